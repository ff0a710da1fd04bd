//! Built-in quantum gates.

use std::fmt;

use crate::expr::FloatExpr;

/// Gates with fixed size and known semantics.
#[derive(Debug, Clone, PartialEq)]
pub enum StandardGate {
    // Single-qubit Pauli gates
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,

    // Single-qubit Clifford and related gates
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,
    /// V gate (sqrt(X)).
    V,
    /// V-dagger gate.
    Vdg,

    // Single-qubit rotation gates
    /// Phase gate.
    P(FloatExpr),
    /// Rotation around X axis.
    Rx(FloatExpr),
    /// Rotation around Y axis.
    Ry(FloatExpr),
    /// Rotation around Z axis.
    Rz(FloatExpr),
    /// Rotation by an angle around the axis `(nx, ny, nz)`.
    Rn {
        /// Axis x component.
        nx: FloatExpr,
        /// Axis y component.
        ny: FloatExpr,
        /// Axis z component.
        nz: FloatExpr,
        /// Rotation angle.
        angle: FloatExpr,
    },
    /// Universal single-qubit gate U(θ, φ, λ).
    U(FloatExpr, FloatExpr, FloatExpr),

    // Two-qubit gates
    /// SWAP gate.
    Swap,
    /// iSWAP gate.
    ISwap,
    /// iSWAP-dagger gate.
    ISwapDg,
    /// sqrt(SWAP) gate.
    SqrtSwap,
    /// sqrt(SWAP)-dagger gate.
    SqrtSwapDg,
    /// sqrt(iSWAP) gate.
    SqrtISwap,
    /// sqrt(iSWAP)-dagger gate.
    SqrtISwapDg,
}

impl StandardGate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::V => "v",
            StandardGate::Vdg => "vdg",
            StandardGate::P(_) => "p",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::Rn { .. } => "rn",
            StandardGate::U(..) => "u",
            StandardGate::Swap => "swap",
            StandardGate::ISwap => "iswap",
            StandardGate::ISwapDg => "iswapdg",
            StandardGate::SqrtSwap => "sqrtswap",
            StandardGate::SqrtSwapDg => "sqrtswapdg",
            StandardGate::SqrtISwap => "sqrtiswap",
            StandardGate::SqrtISwapDg => "sqrtiswapdg",
        }
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::Swap
            | StandardGate::ISwap
            | StandardGate::ISwapDg
            | StandardGate::SqrtSwap
            | StandardGate::SqrtSwapDg
            | StandardGate::SqrtISwap
            | StandardGate::SqrtISwapDg => 2,
            _ => 1,
        }
    }

    /// Whether this is the identity, which lowers to nothing.
    pub fn is_identity(&self) -> bool {
        matches!(self, StandardGate::I)
    }

    /// Get parameters of this gate.
    pub fn parameters(&self) -> Vec<&FloatExpr> {
        match self {
            StandardGate::P(p) | StandardGate::Rx(p) | StandardGate::Ry(p) | StandardGate::Rz(p) => {
                vec![p]
            }
            StandardGate::Rn { nx, ny, nz, angle } => vec![nx, ny, nz, angle],
            StandardGate::U(a, b, c) => vec![a, b, c],
            _ => vec![],
        }
    }

    /// Look a gate up by name, consuming the exact number of parameters it
    /// takes.
    pub fn from_name(name: &str, params: Vec<FloatExpr>) -> Option<Self> {
        let mut params = params.into_iter();
        let gate = match name {
            "id" => StandardGate::I,
            "x" => StandardGate::X,
            "y" => StandardGate::Y,
            "z" => StandardGate::Z,
            "h" => StandardGate::H,
            "s" => StandardGate::S,
            "sdg" => StandardGate::Sdg,
            "t" => StandardGate::T,
            "tdg" => StandardGate::Tdg,
            "v" => StandardGate::V,
            "vdg" => StandardGate::Vdg,
            "p" => StandardGate::P(params.next()?),
            "rx" => StandardGate::Rx(params.next()?),
            "ry" => StandardGate::Ry(params.next()?),
            "rz" => StandardGate::Rz(params.next()?),
            "rn" => StandardGate::Rn {
                nx: params.next()?,
                ny: params.next()?,
                nz: params.next()?,
                angle: params.next()?,
            },
            "u" => StandardGate::U(params.next()?, params.next()?, params.next()?),
            "swap" => StandardGate::Swap,
            "iswap" => StandardGate::ISwap,
            "iswapdg" => StandardGate::ISwapDg,
            "sqrtswap" => StandardGate::SqrtSwap,
            "sqrtswapdg" => StandardGate::SqrtSwapDg,
            "sqrtiswap" => StandardGate::SqrtISwap,
            "sqrtiswapdg" => StandardGate::SqrtISwapDg,
            _ => return None,
        };
        params.next().is_none().then_some(gate)
    }
}

impl fmt::Display for StandardGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())?;
        let params = self.parameters();
        if !params.is_empty() {
            f.write_str("(")?;
            for (i, p) in params.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{p}")?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}
