//! Multiplexed control decomposition.
//!
//! A mux over `k` controls selects one of `2^k` blocks by the truth values
//! of the controls, bit `p` of the block index being control `p`. The blocks
//! are linearized by walking the block indices in order and toggling only
//! the controls whose bit changed from one index to the next.

use qforge_ir::{IrError, IrResult, Location, QubitAccessor};

use crate::instruction::Instruction;

/// Number of blocks a mux over `controls` control accessors needs, or
/// `None` if that does not fit in `usize`.
pub fn block_count(controls: usize) -> Option<usize> {
    u32::try_from(controls)
        .ok()
        .and_then(|k| 1usize.checked_shl(k))
}

/// Check that there is one block per control assignment.
pub fn check_shape(controls: usize, blocks: usize) -> IrResult<()> {
    match block_count(controls) {
        Some(expected) if expected == blocks => Ok(()),
        expected => Err(IrError::InvalidMux {
            controls,
            expected: expected.unwrap_or(usize::MAX),
            got: blocks,
        }),
    }
}

/// Linearize already lowered `blocks` under `controls`.
///
/// Every control is opened with `false` and closed at the end. Toggles are
/// emitted for every state even when its block is empty, so the control
/// pairs stay balanced.
pub fn multiplex(
    controls: &[QubitAccessor],
    blocks: Vec<Vec<Instruction>>,
    location: Option<&Location>,
) -> IrResult<Vec<Instruction>> {
    check_shape(controls.len(), blocks.len())?;
    let at = || location.cloned();

    let mut out: Vec<Instruction> = controls
        .iter()
        .map(|control| Instruction::begin_control(control.clone(), false).at(at()))
        .collect();

    for (state, block) in blocks.into_iter().enumerate() {
        if state > 0 {
            let diff = state ^ (state - 1);
            for (p, control) in controls.iter().enumerate() {
                if diff & (1 << p) != 0 {
                    out.push(Instruction::end_control(control.clone()).at(at()));
                    let condition = state & (1 << p) != 0;
                    out.push(Instruction::begin_control(control.clone(), condition).at(at()));
                }
            }
        }
        out.extend(block);
    }

    out.extend(
        controls
            .iter()
            .map(|control| Instruction::end_control(control.clone()).at(at())),
    );
    Ok(out)
}
