//! Declaration scope stack.
//!
//! Each frame records the accessors declared in one block. An accessor
//! declared in an outer frame is visible to inner frames; one declared in
//! an inner frame is forgotten when the frame is popped, so a sibling block
//! declares it again.

use rustc_hash::FxHashSet;

use qforge_ir::QubitAccessor;

use crate::instruction::Instruction;

/// A stack of per-block "already declared" sets.
#[derive(Debug, Clone)]
pub struct DeclarationScopes {
    frames: Vec<FxHashSet<QubitAccessor>>,
}

impl DeclarationScopes {
    /// A stack holding only the root frame.
    pub fn new() -> Self {
        Self {
            frames: vec![FxHashSet::default()],
        }
    }

    /// Push an empty frame.
    pub fn enter(&mut self) {
        self.frames.push(FxHashSet::default());
    }

    /// Pop the innermost frame. The root frame is never popped.
    pub fn exit(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Number of frames, including the root.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Whether `accessor` is declared in any visible frame.
    pub fn is_declared(&self, accessor: &QubitAccessor) -> bool {
        self.frames.iter().any(|frame| frame.contains(accessor))
    }

    /// Reference `accessor`, appending its declaration (and those of its
    /// constituents, first) to `out` unless already visible.
    pub fn use_accessor(&mut self, accessor: &QubitAccessor, out: &mut Vec<Instruction>) {
        if !accessor.is_declarable() || self.is_declared(accessor) {
            return;
        }
        for part in accessor.constituents() {
            self.use_accessor(part, out);
        }
        if let Some(declaration) = Instruction::declaration(accessor) {
            out.push(declaration);
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(accessor.clone());
        }
    }
}

impl Default for DeclarationScopes {
    fn default() -> Self {
        Self::new()
    }
}
