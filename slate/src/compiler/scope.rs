//! Per-function compilation state: the chunk under construction, its
//! visible local bindings, its upvalue names (for closures), and the
//! patch lists `break`/`continue` need once their enclosing loop's end
//! is known.

use crate::bytecode::Chunk;

pub struct LoopContext {
    /// Offset of the condition re-check, for `continue` to jump back to.
    pub continue_target: usize,
    /// Jump instructions emitted by `break`, patched once the loop ends.
    pub break_patches: Vec<usize>,
}

pub struct FunctionScope {
    pub chunk: Chunk,
    /// Visible `(name, slot)` bindings, in declaration order; shadowing
    /// is resolved by scanning from the end.
    pub locals: Vec<(String, u16)>,
    /// Block boundaries: `locals.len()` at each `{` entered, so a block
    /// exit can drop names that went out of scope (slots are not
    /// reused — see DESIGN.md).
    pub block_starts: Vec<usize>,
    /// Names this function's body references free (spec §3.4); their
    /// values arrive as positional `LoadUpvalue` slots in this order.
    pub upvalue_names: Vec<String>,
    pub loops: Vec<LoopContext>,
}

impl FunctionScope {
    pub fn new(chunk: Chunk, upvalue_names: Vec<String>) -> Self {
        Self {
            chunk,
            locals: Vec::new(),
            block_starts: Vec::new(),
            upvalue_names,
            loops: Vec::new(),
        }
    }

    pub fn declare_local(&mut self, name: String) -> u16 {
        let slot = self.chunk.reserve_local();
        self.locals.push((name, slot));
        slot
    }

    pub fn resolve_local(&self, name: &str) -> Option<u16> {
        self.locals.iter().rev().find(|(n, _)| n == name).map(|(_, s)| *s)
    }

    pub fn resolve_upvalue(&self, name: &str) -> Option<u16> {
        self.upvalue_names.iter().position(|n| n == name).map(|i| i as u16)
    }

    pub fn enter_block(&mut self) {
        self.block_starts.push(self.locals.len());
    }

    pub fn exit_block(&mut self) {
        if let Some(start) = self.block_starts.pop() {
            self.locals.truncate(start);
        }
    }
}
