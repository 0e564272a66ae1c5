//! The opcode set (C4, spec §4.4). Each instruction is a single opcode
//! byte plus at most one `u16` (or signed `i16` for jump deltas) operand,
//! matching the on-disk layout in spec §6.1 exactly.
//!
//! Grounded on the teacher's `vm/instr.rs` `Instr` enum shape; unlike the
//! teacher's name-indexed locals, Slate's locals and upvalues are slot
//! indices (spec §4.5), and constants are indices into the owning
//! [`crate::bytecode::chunk::Chunk`]'s constant pool (spec §3.7).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Instr {
    LoadConst(u16),
    LoadNull,
    LoadUndefined,
    LoadTrue,
    LoadFalse,

    LoadLocal(u16),
    StoreLocal(u16),
    LoadGlobal(u16),
    StoreGlobal(u16),
    /// Pops and binds a new global (spec §4.4); unlike `StoreGlobal`,
    /// never errors on a name that doesn't exist yet.
    DefineGlobal(u16),
    LoadUpvalue(u16),
    StoreUpvalue(u16),

    Pop,
    Dup,

    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    Neg,
    Not,

    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    /// Unconditional relative jump. The operand is a signed offset from
    /// the instruction immediately following the jump (a negative offset
    /// is how `while`/`for` loop back-edges — spec's `LOOP` — are
    /// expressed, since this opcode set folds `LOOP` into signed `Jump`).
    Jump(i16),
    /// Pops the condition; jumps if it is falsy.
    JumpIfFalse(i16),
    /// Pops the condition; jumps if it is truthy. Used by short-circuit
    /// `||` (spec §4.4); `&&` uses `JumpIfFalse` instead.
    JumpIfTrue(i16),

    Call(u16),
    Return,

    MakeArray(u16),
    MakeObject(u16),
    GetIndex,
    SetIndex,
    /// Operand indexes the constant pool for the property name.
    GetProperty(u16),
    SetProperty(u16),
    /// Operand indexes the constant pool for the method name; the call's
    /// argument count is read from the following `Call` instruction.
    GetMethod(u16),

    MakeRange,
    GetIter,
    IterHasNext,
    IterNext,

    /// Operand indexes the constant pool for the function prototype; the
    /// capture count follows as the number of `LoadLocal`/`LoadUpvalue`
    /// instructions the compiler emits immediately before it.
    MakeClosure(u16),
    /// Builds a class value (spec §3.3). Stack order bottom-to-top:
    /// class name (`Str` constant load), superclass (a `Class` or
    /// `LoadNull`), then `operand` key/value pairs (method name constant
    /// load, then a `MakeClosure`) for the instance methods. Pops all of
    /// it and pushes the assembled `Class`.
    MakeClass(u16),
    /// Operand indexes the constant pool for the class name; looks the
    /// class up as a global and pushes it as the pending callee for the
    /// `Call` that follows, mirroring `GetMethod`.
    NewInstance(u16),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instr_is_copy_and_small() {
        fn assert_copy<T: Copy>() {}
        assert_copy::<Instr>();
    }
}
