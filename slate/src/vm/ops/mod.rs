//! Per-concern opcode handlers (spec §4.5), split the way the teacher's
//! `vm/exec/mod.rs` spreads its `dispatch_instr` across handler modules.
//! Slate's opcode set is an order of magnitude smaller than the
//! teacher's, so it groups into four files instead of their two dozen,
//! but the shape is the same: each module is an `impl Vm` block the
//! main dispatch loop in `vm/mod.rs` calls into.

mod arithmetic;
mod calls;
mod closures;
mod objects;
