//! Call frames (spec §4.5).
//!
//! Diverges from the spec's literal "base index into a shared value
//! stack" wording: each frame owns its own `locals` array instead. A
//! closure's captured variables already live in their own
//! `Rc<RefCell<Value>>` cells, so nothing but this frame's own
//! parameters and block-scoped locals ever needs a slot here, and a
//! per-frame `Vec` sidesteps the bookkeeping a shared stack would need
//! to keep a closure's captured-by-reference slots alive once its
//! defining frame returns. See DESIGN.md.

use std::rc::Rc;

use slate_value::ClosureValue;

/// One call in progress. `ip` indexes `closure.function`'s owning
/// chunk's `code`; `locals[i]` backs `LoadLocal(i)`/`StoreLocal(i)`.
#[derive(Debug)]
pub struct Frame {
    pub closure: Rc<ClosureValue>,
    pub ip: usize,
    pub locals: Vec<slate_value::Value>,
}

impl Frame {
    pub fn new(closure: Rc<ClosureValue>, num_locals: usize) -> Self {
        let mut locals = Vec::with_capacity(num_locals);
        locals.resize(num_locals, slate_value::Value::Undefined);
        Self { closure, ip: 0, locals }
    }

    pub fn name(&self) -> &str {
        self.closure.function.name.as_ref().map(|n| n.as_str()).unwrap_or("<anonymous>")
    }
}
