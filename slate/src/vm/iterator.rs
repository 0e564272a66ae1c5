//! `GET_ITER` (spec §4.5): wraps a value in the has_next/next protocol
//! slate-value's `IteratorValue` already implements. `IterHasNext`/
//! `IterNext` need no wrapper of their own — they call straight through
//! to `Value::Iterator`'s methods in the main dispatch loop. Grounded on
//! the teacher's range/iterator handling in `vm/exec/iterator.rs` and
//! `vm/exec/range.rs`.

use slate_value::{IteratorValue, Value};

use super::error::VmError;

pub fn make_iterator(v: &Value) -> Result<Value, VmError> {
    match v {
        Value::Array(a) => Ok(Value::Iterator(IteratorValue::over_array(a.clone()))),
        Value::Range(r) => Ok(Value::Iterator(IteratorValue::over_range(**r))),
        Value::Str(s) => Ok(Value::Iterator(IteratorValue::over_string_codepoints(s.clone()))),
        other => Err(VmError::type_error_expected("for-loop iteration", "an array, range, or string", other.kind())),
    }
}
