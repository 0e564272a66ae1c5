//! Iterator protocol: `has_next` / `next` over arrays, ranges, and strings
//! by codepoint (spec §3.5/§4.2).

use std::cell::RefCell;
use std::rc::Rc;

use crate::containers::{SlateArray, SlateString};
use crate::value::range::RangeValue;
use crate::value::value_enum::Value;

#[derive(Debug, Clone, Copy)]
enum Cursor {
    Array(usize),
    Range(u64),
    String(usize),
}

#[derive(Debug)]
enum Source {
    Array(SlateArray),
    Range(RangeValue),
    String(SlateString),
}

#[derive(Debug, Clone)]
pub struct IteratorValue(Rc<RefCell<IteratorState>>);

impl PartialEq for IteratorValue {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

#[derive(Debug)]
struct IteratorState {
    source: Source,
    cursor: Cursor,
}

impl IteratorValue {
    pub fn over_array(array: SlateArray) -> Self {
        Self(Rc::new(RefCell::new(IteratorState {
            source: Source::Array(array),
            cursor: Cursor::Array(0),
        })))
    }

    pub fn over_range(range: RangeValue) -> Self {
        Self(Rc::new(RefCell::new(IteratorState {
            source: Source::Range(range),
            cursor: Cursor::Range(0),
        })))
    }

    pub fn over_string_codepoints(s: SlateString) -> Self {
        Self(Rc::new(RefCell::new(IteratorState {
            source: Source::String(s),
            cursor: Cursor::String(0),
        })))
    }

    pub fn has_next(&self) -> bool {
        let state = self.0.borrow();
        match (&state.source, state.cursor) {
            (Source::Array(arr), Cursor::Array(i)) => i < arr.len(),
            (Source::Range(range), Cursor::Range(i)) => i < range.len(),
            (Source::String(s), Cursor::String(i)) => i < s.len_codepoints(),
            _ => unreachable!("cursor variant always matches its source"),
        }
    }

    pub fn next(&self) -> Option<Value> {
        let mut state = self.0.borrow_mut();
        match (&state.source, &mut state.cursor) {
            (Source::Array(arr), Cursor::Array(i)) => {
                let v = arr.get(*i)?;
                *i += 1;
                Some(v)
            }
            (Source::Range(range), Cursor::Range(i)) => {
                let v = range.nth(*i)?;
                *i += 1;
                Some(Value::Int32(i32::try_from(v).unwrap_or(i32::MAX)))
            }
            (Source::String(s), Cursor::String(i)) => {
                let c = s.chars().nth(*i)?;
                *i += 1;
                Some(Value::Str(SlateString::new(c.to_string()).ok()?))
            }
            _ => unreachable!("cursor variant always matches its source"),
        }
    }

    pub fn ptr_eq(&self, other: &IteratorValue) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_iterator_yields_in_order() {
        let arr = SlateArray::from_vec(vec![Value::Int32(1), Value::Int32(2)]);
        let it = IteratorValue::over_array(arr);
        assert!(it.has_next());
        assert_eq!(it.next(), Some(Value::Int32(1)));
        assert_eq!(it.next(), Some(Value::Int32(2)));
        assert!(!it.has_next());
        assert_eq!(it.next(), None);
    }

    #[test]
    fn range_iterator_respects_direction() {
        let range = RangeValue::new(3, 1, -1).unwrap();
        let it = IteratorValue::over_range(range);
        let mut seen = Vec::new();
        while it.has_next() {
            seen.push(it.next().unwrap());
        }
        assert_eq!(seen, vec![Value::Int32(3), Value::Int32(2), Value::Int32(1)]);
    }

    #[test]
    fn string_iterator_yields_codepoints() {
        let s = SlateString::new("ab").unwrap();
        let it = IteratorValue::over_string_codepoints(s);
        assert_eq!(it.next().unwrap(), Value::Str(SlateString::new("a").unwrap()));
        assert_eq!(it.next().unwrap(), Value::Str(SlateString::new("b").unwrap()));
    }
}
