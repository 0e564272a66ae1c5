//! Shared, mutable property map (C1).
//!
//! Small maps are scanned linearly to avoid hashing overhead; once a map
//! grows to the threshold it is promoted to a `HashMap` internally. The
//! promotion is transparent to callers. Grounded on the teacher's
//! `vm/value/object_value/mod.rs` shared-handle convention.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::containers::string::SlateString;
use crate::value::Value;

/// Above this many entries a [`SlateObject`] switches from a linear `Vec`
/// scan to a `HashMap` lookup (spec §4.1).
const HASH_PROMOTION_THRESHOLD: usize = 8;

enum Storage {
    Linear(Vec<(SlateString, Value)>),
    Hashed(HashMap<String, Value>),
}

pub struct SlateObjectInner {
    storage: Storage,
    /// Optional prototype for class-based property lookup fallthrough
    /// (spec §3.3).
    prototype: Option<SlateObject>,
}

#[derive(Clone)]
pub struct SlateObject(Rc<RefCell<SlateObjectInner>>);

impl SlateObject {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(SlateObjectInner {
            storage: Storage::Linear(Vec::new()),
            prototype: None,
        })))
    }

    pub fn with_prototype(prototype: SlateObject) -> Self {
        Self(Rc::new(RefCell::new(SlateObjectInner {
            storage: Storage::Linear(Vec::new()),
            prototype: Some(prototype),
        })))
    }

    pub fn prototype(&self) -> Option<SlateObject> {
        self.0.borrow().prototype.clone()
    }

    /// Own-property lookup only; does not walk the prototype chain.
    pub fn get_own(&self, key: &str) -> Option<Value> {
        match &self.0.borrow().storage {
            Storage::Linear(entries) => entries
                .iter()
                .find(|(k, _)| k.as_str() == key)
                .map(|(_, v)| v.clone()),
            Storage::Hashed(map) => map.get(key).cloned(),
        }
    }

    /// Looks up `key`, walking the prototype chain on a miss (spec §3.3).
    pub fn get(&self, key: &str) -> Option<Value> {
        if let Some(v) = self.get_own(key) {
            return Some(v);
        }
        self.prototype().and_then(|p| p.get(key))
    }

    pub fn set(&self, key: SlateString, value: Value) {
        let mut inner = self.0.borrow_mut();
        match &mut inner.storage {
            Storage::Linear(entries) => {
                if let Some(slot) = entries.iter_mut().find(|(k, _)| *k == key) {
                    slot.1 = value;
                    return;
                }
                if entries.len() + 1 > HASH_PROMOTION_THRESHOLD {
                    let mut map: HashMap<String, Value> = entries
                        .drain(..)
                        .map(|(k, v)| (k.as_str().to_string(), v))
                        .collect();
                    map.insert(key.as_str().to_string(), value);
                    inner.storage = Storage::Hashed(map);
                } else {
                    entries.push((key, value));
                }
            }
            Storage::Hashed(map) => {
                map.insert(key.as_str().to_string(), value);
            }
        }
    }

    pub fn delete(&self, key: &str) -> bool {
        let mut inner = self.0.borrow_mut();
        match &mut inner.storage {
            Storage::Linear(entries) => {
                let before = entries.len();
                entries.retain(|(k, _)| k.as_str() != key);
                entries.len() != before
            }
            Storage::Hashed(map) => map.remove(key).is_some(),
        }
    }

    pub fn has_own(&self, key: &str) -> bool {
        self.get_own(key).is_some()
    }

    pub fn len(&self) -> usize {
        match &self.0.borrow().storage {
            Storage::Linear(entries) => entries.len(),
            Storage::Hashed(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn keys(&self) -> Vec<String> {
        match &self.0.borrow().storage {
            Storage::Linear(entries) => entries.iter().map(|(k, _)| k.as_str().to_string()).collect(),
            Storage::Hashed(map) => map.keys().cloned().collect(),
        }
    }

    pub fn ptr_eq(&self, other: &SlateObject) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for SlateObject {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for SlateObject {
    /// Objects compare by identity: two distinct maps with the same
    /// entries are still different objects (spec §3.1).
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for SlateObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.0.borrow();
        match &inner.storage {
            Storage::Linear(entries) => f
                .debug_map()
                .entries(entries.iter().map(|(k, v)| (k.as_str(), v)))
                .finish(),
            Storage::Hashed(map) => f.debug_map().entries(map.iter()).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> SlateString {
        SlateString::new(s).unwrap()
    }

    #[test]
    fn set_then_get_own() {
        let obj = SlateObject::new();
        obj.set(key("x"), Value::Int32(42));
        assert_eq!(obj.get_own("x"), Some(Value::Int32(42)));
    }

    #[test]
    fn prototype_fallthrough() {
        let proto = SlateObject::new();
        proto.set(key("greeting"), Value::Int32(1));
        let child = SlateObject::with_prototype(proto);
        assert_eq!(child.get("greeting"), Some(Value::Int32(1)));
        assert_eq!(child.get_own("greeting"), None);
    }

    #[test]
    fn promotes_to_hashed_storage_past_threshold() {
        let obj = SlateObject::new();
        for i in 0..(HASH_PROMOTION_THRESHOLD + 2) {
            obj.set(key(&format!("k{i}")), Value::Int32(i as i32));
        }
        assert_eq!(obj.len(), HASH_PROMOTION_THRESHOLD + 2);
        assert_eq!(obj.get_own("k0"), Some(Value::Int32(0)));
        assert!(matches!(obj.0.borrow().storage, Storage::Hashed(_)));
    }

    #[test]
    fn delete_removes_entry() {
        let obj = SlateObject::new();
        obj.set(key("x"), Value::Null);
        assert!(obj.delete("x"));
        assert!(!obj.has_own("x"));
    }
}
