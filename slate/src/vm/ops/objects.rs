//! `GetIndex`/`SetIndex`/`GetProperty`/`SetProperty`/`GetMethod`,
//! `MakeArray`/`MakeObject` (spec §3.3, §4.1, §4.5).
//!
//! Property resolution has two shapes: an object (or a class) resolves
//! through its own map and prototype chain and the result is pushed
//! unbound; every other value kind resolves through its primitive
//! class's `instance_properties` and, if the hit is a native, is bound
//! to the receiver (spec §3.1's `BoundMethod`) since a primitive has no
//! object of its own to carry `this` through.

use std::rc::Rc;

use slate_value::{ClassValue, SlateObject, SlateString, Value, ValueKind};

use super::super::error::VmError;
use super::super::Vm;

fn value_to_key(v: &Value) -> String {
    match v {
        Value::Str(s) => s.as_str().to_string(),
        other => other.to_string(),
    }
}

impl Vm {
    pub(in crate::vm) fn class_for(&self, v: &Value) -> Rc<ClassValue> {
        match v.kind() {
            ValueKind::Null => self.classes.null.clone(),
            ValueKind::Undefined => self.classes.undefined.clone(),
            ValueKind::Bool => self.classes.boolean.clone(),
            ValueKind::Int32 => self.classes.int.clone(),
            ValueKind::BigInt => self.classes.bigint.clone(),
            ValueKind::Float32 => self.classes.float32.clone(),
            ValueKind::Float64 => self.classes.float64.clone(),
            ValueKind::String | ValueKind::StringBuilder => self.classes.string.clone(),
            ValueKind::Array => self.classes.array.clone(),
            ValueKind::Buffer | ValueKind::BufferBuilder | ValueKind::BufferReader => self.classes.buffer.clone(),
            ValueKind::Range => self.classes.range.clone(),
            ValueKind::Function | ValueKind::Closure => self.classes.function.clone(),
            ValueKind::Object => self.classes.object.clone(),
            _ => self.classes.object.clone(),
        }
    }

    /// Resolves `receiver.key` (spec §4.5's `GET_PROPERTY`/`GET_METHOD`).
    /// Missing properties read as `undefined` rather than erroring —
    /// `NameError` is reserved for globals (spec §7).
    pub(in crate::vm) fn get_property(&self, receiver: Value, key: &str) -> Value {
        match &receiver {
            Value::Object(obj) => obj.get(key).unwrap_or(Value::Undefined),
            Value::Class(class) => Self::lookup_static(class, key).unwrap_or(Value::Undefined),
            _ => {
                let class = self.class_for(&receiver);
                match class.instance_properties.get(key) {
                    Some(Value::Native(native)) => {
                        Value::BoundMethod(Rc::new(slate_value::BoundMethodValue::new(receiver, native)))
                    }
                    Some(v) => v,
                    None => Value::Undefined,
                }
            }
        }
    }

    fn lookup_static(class: &Rc<ClassValue>, key: &str) -> Option<Value> {
        if let Some(v) = class.static_properties.get_own(key) {
            return Some(v);
        }
        let mut current = class.superclass.clone();
        while let Some(c) = current {
            if let Some(v) = c.static_properties.get_own(key) {
                return Some(v);
            }
            current = c.superclass.clone();
        }
        None
    }

    pub(in crate::vm) fn set_property(&self, receiver: &Value, key: &str, value: Value) -> Result<(), VmError> {
        let key = SlateString::new(key).map_err(|e| VmError::runtime(e.to_string()))?;
        match receiver {
            Value::Object(obj) => {
                obj.set(key, value);
                Ok(())
            }
            Value::Class(class) => {
                class.static_properties.set(key, value);
                Ok(())
            }
            other => Err(VmError::type_error_expected("property assignment", "an object or a class", other.kind())),
        }
    }

    pub(in crate::vm) fn get_index(&self, receiver: &Value, index: &Value) -> Result<Value, VmError> {
        match receiver {
            Value::Array(arr) => {
                let i = Self::array_index(index, arr.len())?;
                Ok(arr.get(i).unwrap_or(Value::Undefined))
            }
            Value::Str(s) => {
                let i = Self::array_index(index, s.len_codepoints())?;
                let ch = s.chars().nth(i).ok_or_else(|| VmError::index_out_of_bounds(i as i64, s.len_codepoints()))?;
                let s = SlateString::new(ch.to_string()).map_err(|e| VmError::runtime(e.to_string()))?;
                Ok(Value::Str(s))
            }
            Value::Object(obj) => Ok(obj.get(&value_to_key(index)).unwrap_or(Value::Undefined)),
            other => Err(VmError::type_error_expected("indexing", "an array, string, or object", other.kind())),
        }
    }

    pub(in crate::vm) fn set_index(&self, receiver: &Value, index: &Value, value: Value) -> Result<(), VmError> {
        match receiver {
            Value::Array(arr) => {
                let i = Self::array_index(index, arr.len())?;
                arr.set(i, value).map_err(|e| VmError::runtime(e.to_string()))
            }
            Value::Object(obj) => {
                let key = SlateString::new(value_to_key(index)).map_err(|e| VmError::runtime(e.to_string()))?;
                obj.set(key, value);
                Ok(())
            }
            other => Err(VmError::type_error_expected("index assignment", "an array or object", other.kind())),
        }
    }

    fn array_index(index: &Value, len: usize) -> Result<usize, VmError> {
        match index {
            Value::Int32(i) if *i >= 0 && (*i as usize) < len => Ok(*i as usize),
            Value::Int32(i) => Err(VmError::index_out_of_bounds(*i as i64, len)),
            other => Err(VmError::type_error_expected("indexing", "an integer", other.kind())),
        }
    }

    pub(in crate::vm) fn make_array(&self, values: Vec<Value>) -> Value {
        Value::Array(slate_value::SlateArray::from_vec(values))
    }

    pub(in crate::vm) fn make_object(&self, pairs: Vec<(Value, Value)>) -> Result<Value, VmError> {
        let obj = SlateObject::new();
        for (k, v) in pairs {
            let key = SlateString::new(value_to_key(&k)).map_err(|e| VmError::runtime(e.to_string()))?;
            obj.set(key, v);
        }
        Ok(Value::Object(obj))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::Module;

    #[test]
    fn string_method_resolves_bound_to_its_receiver() {
        let vm = Vm::new(Module::new());
        let s = Value::Str(SlateString::new("hi").unwrap());
        let resolved = vm.get_property(s.clone(), "toUpper");
        let Value::BoundMethod(bound) = resolved else { panic!("expected a bound method") };
        assert_eq!(bound.receiver, s);
    }

    #[test]
    fn object_static_is_not_bound() {
        let vm = Vm::new(Module::new());
        let class = Value::Class(vm.classes.object.clone());
        let resolved = vm.get_property(class, "create");
        assert!(matches!(resolved, Value::Native(_)));
    }

    #[test]
    fn missing_property_reads_as_undefined() {
        let vm = Vm::new(Module::new());
        let obj = Value::Object(SlateObject::new());
        assert_eq!(vm.get_property(obj, "nope"), Value::Undefined);
    }

    #[test]
    fn array_index_out_of_bounds_is_a_range_error() {
        let vm = Vm::new(Module::new());
        let arr = Value::Array(slate_value::SlateArray::from_vec(vec![Value::Int32(1)]));
        let err = vm.get_index(&arr, &Value::Int32(5)).unwrap_err();
        assert!(matches!(err, VmError::RangeError { .. }));
    }
}
