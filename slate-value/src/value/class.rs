//! Class/prototype values (spec §3.3).
//!
//! A class owns a static property map (looked up on the class itself) and
//! an instance-property map (the prototype new instances delegate to via
//! [`SlateObject::with_prototype`]). Every primitive type's class
//! (`Int`, `Float`, `String`, `Array`, ...) is registered eagerly into the
//! VM's global class registry at construction time (spec §9 open
//! question, resolved in DESIGN.md).

use std::fmt;
use std::rc::Rc;

use crate::containers::{SlateObject, SlateString};
use crate::value::value_enum::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct ClassValue {
    pub name: SlateString,
    /// Properties/methods resolved on an instance of this class.
    pub instance_properties: SlateObject,
    /// Properties/methods resolved on the class value itself (statics).
    pub static_properties: SlateObject,
    pub superclass: Option<Rc<ClassValue>>,
    /// The callable invoked on `Class(args…)` (spec §3.3). `None` means
    /// the class declared no `init` method; construction then falls back
    /// to a bare [`Self::instantiate`] that ignores constructor arguments
    /// rather than erroring, since most classes in practice have no
    /// constructor logic to run (see DESIGN.md).
    pub factory: Option<Value>,
}

impl ClassValue {
    pub fn new(name: SlateString) -> Self {
        Self {
            name,
            instance_properties: SlateObject::new(),
            static_properties: SlateObject::new(),
            superclass: None,
            factory: None,
        }
    }

    pub fn with_superclass(name: SlateString, superclass: Rc<ClassValue>) -> Self {
        let instance_properties = SlateObject::with_prototype(superclass.instance_properties.clone());
        Self {
            name,
            instance_properties,
            static_properties: SlateObject::new(),
            superclass: Some(superclass),
            factory: None,
        }
    }

    /// Creates a fresh instance object prototyped off this class's
    /// instance-property map.
    pub fn instantiate(&self) -> SlateObject {
        SlateObject::with_prototype(self.instance_properties.clone())
    }

    pub fn is_subclass_of(&self, other: &ClassValue) -> bool {
        let mut current = self.superclass.clone();
        while let Some(c) = current {
            if c.name == other.name {
                return true;
            }
            current = c.superclass.clone();
        }
        false
    }
}

impl fmt::Display for ClassValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class {}", self.name)
    }
}

/// The set of globally registered primitive classes (spec §3.3), built
/// eagerly once at VM construction and shared thereafter.
#[derive(Debug, Clone)]
pub struct PrimitiveClasses {
    pub null: Rc<ClassValue>,
    pub undefined: Rc<ClassValue>,
    pub boolean: Rc<ClassValue>,
    pub int: Rc<ClassValue>,
    pub bigint: Rc<ClassValue>,
    pub float32: Rc<ClassValue>,
    pub float64: Rc<ClassValue>,
    pub string: Rc<ClassValue>,
    pub array: Rc<ClassValue>,
    pub object: Rc<ClassValue>,
    pub buffer: Rc<ClassValue>,
    pub range: Rc<ClassValue>,
    pub function: Rc<ClassValue>,
}

impl PrimitiveClasses {
    /// Builds every primitive class up front. Each class is a bare
    /// container here; the runtime (C5) attaches the actual builtin
    /// method implementations during `Vm::new`, once it can close over
    /// VM state to register natives on `instance_properties`.
    pub fn new_eager() -> Self {
        let make = |n: &str| match SlateString::new(n) {
            Ok(s) => Rc::new(ClassValue::new(s)),
            Err(_) => unreachable!("primitive class names never contain a NUL byte"),
        };
        Self {
            null: make("Null"),
            undefined: make("Undefined"),
            boolean: make("Boolean"),
            int: make("Int"),
            bigint: make("BigInt"),
            float32: make("Float32"),
            float64: make("Float64"),
            string: make("String"),
            array: make("Array"),
            object: make("Object"),
            buffer: make("Buffer"),
            range: make("Range"),
            function: make("Function"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subclass_relationship_is_transitive() {
        let base = Rc::new(ClassValue::new(SlateString::new("Animal").unwrap()));
        let mid = Rc::new(ClassValue::with_superclass(
            SlateString::new("Mammal").unwrap(),
            base.clone(),
        ));
        let leaf = ClassValue::with_superclass(SlateString::new("Dog").unwrap(), mid);
        assert!(leaf.is_subclass_of(&base));
    }

    #[test]
    fn instantiate_delegates_to_instance_properties() {
        let class = ClassValue::new(SlateString::new("Point").unwrap());
        class
            .instance_properties
            .set(SlateString::new("dimensions").unwrap(), crate::value::Value::Int32(2));
        let instance = class.instantiate();
        assert_eq!(instance.get("dimensions"), Some(crate::value::Value::Int32(2)));
    }

    #[test]
    fn eager_primitive_classes_are_all_distinct() {
        let classes = PrimitiveClasses::new_eager();
        assert_eq!(classes.int.name.as_str(), "Int");
        assert_eq!(classes.string.name.as_str(), "String");
        assert!(!classes.int.instance_properties.ptr_eq(&classes.string.instance_properties));
    }
}
