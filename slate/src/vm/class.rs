//! Primitive class registry (spec §3.3, §9).
//!
//! `PrimitiveClasses::new_eager` (slate-value) builds the bare class
//! containers; this module is where the runtime (C5) attaches the
//! actual builtin method implementations, since only here can a native
//! close over nothing but its own arguments (spec §6.2's native ABI has
//! no VM-reentrant callback, so every builtin here is self-contained).
//! Grounded on the teacher's `ModuleValue`/registry-singleton pattern in
//! `vm/value/metadata.rs`.

use std::rc::Rc;

use slate_value::{ArrayError, NativeFunction, PrimitiveClasses, SlateArray, SlateObject, SlateString, StringError, Value};

fn native(name: &str, arity: Option<usize>, f: impl Fn(&[Value]) -> Result<Value, String> + 'static) -> Value {
    let name = match SlateString::new(name) {
        Ok(n) => n,
        Err(_) => unreachable!("builtin method names never contain a NUL byte"),
    };
    Value::Native(Rc::new(NativeFunction::new(name, arity, Rc::new(f))))
}

fn string_of(v: &Value, who: &str) -> Result<SlateString, String> {
    match v {
        Value::Str(s) => Ok(s.clone()),
        other => Err(format!("{who} expected a string receiver, got {}", other.kind())),
    }
}

fn array_of(v: &Value, who: &str) -> Result<SlateArray, String> {
    match v {
        Value::Array(a) => Ok(a.clone()),
        other => Err(format!("{who} expected an array receiver, got {}", other.kind())),
    }
}

fn int_of(v: &Value, who: &str) -> Result<i64, String> {
    match v {
        Value::Int32(i) => Ok(*i as i64),
        other => Err(format!("{who} expected an integer argument, got {}", other.kind())),
    }
}

fn map_string_err(e: StringError) -> String {
    e.to_string()
}

fn map_array_err(e: ArrayError) -> String {
    e.to_string()
}

/// Builds the eager primitive class set and installs every builtin
/// instance/static method spec §4.1 names for strings, arrays, and
/// objects. Scalar/container classes with no builtin surface in scope
/// (Range, Bool, Float32/64) keep an empty `instance_properties` map; it
/// is still a real object, so property lookups on those values resolve
/// through it without a special case in the VM.
pub fn build() -> PrimitiveClasses {
    let classes = PrimitiveClasses::new_eager();
    install_string_methods(&classes);
    install_array_methods(&classes);
    install_object_statics(&classes);
    install_buffer_methods(&classes);
    classes
}

fn install_string_methods(classes: &PrimitiveClasses) {
    let props = &classes.string.instance_properties;
    let key = |n: &str| match SlateString::new(n) {
        Ok(s) => s,
        Err(_) => unreachable!("builtin method names never contain a NUL byte"),
    };

    props.set(
        key("toUpper"),
        native("String.toUpper", Some(1), |args| Ok(Value::Str(string_of(&args[0], "toUpper")?.to_upper()))),
    );
    props.set(
        key("toLower"),
        native("String.toLower", Some(1), |args| Ok(Value::Str(string_of(&args[0], "toLower")?.to_lower()))),
    );
    props.set(
        key("substring"),
        native("String.substring", Some(3), |args| {
            let s = string_of(&args[0], "substring")?;
            let start = int_of(&args[1], "substring")?;
            let len = int_of(&args[2], "substring")?;
            if start < 0 || len < 0 {
                return Err("substring: start and length must be non-negative".to_string());
            }
            s.substring(start as usize, len as usize)
                .map(Value::Str)
                .ok_or_else(|| format!("substring: range {start}..{} out of bounds for length {}", start + len, s.len_codepoints()))
        }),
    );
    props.set(
        key("find"),
        native("String.find", Some(2), |args| {
            let s = string_of(&args[0], "find")?;
            let needle = string_of(&args[1], "find")?;
            Ok(match s.find(needle.as_str()) {
                Some(i) => Value::Int32(i as i32),
                None => Value::Int32(-1),
            })
        }),
    );
    props.set(
        key("replace"),
        native("String.replace", Some(3), |args| {
            let s = string_of(&args[0], "replace")?;
            let from = string_of(&args[1], "replace")?;
            let to = string_of(&args[2], "replace")?;
            Ok(Value::Str(s.replace(from.as_str(), to.as_str())))
        }),
    );
    props.set(
        key("append"),
        native("String.append", Some(2), |args| {
            let s = string_of(&args[0], "append")?;
            let other = string_of(&args[1], "append")?;
            Ok(Value::Str(s.append(&other)))
        }),
    );
    props.set(
        key("length"),
        native("String.length", Some(1), |args| Ok(Value::Int32(string_of(&args[0], "length")?.len_codepoints() as i32))),
    );
}

fn install_array_methods(classes: &PrimitiveClasses) {
    let props = &classes.array.instance_properties;
    let key = |n: &str| match SlateString::new(n) {
        Ok(s) => s,
        Err(_) => unreachable!("builtin method names never contain a NUL byte"),
    };

    props.set(
        key("push"),
        native("Array.push", Some(2), |args| {
            array_of(&args[0], "push")?.push(args[1].clone());
            Ok(args[0].clone())
        }),
    );
    props.set(
        key("pop"),
        native("Array.pop", Some(1), |args| Ok(array_of(&args[0], "pop")?.pop().unwrap_or(Value::Undefined))),
    );
    props.set(
        key("insert"),
        native("Array.insert", Some(3), |args| {
            let arr = array_of(&args[0], "insert")?;
            let index = int_of(&args[1], "insert")?;
            if index < 0 {
                return Err("insert: index must be non-negative".to_string());
            }
            arr.insert(index as usize, args[2].clone()).map_err(map_array_err)?;
            Ok(args[0].clone())
        }),
    );
    props.set(
        key("remove"),
        native("Array.remove", Some(2), |args| {
            let arr = array_of(&args[0], "remove")?;
            let index = int_of(&args[1], "remove")?;
            if index < 0 {
                return Err("remove: index must be non-negative".to_string());
            }
            arr.remove(index as usize).map_err(map_array_err)
        }),
    );
    props.set(
        key("concat"),
        native("Array.concat", Some(2), |args| {
            let a = array_of(&args[0], "concat")?;
            let b = array_of(&args[1], "concat")?;
            Ok(Value::Array(a.concat(&b)))
        }),
    );
    props.set(
        key("slice"),
        native("Array.slice", Some(3), |args| {
            let arr = array_of(&args[0], "slice")?;
            let start = int_of(&args[1], "slice")?;
            let len = int_of(&args[2], "slice")?;
            if start < 0 || len < 0 {
                return Err("slice: start and length must be non-negative".to_string());
            }
            Ok(Value::Array(arr.slice(start as usize, len as usize)))
        }),
    );
    props.set(
        key("reverse"),
        native("Array.reverse", Some(1), |args| {
            let arr = array_of(&args[0], "reverse")?;
            arr.borrow_mut().reverse();
            Ok(args[0].clone())
        }),
    );
    props.set(
        key("length"),
        native("Array.length", Some(1), |args| Ok(Value::Int32(array_of(&args[0], "length")?.len() as i32))),
    );
}

fn endian_of(v: &Value, who: &str) -> Result<slate_value::Endian, String> {
    match int_of(v, who)? {
        0 => Ok(slate_value::Endian::Little),
        1 => Ok(slate_value::Endian::Big),
        other => Err(format!("{who}: endian argument must be 0 (little) or 1 (big), got {other}")),
    }
}

/// Installs the byte-buffer surface (spec §4.1's fixed-width encode/decode
/// contract) across all three buffer handles (spec §3.1): `Buffer`
/// (immutable, decode-only), `BufferBuilder` (growable, encode + finalize
/// to a `Buffer`), and `BufferReader` (positional cursor, sequential
/// decode over a `Buffer`). All three route through the same primitive
/// class (`class_for` maps every buffer kind there), so each method name
/// is installed once and dispatches on which variant it actually
/// received. Numeric accessors take an explicit little/big endian flag
/// (`0`/`1`) since natives cross the ABI as plain values (spec §6.2), not
/// as an enum.
fn install_buffer_methods(classes: &PrimitiveClasses) {
    let props = &classes.buffer.instance_properties;
    let key = |n: &str| match SlateString::new(n) {
        Ok(s) => s,
        Err(_) => unreachable!("builtin method names never contain a NUL byte"),
    };

    props.set(
        key("length"),
        native("Buffer.length", Some(1), |args| match &args[0] {
            Value::Buffer(b) => Ok(Value::Int32(b.len() as i32)),
            Value::BufferBuilder(b) => Ok(Value::Int32(b.len() as i32)),
            other => Err(format!("length expected a buffer receiver, got {}", other.kind())),
        }),
    );
    props.set(
        key("toHex"),
        native("Buffer.toHex", Some(1), |args| match &args[0] {
            Value::Buffer(b) => Ok(Value::Str(SlateString::new(b.to_hex()).map_err(map_string_err)?)),
            other => Err(format!("toHex expected a buffer receiver, got {}", other.kind())),
        }),
    );
    props.set(
        key("slice"),
        native("Buffer.slice", Some(3), |args| {
            let Value::Buffer(b) = &args[0] else {
                return Err(format!("slice expected a buffer receiver, got {}", args[0].kind()));
            };
            let start = int_of(&args[1], "slice")?;
            let len = int_of(&args[2], "slice")?;
            if start < 0 || len < 0 {
                return Err("slice: start and length must be non-negative".to_string());
            }
            Ok(Value::Buffer(b.slice(start as usize, len as usize)))
        }),
    );
    props.set(
        key("concat"),
        native("Buffer.concat", Some(2), |args| {
            let (Value::Buffer(a), Value::Buffer(b)) = (&args[0], &args[1]) else {
                return Err("concat expects two buffer receivers".to_string());
            };
            Ok(Value::Buffer(a.concat(b)))
        }),
    );
    props.set(
        key("readU32"),
        native("Buffer.readU32", Some(3), |args| {
            let Value::Buffer(b) = &args[0] else {
                return Err(format!("readU32 expected a buffer receiver, got {}", args[0].kind()));
            };
            let offset = int_of(&args[1], "readU32")?;
            if offset < 0 {
                return Err("readU32: offset must be non-negative".to_string());
            }
            let endian = endian_of(&args[2], "readU32")?;
            b.read_u32(offset as usize, endian).map(|v| Value::Int32(v as i32)).map_err(|e| e.to_string())
        }),
    );
    props.set(
        key("writeU32"),
        native("BufferBuilder.writeU32", Some(4), |args| {
            let Value::BufferBuilder(b) = &args[0] else {
                return Err(format!("writeU32 expected a buffer builder receiver, got {}", args[0].kind()));
            };
            let offset = int_of(&args[1], "writeU32")?;
            if offset < 0 {
                return Err("writeU32: offset must be non-negative".to_string());
            }
            let value = int_of(&args[2], "writeU32")? as u32;
            let endian = endian_of(&args[3], "writeU32")?;
            b.write_bytes_at(offset as usize, &[0; 4]);
            b.write_u32(offset as usize, value, endian).map_err(|e| e.to_string())?;
            Ok(args[0].clone())
        }),
    );
    props.set(
        key("finalize"),
        native("BufferBuilder.finalize", Some(1), |args| {
            let Value::BufferBuilder(b) = &args[0] else {
                return Err(format!("finalize expected a buffer builder receiver, got {}", args[0].kind()));
            };
            Ok(Value::Buffer(b.finalize()))
        }),
    );
    props.set(
        key("readReaderU32"),
        native("BufferReader.readU32", Some(2), |args| {
            let Value::BufferReader(r) = &args[0] else {
                return Err(format!("readReaderU32 expected a buffer reader receiver, got {}", args[0].kind()));
            };
            let endian = endian_of(&args[1], "readReaderU32")?;
            r.read_u32(endian).map(|v| Value::Int32(v as i32)).map_err(|e| e.to_string())
        }),
    );
    props.set(
        key("hasRemaining"),
        native("BufferReader.hasRemaining", Some(1), |args| {
            let Value::BufferReader(r) = &args[0] else {
                return Err(format!("hasRemaining expected a buffer reader receiver, got {}", args[0].kind()));
            };
            Ok(Value::Bool(r.has_remaining()))
        }),
    );

    let statics = &classes.buffer.static_properties;
    statics.set(
        key("withLength"),
        native("Buffer.withLength", Some(1), |args| {
            let len = int_of(&args[0], "withLength")?;
            if len < 0 {
                return Err("withLength: length must be non-negative".to_string());
            }
            Ok(Value::Buffer(slate_value::SlateBuffer::with_len(len as usize)))
        }),
    );
    statics.set(
        key("builder"),
        native("Buffer.builder", Some(0), |_| Ok(Value::BufferBuilder(slate_value::BufferBuilder::new()))),
    );
    statics.set(
        key("reader"),
        native("Buffer.reader", Some(1), |args| match &args[0] {
            Value::Buffer(b) => Ok(Value::BufferReader(slate_value::BufferReader::new(b.clone()))),
            other => Err(format!("reader expected a buffer argument, got {}", other.kind())),
        }),
    );
}

/// `Object.create(proto)` (spec §8 S5): the only static the in-scope
/// scenarios exercise. Statics live on `static_properties`, never on
/// `instance_properties`, so they are resolved unbound — a property
/// read off the `Object` class itself, not off one of its instances.
fn install_object_statics(classes: &PrimitiveClasses) {
    let key = match SlateString::new("create") {
        Ok(s) => s,
        Err(_) => unreachable!("builtin method names never contain a NUL byte"),
    };
    classes.object.static_properties.set(
        key,
        native("Object.create", Some(1), |args| match &args[0] {
            Value::Object(proto) => Ok(Value::Object(SlateObject::with_prototype(proto.clone()))),
            Value::Null => Ok(Value::Object(SlateObject::new())),
            other => Err(format!("Object.create expected an object prototype, got {}", other.kind())),
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_upper_and_substring_compose() {
        let classes = build();
        let upper = classes.string.instance_properties.get("toUpper").unwrap();
        let Value::Native(upper) = upper else { panic!("expected native") };
        let s = Value::Str(SlateString::new("Hello, World").unwrap());
        let upper_value = upper.call(&[s]).unwrap();
        let substring = classes.string.instance_properties.get("substring").unwrap();
        let Value::Native(substring) = substring else { panic!("expected native") };
        let result = substring.call(&[upper_value, Value::Int32(7), Value::Int32(5)]).unwrap();
        assert_eq!(result, Value::Str(SlateString::new("WORLD").unwrap()));
    }

    #[test]
    fn object_create_prototypes_off_the_given_object() {
        let classes = build();
        let create = classes.object.static_properties.get_own("create").unwrap();
        let Value::Native(create) = create else { panic!("expected native") };
        let proto = SlateObject::new();
        proto.set(SlateString::new("greeting").unwrap(), Value::Int32(1));
        let instance = create.call(&[Value::Object(proto)]).unwrap();
        let Value::Object(instance) = instance else { panic!("expected object") };
        assert_eq!(instance.get("greeting"), Some(Value::Int32(1)));
    }

    #[test]
    fn buffer_builder_writes_finalize_and_read_back_through_a_reader() {
        let classes = build();
        let builder_native = |n: &str| {
            let Value::Native(f) = classes.buffer.static_properties.get_own(n).unwrap() else {
                panic!("expected native");
            };
            f
        };
        let instance_native = |n: &str| {
            let Value::Native(f) = classes.buffer.instance_properties.get(n).unwrap() else {
                panic!("expected native");
            };
            f
        };

        let builder = builder_native("builder").call(&[]).unwrap();
        let builder = instance_native("writeU32")
            .call(&[builder, Value::Int32(0), Value::Int32(0x2a), Value::Int32(0)])
            .unwrap();
        let buffer = instance_native("finalize").call(&[builder]).unwrap();
        assert_eq!(instance_native("length").call(&[buffer.clone()]).unwrap(), Value::Int32(4));

        let reader = builder_native("reader").call(&[buffer]).unwrap();
        assert_eq!(
            instance_native("readReaderU32").call(&[reader.clone(), Value::Int32(0)]).unwrap(),
            Value::Int32(0x2a)
        );
        assert_eq!(instance_native("hasRemaining").call(&[reader]).unwrap(), Value::Bool(false));
    }
}
