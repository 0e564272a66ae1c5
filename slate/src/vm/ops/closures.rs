//! `MakeClosure`/`MakeClass`/`NewInstance` (spec §3.3, §3.4, §4.5).

use std::cell::RefCell;
use std::rc::Rc;

use slate_value::{ClassValue, ClosureValue, FunctionValue, Value};

use super::super::error::VmError;
use super::super::Vm;
use crate::bytecode::Constant;

impl Vm {
    /// `MakeClosure`: the `capture_count` values immediately below the
    /// target function's prototype on the stack become its upvalue
    /// cells, in the same order the compiler pushed them (spec §3.4) —
    /// popping off the stack reverses that order, so it is restored
    /// before building the closure.
    pub(in crate::vm) fn make_closure(&mut self, proto_idx: u16) -> Result<(), VmError> {
        let chunk_index = self.current_frame().closure.function.chunk_index;
        let constant = self.module.chunks[chunk_index].constants.get(proto_idx as usize).cloned();
        let target_chunk_index = match constant {
            Some(Constant::FunctionProto(idx)) => idx,
            _ => return Err(VmError::runtime("MakeClosure operand does not name a function prototype")),
        };
        let target = &self.module.chunks[target_chunk_index as usize];
        let num_upvalues = target.num_upvalues;
        let arity = target.arity;
        let name = match &target.name {
            Some(n) => Some(slate_value::SlateString::new(n.clone()).map_err(|e| VmError::runtime(e.to_string()))?),
            None => None,
        };

        let mut captured = Vec::with_capacity(num_upvalues);
        for _ in 0..num_upvalues {
            captured.push(Rc::new(RefCell::new(self.pop()?)));
        }
        captured.reverse();

        let function = Rc::new(FunctionValue::new(name, arity, target_chunk_index as usize));
        let closure = ClosureValue::new(function, captured);
        self.push(Value::Closure(Rc::new(closure)))
    }

    /// `MakeClass`: unpacks `name, superclass, (key, closure){n}` off the
    /// stack in that order (spec's `Instr::MakeClass` doc comment); a
    /// method named `init` becomes the class's factory rather than an
    /// ordinary instance method (see DESIGN.md).
    pub(in crate::vm) fn make_class(&mut self, n: u16) -> Result<(), VmError> {
        let pair_count = n as usize;
        let mut methods_flat = Vec::with_capacity(pair_count * 2);
        for _ in 0..pair_count * 2 {
            methods_flat.push(self.pop()?);
        }
        methods_flat.reverse();

        let superclass_val = self.pop()?;
        let name_val = self.pop()?;

        let name = match name_val {
            Value::Str(s) => s,
            other => return Err(VmError::type_error_expected("class name", "a string", other.kind())),
        };
        let superclass = match superclass_val {
            Value::Null => None,
            Value::Class(c) => Some(c),
            other => return Err(VmError::type_error_expected("superclass", "a class or null", other.kind())),
        };

        let mut class = match &superclass {
            Some(sc) => ClassValue::with_superclass(name, sc.clone()),
            None => ClassValue::new(name),
        };

        let mut factory = None;
        for pair in methods_flat.chunks(2) {
            let key = match &pair[0] {
                Value::Str(s) => s.clone(),
                other => return Err(VmError::type_error_expected("method name", "a string", other.kind())),
            };
            let value = pair[1].clone();
            if key.as_str() == "init" {
                factory = Some(value);
            } else {
                class.instance_properties.set(key, value);
            }
        }
        class.factory = factory;
        self.push(Value::Class(Rc::new(class)))
    }

    /// `NewInstance`: resolves the named class as a global and pushes it
    /// unbound, mirroring `GetMethod` — the `Call` that follows decides
    /// how to invoke it (spec's `Instr::NewInstance` doc comment).
    pub(in crate::vm) fn new_instance(&mut self, name_idx: u16) -> Result<(), VmError> {
        let chunk_index = self.current_frame().closure.function.chunk_index;
        let name = match self.module.chunks[chunk_index].constants.get(name_idx as usize) {
            Some(Constant::Str(s)) => s.clone(),
            _ => return Err(VmError::runtime("NewInstance operand does not name a class")),
        };
        let class = self.globals.get(&name).ok_or_else(|| VmError::undefined_global(name.clone()))?;
        if !matches!(class, Value::Class(_)) {
            return Err(VmError::type_error(format!("'{name}' is not a class")));
        }
        self.push(class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::{Chunk, Instr, Module};
    use slate_value::SlateString;

    #[test]
    fn make_closure_captures_locals_in_order() {
        let mut module = Module::new();
        let mut target = Chunk::new(Some("adder".to_string()), 0);
        target.num_upvalues = 2;
        target.push_instr(Instr::Return);
        module.push_chunk(target);

        let mut script = Chunk::new(Some("<script>".to_string()), 0);
        let proto = script.add_constant(Constant::FunctionProto(1));
        script.push_instr(Instr::LoadConst(0));
        script.push_instr(Instr::Return);
        module.chunks[0] = script;

        let mut vm = Vm::new(module);
        vm.push(Value::Int32(1)).unwrap();
        vm.push(Value::Int32(2)).unwrap();
        vm.make_closure(proto).unwrap();
        let Value::Closure(c) = vm.pop().unwrap() else { panic!("expected closure") };
        assert_eq!(*c.captured[0].borrow(), Value::Int32(1));
        assert_eq!(*c.captured[1].borrow(), Value::Int32(2));
    }

    #[test]
    fn make_class_extracts_init_as_factory() {
        let mut module = Module::new();
        let mut method_chunk = Chunk::new(Some("init".to_string()), 0);
        method_chunk.push_instr(Instr::Return);
        module.push_chunk(method_chunk);

        let mut vm = Vm::new(module);
        vm.push(Value::Str(SlateString::new("Point").unwrap())).unwrap();
        vm.push(Value::Null).unwrap();
        vm.push(Value::Str(SlateString::new("init").unwrap())).unwrap();
        let function = Rc::new(FunctionValue::new(Some(SlateString::new("init").unwrap()), 0, 0));
        vm.push(Value::Closure(Rc::new(ClosureValue::new(function, Vec::new())))).unwrap();
        vm.make_class(1).unwrap();
        let Value::Class(class) = vm.pop().unwrap() else { panic!("expected class") };
        assert!(class.factory.is_some());
        assert!(!class.instance_properties.has_own("init"));
    }
}
