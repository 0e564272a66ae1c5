//! `Call`/`Return` (spec §4.5). Four callable shapes: a closure pushes a
//! new frame; a native, a bound method, and a class all resolve to a
//! value in one step since none of them re-enter the bytecode loop
//! (spec §6.2's native ABI is not ­VM-reentrant).

use std::rc::Rc;

use slate_value::Value;

use super::super::error::VmError;
use super::super::frame::Frame;
use super::super::Vm;

impl Vm {
    pub(in crate::vm) fn call_value(&mut self, callee: Value, args: Vec<Value>) -> Result<(), VmError> {
        match callee {
            Value::Native(native) => {
                let result = native.call(&args).map_err(VmError::runtime)?;
                self.push(result)
            }
            Value::BoundMethod(bound) => {
                let mut full_args = Vec::with_capacity(args.len() + 1);
                full_args.push(bound.receiver.clone());
                full_args.extend(args);
                let result = bound.callee.call(&full_args).map_err(VmError::runtime)?;
                self.push(result)
            }
            Value::Closure(closure) => self.call_closure(closure, args),
            Value::Class(class) => match &class.factory {
                Some(Value::Closure(closure)) => self.call_closure(closure.clone(), args),
                Some(Value::Native(native)) => {
                    let result = native.call(&args).map_err(VmError::runtime)?;
                    self.push(result)
                }
                Some(other) => Err(VmError::type_error(format!("class '{}' has a non-callable factory ({})", class.name, other.kind()))),
                None => self.push(Value::Object(class.instantiate())),
            },
            other => Err(VmError::type_error_expected("call", "a callable", other.kind())),
        }
    }

    fn call_closure(&mut self, closure: Rc<slate_value::ClosureValue>, args: Vec<Value>) -> Result<(), VmError> {
        if args.len() != closure.function.arity {
            return Err(VmError::arity(closure.function.arity, args.len()));
        }
        if self.frames.len() >= self.max_frames {
            return Err(VmError::StackOverflowError);
        }
        let chunk = &self.module.chunks[closure.function.chunk_index];
        let mut frame = Frame::new(closure, chunk.num_locals);
        for (slot, arg) in frame.locals.iter_mut().zip(args) {
            *slot = arg;
        }
        self.frames.push(frame);
        Ok(())
    }

    /// `Return`: pops the current frame and carries its result into the
    /// caller. `Ok(Some(value))` means the frame just popped was the
    /// outermost one — the whole program is done.
    pub(in crate::vm) fn do_return(&mut self) -> Result<Option<Value>, VmError> {
        let value = self.pop()?;
        self.frames.pop();
        if self.frames.is_empty() {
            return Ok(Some(value));
        }
        self.push(value)?;
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::{Chunk, Instr, Module};
    use slate_value::{FunctionValue, NativeFunction, SlateString};

    #[test]
    fn calling_a_native_pushes_its_result() {
        let mut vm = Vm::new(Module::new());
        let native = Rc::new(NativeFunction::new(SlateString::new("id").unwrap(), Some(1), Rc::new(|a: &[Value]| Ok(a[0].clone()))));
        vm.call_value(Value::Native(native), vec![Value::Int32(9)]).unwrap();
        assert_eq!(vm.pop().unwrap(), Value::Int32(9));
    }

    #[test]
    fn calling_a_closure_with_wrong_arity_is_an_error() {
        let mut module = Module::new();
        let mut chunk = Chunk::new(Some("f".to_string()), 1);
        chunk.push_instr(Instr::Return);
        module.push_chunk(chunk);
        let mut vm = Vm::new(module);
        let function = Rc::new(FunctionValue::new(None, 1, 0));
        let closure = Rc::new(slate_value::ClosureValue::new(function, Vec::new()));
        let err = vm.call_value(Value::Closure(closure), vec![]).unwrap_err();
        assert!(matches!(err, VmError::ArityError { .. }));
    }

    #[test]
    fn constructing_a_class_without_a_factory_ignores_arguments() {
        let mut vm = Vm::new(Module::new());
        let class = Rc::new(slate_value::ClassValue::new(SlateString::new("Point").unwrap()));
        vm.call_value(Value::Class(class), vec![Value::Int32(1), Value::Int32(2)]).unwrap();
        assert!(matches!(vm.pop().unwrap(), Value::Object(_)));
    }
}
