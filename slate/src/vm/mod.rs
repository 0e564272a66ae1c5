//! The stack-based bytecode interpreter (C5, spec §4.5).
//!
//! Grounded on the teacher's `vm/exec/mod.rs` dispatch loop, generalized
//! from its `FooResult::{Handled, Continue, NotHandled}` chain — built
//! for Julia's multiple dispatch, where an opcode can fall through
//! several candidate handlers before one claims it — down to a flat
//! `match`, since every Slate opcode is claimed by exactly one handler.
//! The per-opcode bodies live in `vm::ops`; this module owns the `Vm`
//! struct itself, its construction, and the fetch loop that drives them.

pub mod class;
pub mod error;
pub mod frame;
pub mod iterator;
mod ops;

use std::rc::Rc;

use slate_value::{is_falsy, is_truthy, ClassValue, NativeFunction, PrimitiveClasses, SlateBigInt, SlateObject, SlateString, Value};

use crate::bytecode::{Chunk, Constant, Instr, Module};
use error::{SpannedVmError, VmError, VmResult};
use frame::Frame;

/// Call-frame depth limit (spec §7's `StackOverflowError`).
pub const DEFAULT_MAX_FRAMES: usize = 256;
/// Operand-stack depth limit, generous enough that no in-scope scenario
/// or realistic script trips it; exists so a runaway program fails with
/// `RuntimeError` instead of exhausting host memory.
pub const DEFAULT_MAX_STACK: usize = 1 << 16;

/// The interpreter (spec §4.5): one shared operand `stack` used for
/// expression temporaries and call arguments, a `frames` stack of
/// in-progress calls each owning its own locals (see `frame`'s module
/// doc for why this diverges from the spec's literal "base index into a
/// shared stack" wording), a name-keyed `globals` object, and the eager
/// primitive class registry every value's property lookup resolves
/// through.
#[derive(Debug)]
pub struct Vm {
    module: Module,
    /// `module.globals[i]` interned once as a [`SlateString`]:
    /// `LoadGlobal`/`StoreGlobal`/`DefineGlobal`'s operand is a position
    /// in that compile-time name table, but the VM's actual storage
    /// (`globals`) is keyed by name, not by position.
    global_names: Vec<SlateString>,
    globals: SlateObject,
    classes: PrimitiveClasses,
    frames: Vec<Frame>,
    stack: Vec<Value>,
    max_stack: usize,
    max_frames: usize,
}

impl Vm {
    pub fn new(module: Module) -> Self {
        Self::with_limits(module, DEFAULT_MAX_STACK, DEFAULT_MAX_FRAMES)
    }

    pub fn with_limits(module: Module, max_stack: usize, max_frames: usize) -> Self {
        let global_names = module
            .globals
            .iter()
            .map(|n| match SlateString::new(n.clone()) {
                Ok(s) => s,
                Err(_) => unreachable!("a compiled global name never contains a NUL byte"),
            })
            .collect();
        let mut vm = Self {
            module,
            global_names,
            globals: SlateObject::new(),
            classes: class::build(),
            frames: Vec::new(),
            stack: Vec::new(),
            max_stack,
            max_frames,
        };
        vm.install_primitive_class_globals();
        vm
    }

    /// Exposes every constructible primitive class as a global of its
    /// spec §3.3 name, so `Object.create(...)` and similar statics
    /// resolve like any other call (spec §8 S5). `Null`/`Undefined` are
    /// literals, not classes a script ever names directly, so they are
    /// left out of the global namespace.
    fn install_primitive_class_globals(&mut self) {
        let entries: [(&str, Rc<ClassValue>); 10] = [
            ("Boolean", self.classes.boolean.clone()),
            ("Int", self.classes.int.clone()),
            ("BigInt", self.classes.bigint.clone()),
            ("Float32", self.classes.float32.clone()),
            ("Float64", self.classes.float64.clone()),
            ("String", self.classes.string.clone()),
            ("Array", self.classes.array.clone()),
            ("Object", self.classes.object.clone()),
            ("Range", self.classes.range.clone()),
            ("Buffer", self.classes.buffer.clone()),
        ];
        for (name, class) in entries {
            let key = match SlateString::new(name) {
                Ok(s) => s,
                Err(_) => unreachable!("primitive class names never contain a NUL byte"),
            };
            self.globals.set(key, Value::Class(class));
        }
    }

    /// Registers a host function as a global (spec §6.3's native
    /// registration ABI). `arity` follows [`NativeFunction`]'s
    /// convention: `Some(n)` enforces exactly `n` arguments, `None`
    /// accepts any count.
    pub fn register_builtin(&mut self, name: &str, arity: Option<usize>, func: impl Fn(&[Value]) -> Result<Value, String> + 'static) {
        let key = match SlateString::new(name) {
            Ok(s) => s,
            Err(_) => return,
        };
        let native = Value::Native(Rc::new(NativeFunction::new(key.clone(), arity, Rc::new(func))));
        self.globals.set(key, native);
    }

    fn push(&mut self, value: Value) -> VmResult<()> {
        if self.stack.len() >= self.max_stack {
            return Err(VmError::runtime("operand stack exceeded its maximum depth"));
        }
        self.stack.push(value);
        Ok(())
    }

    fn pop(&mut self) -> VmResult<Value> {
        self.stack.pop().ok_or_else(|| VmError::runtime("operand stack underflow"))
    }

    fn current_frame(&self) -> &Frame {
        match self.frames.last() {
            Some(frame) => frame,
            None => unreachable!("step is only called while a frame is active"),
        }
    }

    fn current_frame_mut(&mut self) -> &mut Frame {
        match self.frames.last_mut() {
            Some(frame) => frame,
            None => unreachable!("step is only called while a frame is active"),
        }
    }

    fn current_chunk(&self) -> &Chunk {
        &self.module.chunks[self.current_frame().closure.function.chunk_index]
    }

    /// Expands a chunk-pool [`Constant`] into a live runtime [`Value`]
    /// (spec §3.7). `FunctionProto` is not a loadable value on its own —
    /// it only ever appears as `MakeClosure`'s operand.
    fn constant_to_value(&self, idx: u16) -> VmResult<Value> {
        let constant = self
            .current_chunk()
            .constants
            .get(idx as usize)
            .cloned()
            .ok_or_else(|| VmError::runtime("constant pool index out of bounds"))?;
        match constant {
            Constant::Int32(i) => Ok(Value::Int32(i)),
            Constant::BigInt(digits) => {
                let big = SlateBigInt::parse(&digits).ok_or_else(|| VmError::runtime(format!("invalid bigint literal '{digits}'")))?;
                Ok(Value::BigInt(big))
            }
            Constant::Float32(f) => Ok(Value::Float32(f)),
            Constant::Float64(f) => Ok(Value::Float64(f)),
            Constant::Str(s) => Ok(Value::Str(SlateString::new(s).map_err(|e| VmError::runtime(e.to_string()))?)),
            Constant::FunctionProto(_) => Err(VmError::runtime("cannot load a function prototype as a plain value")),
        }
    }

    /// Reads a `Str` constant as a borrowed name, for the opcodes
    /// (`GetProperty`, `SetProperty`, `GetMethod`, `NewInstance`) whose
    /// operand is always a property or class name rather than a general
    /// constant.
    fn constant_str(&self, idx: u16) -> VmResult<String> {
        match self.current_chunk().constants.get(idx as usize) {
            Some(Constant::Str(s)) => Ok(s.clone()),
            _ => Err(VmError::runtime("operand does not index a string constant")),
        }
    }

    fn jump(&mut self, delta: i16) -> VmResult<()> {
        let frame = self.current_frame_mut();
        let new_ip = frame.ip as isize + delta as isize;
        if new_ip < 0 {
            return Err(VmError::runtime("jump target precedes the start of the chunk"));
        }
        frame.ip = new_ip as usize;
        Ok(())
    }

    fn range_bound(v: &Value) -> VmResult<i64> {
        match v {
            Value::Int32(i) => Ok(*i as i64),
            other => Err(VmError::type_error_expected("range bound", "an integer", other.kind())),
        }
    }

    /// Runs the module from its top-level script chunk (chunk 0) to
    /// completion (spec §4.5). The script's own `Return` unwinds the
    /// synthetic outermost frame and carries the script's result value
    /// out.
    pub fn run(&mut self) -> Result<Value, SpannedVmError> {
        let script = Rc::new(slate_value::FunctionValue::new(Some(self.script_name()), 0, 0));
        let closure = Rc::new(slate_value::ClosureValue::new(script, Vec::new()));
        let num_locals = self.module.chunks[0].num_locals;
        self.frames.push(Frame::new(closure, num_locals));

        loop {
            match self.step() {
                Ok(Some(result)) => return Ok(result),
                Ok(None) => continue,
                Err(error) => return Err(self.spanned(error)),
            }
        }
    }

    fn script_name(&self) -> SlateString {
        let name = self.module.chunks[0].name.as_deref().unwrap_or("<script>");
        match SlateString::new(name) {
            Ok(s) => s,
            Err(_) => unreachable!("chunk names never contain a NUL byte"),
        }
    }

    fn spanned(&self, error: VmError) -> SpannedVmError {
        let line = self.frames.last().map(|f| self.module.chunks[f.closure.function.chunk_index].line_at(f.ip)).unwrap_or(0);
        let frame_names = self.frames.iter().rev().map(|f| f.name().to_string()).collect();
        SpannedVmError::new(error, line, frame_names)
    }

    /// Fetches and executes one instruction. `Ok(Some(value))` means the
    /// outermost frame just returned, carrying the whole program's
    /// result; `Ok(None)` means keep looping.
    fn step(&mut self) -> VmResult<Option<Value>> {
        let chunk_index = self.current_frame().closure.function.chunk_index;
        let ip = self.current_frame().ip;
        let instr = match self.module.chunks[chunk_index].code.get(ip).copied() {
            Some(instr) => instr,
            None => return Err(VmError::runtime("instruction pointer ran past the end of the chunk")),
        };
        self.current_frame_mut().ip += 1;

        match instr {
            Instr::LoadConst(idx) => {
                let value = self.constant_to_value(idx)?;
                self.push(value)?;
            }
            Instr::LoadNull => self.push(Value::Null)?,
            Instr::LoadUndefined => self.push(Value::Undefined)?,
            Instr::LoadTrue => self.push(Value::Bool(true))?,
            Instr::LoadFalse => self.push(Value::Bool(false))?,

            Instr::LoadLocal(slot) => {
                let value = self
                    .current_frame()
                    .locals
                    .get(slot as usize)
                    .cloned()
                    .ok_or_else(|| VmError::runtime("local slot out of bounds"))?;
                self.push(value)?;
            }
            Instr::StoreLocal(slot) => {
                let value = self.pop()?;
                let frame = self.current_frame_mut();
                match frame.locals.get_mut(slot as usize) {
                    Some(slot) => *slot = value,
                    None => return Err(VmError::runtime("local slot out of bounds")),
                }
            }
            Instr::LoadGlobal(idx) => {
                let name = self.global_name(idx)?;
                let value = self.globals.get(name.as_str()).ok_or_else(|| VmError::undefined_global(name.as_str()))?;
                self.push(value)?;
            }
            Instr::StoreGlobal(idx) => {
                let name = self.global_name(idx)?;
                if !self.globals.has_own(name.as_str()) {
                    return Err(VmError::undefined_global(name.as_str()));
                }
                let value = self.pop()?;
                self.globals.set(name, value);
            }
            Instr::DefineGlobal(idx) => {
                let name = self.global_name(idx)?;
                let value = self.pop()?;
                self.globals.set(name, value);
            }
            Instr::LoadUpvalue(idx) => {
                let cell = self
                    .current_frame()
                    .closure
                    .captured
                    .get(idx as usize)
                    .ok_or_else(|| VmError::runtime("upvalue slot out of bounds"))?
                    .clone();
                let value = cell.borrow().clone();
                self.push(value)?;
            }
            Instr::StoreUpvalue(idx) => {
                let value = self.pop()?;
                let cell = self
                    .current_frame()
                    .closure
                    .captured
                    .get(idx as usize)
                    .ok_or_else(|| VmError::runtime("upvalue slot out of bounds"))?
                    .clone();
                *cell.borrow_mut() = value;
            }

            Instr::Pop => {
                self.pop()?;
            }
            Instr::Dup => {
                let top = self.stack.last().cloned().ok_or_else(|| VmError::runtime("operand stack underflow"))?;
                self.push(top)?;
            }

            Instr::Add | Instr::Sub | Instr::Mul | Instr::Div | Instr::FloorDiv | Instr::Mod | Instr::Pow => {
                let b = self.pop()?;
                let a = self.pop()?;
                let result = self.binary_arith(instr, &a, &b)?;
                self.push(result)?;
            }
            Instr::Neg => {
                let a = self.pop()?;
                let result = self.unary_neg(&a)?;
                self.push(result)?;
            }
            Instr::Not => {
                let a = self.pop()?;
                self.push(Value::Bool(is_falsy(&a)))?;
            }

            Instr::Eq | Instr::NotEq | Instr::Lt | Instr::LtEq | Instr::Gt | Instr::GtEq => {
                let b = self.pop()?;
                let a = self.pop()?;
                let result = self.comparison(instr, &a, &b)?;
                self.push(result)?;
            }

            Instr::Jump(delta) => self.jump(delta)?,
            Instr::JumpIfFalse(delta) => {
                let cond = self.pop()?;
                if is_falsy(&cond) {
                    self.jump(delta)?;
                }
            }
            Instr::JumpIfTrue(delta) => {
                let cond = self.pop()?;
                if is_truthy(&cond) {
                    self.jump(delta)?;
                }
            }

            Instr::Call(argc) => {
                let mut args = Vec::with_capacity(argc as usize);
                for _ in 0..argc {
                    args.push(self.pop()?);
                }
                args.reverse();
                let callee = self.pop()?;
                self.call_value(callee, args)?;
            }
            Instr::Return => {
                if let Some(result) = self.do_return()? {
                    return Ok(Some(result));
                }
            }

            Instr::MakeArray(n) => {
                let mut values = Vec::with_capacity(n as usize);
                for _ in 0..n {
                    values.push(self.pop()?);
                }
                values.reverse();
                let array = self.make_array(values);
                self.push(array)?;
            }
            Instr::MakeObject(n) => {
                let mut flat = Vec::with_capacity(n as usize * 2);
                for _ in 0..n as usize * 2 {
                    flat.push(self.pop()?);
                }
                flat.reverse();
                let pairs = flat.chunks(2).map(|pair| (pair[0].clone(), pair[1].clone())).collect();
                let object = self.make_object(pairs)?;
                self.push(object)?;
            }
            Instr::GetIndex => {
                let index = self.pop()?;
                let receiver = self.pop()?;
                let value = self.get_index(&receiver, &index)?;
                self.push(value)?;
            }
            Instr::SetIndex => {
                let value = self.pop()?;
                let index = self.pop()?;
                let receiver = self.pop()?;
                self.set_index(&receiver, &index, value)?;
            }
            Instr::GetProperty(idx) | Instr::GetMethod(idx) => {
                let key = self.constant_str(idx)?;
                let receiver = self.pop()?;
                let value = self.get_property(receiver, &key);
                self.push(value)?;
            }
            Instr::SetProperty(idx) => {
                let key = self.constant_str(idx)?;
                let value = self.pop()?;
                let receiver = self.pop()?;
                self.set_property(&receiver, &key, value)?;
            }

            Instr::MakeRange => {
                let end = self.pop()?;
                let start = self.pop()?;
                let start = Self::range_bound(&start)?;
                let end = Self::range_bound(&end)?;
                self.push(Value::Range(Rc::new(slate_value::RangeValue::inclusive(start, end))))?;
            }
            Instr::GetIter => {
                let value = self.pop()?;
                let iter = iterator::make_iterator(&value)?;
                self.push(iter)?;
            }
            Instr::IterHasNext => {
                let value = self.pop()?;
                match value {
                    Value::Iterator(it) => self.push(Value::Bool(it.has_next()))?,
                    other => return Err(VmError::type_error_expected("iterator protocol", "an iterator", other.kind())),
                }
            }
            Instr::IterNext => {
                let value = self.pop()?;
                match value {
                    Value::Iterator(it) => {
                        let next = it.next().unwrap_or(Value::Undefined);
                        self.push(next)?;
                    }
                    other => return Err(VmError::type_error_expected("iterator protocol", "an iterator", other.kind())),
                }
            }

            Instr::MakeClosure(idx) => self.make_closure(idx)?,
            Instr::MakeClass(n) => self.make_class(n)?,
            Instr::NewInstance(idx) => self.new_instance(idx)?,
        }

        Ok(None)
    }

    fn global_name(&self, idx: u16) -> VmResult<SlateString> {
        self.global_names
            .get(idx as usize)
            .cloned()
            .ok_or_else(|| VmError::runtime("global index out of bounds"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::{Chunk, Module};

    fn script_with(instrs: Vec<Instr>) -> Module {
        let mut module = Module::new();
        let mut chunk = Chunk::new(Some("<script>".to_string()), 0);
        for instr in instrs {
            chunk.push_instr(instr);
        }
        module.chunks.push(chunk);
        module
    }

    #[test]
    fn runs_a_trivial_script_to_its_return_value() {
        let mut chunk = Chunk::new(Some("<script>".to_string()), 0);
        let k = chunk.add_constant(Constant::Int32(42));
        chunk.push_instr(Instr::LoadConst(k));
        chunk.push_instr(Instr::Return);
        let mut module = Module::new();
        module.chunks.push(chunk);

        let mut vm = Vm::new(module);
        assert_eq!(vm.run().unwrap(), Value::Int32(42));
    }

    #[test]
    fn integer_division_by_zero_is_a_spanned_arithmetic_error() {
        let mut chunk = Chunk::new(Some("<script>".to_string()), 0);
        let a = chunk.add_constant(Constant::Int32(1));
        let b = chunk.add_constant(Constant::Int32(0));
        chunk.push_instr(Instr::LoadConst(a));
        chunk.push_instr(Instr::LoadConst(b));
        chunk.push_instr(Instr::Div);
        chunk.push_instr(Instr::Return);
        chunk.lines = vec![1, 1, 1, 1];
        let mut module = Module::new();
        module.chunks.push(chunk);

        let mut vm = Vm::new(module);
        let err = vm.run().unwrap_err();
        assert!(matches!(err.error, VmError::ArithmeticError { .. }));
        assert_eq!(err.line, 1);
    }

    #[test]
    fn global_round_trips_through_define_load_store() {
        let mut module = script_with(vec![]);
        let idx = module.global_index("x");
        let mut chunk = Chunk::new(Some("<script>".to_string()), 0);
        let one = chunk.add_constant(Constant::Int32(1));
        let two = chunk.add_constant(Constant::Int32(2));
        chunk.push_instr(Instr::LoadConst(one));
        chunk.push_instr(Instr::DefineGlobal(idx));
        chunk.push_instr(Instr::LoadConst(two));
        chunk.push_instr(Instr::StoreGlobal(idx));
        chunk.push_instr(Instr::LoadGlobal(idx));
        chunk.push_instr(Instr::Return);
        module.chunks[0] = chunk;

        let mut vm = Vm::new(module);
        assert_eq!(vm.run().unwrap(), Value::Int32(2));
    }

    #[test]
    fn loading_an_undefined_global_is_a_name_error() {
        let mut module = script_with(vec![]);
        let idx = module.global_index("missing");
        let mut chunk = Chunk::new(Some("<script>".to_string()), 0);
        chunk.push_instr(Instr::LoadGlobal(idx));
        chunk.push_instr(Instr::Return);
        module.chunks[0] = chunk;

        let mut vm = Vm::new(module);
        let err = vm.run().unwrap_err();
        assert!(matches!(err.error, VmError::NameError { .. }));
    }
}
