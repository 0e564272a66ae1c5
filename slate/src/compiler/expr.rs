//! Expression lowering (spec §4.4). One arm per [`Expr`] variant.

use slate_parser::{BinaryOp, Expr, LogicalOp, UnaryOp};
use slate_value::Value;

use super::{Binding, CompileResult, Compiler};
use crate::bytecode::{Constant, Instr};

impl Compiler {
    pub(super) fn compile_expr(&mut self, expr: &Expr) -> CompileResult<()> {
        self.set_line(expr.span());
        match expr {
            Expr::Literal { value, span } => self.compile_literal(value, *span)?,
            Expr::Identifier { name, .. } => self.compile_identifier_read(name),
            Expr::Unary { op, operand, .. } => self.compile_unary(*op, operand)?,
            Expr::Binary { op, left, right, .. } => self.compile_binary(*op, left, right)?,
            Expr::Logical { op, left, right, .. } => self.compile_logical(*op, left, right)?,
            Expr::Call { callee, args, .. } => self.compile_call(callee, args)?,
            Expr::Index { object, index, .. } => {
                self.compile_expr(object)?;
                self.compile_expr(index)?;
                self.emit(Instr::GetIndex);
            }
            Expr::Property { object, name, span } => {
                self.compile_expr(object)?;
                let idx = self.add_constant(Constant::Str(name.clone()), *span)?;
                self.emit(Instr::GetProperty(idx));
            }
            Expr::MethodCall { object, method, args, span } => {
                self.compile_expr(object)?;
                let idx = self.add_constant(Constant::Str(method.clone()), *span)?;
                self.emit(Instr::GetMethod(idx));
                for arg in args {
                    self.compile_expr(arg)?;
                }
                self.emit(Instr::Call(args.len() as u16));
            }
            Expr::ArrayLiteral { elements, .. } => {
                for e in elements {
                    self.compile_expr(e)?;
                }
                self.emit(Instr::MakeArray(elements.len() as u16));
            }
            Expr::ObjectLiteral { entries, span } => {
                for (key, value) in entries {
                    let idx = self.add_constant(Constant::Str(key.clone()), *span)?;
                    self.emit(Instr::LoadConst(idx));
                    self.compile_expr(value)?;
                }
                self.emit(Instr::MakeObject(entries.len() as u16));
            }
            Expr::Range { start, end, .. } => {
                self.compile_expr(start)?;
                self.compile_expr(end)?;
                self.emit(Instr::MakeRange);
            }
            Expr::FunctionExpr { params, body, span } => {
                self.push_closure(None, params, body, *span)?;
            }
            Expr::New { class_name, args, span } => {
                let idx = self.add_constant(Constant::Str(class_name.clone()), *span)?;
                self.emit(Instr::NewInstance(idx));
                for arg in args {
                    self.compile_expr(arg)?;
                }
                self.emit(Instr::Call(args.len() as u16));
            }
        }
        Ok(())
    }

    fn compile_literal(&mut self, value: &Value, span: slate_parser::Span) -> CompileResult<()> {
        match value {
            Value::Null => {
                self.emit(Instr::LoadNull);
            }
            Value::Undefined => {
                self.emit(Instr::LoadUndefined);
            }
            Value::Bool(true) => {
                self.emit(Instr::LoadTrue);
            }
            Value::Bool(false) => {
                self.emit(Instr::LoadFalse);
            }
            Value::Int32(i) => {
                let idx = self.add_constant(Constant::Int32(*i), span)?;
                self.emit(Instr::LoadConst(idx));
            }
            Value::BigInt(b) => {
                let idx = self.add_constant(Constant::BigInt(b.inner().to_string()), span)?;
                self.emit(Instr::LoadConst(idx));
            }
            Value::Float32(f) => {
                let idx = self.add_constant(Constant::Float32(*f), span)?;
                self.emit(Instr::LoadConst(idx));
            }
            Value::Float64(f) => {
                let idx = self.add_constant(Constant::Float64(*f), span)?;
                self.emit(Instr::LoadConst(idx));
            }
            Value::Str(s) => {
                let idx = self.add_constant(Constant::Str(s.as_str().to_string()), span)?;
                self.emit(Instr::LoadConst(idx));
            }
            other => unreachable!("parser only ever produces scalar/string literals, not {other:?}"),
        }
        Ok(())
    }

    fn compile_identifier_read(&mut self, name: &str) {
        match self.resolve(name) {
            Binding::Local(slot) => self.emit(Instr::LoadLocal(slot)),
            Binding::Upvalue(idx) => self.emit(Instr::LoadUpvalue(idx)),
            Binding::Global(idx) => self.emit(Instr::LoadGlobal(idx)),
        };
    }

    fn compile_unary(&mut self, op: UnaryOp, operand: &Expr) -> CompileResult<()> {
        self.compile_expr(operand)?;
        self.emit(match op {
            UnaryOp::Neg => Instr::Neg,
            UnaryOp::Not => Instr::Not,
        });
        Ok(())
    }

    fn compile_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> CompileResult<()> {
        self.compile_expr(left)?;
        self.compile_expr(right)?;
        self.emit(match op {
            BinaryOp::Add => Instr::Add,
            BinaryOp::Sub => Instr::Sub,
            BinaryOp::Mul => Instr::Mul,
            BinaryOp::Div => Instr::Div,
            BinaryOp::FloorDiv => Instr::FloorDiv,
            BinaryOp::Mod => Instr::Mod,
            BinaryOp::Pow => Instr::Pow,
            BinaryOp::Eq => Instr::Eq,
            BinaryOp::NotEq => Instr::NotEq,
            BinaryOp::Lt => Instr::Lt,
            BinaryOp::LtEq => Instr::LtEq,
            BinaryOp::Gt => Instr::Gt,
            BinaryOp::GtEq => Instr::GtEq,
        });
        Ok(())
    }

    /// `&&`/`||` short-circuit by leaving whichever operand decided the
    /// result on the stack (spec §4.4), not a coerced boolean: `a && b`
    /// is `a` when `a` is falsy, else `b`; `a || b` is `a` when `a` is
    /// truthy, else `b`. `JumpIfFalse`/`JumpIfTrue` pop their condition,
    /// so a `Dup` keeps a copy around in case the jump is taken.
    fn compile_logical(&mut self, op: LogicalOp, left: &Expr, right: &Expr) -> CompileResult<()> {
        self.compile_expr(left)?;
        self.emit(Instr::Dup);
        let short_circuit = match op {
            LogicalOp::And => self.emit(Instr::JumpIfFalse(0)),
            LogicalOp::Or => self.emit(Instr::JumpIfTrue(0)),
        };
        self.emit(Instr::Pop);
        self.compile_expr(right)?;
        let after = self.scope().chunk.code.len();
        self.patch_jump_to(short_circuit, after, right.span())?;
        Ok(())
    }

    fn compile_call(&mut self, callee: &Expr, args: &[Expr]) -> CompileResult<()> {
        self.compile_expr(callee)?;
        for arg in args {
            self.compile_expr(arg)?;
        }
        self.emit(Instr::Call(args.len() as u16));
        Ok(())
    }
}
