//! Statement lowering (spec §4.4). One arm per [`Stmt`] variant.

use slate_parser::{Expr, Stmt};

use super::scope::LoopContext;
use super::{Binding, CompileError, CompileResult, Compiler};
use crate::bytecode::{Constant, Instr};

impl Compiler {
    pub(super) fn compile_stmt(&mut self, stmt: &Stmt) -> CompileResult<()> {
        self.set_line(stmt.span());
        match stmt {
            Stmt::Expr { expr, .. } => {
                self.compile_expr(expr)?;
                self.emit(Instr::Pop);
            }
            Stmt::VarDecl { name, init, span, .. } => {
                match init {
                    Some(init) => self.compile_expr(init)?,
                    None => {
                        self.emit(Instr::LoadUndefined);
                    }
                }
                self.bind_declared_name(name, *span)?;
            }
            Stmt::Assign { target, value, span } => self.compile_assign(target, value, *span)?,
            Stmt::If { condition, then_branch, else_branch, span } => {
                self.compile_if(condition, then_branch, else_branch.as_deref(), *span)?;
            }
            Stmt::While { condition, body, span } => self.compile_while(condition, body, *span)?,
            Stmt::For { variable, iterable, body, span } => self.compile_for(variable, iterable, body, *span)?,
            Stmt::FunctionDecl { name, params, body, span } => {
                self.push_closure(Some(name.clone()), params, body, *span)?;
                self.bind_declared_name(name, *span)?;
            }
            Stmt::ClassDecl { name, superclass, methods, span } => {
                self.compile_class_decl(name, superclass.as_deref(), methods, *span)?;
            }
            Stmt::Return { value, span } => {
                if self.scopes.len() == 1 {
                    return Err(CompileError::ReturnOutsideFunction { span: *span });
                }
                match value {
                    Some(value) => self.compile_expr(value)?,
                    None => {
                        self.emit(Instr::LoadUndefined);
                    }
                }
                self.emit(Instr::Return);
            }
            Stmt::Break { span } => self.compile_break(*span)?,
            Stmt::Continue { span } => self.compile_continue(*span)?,
            Stmt::Block { statements, .. } => {
                self.enter_block();
                for s in statements {
                    self.compile_stmt(s)?;
                }
                self.exit_block();
            }
        }
        Ok(())
    }

    fn compile_assign(&mut self, target: &Expr, value: &Expr, span: slate_parser::Span) -> CompileResult<()> {
        match target {
            Expr::Identifier { name, .. } => {
                self.compile_expr(value)?;
                let store = match self.resolve(name) {
                    Binding::Local(slot) => Instr::StoreLocal(slot),
                    Binding::Upvalue(idx) => Instr::StoreUpvalue(idx),
                    Binding::Global(idx) => Instr::StoreGlobal(idx),
                };
                self.emit(store);
            }
            Expr::Index { object, index, .. } => {
                self.compile_expr(object)?;
                self.compile_expr(index)?;
                self.compile_expr(value)?;
                self.emit(Instr::SetIndex);
            }
            Expr::Property { object, name, .. } => {
                self.compile_expr(object)?;
                self.compile_expr(value)?;
                let idx = self.add_constant(Constant::Str(name.clone()), span)?;
                self.emit(Instr::SetProperty(idx));
            }
            _ => return Err(CompileError::InvalidAssignmentTarget { span }),
        }
        Ok(())
    }

    fn compile_if(
        &mut self,
        condition: &Expr,
        then_branch: &[Stmt],
        else_branch: Option<&[Stmt]>,
        span: slate_parser::Span,
    ) -> CompileResult<()> {
        self.compile_expr(condition)?;
        let else_jump = self.emit(Instr::JumpIfFalse(0));
        self.enter_block();
        for s in then_branch {
            self.compile_stmt(s)?;
        }
        self.exit_block();

        if let Some(else_branch) = else_branch {
            let end_jump = self.emit(Instr::Jump(0));
            let else_start = self.scope().chunk.code.len();
            self.patch_jump_to(else_jump, else_start, span)?;
            self.enter_block();
            for s in else_branch {
                self.compile_stmt(s)?;
            }
            self.exit_block();
            let after = self.scope().chunk.code.len();
            self.patch_jump_to(end_jump, after, span)?;
        } else {
            let after = self.scope().chunk.code.len();
            self.patch_jump_to(else_jump, after, span)?;
        }
        Ok(())
    }

    fn compile_while(&mut self, condition: &Expr, body: &[Stmt], span: slate_parser::Span) -> CompileResult<()> {
        let loop_start = self.scope().chunk.code.len();
        self.compile_expr(condition)?;
        let exit_jump = self.emit(Instr::JumpIfFalse(0));

        self.scope_mut().loops.push(LoopContext { continue_target: loop_start, break_patches: Vec::new() });
        self.enter_block();
        for s in body {
            self.compile_stmt(s)?;
        }
        self.exit_block();

        let back_jump = self.emit(Instr::Jump(0));
        self.patch_jump_to(back_jump, loop_start, span)?;

        let after = self.scope().chunk.code.len();
        self.patch_jump_to(exit_jump, after, span)?;
        let ctx = match self.scope_mut().loops.pop() {
            Some(ctx) => ctx,
            None => unreachable!("loop context pushed above"),
        };
        for patch in ctx.break_patches {
            self.patch_jump_to(patch, after, span)?;
        }
        Ok(())
    }

    /// Lowers `for (v in iterable) body` onto the has_next/next iterator
    /// protocol (spec §4.5): the iterator and loop variable each get a
    /// dedicated local slot (names a user identifier can never collide
    /// with, since the lexer does not allow `<` inside one), re-read and
    /// rewritten every pass through `loop_start` rather than re-declared.
    fn compile_for(&mut self, variable: &str, iterable: &Expr, body: &[Stmt], span: slate_parser::Span) -> CompileResult<()> {
        self.compile_expr(iterable)?;
        self.emit(Instr::GetIter);

        self.enter_block();
        let iter_slot = self.declare_local("<iter>", span)?;
        self.emit(Instr::StoreLocal(iter_slot));
        let var_slot = self.declare_local(variable, span)?;

        let loop_start = self.scope().chunk.code.len();
        self.emit(Instr::LoadLocal(iter_slot));
        self.emit(Instr::IterHasNext);
        let exit_jump = self.emit(Instr::JumpIfFalse(0));
        self.emit(Instr::LoadLocal(iter_slot));
        self.emit(Instr::IterNext);
        self.emit(Instr::StoreLocal(var_slot));

        self.scope_mut().loops.push(LoopContext { continue_target: loop_start, break_patches: Vec::new() });
        self.enter_block();
        for s in body {
            self.compile_stmt(s)?;
        }
        self.exit_block();

        let back_jump = self.emit(Instr::Jump(0));
        self.patch_jump_to(back_jump, loop_start, span)?;

        let after = self.scope().chunk.code.len();
        self.patch_jump_to(exit_jump, after, span)?;
        let ctx = match self.scope_mut().loops.pop() {
            Some(ctx) => ctx,
            None => unreachable!("loop context pushed above"),
        };
        for patch in ctx.break_patches {
            self.patch_jump_to(patch, after, span)?;
        }
        self.exit_block();
        Ok(())
    }

    fn compile_break(&mut self, span: slate_parser::Span) -> CompileResult<()> {
        if self.scope().loops.is_empty() {
            return Err(CompileError::BreakOutsideLoop { span });
        }
        let jump = self.emit(Instr::Jump(0));
        match self.scope_mut().loops.last_mut() {
            Some(ctx) => ctx.break_patches.push(jump),
            None => unreachable!("checked above"),
        }
        Ok(())
    }

    fn compile_continue(&mut self, span: slate_parser::Span) -> CompileResult<()> {
        let target = match self.scope().loops.last() {
            Some(ctx) => ctx.continue_target,
            None => return Err(CompileError::ContinueOutsideLoop { span }),
        };
        let jump = self.emit(Instr::Jump(0));
        self.patch_jump_to(jump, target, span)?;
        Ok(())
    }

    /// Builds a class value at runtime from a name, a superclass (or
    /// `null`), and its methods as name/closure pairs (spec §3.3); see
    /// `Instr::MakeClass` and DESIGN.md for the `init`-as-factory
    /// convention `MakeClass`'s VM handler applies.
    fn compile_class_decl(
        &mut self,
        name: &str,
        superclass: Option<&str>,
        methods: &[Stmt],
        span: slate_parser::Span,
    ) -> CompileResult<()> {
        let name_idx = self.add_constant(Constant::Str(name.to_string()), span)?;
        self.emit(Instr::LoadConst(name_idx));

        match superclass {
            Some(super_name) => self.compile_identifier_read(super_name),
            None => {
                self.emit(Instr::LoadNull);
            }
        }

        for method in methods {
            let Stmt::FunctionDecl { name: method_name, params, body, span: method_span } = method else {
                unreachable!("the parser only ever places FunctionDecl statements in a class body");
            };
            let key_idx = self.add_constant(Constant::Str(method_name.clone()), *method_span)?;
            self.emit(Instr::LoadConst(key_idx));
            self.push_closure(Some(method_name.clone()), params, body, *method_span)?;
        }

        self.emit(Instr::MakeClass(methods.len() as u16));
        self.bind_declared_name(name, span)
    }
}
