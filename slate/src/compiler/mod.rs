//! AST-to-bytecode lowering (C4, spec §4.4).
//!
//! Grounded on the teacher's `compile/expr`/`compile/stmt` directory
//! split: one `Compiler` struct whose `impl` is spread across this file,
//! `expr.rs`, and `stmt.rs` by AST construct family, sharing the
//! `Module` under construction and a stack of active [`FunctionScope`]s
//! (one per nested function currently being compiled; the outermost
//! entry is the top-level script).

mod expr;
mod stmt;

pub mod closures;
pub mod error;
pub mod scope;

use slate_parser::{Program, Span, Stmt};

use crate::bytecode::{Chunk, Constant, Instr, Module};
use closures::free_variables;
pub use error::{CompileError, CompileResult};
use scope::FunctionScope;

/// Where an identifier reference resolves, decided fresh at each use
/// since a name can mean a different thing depending on which function
/// is compiling it.
enum Binding {
    Local(u16),
    Upvalue(u16),
    Global(u16),
}

pub struct Compiler {
    module: Module,
    scopes: Vec<FunctionScope>,
    /// Line of the statement/expression currently being lowered, stamped
    /// onto every instruction `emit` pushes (spec §6.4's per-frame source
    /// location); updated at the top of `compile_stmt`/`compile_expr`
    /// rather than threaded through every call site.
    current_line: u32,
}

/// Compiles a parsed program into a loadable [`Module`] (spec §4.4).
pub fn compile(program: &Program) -> CompileResult<Module> {
    let mut compiler = Compiler {
        module: Module::new(),
        scopes: Vec::new(),
        current_line: 0,
    };
    let script_index = compiler.module.push_chunk(Chunk::new(Some("<script>".to_string()), 0));
    debug_assert_eq!(script_index, 0, "the script chunk must be Module::chunks[0]");

    compiler.scopes.push(FunctionScope::new(Chunk::new(Some("<script>".to_string()), 0), Vec::new()));
    compiler.compile_script(&program.statements)?;
    let finished = match compiler.scopes.pop() {
        Some(scope) => scope,
        None => unreachable!("script scope pushed above"),
    };
    compiler.module.chunks[0] = finished.chunk;

    Ok(compiler.module)
}

impl Compiler {
    fn scope_mut(&mut self) -> &mut FunctionScope {
        match self.scopes.last_mut() {
            Some(scope) => scope,
            None => unreachable!("compiler always has an active function scope"),
        }
    }

    fn scope(&self) -> &FunctionScope {
        match self.scopes.last() {
            Some(scope) => scope,
            None => unreachable!("compiler always has an active function scope"),
        }
    }

    fn current_chunk_mut(&mut self) -> &mut Chunk {
        &mut self.scope_mut().chunk
    }

    fn emit(&mut self, instr: Instr) -> usize {
        let line = self.current_line;
        let scope = self.scope_mut();
        let index = scope.chunk.push_instr(instr);
        scope.chunk.lines.push(line);
        index
    }

    fn set_line(&mut self, span: Span) {
        self.current_line = span.start_line as u32;
    }

    fn add_constant(&mut self, constant: Constant, span: Span) -> CompileResult<u16> {
        if self.scope().chunk.constants.len() >= u16::MAX as usize {
            return Err(CompileError::TooManyConstants { span });
        }
        Ok(self.current_chunk_mut().add_constant(constant))
    }

    /// A `var`/function/class declaration is a global only when it sits
    /// directly in the top-level script, outside every block. Everything
    /// else — including top-level code nested in an `if`/`while`/`for`
    /// body, and anything inside a function — is local.
    fn is_global_scope(&self) -> bool {
        self.scopes.len() == 1 && self.scope().block_starts.is_empty()
    }

    fn resolve(&mut self, name: &str) -> Binding {
        if let Some(slot) = self.scope().resolve_local(name) {
            return Binding::Local(slot);
        }
        if let Some(idx) = self.scope().resolve_upvalue(name) {
            return Binding::Upvalue(idx);
        }
        Binding::Global(self.module.global_index(name))
    }

    fn declare_local(&mut self, name: &str, span: Span) -> CompileResult<u16> {
        if self.scope().chunk.num_locals >= u16::MAX as usize {
            return Err(CompileError::TooManyLocals { span });
        }
        Ok(self.scope_mut().declare_local(name.to_string()))
    }

    fn enter_block(&mut self) {
        self.scope_mut().enter_block();
    }

    fn exit_block(&mut self) {
        self.scope_mut().exit_block();
    }

    /// Binds the just-pushed stack value (a closure, class, or plain
    /// initializer) to `name`, either as a global or as a new local slot,
    /// per [`Compiler::is_global_scope`].
    fn bind_declared_name(&mut self, name: &str, span: Span) -> CompileResult<()> {
        if self.is_global_scope() {
            let idx = self.module.global_index(name);
            self.emit(Instr::DefineGlobal(idx));
        } else {
            let slot = self.declare_local(name, span)?;
            self.emit(Instr::StoreLocal(slot));
        }
        Ok(())
    }

    fn patch_jump_to(&mut self, jump_index: usize, target: usize, span: Span) -> CompileResult<()> {
        let delta = target as isize - (jump_index as isize + 1);
        let delta: i16 = delta.try_into().map_err(|_| CompileError::JumpTooFar { span })?;
        match &mut self.scope_mut().chunk.code[jump_index] {
            Instr::Jump(d) | Instr::JumpIfFalse(d) | Instr::JumpIfTrue(d) => *d = delta,
            other => unreachable!("patch_jump_to called on non-jump instruction {other:?}"),
        }
        Ok(())
    }

    /// Compiles a closure's body (spec §3.4), pushing `MakeClosure` onto
    /// the *enclosing* scope's chunk. Used for named function
    /// declarations, function expressions, and class methods alike.
    fn push_closure(&mut self, name: Option<String>, params: &[String], body: &[Stmt], span: Span) -> CompileResult<()> {
        let free = free_variables(params, body);
        let mut captured_names = Vec::new();
        let mut capture_instrs = Vec::new();
        {
            let enclosing = self.scope();
            for n in &free {
                if let Some(slot) = enclosing.resolve_local(n) {
                    capture_instrs.push(Instr::LoadLocal(slot));
                    captured_names.push(n.clone());
                } else if let Some(idx) = enclosing.resolve_upvalue(n) {
                    capture_instrs.push(Instr::LoadUpvalue(idx));
                    captured_names.push(n.clone());
                }
                // else: resolves as a global inside the function body; nothing to capture.
            }
        }

        let chunk = Chunk::new(name, params.len());
        let mut inner = FunctionScope::new(chunk, captured_names);
        for (i, p) in params.iter().enumerate() {
            inner.locals.push((p.clone(), i as u16));
        }
        let num_upvalues = capture_instrs.len();
        self.scopes.push(inner);
        self.compile_function_body(body)?;
        let finished = match self.scopes.pop() {
            Some(scope) => scope,
            None => unreachable!("scope pushed just above"),
        };
        let mut chunk = finished.chunk;
        chunk.num_upvalues = num_upvalues;
        let chunk_index = self.module.push_chunk(chunk);

        for instr in capture_instrs {
            self.emit(instr);
        }
        let proto_const = self.add_constant(Constant::FunctionProto(chunk_index), span)?;
        self.emit(Instr::MakeClosure(proto_const));
        Ok(())
    }

    /// A function body always ends in `Return`; a body that never hits an
    /// explicit `return` statement falls off the end and returns
    /// `undefined`. Trailing `LoadUndefined; Return` after an explicit
    /// terminal `return` is unreachable but harmless.
    fn compile_function_body(&mut self, body: &[Stmt]) -> CompileResult<()> {
        self.enter_block();
        for stmt in body {
            self.compile_stmt(stmt)?;
        }
        self.exit_block();
        self.emit(Instr::LoadUndefined);
        self.emit(Instr::Return);
        Ok(())
    }

    /// The top-level script is compiled like a function body, except the
    /// final statement — if it is a bare expression statement — leaves
    /// its value on the stack instead of popping it, becoming the
    /// script's result (spec §8's end-to-end scenarios all read this
    /// "stack-return" after running the whole program).
    fn compile_script(&mut self, statements: &[Stmt]) -> CompileResult<()> {
        for (i, stmt) in statements.iter().enumerate() {
            let is_last = i + 1 == statements.len();
            if is_last {
                if let Stmt::Expr { expr, .. } = stmt {
                    self.compile_expr(expr)?;
                } else {
                    self.compile_stmt(stmt)?;
                    self.emit(Instr::LoadUndefined);
                }
            } else {
                self.compile_stmt(stmt)?;
            }
        }
        if statements.is_empty() {
            self.emit(Instr::LoadUndefined);
        }
        self.emit(Instr::Return);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slate_parser::parse;

    #[test]
    fn script_leaves_final_expression_as_the_result() {
        let program = parse("var x = 1; x + 1;").unwrap();
        let module = compile(&program).unwrap();
        assert_eq!(module.chunks[0].name.as_deref(), Some("<script>"));
        assert!(matches!(module.chunks[0].code.last(), Some(Instr::Return)));
    }

    #[test]
    fn empty_program_compiles_to_a_bare_return() {
        let program = parse("").unwrap();
        let module = compile(&program).unwrap();
        assert_eq!(module.chunks[0].code, vec![Instr::LoadUndefined, Instr::Return]);
    }

    #[test]
    fn return_outside_function_is_rejected() {
        let program = parse("return 1;").unwrap();
        assert!(matches!(compile(&program), Err(CompileError::ReturnOutsideFunction { .. })));
    }

    #[test]
    fn break_outside_loop_is_rejected() {
        let program = parse("break;").unwrap();
        assert!(matches!(compile(&program), Err(CompileError::BreakOutsideLoop { .. })));
    }
}
