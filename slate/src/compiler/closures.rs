//! Free-variable analysis, used to decide what a closure must capture.
//!
//! Slate closures capture by value at creation time (spec §3.4), so the
//! compiler only needs to know *which* names a function body references
//! that it does not itself bind — not build a live upvalue chain. This
//! walks the AST once per function and returns that name set, in a
//! stable order so the capture list and the inner chunk's `LoadUpvalue`
//! indices agree.

use std::collections::HashSet;

use slate_parser::{Expr, Stmt};

pub fn free_variables(params: &[String], body: &[Stmt]) -> Vec<String> {
    let mut bound: HashSet<String> = params.iter().cloned().collect();
    let mut free: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for stmt in body {
        walk_stmt(stmt, &mut bound, &mut free, &mut seen);
    }
    free
}

fn note_free(name: &str, bound: &HashSet<String>, free: &mut Vec<String>, seen: &mut HashSet<String>) {
    if !bound.contains(name) && seen.insert(name.to_string()) {
        free.push(name.to_string());
    }
}

fn walk_stmt(stmt: &Stmt, bound: &mut HashSet<String>, free: &mut Vec<String>, seen: &mut HashSet<String>) {
    match stmt {
        Stmt::Expr { expr, .. } => walk_expr(expr, bound, free, seen),
        Stmt::VarDecl { name, init, .. } => {
            if let Some(init) = init {
                walk_expr(init, bound, free, seen);
            }
            bound.insert(name.clone());
        }
        Stmt::Assign { target, value, .. } => {
            walk_expr(target, bound, free, seen);
            walk_expr(value, bound, free, seen);
        }
        Stmt::If { condition, then_branch, else_branch, .. } => {
            walk_expr(condition, bound, free, seen);
            for s in then_branch {
                walk_stmt(s, bound, free, seen);
            }
            if let Some(else_branch) = else_branch {
                for s in else_branch {
                    walk_stmt(s, bound, free, seen);
                }
            }
        }
        Stmt::While { condition, body, .. } => {
            walk_expr(condition, bound, free, seen);
            for s in body {
                walk_stmt(s, bound, free, seen);
            }
        }
        Stmt::For { variable, iterable, body, .. } => {
            walk_expr(iterable, bound, free, seen);
            bound.insert(variable.clone());
            for s in body {
                walk_stmt(s, bound, free, seen);
            }
        }
        Stmt::FunctionDecl { name, params, body, .. } => {
            bound.insert(name.clone());
            walk_nested_function(params, body, bound, free, seen);
        }
        Stmt::ClassDecl { name, .. } => {
            bound.insert(name.clone());
        }
        Stmt::Return { value, .. } => {
            if let Some(value) = value {
                walk_expr(value, bound, free, seen);
            }
        }
        Stmt::Break { .. } | Stmt::Continue { .. } => {}
        Stmt::Block { statements, .. } => {
            for s in statements {
                walk_stmt(s, bound, free, seen);
            }
        }
    }
}

fn walk_nested_function(
    params: &[String],
    body: &[Stmt],
    bound: &HashSet<String>,
    free: &mut Vec<String>,
    seen: &mut HashSet<String>,
) {
    let mut inner_bound = bound.clone();
    inner_bound.extend(params.iter().cloned());
    for s in body {
        walk_stmt(s, &mut inner_bound, free, seen);
    }
}

fn walk_expr(expr: &Expr, bound: &mut HashSet<String>, free: &mut Vec<String>, seen: &mut HashSet<String>) {
    match expr {
        Expr::Literal { .. } => {}
        Expr::Identifier { name, .. } => note_free(name, bound, free, seen),
        Expr::Unary { operand, .. } => walk_expr(operand, bound, free, seen),
        Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
            walk_expr(left, bound, free, seen);
            walk_expr(right, bound, free, seen);
        }
        Expr::Call { callee, args, .. } => {
            walk_expr(callee, bound, free, seen);
            for a in args {
                walk_expr(a, bound, free, seen);
            }
        }
        Expr::Index { object, index, .. } => {
            walk_expr(object, bound, free, seen);
            walk_expr(index, bound, free, seen);
        }
        Expr::Property { object, .. } => walk_expr(object, bound, free, seen),
        Expr::MethodCall { object, args, .. } => {
            walk_expr(object, bound, free, seen);
            for a in args {
                walk_expr(a, bound, free, seen);
            }
        }
        Expr::ArrayLiteral { elements, .. } => {
            for e in elements {
                walk_expr(e, bound, free, seen);
            }
        }
        Expr::ObjectLiteral { entries, .. } => {
            for (_, v) in entries {
                walk_expr(v, bound, free, seen);
            }
        }
        Expr::Range { start, end, .. } => {
            walk_expr(start, bound, free, seen);
            walk_expr(end, bound, free, seen);
        }
        Expr::FunctionExpr { params, body, .. } => {
            walk_nested_function(params, body, bound, free, seen);
        }
        Expr::New { args, .. } => {
            for a in args {
                walk_expr(a, bound, free, seen);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slate_parser::parse;

    #[test]
    fn captures_variable_from_enclosing_scope() {
        let program = parse("function outer() { var x = 1; function inner() { return x; } }").unwrap();
        let Stmt::FunctionDecl { body, .. } = &program.statements[0] else {
            panic!("expected function decl")
        };
        let Stmt::FunctionDecl { params, body: inner_body, .. } = &body[1] else {
            panic!("expected nested function decl")
        };
        let free = free_variables(params, inner_body);
        assert_eq!(free, vec!["x".to_string()]);
    }

    #[test]
    fn params_and_locals_are_not_free() {
        let program = parse("function f(a) { var b = a; return b; }").unwrap();
        let Stmt::FunctionDecl { params, body, .. } = &program.statements[0] else {
            panic!("expected function decl")
        };
        assert!(free_variables(params, body).is_empty());
    }
}
