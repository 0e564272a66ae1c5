//! Statement parsing.

use crate::ast::{Expr, Stmt};
use crate::error::{ParseError, ParseResult};
use crate::parser::Parser;
use crate::token::Token;

impl<'a> Parser<'a> {
    pub(crate) fn parse_stmt(&mut self) -> ParseResult<Stmt> {
        match self.peek() {
            Some(Token::KwVar) => self.parse_var_decl(true),
            Some(Token::KwVal) => self.parse_var_decl(false),
            Some(Token::KwFunction) => self.parse_function_decl(),
            Some(Token::KwClass) => self.parse_class_decl(),
            Some(Token::KwIf) => self.parse_if(),
            Some(Token::KwWhile) => self.parse_while(),
            Some(Token::KwFor) => self.parse_for(),
            Some(Token::KwReturn) => self.parse_return(),
            Some(Token::KwBreak) => {
                let span = self.bump()?.span;
                self.eat(&Token::Semicolon);
                Ok(Stmt::Break { span })
            }
            Some(Token::KwContinue) => {
                let span = self.bump()?.span;
                self.eat(&Token::Semicolon);
                Ok(Stmt::Continue { span })
            }
            Some(Token::LBrace) => self.parse_block_stmt(),
            _ => self.parse_expr_or_assign_stmt(),
        }
    }

    fn parse_var_decl(&mut self, mutable: bool) -> ParseResult<Stmt> {
        let start = self.bump()?.span;
        let (name, _) = self.expect_identifier()?;
        let init = if self.eat(&Token::Eq) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        let end = self.expect(Token::Semicolon)?.span;
        Ok(Stmt::VarDecl {
            name,
            mutable,
            init,
            span: start.merge(&end),
        })
    }

    fn parse_function_decl(&mut self) -> ParseResult<Stmt> {
        let start = self.expect(Token::KwFunction)?.span;
        let (name, _) = self.expect_identifier()?;
        self.expect(Token::LParen)?;
        let params = self.parse_param_list()?;
        self.expect(Token::RParen)?;
        let body = self.parse_block()?;
        let end = body.last().map(|s| s.span()).unwrap_or(start);
        Ok(Stmt::FunctionDecl {
            name,
            params,
            span: start.merge(&end),
            body,
        })
    }

    fn parse_class_decl(&mut self) -> ParseResult<Stmt> {
        let start = self.expect(Token::KwClass)?.span;
        let (name, _) = self.expect_identifier()?;
        let superclass = if self.eat(&Token::Colon) {
            Some(self.expect_identifier()?.0)
        } else {
            None
        };
        self.expect(Token::LBrace)?;
        let mut methods = Vec::new();
        while !self.check(&Token::RBrace) {
            methods.push(self.parse_function_decl()?);
        }
        let end = self.expect(Token::RBrace)?.span;
        Ok(Stmt::ClassDecl {
            name,
            superclass,
            methods,
            span: start.merge(&end),
        })
    }

    fn parse_if(&mut self) -> ParseResult<Stmt> {
        let start = self.expect(Token::KwIf)?.span;
        self.expect(Token::LParen)?;
        let condition = self.parse_expr()?;
        self.expect(Token::RParen)?;
        let then_branch = self.parse_stmt_or_block()?;
        let (else_branch, end) = if self.eat(&Token::KwElse) {
            let branch = self.parse_stmt_or_block()?;
            let end = branch.last().map(|s| s.span()).unwrap_or(start);
            (Some(branch), end)
        } else {
            let end = then_branch.last().map(|s| s.span()).unwrap_or(start);
            (None, end)
        };
        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
            span: start.merge(&end),
        })
    }

    fn parse_while(&mut self) -> ParseResult<Stmt> {
        let start = self.expect(Token::KwWhile)?.span;
        self.expect(Token::LParen)?;
        let condition = self.parse_expr()?;
        self.expect(Token::RParen)?;
        let body = self.parse_stmt_or_block()?;
        let end = body.last().map(|s| s.span()).unwrap_or(start);
        Ok(Stmt::While {
            condition,
            body,
            span: start.merge(&end),
        })
    }

    fn parse_for(&mut self) -> ParseResult<Stmt> {
        let start = self.expect(Token::KwFor)?.span;
        self.expect(Token::LParen)?;
        let (variable, _) = self.expect_identifier()?;
        self.expect(Token::KwIn)?;
        let iterable = self.parse_expr()?;
        self.expect(Token::RParen)?;
        let body = self.parse_stmt_or_block()?;
        let end = body.last().map(|s| s.span()).unwrap_or(start);
        Ok(Stmt::For {
            variable,
            iterable,
            body,
            span: start.merge(&end),
        })
    }

    fn parse_return(&mut self) -> ParseResult<Stmt> {
        let start = self.expect(Token::KwReturn)?.span;
        let value = if self.check(&Token::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        let end = self.expect(Token::Semicolon)?.span;
        Ok(Stmt::Return {
            value,
            span: start.merge(&end),
        })
    }

    fn parse_block_stmt(&mut self) -> ParseResult<Stmt> {
        let start = self.current_span();
        let statements = self.parse_block()?;
        let end = statements.last().map(|s| s.span()).unwrap_or(start);
        Ok(Stmt::Block {
            statements,
            span: start.merge(&end),
        })
    }

    /// A `{ ... }` block of statements.
    pub(crate) fn parse_block(&mut self) -> ParseResult<Vec<Stmt>> {
        self.expect(Token::LBrace)?;
        let mut statements = Vec::new();
        while !self.check(&Token::RBrace) {
            statements.push(self.parse_stmt()?);
        }
        self.expect(Token::RBrace)?;
        Ok(statements)
    }

    /// `if`/`while`/`for` bodies accept either a `{ ... }` block or a
    /// single statement, normalized to a `Vec<Stmt>` either way.
    fn parse_stmt_or_block(&mut self) -> ParseResult<Vec<Stmt>> {
        if self.check(&Token::LBrace) {
            self.parse_block()
        } else {
            Ok(vec![self.parse_stmt()?])
        }
    }

    fn parse_expr_or_assign_stmt(&mut self) -> ParseResult<Stmt> {
        let expr = self.parse_expr()?;
        if self.eat(&Token::Eq) {
            if !is_assignable(&expr) {
                return Err(ParseError::invalid_syntax(
                    "left-hand side of assignment is not assignable",
                    expr.span(),
                ));
            }
            let value = self.parse_expr()?;
            let end = self.expect(Token::Semicolon)?.span;
            let span = expr.span().merge(&end);
            return Ok(Stmt::Assign {
                target: expr,
                value,
                span,
            });
        }
        let end = self.expect(Token::Semicolon)?.span;
        let span = expr.span().merge(&end);
        Ok(Stmt::Expr { expr, span })
    }
}

fn is_assignable(expr: &Expr) -> bool {
    matches!(expr, Expr::Identifier { .. } | Expr::Index { .. } | Expr::Property { .. })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn parses_if_else() {
        let program = parse("if (x) { y = 1; } else { y = 2; }").unwrap();
        assert!(matches!(program.statements[0], Stmt::If { .. }));
    }

    #[test]
    fn parses_for_in_range() {
        let program = parse("for (i in 1..10) { total = total + i; }").unwrap();
        assert!(matches!(program.statements[0], Stmt::For { .. }));
    }

    #[test]
    fn rejects_assignment_to_literal() {
        let err = parse("1 = 2;").unwrap_err();
        assert!(err.to_string().contains("not assignable"));
    }

    #[test]
    fn parses_class_with_superclass() {
        let program = parse("class Dog : Animal { function bark() { return 1; } }").unwrap();
        match &program.statements[0] {
            Stmt::ClassDecl { superclass, methods, .. } => {
                assert_eq!(superclass.as_deref(), Some("Animal"));
                assert_eq!(methods.len(), 1);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
