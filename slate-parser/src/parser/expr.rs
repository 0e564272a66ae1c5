//! Pratt expression parsing.

use slate_value::Value;

use crate::ast::{BinaryOp, Expr, LogicalOp, UnaryOp};
use crate::error::{ParseError, ParseResult};
use crate::parser::Parser;
use crate::token::{infix_binding_power, Associativity, Precedence, Token};

impl<'a> Parser<'a> {
    pub(crate) fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.parse_precedence(Precedence::NONE)
    }

    fn parse_precedence(&mut self, min_bp: Precedence) -> ParseResult<Expr> {
        let mut left = self.parse_unary()?;

        loop {
            let Some(token) = self.peek() else { break };
            let Some((bp, assoc)) = infix_binding_power(token) else {
                break;
            };
            if bp < min_bp {
                break;
            }

            left = match token {
                Token::LParen => self.parse_call(left)?,
                Token::LBracket => self.parse_index(left)?,
                Token::Dot => self.parse_property_or_method(left)?,
                Token::DotDot => self.parse_range(left)?,
                _ => {
                    let next_min = match assoc {
                        Associativity::Left => Precedence(bp.0 + 1),
                        Associativity::Right => bp,
                    };
                    self.parse_binary(left, next_min)?
                }
            };
        }

        Ok(left)
    }

    fn parse_binary(&mut self, left: Expr, next_min: Precedence) -> ParseResult<Expr> {
        let op_token = self.bump()?;
        let right = self.parse_precedence(next_min)?;
        let span = left.span().merge(&right.span());

        if let Some(op) = logical_op(&op_token.token) {
            return Ok(Expr::Logical {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            });
        }

        let op = binary_op(&op_token.token).ok_or_else(|| {
            ParseError::invalid_syntax(
                format!("'{}' is not a binary operator", op_token.token.describe()),
                op_token.span,
            )
        })?;
        Ok(Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
            span,
        })
    }

    fn parse_range(&mut self, start: Expr) -> ParseResult<Expr> {
        self.expect(Token::DotDot)?;
        let end = self.parse_precedence(Precedence(Precedence::RANGE.0 + 1))?;
        let span = start.span().merge(&end.span());
        Ok(Expr::Range {
            start: Box::new(start),
            end: Box::new(end),
            span,
        })
    }

    fn parse_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        self.expect(Token::LParen)?;
        let args = self.parse_arg_list(Token::RParen)?;
        let end = self.expect(Token::RParen)?;
        let span = callee.span().merge(&end.span);
        Ok(Expr::Call {
            callee: Box::new(callee),
            args,
            span,
        })
    }

    fn parse_index(&mut self, object: Expr) -> ParseResult<Expr> {
        self.expect(Token::LBracket)?;
        let index = self.parse_expr()?;
        let end = self.expect(Token::RBracket)?;
        let span = object.span().merge(&end.span);
        Ok(Expr::Index {
            object: Box::new(object),
            index: Box::new(index),
            span,
        })
    }

    fn parse_property_or_method(&mut self, object: Expr) -> ParseResult<Expr> {
        self.expect(Token::Dot)?;
        let (name, name_span) = self.expect_identifier()?;
        if self.check(&Token::LParen) {
            self.expect(Token::LParen)?;
            let args = self.parse_arg_list(Token::RParen)?;
            let end = self.expect(Token::RParen)?;
            let span = object.span().merge(&end.span);
            return Ok(Expr::MethodCall {
                object: Box::new(object),
                method: name,
                args,
                span,
            });
        }
        let span = object.span().merge(&name_span);
        Ok(Expr::Property {
            object: Box::new(object),
            name,
            span,
        })
    }

    fn parse_arg_list(&mut self, end: Token) -> ParseResult<Vec<Expr>> {
        let mut args = Vec::new();
        if self.check(&end) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        Ok(args)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        match self.peek() {
            Some(Token::Minus) => {
                let op_span = self.bump()?.span;
                let operand = self.parse_precedence(Precedence::UNARY)?;
                let span = op_span.merge(&operand.span());
                Ok(Expr::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(operand),
                    span,
                })
            }
            Some(Token::Bang) => {
                let op_span = self.bump()?.span;
                let operand = self.parse_precedence(Precedence::UNARY)?;
                let span = op_span.merge(&operand.span());
                Ok(Expr::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                    span,
                })
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let spanned = self.peek().cloned();
        match spanned {
            Some(Token::IntLiteral(text)) => {
                let span = self.bump()?.span;
                let parsed = text.parse::<i64>().map_err(|_| {
                    ParseError::InvalidNumber {
                        literal: text.clone(),
                        span,
                    }
                })?;
                let value = if let Ok(i) = i32::try_from(parsed) {
                    Value::Int32(i)
                } else {
                    Value::BigInt(
                        slate_value::containers::SlateBigInt::parse(&text)
                            .ok_or_else(|| ParseError::InvalidNumber { literal: text, span })?,
                    )
                };
                Ok(Expr::Literal { value, span })
            }
            Some(Token::FloatLiteral(text)) => {
                let span = self.bump()?.span;
                let value = text
                    .parse::<f64>()
                    .map_err(|_| ParseError::InvalidNumber { literal: text, span })?;
                Ok(Expr::Literal {
                    value: Value::Float64(value),
                    span,
                })
            }
            Some(Token::Float32Literal(text)) => {
                let span = self.bump()?.span;
                let value = text
                    .parse::<f32>()
                    .map_err(|_| ParseError::InvalidNumber { literal: text, span })?;
                Ok(Expr::Literal {
                    value: Value::Float32(value),
                    span,
                })
            }
            Some(Token::StringLiteral(text)) => {
                let span = self.bump()?.span;
                let unescaped = unescape(&text);
                let value = Value::Str(
                    slate_value::containers::SlateString::new(unescaped)
                        .map_err(|_| ParseError::InvalidSyntax {
                            message: "string literal contains an embedded NUL".to_string(),
                            span,
                        })?,
                );
                Ok(Expr::Literal { value, span })
            }
            Some(Token::True) => {
                let span = self.bump()?.span;
                Ok(Expr::Literal { value: Value::Bool(true), span })
            }
            Some(Token::False) => {
                let span = self.bump()?.span;
                Ok(Expr::Literal { value: Value::Bool(false), span })
            }
            Some(Token::Null) => {
                let span = self.bump()?.span;
                Ok(Expr::Literal { value: Value::Null, span })
            }
            Some(Token::Undefined) => {
                let span = self.bump()?.span;
                Ok(Expr::Literal { value: Value::Undefined, span })
            }
            Some(Token::Identifier(name)) => {
                let span = self.bump()?.span;
                Ok(Expr::Identifier { name, span })
            }
            Some(Token::LParen) => {
                let start = self.bump()?.span;
                let inner = self.parse_expr()?;
                let end = self.expect(Token::RParen)?.span;
                let _ = start.merge(&end);
                Ok(inner)
            }
            Some(Token::LBracket) => self.parse_array_literal(),
            Some(Token::LBrace) => self.parse_object_literal(),
            Some(Token::KwFunction) => self.parse_function_expr(),
            Some(Token::KwNew) => self.parse_new_expr(),
            other => {
                let span = self.current_span();
                let found = other.map(|t| t.describe().to_string()).unwrap_or_else(|| "end of input".to_string());
                Err(ParseError::unexpected_token(found, "an expression", span))
            }
        }
    }

    fn parse_array_literal(&mut self) -> ParseResult<Expr> {
        let start = self.expect(Token::LBracket)?.span;
        let elements = self.parse_arg_list(Token::RBracket)?;
        let end = self.expect(Token::RBracket)?.span;
        Ok(Expr::ArrayLiteral {
            elements,
            span: start.merge(&end),
        })
    }

    fn parse_object_literal(&mut self) -> ParseResult<Expr> {
        let start = self.expect(Token::LBrace)?.span;
        let mut entries = Vec::new();
        if !self.check(&Token::RBrace) {
            loop {
                let (key, _) = match self.peek().cloned() {
                    Some(Token::Identifier(_)) => self.expect_identifier()?,
                    Some(Token::StringLiteral(text)) => {
                        let span = self.bump()?.span;
                        (unescape(&text), span)
                    }
                    other => {
                        let span = self.current_span();
                        let found = other.map(|t| t.describe().to_string()).unwrap_or_else(|| "end of input".to_string());
                        return Err(ParseError::unexpected_token(found, "a property key", span));
                    }
                };
                self.expect(Token::Colon)?;
                let value = self.parse_expr()?;
                entries.push((key, value));
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }
        let end = self.expect(Token::RBrace)?.span;
        Ok(Expr::ObjectLiteral {
            entries,
            span: start.merge(&end),
        })
    }

    fn parse_function_expr(&mut self) -> ParseResult<Expr> {
        let start = self.expect(Token::KwFunction)?.span;
        self.expect(Token::LParen)?;
        let params = self.parse_param_list()?;
        self.expect(Token::RParen)?;
        let body = self.parse_block()?;
        let end = body.last().map(|s| s.span()).unwrap_or(start);
        Ok(Expr::FunctionExpr {
            params,
            body,
            span: start.merge(&end),
        })
    }

    fn parse_new_expr(&mut self) -> ParseResult<Expr> {
        let start = self.expect(Token::KwNew)?.span;
        let (class_name, _) = self.expect_identifier()?;
        self.expect(Token::LParen)?;
        let args = self.parse_arg_list(Token::RParen)?;
        let end = self.expect(Token::RParen)?.span;
        Ok(Expr::New {
            class_name,
            args,
            span: start.merge(&end),
        })
    }

    pub(crate) fn parse_param_list(&mut self) -> ParseResult<Vec<String>> {
        let mut params = Vec::new();
        if self.check(&Token::RParen) {
            return Ok(params);
        }
        loop {
            let (name, _) = self.expect_identifier()?;
            params.push(name);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        Ok(params)
    }
}

fn binary_op(token: &Token) -> Option<BinaryOp> {
    Some(match token {
        Token::Plus => BinaryOp::Add,
        Token::Minus => BinaryOp::Sub,
        Token::Star => BinaryOp::Mul,
        Token::Slash => BinaryOp::Div,
        Token::SlashSlash => BinaryOp::FloorDiv,
        Token::Percent => BinaryOp::Mod,
        Token::StarStar => BinaryOp::Pow,
        Token::EqEq => BinaryOp::Eq,
        Token::BangEq => BinaryOp::NotEq,
        Token::Lt => BinaryOp::Lt,
        Token::LtEq => BinaryOp::LtEq,
        Token::Gt => BinaryOp::Gt,
        Token::GtEq => BinaryOp::GtEq,
        _ => return None,
    })
}

fn logical_op(token: &Token) -> Option<LogicalOp> {
    Some(match token {
        Token::AndAnd => LogicalOp::And,
        Token::OrOr => LogicalOp::Or,
        _ => return None,
    })
}

/// Resolves the escape sequences the lexer leaves untouched in string
/// literal contents (`\n`, `\t`, `\"`, `\\`).
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn respects_precedence_of_factor_over_term() {
        let program = parse("1 + 2 * 3;").unwrap();
        match &program.statements[0] {
            crate::ast::Stmt::Expr { expr: Expr::Binary { op: BinaryOp::Add, right, .. }, .. } => {
                assert!(matches!(**right, Expr::Binary { op: BinaryOp::Mul, .. }));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn power_is_right_associative() {
        // 2 ** 3 ** 2 should parse as 2 ** (3 ** 2), not (2 ** 3) ** 2.
        let program = parse("2 ** 3 ** 2;").unwrap();
        match &program.statements[0] {
            crate::ast::Stmt::Expr { expr: Expr::Binary { op: BinaryOp::Pow, left, right, .. }, .. } => {
                assert!(matches!(**left, Expr::Literal { .. }));
                assert!(matches!(**right, Expr::Binary { op: BinaryOp::Pow, .. }));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn parses_method_chaining() {
        let program = parse(r#"greeting.toUpper().length();"#).unwrap();
        assert!(matches!(
            &program.statements[0],
            crate::ast::Stmt::Expr { expr: Expr::MethodCall { .. }, .. }
        ));
    }

    #[test]
    fn unescapes_string_literals() {
        let program = parse(r#""a\nb";"#).unwrap();
        match &program.statements[0] {
            crate::ast::Stmt::Expr { expr: Expr::Literal { value: Value::Str(s), .. }, .. } => {
                assert_eq!(s.as_str(), "a\nb");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
