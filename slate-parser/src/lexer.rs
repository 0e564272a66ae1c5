//! Lexer for Slate source code.
//!
//! Wraps the `logos`-generated [`Token`] stream with span tracking and a
//! one-token lookahead buffer, which the Pratt parser relies on.

use logos::Logos;

use crate::error::ParseError;
use crate::span::{SourceMap, Span};
use crate::token::Token;

/// A token paired with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

pub struct Lexer<'a> {
    inner: logos::Lexer<'a, Token>,
    source_map: SourceMap,
    peeked: Option<Option<Result<SpannedToken, ParseError>>>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            inner: Token::lexer(source),
            source_map: SourceMap::new(source),
            peeked: None,
        }
    }

    pub fn peek(&mut self) -> Option<&Result<SpannedToken, ParseError>> {
        if self.peeked.is_none() {
            self.peeked = Some(self.next_internal());
        }
        self.peeked.as_ref().and_then(|opt| opt.as_ref())
    }

    pub fn next_token(&mut self) -> Option<Result<SpannedToken, ParseError>> {
        if let Some(peeked) = self.peeked.take() {
            return peeked;
        }
        self.next_internal()
    }

    fn next_internal(&mut self) -> Option<Result<SpannedToken, ParseError>> {
        let result = self.inner.next()?;
        let range = self.inner.span();
        let span = self.source_map.span(range.start, range.end);
        match result {
            Ok(token) => Some(Ok(SpannedToken { token, span })),
            Err(()) => Some(Err(ParseError::LexerError { span })),
        }
    }
}

/// Collect every token in `source`, stopping at the first lexer error.
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, ParseError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next_token() {
        tokens.push(result?);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peek_does_not_consume() {
        let mut lexer = Lexer::new("1 + 2");
        assert_eq!(lexer.peek().unwrap().as_ref().unwrap().token, Token::IntLiteral("1".into()));
        assert_eq!(lexer.next_token().unwrap().unwrap().token, Token::IntLiteral("1".into()));
        assert_eq!(lexer.next_token().unwrap().unwrap().token, Token::Plus);
    }

    #[test]
    fn tokenize_reports_span() {
        let tokens = tokenize("var x").unwrap();
        assert_eq!(tokens[0].span.start, 0);
        assert_eq!(tokens[1].span.start, 4);
    }
}
