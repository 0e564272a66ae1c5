//! Token definitions for Slate source code.

mod precedence;

#[cfg(test)]
mod tests;

use logos::Logos;

pub use precedence::{infix_binding_power, Associativity, Precedence};

/// Slate tokens, produced by the `logos`-generated lexer.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
pub enum Token {
    // ==================== Keywords ====================
    #[token("var")]
    KwVar,
    #[token("val")]
    KwVal,
    #[token("function")]
    KwFunction,
    #[token("return")]
    KwReturn,
    #[token("if")]
    KwIf,
    #[token("else")]
    KwElse,
    #[token("while")]
    KwWhile,
    #[token("for")]
    KwFor,
    #[token("in")]
    KwIn,
    #[token("break")]
    KwBreak,
    #[token("continue")]
    KwContinue,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,
    #[token("undefined")]
    Undefined,
    #[token("class")]
    KwClass,
    #[token("new")]
    KwNew,

    // ==================== Literals ====================
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    #[regex(r"[0-9][0-9_]*", |lex| lex.slice().replace('_', ""))]
    IntLiteral(String),

    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9]+)?f32", |lex| lex.slice().trim_end_matches("f32").replace('_', ""))]
    Float32Literal(String),

    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9]+)?", |lex| lex.slice().replace('_', ""))]
    FloatLiteral(String),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let s = lex.slice();
        s[1..s.len() - 1].to_string()
    })]
    StringLiteral(String),

    // ==================== Delimiters ====================
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token("..")]
    DotDot,

    // ==================== Operators ====================
    #[token("=")]
    Eq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("!")]
    Bang,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("**")]
    StarStar,
    #[token("/")]
    Slash,
    #[token("//")]
    SlashSlash,
    #[token("%")]
    Percent,
}

impl Token {
    /// A short human-readable name, used in parser diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            Token::KwVar => "'var'",
            Token::KwVal => "'val'",
            Token::KwFunction => "'function'",
            Token::KwReturn => "'return'",
            Token::KwIf => "'if'",
            Token::KwElse => "'else'",
            Token::KwWhile => "'while'",
            Token::KwFor => "'for'",
            Token::KwIn => "'in'",
            Token::KwBreak => "'break'",
            Token::KwContinue => "'continue'",
            Token::KwClass => "'class'",
            Token::KwNew => "'new'",
            Token::True | Token::False => "boolean literal",
            Token::Null => "'null'",
            Token::Undefined => "'undefined'",
            Token::Identifier(_) => "identifier",
            Token::IntLiteral(_) => "integer literal",
            Token::FloatLiteral(_) => "float literal",
            Token::Float32Literal(_) => "float32 literal",
            Token::StringLiteral(_) => "string literal",
            Token::LParen => "'('",
            Token::RParen => "')'",
            Token::LBracket => "'['",
            Token::RBracket => "']'",
            Token::LBrace => "'{'",
            Token::RBrace => "'}'",
            Token::Comma => "','",
            Token::Semicolon => "';'",
            Token::Colon => "':'",
            Token::Dot => "'.'",
            Token::DotDot => "'..'",
            Token::Eq => "'='",
            Token::EqEq => "'=='",
            Token::BangEq => "'!='",
            Token::Bang => "'!'",
            Token::Lt => "'<'",
            Token::LtEq => "'<='",
            Token::Gt => "'>'",
            Token::GtEq => "'>='",
            Token::AndAnd => "'&&'",
            Token::OrOr => "'||'",
            Token::Plus => "'+'",
            Token::Minus => "'-'",
            Token::Star => "'*'",
            Token::StarStar => "'**'",
            Token::Slash => "'/'",
            Token::SlashSlash => "'//'",
            Token::Percent => "'%'",
        }
    }
}
