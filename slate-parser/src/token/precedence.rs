//! Binary operator precedence table for the Pratt parser.

use super::Token;

/// Associativity of a binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

/// Binding power of a binary operator. Higher binds tighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Precedence(pub u8);

impl Precedence {
    pub const NONE: Precedence = Precedence(0);
    pub const OR: Precedence = Precedence(10);
    pub const AND: Precedence = Precedence(20);
    pub const EQUALITY: Precedence = Precedence(30);
    pub const COMPARISON: Precedence = Precedence(40);
    pub const RANGE: Precedence = Precedence(50);
    pub const TERM: Precedence = Precedence(60);
    pub const FACTOR: Precedence = Precedence(70);
    pub const POWER: Precedence = Precedence(80);
    pub const UNARY: Precedence = Precedence(90);
    pub const CALL: Precedence = Precedence(100);
}

/// Returns the (precedence, associativity) of `token` as an infix operator,
/// or `None` if it cannot start an infix expression.
pub fn infix_binding_power(token: &Token) -> Option<(Precedence, Associativity)> {
    use Associativity::*;
    let pair = match token {
        Token::OrOr => (Precedence::OR, Left),
        Token::AndAnd => (Precedence::AND, Left),
        Token::EqEq | Token::BangEq => (Precedence::EQUALITY, Left),
        Token::Lt | Token::LtEq | Token::Gt | Token::GtEq => (Precedence::COMPARISON, Left),
        Token::DotDot => (Precedence::RANGE, Left),
        Token::Plus | Token::Minus => (Precedence::TERM, Left),
        Token::Star | Token::Slash | Token::Percent | Token::SlashSlash => {
            (Precedence::FACTOR, Left)
        }
        Token::StarStar => (Precedence::POWER, Right),
        Token::LParen | Token::LBracket | Token::Dot => (Precedence::CALL, Left),
        _ => return None,
    };
    Some(pair)
}
