use super::*;

#[test]
fn lexes_keywords_and_identifiers() {
    let mut lex = Token::lexer("var x = foo");
    assert_eq!(lex.next(), Some(Ok(Token::KwVar)));
    assert_eq!(lex.next(), Some(Ok(Token::Identifier("x".to_string()))));
    assert_eq!(lex.next(), Some(Ok(Token::Eq)));
    assert_eq!(lex.next(), Some(Ok(Token::Identifier("foo".to_string()))));
}

#[test]
fn lexes_numbers() {
    let mut lex = Token::lexer("42 3.14 1_000");
    assert_eq!(lex.next(), Some(Ok(Token::IntLiteral("42".to_string()))));
    assert_eq!(
        lex.next(),
        Some(Ok(Token::FloatLiteral("3.14".to_string())))
    );
    assert_eq!(lex.next(), Some(Ok(Token::IntLiteral("1000".to_string()))));
}

#[test]
fn lexes_string_literal_unescaped_contents() {
    let mut lex = Token::lexer(r#""hello, world""#);
    assert_eq!(
        lex.next(),
        Some(Ok(Token::StringLiteral("hello, world".to_string())))
    );
}

#[test]
fn lexes_range_dots_before_decimal() {
    let mut lex = Token::lexer("1..10");
    assert_eq!(lex.next(), Some(Ok(Token::IntLiteral("1".to_string()))));
    assert_eq!(lex.next(), Some(Ok(Token::DotDot)));
    assert_eq!(lex.next(), Some(Ok(Token::IntLiteral("10".to_string()))));
}

#[test]
fn skips_line_comments() {
    let mut lex = Token::lexer("1 // comment\n2");
    assert_eq!(lex.next(), Some(Ok(Token::IntLiteral("1".to_string()))));
    assert_eq!(lex.next(), Some(Ok(Token::IntLiteral("2".to_string()))));
}
