//! Exercises the tokenizer through the public `Interpreter::run` interface:
//! every legal lexeme must round-trip to the value its token denotes, and
//! malformed characters must surface as a syntax error.

use lispy::{Interpreter, InterpError};

#[test]
fn constants_round_trip() {
    let mut interp = Interpreter::new();
    assert_eq!(interp.run("42").unwrap(), "42");
    assert_eq!(interp.run("-17").unwrap(), "-17");
    assert_eq!(interp.run("+3").unwrap(), "3");
    assert_eq!(interp.run("0").unwrap(), "0");
}

#[test]
fn booleans_round_trip() {
    let mut interp = Interpreter::new();
    assert_eq!(interp.run("#t").unwrap(), "#t");
    assert_eq!(interp.run("#f").unwrap(), "#f");
}

#[test]
fn bare_sign_is_a_symbol() {
    let mut interp = Interpreter::new();
    // `+` and `-` with no trailing digit lex as symbol tokens (bound to
    // the arithmetic built-ins), not constants.
    assert_eq!(interp.run("(+ 1 2)").unwrap(), "3");
    assert_eq!(interp.run("(- 5 1)").unwrap(), "4");
}

#[test]
fn symbols_allow_punctuation_chars() {
    let mut interp = Interpreter::new();
    assert_eq!(interp.run("(define x* 7) x*").unwrap(), "7");
    assert_eq!(interp.run("(define list? 1) list?").unwrap(), "1");
}

#[test]
fn quote_token_desugars() {
    let mut interp = Interpreter::new();
    assert_eq!(interp.run("'foo").unwrap(), "foo");
}

#[test]
fn unknown_character_is_a_syntax_error() {
    let mut interp = Interpreter::new();
    assert!(matches!(interp.run("@"), Err(InterpError::Syntax(_))));
}

#[test]
fn whitespace_is_insignificant_between_tokens() {
    let mut interp = Interpreter::new();
    assert_eq!(interp.run("(+\n  1\t2\r\n  3)").unwrap(), "6");
}
