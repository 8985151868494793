use std::iter::Peekable;
use std::str::Chars;

use crate::error::InterpError;

/// The closed set of lexical tokens this dialect's grammar is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Open,
    Close,
    Dot,
    Quote,
    Symbol(String),
    Constant(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Root,
    OpenPar,
    ClosePar,
    Dot,
    Quote,
    Plus,
    Minus,
    Symbol,
    Constant,
}

fn is_symbol_start(c: char) -> bool {
    c.is_ascii_alphabetic() || "*#<>=/".contains(c)
}

fn is_symbol_mid(c: char) -> bool {
    c.is_ascii_alphanumeric() || "*#<>=?!-/".contains(c)
}

/// A small DFA tokenizer driven character-by-character from an input string.
pub struct Tokenizer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { chars: source.chars().peekable() }
    }

    fn transition(&self, state: State, c: char) -> Option<State> {
        match state {
            State::Root => match c {
                '(' => Some(State::OpenPar),
                ')' => Some(State::ClosePar),
                '.' => Some(State::Dot),
                '\'' => Some(State::Quote),
                '+' => Some(State::Plus),
                '-' => Some(State::Minus),
                d if d.is_ascii_digit() => Some(State::Constant),
                s if is_symbol_start(s) => Some(State::Symbol),
                _ => None,
            },
            State::Plus | State::Minus => c.is_ascii_digit().then_some(State::Constant),
            State::Constant => c.is_ascii_digit().then_some(State::Constant),
            State::Symbol => is_symbol_mid(c).then_some(State::Symbol),
            State::OpenPar | State::ClosePar | State::Dot | State::Quote => None,
        }
    }

    fn flush(&self, state: State, lexeme: &str) -> Result<Token, InterpError> {
        if lexeme.is_empty() {
            return Err(InterpError::syntax("flushed an empty lexeme"));
        }
        match state {
            State::OpenPar => Ok(Token::Open),
            State::ClosePar => Ok(Token::Close),
            State::Dot => Ok(Token::Dot),
            State::Quote => Ok(Token::Quote),
            State::Plus | State::Minus | State::Symbol => Ok(Token::Symbol(lexeme.to_string())),
            State::Constant => lexeme
                .parse::<i64>()
                .map(Token::Constant)
                .map_err(|_| InterpError::syntax(format!("malformed integer literal '{lexeme}'"))),
            State::Root => Err(InterpError::syntax("no token accumulated")),
        }
    }

    /// Advance the DFA and return the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>, InterpError> {
        let mut state = State::Root;
        let mut lexeme = String::new();
        loop {
            match self.chars.peek().copied() {
                None => {
                    if lexeme.is_empty() {
                        return Ok(None);
                    }
                    return self.flush(state, &lexeme).map(Some);
                }
                Some(c) => {
                    if state == State::Root && c.is_whitespace() {
                        self.chars.next();
                        continue;
                    }
                    match self.transition(state, c) {
                        Some(next_state) => {
                            self.chars.next();
                            lexeme.push(c);
                            let terminal = matches!(
                                next_state,
                                State::OpenPar | State::ClosePar | State::Dot | State::Quote
                            );
                            state = next_state;
                            if terminal {
                                return self.flush(state, &lexeme).map(Some);
                            }
                        }
                        None => {
                            if lexeme.is_empty() {
                                return Err(InterpError::syntax(format!("unexpected character '{c}'")));
                            }
                            return self.flush(state, &lexeme).map(Some);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(src: &str) -> Vec<Token> {
        let mut tokenizer = Tokenizer::new(src);
        let mut out = Vec::new();
        while let Some(tok) = tokenizer.next_token().unwrap() {
            out.push(tok);
        }
        out
    }

    #[test]
    fn single_char_tokens() {
        assert_eq!(tokens("("), vec![Token::Open]);
        assert_eq!(tokens(")"), vec![Token::Close]);
        assert_eq!(tokens("."), vec![Token::Dot]);
        assert_eq!(tokens("'"), vec![Token::Quote]);
    }

    #[test]
    fn signed_constant_vs_symbol() {
        assert_eq!(tokens("+"), vec![Token::Symbol("+".to_string())]);
        assert_eq!(tokens("-5"), vec![Token::Constant(-5)]);
        assert_eq!(tokens("+5"), vec![Token::Constant(5)]);
    }

    #[test]
    fn rejects_unknown_character() {
        assert!(Tokenizer::new("@").next_token().is_err());
    }
}
