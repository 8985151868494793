use crate::error::InterpError;
use crate::heap::{Arena, Expr};
use crate::token::{Token, Tokenizer};
use crate::value::ObjectData;

/// Recursive-descent consumer of the token stream, producing an Object
/// tree. Holds no ownership over anything it parses: every cell and leaf
/// is registered in the arena on creation.
pub struct Parser<'a> {
    tokenizer: Tokenizer<'a>,
    current: Option<Token>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Result<Self, InterpError> {
        let mut tokenizer = Tokenizer::new(source);
        let current = tokenizer.next_token()?;
        Ok(Self { tokenizer, current })
    }

    fn advance(&mut self) -> Result<(), InterpError> {
        self.current = self.tokenizer.next_token()?;
        Ok(())
    }

    /// Reads one top-level expression, or `None` once the source is
    /// exhausted.
    pub fn read_top_level(&mut self, arena: &mut Arena) -> Result<Option<Expr>, InterpError> {
        if self.current.is_none() {
            return Ok(None);
        }
        self.read(arena).map(Some)
    }

    fn read(&mut self, arena: &mut Arena) -> Result<Expr, InterpError> {
        match self.current.clone() {
            Some(Token::Constant(n)) => {
                self.advance()?;
                Ok(Some(arena.allocate(ObjectData::Number(n))))
            }
            Some(Token::Symbol(name)) => {
                self.advance()?;
                Ok(Some(arena.allocate(ObjectData::Symbol(name))))
            }
            Some(Token::Quote) => {
                self.advance()?;
                let quoted = self.read(arena)?;
                let sym = arena.allocate(ObjectData::Symbol("quote".to_string()));
                let inner = arena.allocate(ObjectData::Cell { first: quoted, second: None });
                Ok(Some(arena.allocate(ObjectData::Cell { first: Some(sym), second: Some(inner) })))
            }
            Some(Token::Open) => self.read_list(arena),
            Some(Token::Close) => Err(InterpError::syntax("unexpected ')'")),
            Some(Token::Dot) => Err(InterpError::syntax("unexpected '.'")),
            None => Err(InterpError::syntax("unexpected end of input")),
        }
    }

    fn read_list(&mut self, arena: &mut Arena) -> Result<Expr, InterpError> {
        self.advance()?; // consume '('

        if matches!(self.current, Some(Token::Close)) {
            self.advance()?;
            return Ok(None);
        }
        if matches!(self.current, Some(Token::Dot)) {
            return Err(InterpError::syntax("dot in first position of a list"));
        }

        let head = arena.allocate(ObjectData::Cell { first: None, second: None });
        let first_elem = self.read(arena)?;
        if let ObjectData::Cell { first, .. } = arena.get_mut(head) {
            *first = first_elem;
        }

        let mut tail = head;
        loop {
            match self.current {
                Some(Token::Close) => {
                    self.advance()?;
                    break;
                }
                Some(Token::Dot) => {
                    self.advance()?;
                    if matches!(self.current, Some(Token::Dot)) {
                        return Err(InterpError::syntax("more than one dot in a list"));
                    }
                    if matches!(self.current, Some(Token::Close) | None) {
                        return Err(InterpError::syntax("dot with no successor"));
                    }
                    let improper_tail = self.read(arena)?;
                    if let ObjectData::Cell { second, .. } = arena.get_mut(tail) {
                        *second = improper_tail;
                    }
                    if !matches!(self.current, Some(Token::Close)) {
                        return Err(InterpError::syntax("expected ')' after dotted tail"));
                    }
                    self.advance()?;
                    break;
                }
                None => return Err(InterpError::syntax("unexpected end of input inside list")),
                _ => {
                    let elem = self.read(arena)?;
                    let next = arena.allocate(ObjectData::Cell { first: elem, second: None });
                    if let ObjectData::Cell { second, .. } = arena.get_mut(tail) {
                        *second = Some(next);
                    }
                    tail = next;
                }
            }
        }

        Ok(Some(head))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(src: &str) -> (Arena, Expr) {
        let mut arena = Arena::new();
        let mut parser = Parser::new(src).unwrap();
        let expr = parser.read_top_level(&mut arena).unwrap().unwrap();
        (arena, expr)
    }

    #[test]
    fn proper_list_shape() {
        let (arena, expr) = parse_one("(a b c)");
        let h = expr.unwrap();
        match arena.get(h) {
            ObjectData::Cell { first, second } => {
                assert!(matches!(arena.get(first.unwrap()), ObjectData::Symbol(s) if s == "a"));
                let second = second.unwrap();
                match arena.get(second) {
                    ObjectData::Cell { first, second } => {
                        assert!(matches!(arena.get(first.unwrap()), ObjectData::Symbol(s) if s == "b"));
                        let third = second.unwrap();
                        match arena.get(third) {
                            ObjectData::Cell { first, second } => {
                                assert!(matches!(arena.get(first.unwrap()), ObjectData::Symbol(s) if s == "c"));
                                assert!(second.is_none());
                            }
                            _ => panic!("expected cell"),
                        }
                    }
                    _ => panic!("expected cell"),
                }
            }
            _ => panic!("expected cell"),
        }
    }

    #[test]
    fn dotted_pair_shape() {
        let (arena, expr) = parse_one("(a b . c)");
        let h = expr.unwrap();
        match arena.get(h) {
            ObjectData::Cell { second, .. } => match arena.get(second.unwrap()) {
                ObjectData::Cell { second, .. } => {
                    assert!(matches!(arena.get(second.unwrap()), ObjectData::Symbol(s) if s == "c"));
                }
                _ => panic!("expected cell"),
            },
            _ => panic!("expected cell"),
        }
    }

    #[test]
    fn rejects_leading_dot() {
        let mut arena = Arena::new();
        let mut parser = Parser::new("(. a)").unwrap();
        assert!(parser.read_top_level(&mut arena).is_err());
    }
}
