//! Exercises the parser's cons-tree shape and error cases through the
//! public interface. `(a b c)` must build the same right-nested cell chain
//! as `(a . (b . (c . ())))`, and `(a b . c)` must build the corresponding
//! dotted chain.

use lispy::{Interpreter, InterpError};

#[test]
fn proper_list_matches_its_desugared_dotted_form() {
    let mut a = Interpreter::new();
    let mut b = Interpreter::new();
    assert_eq!(a.run("'(1 2 3)").unwrap(), b.run("'(1 . (2 . (3 . ())))").unwrap());
    assert_eq!(a.run("'(1 2 3)").unwrap(), "(1 2 3)");
}

#[test]
fn dotted_pair_prints_with_a_dot() {
    let mut interp = Interpreter::new();
    assert_eq!(interp.run("'(1 2 . 3)").unwrap(), "(1 2 . 3)");
    assert_eq!(interp.run("(cons 1 2)").unwrap(), "(1 . 2)");
}

#[test]
fn empty_list_prints_as_parens() {
    let mut interp = Interpreter::new();
    assert_eq!(interp.run("'()").unwrap(), "()");
}

#[test]
fn leading_dot_is_a_syntax_error() {
    let mut interp = Interpreter::new();
    assert!(matches!(interp.run("(. 1 2)"), Err(InterpError::Syntax(_))));
}

#[test]
fn repeated_dot_is_a_syntax_error() {
    let mut interp = Interpreter::new();
    assert!(matches!(interp.run("(1 . 2 . 3)"), Err(InterpError::Syntax(_))));
}

#[test]
fn dot_with_no_successor_is_a_syntax_error() {
    let mut interp = Interpreter::new();
    assert!(matches!(interp.run("(1 .)"), Err(InterpError::Syntax(_))));
}

#[test]
fn unterminated_list_is_a_syntax_error() {
    let mut interp = Interpreter::new();
    assert!(matches!(interp.run("(1 2"), Err(InterpError::Syntax(_))));
}

#[test]
fn unbalanced_close_paren_is_a_syntax_error() {
    let mut interp = Interpreter::new();
    assert!(matches!(interp.run(")"), Err(InterpError::Syntax(_))));
}
