//! Self-evaluation, copy isolation, closures, closure mutation, and
//! short-circuiting — the core evaluator behaviors this interpreter is
//! actually about.

use lispy::{Interpreter, InterpError};

#[test]
fn numbers_and_booleans_self_evaluate() {
    let mut interp = Interpreter::new();
    assert_eq!(interp.run("42").unwrap(), "42");
    assert_eq!(interp.run("-1").unwrap(), "-1");
    assert_eq!(interp.run("#t").unwrap(), "#t");
    assert_eq!(interp.run("#f").unwrap(), "#f");
}

#[test]
fn copy_isolation_on_define() {
    let mut interp = Interpreter::new();
    let output = interp.run("(define x 1) (define y x) (set! x 2) y").unwrap();
    assert_eq!(output, "1");
}

#[test]
fn closure_captures_its_defining_binding() {
    let mut interp = Interpreter::new();
    let output = interp.run("(define f (lambda (x) (lambda () x))) (define g (f 42)) (g)").unwrap();
    assert_eq!(output, "42");
}

#[test]
fn closure_mutation_persists_across_calls() {
    let mut interp = Interpreter::new();
    interp
        .run("(define c (lambda () (define n 0) (lambda () (set! n (+ n 1)) n))) (define k (c))")
        .unwrap();
    assert_eq!(interp.run("(k)").unwrap(), "1");
    assert_eq!(interp.run("(k)").unwrap(), "2");
    assert_eq!(interp.run("(k)").unwrap(), "3");
}

#[test]
fn and_short_circuits_on_first_false() {
    let mut interp = Interpreter::new();
    assert_eq!(interp.run("(and 1 #f (undefined-symbol))").unwrap(), "#f");
}

#[test]
fn or_short_circuits_on_first_truthy() {
    let mut interp = Interpreter::new();
    assert_eq!(interp.run("(or 1 (undefined-symbol))").unwrap(), "1");
}

#[test]
fn and_with_no_args_is_true() {
    let mut interp = Interpreter::new();
    assert_eq!(interp.run("(and)").unwrap(), "#t");
}

#[test]
fn or_with_no_args_is_false() {
    let mut interp = Interpreter::new();
    assert_eq!(interp.run("(or)").unwrap(), "#f");
}

#[test]
fn if_without_alternative_yields_nil() {
    let mut interp = Interpreter::new();
    assert_eq!(interp.run("(if #f 1)").unwrap(), "()");
}

#[test]
fn if_requires_a_boolean_test() {
    let mut interp = Interpreter::new();
    assert!(matches!(interp.run("(if 1 2 3)"), Err(InterpError::Runtime(_))));
}

#[test]
fn if_arity_violation_is_syntax_error() {
    let mut interp = Interpreter::new();
    assert!(matches!(interp.run("(if 1)"), Err(InterpError::Syntax(_))));
    assert!(matches!(interp.run("(if 1 2 3 4)"), Err(InterpError::Syntax(_))));
}

#[test]
fn unbound_symbol_is_a_name_error() {
    let mut interp = Interpreter::new();
    assert!(matches!(interp.run("undefined-thing"), Err(InterpError::Name(_))));
}

#[test]
fn set_of_unbound_name_is_a_name_error() {
    let mut interp = Interpreter::new();
    assert!(matches!(interp.run("(set! undefined-thing 1)"), Err(InterpError::Name(_))));
}

#[test]
fn calling_a_non_procedure_is_a_runtime_error() {
    let mut interp = Interpreter::new();
    assert!(matches!(interp.run("(1 2)"), Err(InterpError::Runtime(_))));
}

#[test]
fn bare_atom_tail_auto_wraps_as_unary_call() {
    let mut interp = Interpreter::new();
    // `(not . #f)` has a non-cell tail, auto-wrapped into a one-element
    // argument list equivalent to `(not #f)`.
    assert_eq!(interp.run("(not . #f)").unwrap(), "#t");
}

#[test]
fn function_define_sugar() {
    let mut interp = Interpreter::new();
    let output = interp.run("(define (square x) (* x x)) (square 6)").unwrap();
    assert_eq!(output, "36");
}

#[test]
fn procedures_print_as_function() {
    let mut interp = Interpreter::new();
    assert_eq!(interp.run("(lambda (x) x)").unwrap(), "function");
}
