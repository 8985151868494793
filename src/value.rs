use ahash::AHashMap;

use crate::builtins::BuiltinId;
use crate::heap::{Expr, ObjectHandle};

/// A procedure's declared arity: either a fixed count (checked by the
/// combination protocol before `setup`) or variadic, in which case the
/// procedure body validates its own argument count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    Variadic,
}

/// A native special-form or function. No setup, no teardown; the procedure
/// itself decides which of its unevaluated arguments to evaluate and when —
/// this is what gives short-circuit `and`/`or`, lazy `if`, and `quote`.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinProcedure {
    pub id: BuiltinId,
    pub arity: Arity,
}

/// A user-defined lambda: parameter names, body expression AST roots, and a
/// capture map holding the closure's free variables as they stood at
/// construction time.
#[derive(Debug, Clone)]
pub struct ScopedProcedure {
    pub params: Vec<String>,
    pub body: Vec<ObjectHandle>,
    pub captures: AHashMap<String, Expr>,
}

#[derive(Debug, Clone)]
pub enum Procedure {
    Builtin(BuiltinProcedure),
    Scoped(ScopedProcedure),
}

/// The closed set of concrete Object variants. Every value reachable from a
/// scope or a cell is one of these.
#[derive(Debug, Clone)]
pub enum ObjectData {
    Number(i64),
    Boolean(bool),
    Symbol(String),
    Cell { first: Expr, second: Expr },
    Procedure(Procedure),
}
