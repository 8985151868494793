//! A tree-walking interpreter for a small Scheme-like dialect.
//!
//! ```
//! use lispy::Interpreter;
//!
//! let mut interpreter = Interpreter::new();
//! let output = interpreter.run("(+ 1 2 3)").unwrap();
//! assert_eq!(output, "6");
//! ```
//!
//! The embedder-visible contract is a single `Interpreter::run(source)`
//! call returning the printable representation of the last top-level
//! expression's value. Internally a source string is tokenized (a small
//! DFA, [`token`]), parsed into a cons-cell AST ([`parse`]), and evaluated
//! ([`eval`]) against a lexically scoped environment ([`scope`]) populated
//! with a fixed registry of built-in procedures ([`builtins`]). Every value
//! is an arena-resident object ([`heap`], [`value`]) reclaimed by an
//! explicit mark-and-sweep collection triggered between top-level
//! expressions.

mod builtins;
mod error;
mod eval;
mod heap;
mod parse;
mod run;
mod scope;
mod token;
mod value;

pub use error::InterpError;
pub use heap::ArenaStats;
pub use run::Interpreter;
