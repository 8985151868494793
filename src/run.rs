use ahash::AHashSet;

use crate::builtins;
use crate::error::InterpError;
use crate::heap::{Arena, ArenaStats, Expr};
use crate::parse::Parser;
use crate::scope::Scope;
use crate::value::{BuiltinProcedure, ObjectData, Procedure};

/// The embedder-facing handle: an arena, a global scope pre-populated with
/// the built-in registry, and the `Run` orchestration described in the
/// component design.
pub struct Interpreter {
    pub(crate) arena: Arena,
    pub(crate) global: Scope,
}

impl Interpreter {
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let global = Scope::new_global();
        for (name, id, arity) in builtins::REGISTRY.iter().copied() {
            let proc = ObjectData::Procedure(Procedure::Builtin(BuiltinProcedure { id, arity }));
            global.define_fresh(&mut arena, name, proc).expect("built-in names must be unique");
        }
        Self { arena, global }
    }

    /// Tokenizes and parses `source` into top-level expressions, evaluates
    /// each in turn against the global scope, and returns the printable
    /// representation of the last one (empty string if `source` held no
    /// expressions). Triggers a mark-and-sweep collection at the start of
    /// the call and again before each top-level expression.
    pub fn run(&mut self, source: &str) -> Result<String, InterpError> {
        self.collect(&[]);

        let mut parser = Parser::new(source)?;
        let mut expressions = Vec::new();
        while let Some(expr) = parser.read_top_level(&mut self.arena)? {
            expressions.push(expr);
        }

        let mut last = String::new();
        let global = self.global.clone();
        for i in 0..expressions.len() {
            self.collect(&expressions[i..]);
            let value = self.eval_expr(expressions[i], &global)?;
            last = self.repr_expr(value);
        }
        Ok(last)
    }

    /// A read-only snapshot of the arena's current occupancy.
    pub fn arena_stats(&self) -> ArenaStats {
        self.arena.stats()
    }

    /// Collection rooted at the global scope's reachable set, unioned with
    /// every not-yet-evaluated top-level expression's AST root. All of
    /// `source`'s expressions are parsed (and thus allocated) up front, so
    /// a collection between two of them must keep every expression still
    /// awaiting evaluation alive, not just the one about to run next.
    /// Called only at the safe points `Run` defines: the start of a call
    /// and between top-level expressions.
    fn collect(&mut self, remaining: &[Expr]) {
        let mut roots: AHashSet<_> = AHashSet::default();
        self.global.gather_roots(&self.arena, &mut roots);
        for expr in remaining {
            if let Some(handle) = expr {
                self.arena.gather(*handle, &mut roots);
            }
        }
        self.arena.collect(&roots);
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
