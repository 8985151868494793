use ahash::{AHashMap, AHashSet};

use crate::error::InterpError;
use crate::heap::{Expr, ObjectHandle};
use crate::run::Interpreter;
use crate::scope::Scope;
use crate::value::{Arity, ObjectData, Procedure, ScopedProcedure};

/// Turns a parsed AST node that must not be nil into its handle, reporting
/// a syntax error (rather than the generic "cannot evaluate nil" runtime
/// error) since this is always a shape violation in a special form.
pub(crate) fn require_ast(expr: Expr, what: &str) -> Result<ObjectHandle, InterpError> {
    expr.ok_or_else(|| InterpError::syntax(format!("{what} cannot be nil")))
}

impl Interpreter {
    /// Atomic dispatch plus the combination protocol: the whole of
    /// `Evaluate`.
    pub(crate) fn eval_expr(&mut self, expr: Expr, scope: &Scope) -> Result<Expr, InterpError> {
        let handle = expr.ok_or_else(|| InterpError::runtime("cannot evaluate nil"))?;
        match self.arena.get(handle) {
            ObjectData::Number(_) | ObjectData::Boolean(_) | ObjectData::Procedure(_) => Ok(Some(handle)),
            ObjectData::Symbol(name) => {
                let name = name.clone();
                if name == "#t" {
                    return Ok(Some(scope.alloc_service(&mut self.arena, ObjectData::Boolean(true))));
                }
                if name == "#f" {
                    return Ok(Some(scope.alloc_service(&mut self.arena, ObjectData::Boolean(false))));
                }
                match scope.lookup(&name) {
                    Some(value) => Ok(value),
                    None => Err(InterpError::name(format!("unbound variable: {name}"))),
                }
            }
            ObjectData::Cell { first, second } => {
                let (operator, tail) = (*first, *second);
                self.eval_combination(operator, tail, scope)
            }
        }
    }

    fn eval_combination(&mut self, operator: Expr, tail: Expr, scope: &Scope) -> Result<Expr, InterpError> {
        let operator_handle = operator.ok_or_else(|| InterpError::runtime("cannot apply nil"))?;
        let proc_handle = match self.arena.get(operator_handle) {
            ObjectData::Symbol(name) => {
                let name = name.clone();
                let bound =
                    scope.lookup(&name).ok_or_else(|| InterpError::name(format!("unbound variable: {name}")))?;
                let bound = bound.ok_or_else(|| InterpError::runtime(format!("cannot apply nil ('{name}')")))?;
                self.require_procedure(bound)?
            }
            _ => {
                let evaluated = self.eval_expr(Some(operator_handle), scope)?;
                let handle = evaluated.ok_or_else(|| InterpError::runtime("cannot apply nil"))?;
                self.require_procedure(handle)?
            }
        };
        let args = self.normalize_args(tail);
        self.apply(proc_handle, args, scope)
    }

    /// Step 2 of the combination protocol: nil tail is an empty argument
    /// list; a cell tail is used as-is; any other atom is auto-wrapped
    /// into a one-element proper list.
    fn normalize_args(&mut self, tail: Expr) -> Expr {
        match tail {
            None => None,
            Some(handle) => match self.arena.get(handle) {
                ObjectData::Cell { .. } => Some(handle),
                _ => Some(self.arena.allocate(ObjectData::Cell { first: Some(handle), second: None })),
            },
        }
    }

    fn apply(&mut self, proc_handle: ObjectHandle, args: Expr, scope: &Scope) -> Result<Expr, InterpError> {
        let (arity, is_builtin) = match self.arena.get(proc_handle) {
            ObjectData::Procedure(Procedure::Builtin(b)) => (b.arity, Some(b.id)),
            ObjectData::Procedure(Procedure::Scoped(s)) => (Arity::Exact(s.params.len()), None),
            _ => unreachable!("require_procedure guarantees a Procedure"),
        };
        if let Arity::Exact(expected) = arity {
            let got = self.arg_list(args)?.len();
            if got != expected {
                return Err(InterpError::runtime(format!("procedure expects {expected} argument(s), got {got}")));
            }
        }
        match is_builtin {
            Some(id) => self.call_builtin(id, scope, args),
            None => self.call_scoped(proc_handle, args, scope),
        }
    }

    fn call_scoped(&mut self, proc_handle: ObjectHandle, args: Expr, caller_scope: &Scope) -> Result<Expr, InterpError> {
        let (params, body, captures) = match self.arena.get(proc_handle) {
            ObjectData::Procedure(Procedure::Scoped(s)) => (s.params.clone(), s.body.clone(), s.captures.clone()),
            _ => unreachable!("apply only calls call_scoped for ScopedProcedure"),
        };

        let call_scope = Scope::child(caller_scope);
        let raw_args = self.arg_list(args)?;
        for (param, raw) in params.iter().zip(raw_args) {
            let evaluated = self.eval_expr(raw, caller_scope)?;
            let copied = self.copy_expr(evaluated, &call_scope)?;
            call_scope.bind(param.clone(), copied);
        }
        for (name, value) in captures.iter() {
            call_scope.bind(name.clone(), *value);
        }

        let mut result: Expr = None;
        for body_expr in &body {
            result = self.eval_expr(Some(*body_expr), &call_scope)?;
        }

        // Teardown: re-read every captured name from the call scope and
        // write the fresh binding back into the procedure's capture map,
        // so `set!` on a closed-over variable survives across calls.
        let mut writebacks = Vec::new();
        for name in captures.keys() {
            if let Some(value) = call_scope.lookup_local(name) {
                writebacks.push((name.clone(), value));
            }
        }
        if let ObjectData::Procedure(Procedure::Scoped(s)) = self.arena.get_mut(proc_handle) {
            for (name, value) in writebacks {
                s.captures.insert(name, value);
            }
        }

        Ok(result)
    }

    pub(crate) fn require_procedure(&self, handle: ObjectHandle) -> Result<ObjectHandle, InterpError> {
        match self.arena.get(handle) {
            ObjectData::Procedure(_) => Ok(handle),
            _ => Err(InterpError::runtime("cannot call a non-procedure")),
        }
    }

    pub(crate) fn require_value(&self, expr: Expr, what: &str) -> Result<ObjectHandle, InterpError> {
        expr.ok_or_else(|| InterpError::runtime(format!("{what}: expected a value, found nil")))
    }

    pub(crate) fn as_number(&self, handle: ObjectHandle) -> Result<i64, InterpError> {
        match self.arena.get(handle) {
            ObjectData::Number(n) => Ok(*n),
            _ => Err(InterpError::runtime("expected a number")),
        }
    }

    pub(crate) fn as_boolean(&self, handle: ObjectHandle) -> Result<bool, InterpError> {
        match self.arena.get(handle) {
            ObjectData::Boolean(b) => Ok(*b),
            _ => Err(InterpError::runtime("expected a boolean")),
        }
    }

    pub(crate) fn as_cell(&self, handle: ObjectHandle) -> Result<(Expr, Expr), InterpError> {
        match self.arena.get(handle) {
            ObjectData::Cell { first, second } => Ok((*first, *second)),
            _ => Err(InterpError::runtime("expected a pair")),
        }
    }

    pub(crate) fn as_symbol_name(&self, handle: ObjectHandle) -> Result<String, InterpError> {
        match self.arena.get(handle) {
            ObjectData::Symbol(s) => Ok(s.clone()),
            _ => Err(InterpError::runtime("expected a symbol")),
        }
    }

    pub(crate) fn is_builtin(&self, handle: ObjectHandle) -> bool {
        matches!(self.arena.get(handle), ObjectData::Procedure(Procedure::Builtin(_)))
    }

    /// Walks a (proper) argument-list cons chain into a `Vec`, leaving nil
    /// entries as `None` — raw arguments may themselves be nil (e.g. a
    /// quoted empty list), which is a legitimate value, not an error.
    pub(crate) fn arg_list(&self, args: Expr) -> Result<Vec<Expr>, InterpError> {
        let mut out = Vec::new();
        let mut cur = args;
        loop {
            match cur {
                None => break,
                Some(handle) => match self.arena.get(handle) {
                    ObjectData::Cell { first, second } => {
                        out.push(*first);
                        cur = *second;
                    }
                    _ => return Err(InterpError::runtime("malformed argument list")),
                },
            }
        }
        Ok(out)
    }

    pub(crate) fn eval_args(&mut self, args: Expr, scope: &Scope) -> Result<Vec<Expr>, InterpError> {
        let raw = self.arg_list(args)?;
        let mut out = Vec::with_capacity(raw.len());
        for expr in raw {
            out.push(self.eval_expr(expr, scope)?);
        }
        Ok(out)
    }

    fn symbol_list(&self, expr: Expr) -> Result<Vec<String>, InterpError> {
        let mut out = Vec::new();
        let mut cur = expr;
        loop {
            match cur {
                None => break,
                Some(handle) => match self.arena.get(handle) {
                    ObjectData::Cell { first, second } => {
                        let name = self.as_symbol_name(
                            first.ok_or_else(|| InterpError::syntax("parameter list element cannot be nil"))?,
                        )?;
                        out.push(name);
                        cur = *second;
                    }
                    _ => return Err(InterpError::syntax("malformed parameter list")),
                },
            }
        }
        Ok(out)
    }

    /// `Copy(obj, scope)`.
    pub(crate) fn copy_expr(&mut self, expr: Expr, scope: &Scope) -> Result<Expr, InterpError> {
        match expr {
            None => Ok(None),
            Some(handle) => self.copy_handle(handle, scope).map(Some),
        }
    }

    fn copy_handle(&mut self, handle: ObjectHandle, scope: &Scope) -> Result<ObjectHandle, InterpError> {
        match self.arena.get(handle) {
            ObjectData::Number(n) => {
                let n = *n;
                Ok(scope.alloc_service(&mut self.arena, ObjectData::Number(n)))
            }
            ObjectData::Boolean(b) => {
                let b = *b;
                Ok(scope.alloc_service(&mut self.arena, ObjectData::Boolean(b)))
            }
            ObjectData::Symbol(s) => {
                let s = s.clone();
                Ok(scope.alloc_service(&mut self.arena, ObjectData::Symbol(s)))
            }
            ObjectData::Cell { first, second } => {
                let (first, second) = (*first, *second);
                let first = self.copy_expr(first, scope)?;
                let second = self.copy_expr(second, scope)?;
                Ok(scope.alloc_service(&mut self.arena, ObjectData::Cell { first, second }))
            }
            ObjectData::Procedure(Procedure::Scoped(p)) => {
                let p = p.clone();
                Ok(scope.alloc_service(&mut self.arena, ObjectData::Procedure(Procedure::Scoped(p))))
            }
            ObjectData::Procedure(Procedure::Builtin(_)) => {
                Err(InterpError::runtime("cannot copy a built-in procedure"))
            }
        }
    }

    /// Printable representation, following Scheme's standard list
    /// rendering.
    pub(crate) fn repr_expr(&self, expr: Expr) -> String {
        match expr {
            None => "()".to_string(),
            Some(handle) => self.repr_handle(handle),
        }
    }

    fn repr_handle(&self, handle: ObjectHandle) -> String {
        match self.arena.get(handle) {
            ObjectData::Number(n) => n.to_string(),
            ObjectData::Boolean(true) => "#t".to_string(),
            ObjectData::Boolean(false) => "#f".to_string(),
            ObjectData::Symbol(s) => s.clone(),
            ObjectData::Procedure(_) => "function".to_string(),
            ObjectData::Cell { first, second } => self.repr_cell(*first, *second),
        }
    }

    fn repr_cell(&self, first: Expr, second: Expr) -> String {
        let mut out = String::from("(");
        out.push_str(&self.repr_expr(first));
        let mut cur = second;
        loop {
            match cur {
                None => {
                    out.push(')');
                    break;
                }
                Some(handle) => match self.arena.get(handle) {
                    ObjectData::Cell { first: f2, second: s2 } => {
                        out.push(' ');
                        out.push_str(&self.repr_expr(*f2));
                        cur = *s2;
                    }
                    _ => {
                        out.push_str(" . ");
                        out.push_str(&self.repr_handle(handle));
                        out.push(')');
                        break;
                    }
                },
            }
        }
        out
    }

    /// Builds a `ScopedProcedure` from a parameter-list expression and a
    /// set of body AST roots, running the static capture analysis from
    /// `lambda`/`define`'s function-sugar form.
    pub(crate) fn build_lambda(
        &mut self,
        params_expr: Expr,
        body: Vec<ObjectHandle>,
        scope: &Scope,
    ) -> Result<ObjectHandle, InterpError> {
        let params = self.symbol_list(params_expr)?;
        let param_set: AHashSet<String> = params.iter().cloned().collect();
        let locally_defined = self.collect_locally_defined(&body);

        let mut captures: AHashMap<String, Expr> = AHashMap::default();
        for body_expr in &body {
            self.collect_free_vars(*body_expr, &param_set, &locally_defined, scope, &mut captures);
        }

        let proc = ObjectData::Procedure(Procedure::Scoped(ScopedProcedure { params, body, captures }));
        Ok(scope.alloc_service(&mut self.arena, proc))
    }

    fn collect_locally_defined(&self, body: &[ObjectHandle]) -> AHashSet<String> {
        let mut names = AHashSet::default();
        for expr in body {
            if let ObjectData::Cell { first: Some(head), second } = self.arena.get(*expr) {
                if matches!(self.arena.get(*head), ObjectData::Symbol(s) if s == "define") {
                    if let Some(Ok((first, _))) = second.map(|h| self.as_cell(h)) {
                        if let Some(name) = first.and_then(|h| self.define_target_name(h)) {
                            names.insert(name);
                        }
                    }
                }
            }
        }
        names
    }

    fn define_target_name(&self, handle: ObjectHandle) -> Option<String> {
        match self.arena.get(handle) {
            ObjectData::Symbol(s) => Some(s.clone()),
            ObjectData::Cell { first: Some(name_handle), .. } => match self.arena.get(*name_handle) {
                ObjectData::Symbol(s) => Some(s.clone()),
                _ => None,
            },
            _ => None,
        }
    }

    fn collect_free_vars(
        &self,
        handle: ObjectHandle,
        params: &AHashSet<String>,
        locally_defined: &AHashSet<String>,
        scope: &Scope,
        captured: &mut AHashMap<String, Expr>,
    ) {
        match self.arena.get(handle) {
            ObjectData::Symbol(name) => {
                if name == "#t" || name == "#f" {
                    return;
                }
                if captured.contains_key(name) || params.contains(name) || locally_defined.contains(name) {
                    return;
                }
                if let Some(value) = scope.lookup(name) {
                    let is_builtin = matches!(value, Some(h) if self.is_builtin(h));
                    if !is_builtin {
                        captured.insert(name.clone(), value);
                    }
                }
            }
            ObjectData::Cell { first, second } => {
                if let Some(h) = first {
                    self.collect_free_vars(*h, params, locally_defined, scope, captured);
                }
                if let Some(h) = second {
                    self.collect_free_vars(*h, params, locally_defined, scope, captured);
                }
            }
            ObjectData::Number(_) | ObjectData::Boolean(_) | ObjectData::Procedure(_) => {}
        }
    }
}
