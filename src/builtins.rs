use crate::error::InterpError;
use crate::eval::require_ast;
use crate::heap::Expr;
use crate::run::Interpreter;
use crate::scope::Scope;
use crate::value::{Arity, ObjectData};

/// Identity of a built-in procedure, resolved to a calling convention by
/// `Interpreter::call_builtin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinId {
    Quote,
    BooleanPred,
    Not,
    And,
    Or,
    NumberPred,
    SymbolPred,
    PairPred,
    NullPred,
    ListPred,
    NumEq,
    NumLt,
    NumGt,
    NumLe,
    NumGe,
    Add,
    Mul,
    Sub,
    Div,
    Min,
    Max,
    Abs,
    Cons,
    Car,
    Cdr,
    List,
    ListRef,
    ListTail,
    If,
    Define,
    SetBang,
    SetCar,
    SetCdr,
    Lambda,
}

/// The fixed, name-keyed registry installed into the global scope at
/// interpreter construction.
pub(crate) const REGISTRY: &[(&str, BuiltinId, Arity)] = &[
    ("quote", BuiltinId::Quote, Arity::Exact(1)),
    ("boolean?", BuiltinId::BooleanPred, Arity::Exact(1)),
    ("not", BuiltinId::Not, Arity::Exact(1)),
    ("and", BuiltinId::And, Arity::Variadic),
    ("or", BuiltinId::Or, Arity::Variadic),
    ("number?", BuiltinId::NumberPred, Arity::Exact(1)),
    ("symbol?", BuiltinId::SymbolPred, Arity::Exact(1)),
    ("pair?", BuiltinId::PairPred, Arity::Exact(1)),
    ("null?", BuiltinId::NullPred, Arity::Exact(1)),
    ("list?", BuiltinId::ListPred, Arity::Exact(1)),
    ("=", BuiltinId::NumEq, Arity::Variadic),
    ("<", BuiltinId::NumLt, Arity::Variadic),
    (">", BuiltinId::NumGt, Arity::Variadic),
    ("<=", BuiltinId::NumLe, Arity::Variadic),
    (">=", BuiltinId::NumGe, Arity::Variadic),
    ("+", BuiltinId::Add, Arity::Variadic),
    ("*", BuiltinId::Mul, Arity::Variadic),
    ("-", BuiltinId::Sub, Arity::Variadic),
    ("/", BuiltinId::Div, Arity::Variadic),
    ("min", BuiltinId::Min, Arity::Variadic),
    ("max", BuiltinId::Max, Arity::Variadic),
    ("abs", BuiltinId::Abs, Arity::Exact(1)),
    ("cons", BuiltinId::Cons, Arity::Exact(2)),
    ("car", BuiltinId::Car, Arity::Exact(1)),
    ("cdr", BuiltinId::Cdr, Arity::Exact(1)),
    ("list", BuiltinId::List, Arity::Variadic),
    ("list-ref", BuiltinId::ListRef, Arity::Exact(2)),
    ("list-tail", BuiltinId::ListTail, Arity::Exact(2)),
    ("if", BuiltinId::If, Arity::Variadic),
    ("define", BuiltinId::Define, Arity::Variadic),
    ("set!", BuiltinId::SetBang, Arity::Variadic),
    ("set-car!", BuiltinId::SetCar, Arity::Exact(2)),
    ("set-cdr!", BuiltinId::SetCdr, Arity::Exact(2)),
    ("lambda", BuiltinId::Lambda, Arity::Variadic),
];

fn is_false(interp: &Interpreter, expr: Expr) -> bool {
    matches!(expr, Some(h) if matches!(interp.arena.get(h), ObjectData::Boolean(false)))
}

impl Interpreter {
    pub(crate) fn call_builtin(&mut self, id: BuiltinId, scope: &Scope, args: Expr) -> Result<Expr, InterpError> {
        match id {
            BuiltinId::Quote => {
                let raw = self.arg_list(args)?;
                Ok(raw[0])
            }
            BuiltinId::BooleanPred => {
                let v = self.eval_args(args, scope)?[0];
                let b = matches!(v, Some(h) if matches!(self.arena.get(h), ObjectData::Boolean(_)));
                Ok(Some(scope.alloc_service(&mut self.arena, ObjectData::Boolean(b))))
            }
            BuiltinId::Not => {
                let v = self.eval_args(args, scope)?[0];
                Ok(Some(scope.alloc_service(&mut self.arena, ObjectData::Boolean(is_false(self, v)))))
            }
            BuiltinId::And => {
                let raw = self.arg_list(args)?;
                if raw.is_empty() {
                    return Ok(Some(scope.alloc_service(&mut self.arena, ObjectData::Boolean(true))));
                }
                let mut last = None;
                for expr in raw {
                    let value = self.eval_expr(expr, scope)?;
                    if is_false(self, value) {
                        return Ok(value);
                    }
                    last = value;
                }
                Ok(last)
            }
            BuiltinId::Or => {
                let raw = self.arg_list(args)?;
                if raw.is_empty() {
                    return Ok(Some(scope.alloc_service(&mut self.arena, ObjectData::Boolean(false))));
                }
                let mut last = None;
                for expr in raw {
                    let value = self.eval_expr(expr, scope)?;
                    if !is_false(self, value) {
                        return Ok(value);
                    }
                    last = value;
                }
                Ok(last)
            }
            BuiltinId::NumberPred => {
                let v = self.eval_args(args, scope)?[0];
                let b = matches!(v, Some(h) if matches!(self.arena.get(h), ObjectData::Number(_)));
                Ok(Some(scope.alloc_service(&mut self.arena, ObjectData::Boolean(b))))
            }
            BuiltinId::SymbolPred => {
                let v = self.eval_args(args, scope)?[0];
                let b = matches!(v, Some(h) if matches!(self.arena.get(h), ObjectData::Symbol(_)));
                Ok(Some(scope.alloc_service(&mut self.arena, ObjectData::Boolean(b))))
            }
            BuiltinId::PairPred => {
                let v = self.eval_args(args, scope)?[0];
                let b = matches!(v, Some(h) if matches!(self.arena.get(h), ObjectData::Cell { .. }));
                Ok(Some(scope.alloc_service(&mut self.arena, ObjectData::Boolean(b))))
            }
            BuiltinId::NullPred => {
                let v = self.eval_args(args, scope)?[0];
                Ok(Some(scope.alloc_service(&mut self.arena, ObjectData::Boolean(v.is_none()))))
            }
            BuiltinId::ListPred => {
                let v = self.eval_args(args, scope)?[0];
                Ok(Some(scope.alloc_service(&mut self.arena, ObjectData::Boolean(self.is_proper_list(v)))))
            }
            BuiltinId::NumEq | BuiltinId::NumLt | BuiltinId::NumGt | BuiltinId::NumLe | BuiltinId::NumGe => {
                let values = self.eval_args(args, scope)?;
                let mut numbers = Vec::with_capacity(values.len());
                for value in values {
                    numbers.push(self.as_number(self.require_value(value, "comparison")?)?);
                }
                let ok = numbers.windows(2).all(|pair| match id {
                    BuiltinId::NumEq => pair[0] == pair[1],
                    BuiltinId::NumLt => pair[0] < pair[1],
                    BuiltinId::NumGt => pair[0] > pair[1],
                    BuiltinId::NumLe => pair[0] <= pair[1],
                    BuiltinId::NumGe => pair[0] >= pair[1],
                    _ => unreachable!(),
                });
                Ok(Some(scope.alloc_service(&mut self.arena, ObjectData::Boolean(ok))))
            }
            BuiltinId::Add | BuiltinId::Mul => {
                let values = self.eval_args(args, scope)?;
                let mut acc: i64 = if id == BuiltinId::Add { 0 } else { 1 };
                for value in values {
                    let n = self.as_number(self.require_value(value, "arithmetic")?)?;
                    acc = if id == BuiltinId::Add { acc + n } else { acc * n };
                }
                Ok(Some(scope.alloc_service(&mut self.arena, ObjectData::Number(acc))))
            }
            BuiltinId::Sub | BuiltinId::Div => {
                let values = self.eval_args(args, scope)?;
                if values.is_empty() {
                    let name = if id == BuiltinId::Sub { "-" } else { "/" };
                    return Err(InterpError::runtime(format!("{name}: expected at least one argument")));
                }
                let mut numbers = Vec::with_capacity(values.len());
                for value in values {
                    numbers.push(self.as_number(self.require_value(value, "arithmetic")?)?);
                }
                let mut acc = numbers[0];
                for n in &numbers[1..] {
                    if id == BuiltinId::Sub {
                        acc -= n;
                    } else {
                        if *n == 0 {
                            return Err(InterpError::runtime("division by zero"));
                        }
                        acc /= n;
                    }
                }
                Ok(Some(scope.alloc_service(&mut self.arena, ObjectData::Number(acc))))
            }
            BuiltinId::Min | BuiltinId::Max => {
                let values = self.eval_args(args, scope)?;
                if values.is_empty() {
                    let name = if id == BuiltinId::Min { "min" } else { "max" };
                    return Err(InterpError::runtime(format!("{name}: expected at least one argument")));
                }
                let mut numbers = Vec::with_capacity(values.len());
                for value in values {
                    numbers.push(self.as_number(self.require_value(value, "min/max")?)?);
                }
                let result = if id == BuiltinId::Min {
                    numbers.into_iter().min().unwrap()
                } else {
                    numbers.into_iter().max().unwrap()
                };
                Ok(Some(scope.alloc_service(&mut self.arena, ObjectData::Number(result))))
            }
            BuiltinId::Abs => {
                let v = self.eval_args(args, scope)?[0];
                let n = self.as_number(self.require_value(v, "abs")?)?;
                Ok(Some(scope.alloc_service(&mut self.arena, ObjectData::Number(n.abs()))))
            }
            BuiltinId::Cons => {
                let values = self.eval_args(args, scope)?;
                let cell = ObjectData::Cell { first: values[0], second: values[1] };
                Ok(Some(scope.alloc_service(&mut self.arena, cell)))
            }
            BuiltinId::Car => {
                let v = self.eval_args(args, scope)?[0];
                let handle = self.require_value(v, "car")?;
                let (first, _) = self.as_cell(handle)?;
                Ok(first)
            }
            BuiltinId::Cdr => {
                let v = self.eval_args(args, scope)?[0];
                let handle = self.require_value(v, "cdr")?;
                let (_, second) = self.as_cell(handle)?;
                Ok(second)
            }
            BuiltinId::List => {
                let values = self.eval_args(args, scope)?;
                let mut acc: Expr = None;
                for value in values.into_iter().rev() {
                    acc = Some(scope.alloc_service(&mut self.arena, ObjectData::Cell { first: value, second: acc }));
                }
                Ok(acc)
            }
            BuiltinId::ListRef => {
                let values = self.eval_args(args, scope)?;
                let mut cur = values[0];
                let index = self.as_number(self.require_value(values[1], "list-ref")?)?;
                if index < 0 {
                    return Err(InterpError::runtime("list-ref: negative index"));
                }
                for _ in 0..index {
                    let handle = self.require_value(cur, "list-ref: index out of range")?;
                    cur = self.as_cell(handle)?.1;
                }
                let handle = self.require_value(cur, "list-ref: index out of range")?;
                Ok(self.as_cell(handle)?.0)
            }
            BuiltinId::ListTail => {
                let values = self.eval_args(args, scope)?;
                let mut cur = values[0];
                let index = self.as_number(self.require_value(values[1], "list-tail")?)?;
                if index < 0 {
                    return Err(InterpError::runtime("list-tail: negative index"));
                }
                for _ in 0..index {
                    let handle = self.require_value(cur, "list-tail: index out of range")?;
                    cur = self.as_cell(handle)?.1;
                }
                Ok(cur)
            }
            BuiltinId::If => self.builtin_if(scope, args),
            BuiltinId::Define => self.builtin_define(scope, args),
            BuiltinId::SetBang => self.builtin_set_bang(scope, args),
            BuiltinId::SetCar => self.builtin_set_car_cdr(scope, args, true),
            BuiltinId::SetCdr => self.builtin_set_car_cdr(scope, args, false),
            BuiltinId::Lambda => self.builtin_lambda(scope, args),
        }
    }

    fn is_proper_list(&self, expr: Expr) -> bool {
        let mut cur = expr;
        loop {
            match cur {
                None => return true,
                Some(h) => match self.arena.get(h) {
                    ObjectData::Cell { second, .. } => cur = *second,
                    _ => return false,
                },
            }
        }
    }

    fn builtin_if(&mut self, scope: &Scope, args: Expr) -> Result<Expr, InterpError> {
        let raw = self.arg_list(args)?;
        if raw.len() != 2 && raw.len() != 3 {
            return Err(InterpError::syntax("if: expected 2 or 3 arguments"));
        }
        let test = self.eval_expr(raw[0], scope)?;
        let test_handle = self.require_value(test, "if: test")?;
        let test_value = self.as_boolean(test_handle).map_err(|_| InterpError::runtime("if: test must be a boolean"))?;
        if test_value {
            self.eval_expr(raw[1], scope)
        } else if raw.len() == 3 {
            self.eval_expr(raw[2], scope)
        } else {
            Ok(None)
        }
    }

    fn builtin_define(&mut self, scope: &Scope, args: Expr) -> Result<Expr, InterpError> {
        let raw = self.arg_list(args)?;
        if raw.len() < 2 {
            return Err(InterpError::syntax("define: expected a target and at least one expression"));
        }
        let target = require_ast(raw[0], "define target")?;
        match self.arena.get(target) {
            ObjectData::Symbol(name) => {
                let name = name.clone();
                if raw.len() != 2 {
                    return Err(InterpError::syntax("define: simple form takes exactly one expression"));
                }
                let value = self.eval_expr(raw[1], scope)?;
                let copied = self.copy_expr(value, scope)?;
                scope.bind(name, copied);
                Ok(copied)
            }
            ObjectData::Cell { first, second } => {
                let name_handle = first.ok_or_else(|| InterpError::syntax("define: missing function name"))?;
                let name = self
                    .as_symbol_name(name_handle)
                    .map_err(|_| InterpError::syntax("define: function name must be a symbol"))?;
                let params_expr = *second;
                let mut body = Vec::with_capacity(raw.len() - 1);
                for expr in &raw[1..] {
                    body.push(require_ast(*expr, "define body expression")?);
                }
                let handle = self.build_lambda(params_expr, body, scope)?;
                scope.bind(name, Some(handle));
                Ok(Some(handle))
            }
            _ => Err(InterpError::syntax("define: malformed target")),
        }
    }

    fn builtin_set_bang(&mut self, scope: &Scope, args: Expr) -> Result<Expr, InterpError> {
        let raw = self.arg_list(args)?;
        if raw.len() != 2 {
            return Err(InterpError::syntax("set!: expected exactly 2 arguments"));
        }
        let name_handle = require_ast(raw[0], "set! target")?;
        let name = self.as_symbol_name(name_handle).map_err(|_| InterpError::syntax("set!: target must be a symbol"))?;
        if scope.lookup(&name).is_none() {
            return Err(InterpError::name(format!("unbound variable: {name}")));
        }
        let value = self.eval_expr(raw[1], scope)?;
        let copied = self.copy_expr(value, scope)?;
        scope.bind(name, copied);
        Ok(copied)
    }

    fn builtin_set_car_cdr(&mut self, scope: &Scope, args: Expr, is_car: bool) -> Result<Expr, InterpError> {
        let raw = self.arg_list(args)?;
        let cell_value = self.eval_expr(raw[0], scope)?;
        let cell_handle = self.require_value(cell_value, "set-car!/set-cdr!")?;
        self.as_cell(cell_handle)?;
        let new_value = self.eval_expr(raw[1], scope)?;
        let copied = self.copy_expr(new_value, scope)?;
        match self.arena.get_mut(cell_handle) {
            ObjectData::Cell { first, second } => {
                if is_car {
                    *first = copied;
                } else {
                    *second = copied;
                }
            }
            _ => unreachable!("checked by as_cell above"),
        }
        Ok(Some(cell_handle))
    }

    fn builtin_lambda(&mut self, scope: &Scope, args: Expr) -> Result<Expr, InterpError> {
        let raw = self.arg_list(args)?;
        if raw.len() < 2 {
            return Err(InterpError::syntax("lambda: expected a parameter list and at least one body expression"));
        }
        let params_expr = raw[0];
        let mut body = Vec::with_capacity(raw.len() - 1);
        for expr in &raw[1..] {
            body.push(require_ast(*expr, "lambda body expression")?);
        }
        let handle = self.build_lambda(params_expr, body, scope)?;
        Ok(Some(handle))
    }
}
