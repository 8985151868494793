use std::cell::RefCell;
use std::rc::Rc;

use ahash::{AHashMap, AHashSet};

use crate::error::InterpError;
use crate::heap::{Arena, Expr, ObjectHandle};
use crate::value::ObjectData;

struct ScopeData {
    bindings: AHashMap<String, Expr>,
    service: Vec<ObjectHandle>,
    parent: Option<Scope>,
}

/// A reference-counted owner of a name→value binding map, a service list of
/// transient objects created while evaluating under this scope, and an
/// optional parent link forming a chain that terminates at the global
/// scope.
///
/// The parent pointer is conceptually non-owning (a scope never outlives
/// the one that created it, since child scopes live only on the host call
/// stack for the duration of a call); it is represented here as a strong
/// `Rc` purely because there is no cycle among scopes to worry about.
#[derive(Clone)]
pub struct Scope(Rc<RefCell<ScopeData>>);

impl Scope {
    pub fn new_global() -> Self {
        Self(Rc::new(RefCell::new(ScopeData { bindings: AHashMap::default(), service: Vec::new(), parent: None })))
    }

    pub fn child(parent: &Scope) -> Self {
        Self(Rc::new(RefCell::new(ScopeData {
            bindings: AHashMap::default(),
            service: Vec::new(),
            parent: Some(parent.clone()),
        })))
    }

    /// `Lookup(name)`: this scope, then its parent chain.
    pub fn lookup(&self, name: &str) -> Option<Expr> {
        let data = self.0.borrow();
        if let Some(value) = data.bindings.get(name) {
            Some(*value)
        } else {
            data.parent.as_ref().and_then(|parent| parent.lookup(name))
        }
    }

    /// `LookupLocal(name)`: this scope only.
    pub fn lookup_local(&self, name: &str) -> Option<Expr> {
        self.0.borrow().bindings.get(name).copied()
    }

    /// `Bind(obj, name)`: unconditional assignment into this scope.
    pub fn bind(&self, name: String, value: Expr) {
        self.0.borrow_mut().bindings.insert(name, value);
    }

    /// `DefineFresh`: allocate a fresh object, bind it, fail on a local
    /// duplicate. Used only to populate the global scope's built-in
    /// registry at construction.
    pub fn define_fresh(&self, arena: &mut Arena, name: &str, data: ObjectData) -> Result<(), InterpError> {
        if self.lookup_local(name).is_some() {
            return Err(InterpError::runtime(format!("duplicate definition: {name}")));
        }
        let handle = arena.allocate(data);
        self.bind(name.to_string(), Some(handle));
        Ok(())
    }

    /// `AllocService`: allocate a fresh object and retain it in this
    /// scope's service list for the lifetime of the scope.
    pub fn alloc_service(&self, arena: &mut Arena, data: ObjectData) -> ObjectHandle {
        let handle = arena.allocate(data);
        self.0.borrow_mut().service.push(handle);
        handle
    }

    /// `GatherRoots`: insert every binding's target and every service
    /// object, transitively, into `acc`.
    pub fn gather_roots(&self, arena: &Arena, acc: &mut AHashSet<ObjectHandle>) {
        let data = self.0.borrow();
        for value in data.bindings.values().flatten() {
            arena.gather(*value, acc);
        }
        for handle in &data.service {
            arena.gather(*handle, acc);
        }
    }
}
