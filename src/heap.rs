use ahash::AHashSet;

use crate::value::{ObjectData, Procedure};

/// An index into the arena. Stable for the lifetime of the object it names;
/// the arena never moves live objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectHandle(usize);

impl ObjectHandle {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// A Lisp value reference: `Some` is a real object, `None` is nil — the
/// absent-object sentinel used for the empty list and its terminators.
pub type Expr = Option<ObjectHandle>;

/// A read-only snapshot of arena occupancy, useful for tests and for an
/// embedder that wants to observe collector behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaStats {
    pub live: usize,
    pub free: usize,
    pub total: usize,
}

/// The process-wide registry of every Object ever created and still live.
///
/// Allocation is an append (or a free-slot reuse); the arena never moves an
/// object once allocated, so handles stay valid until a collection reclaims
/// them.
pub struct Arena {
    slots: Vec<Option<ObjectData>>,
    free: Vec<usize>,
}

impl Arena {
    pub fn new() -> Self {
        Self { slots: Vec::new(), free: Vec::new() }
    }

    pub fn allocate(&mut self, data: ObjectData) -> ObjectHandle {
        if let Some(index) = self.free.pop() {
            self.slots[index] = Some(data);
            ObjectHandle(index)
        } else {
            let index = self.slots.len();
            self.slots.push(Some(data));
            ObjectHandle(index)
        }
    }

    pub fn get(&self, handle: ObjectHandle) -> &ObjectData {
        self.slots[handle.index()]
            .as_ref()
            .expect("handle referenced a collected object")
    }

    pub fn get_mut(&mut self, handle: ObjectHandle) -> &mut ObjectData {
        self.slots[handle.index()]
            .as_mut()
            .expect("handle referenced a collected object")
    }

    pub fn stats(&self) -> ArenaStats {
        ArenaStats { live: self.slots.len() - self.free.len(), free: self.free.len(), total: self.slots.len() }
    }

    /// `GatherSubobjects`: insert `handle` and everything transitively
    /// reachable from it into `acc`. The accumulator doubles as the visited
    /// set, so cyclic graphs (built via `set-car!`/`set-cdr!`) terminate.
    pub fn gather(&self, handle: ObjectHandle, acc: &mut AHashSet<ObjectHandle>) {
        if !acc.insert(handle) {
            return;
        }
        match self.get(handle) {
            ObjectData::Number(_) | ObjectData::Boolean(_) | ObjectData::Symbol(_) => {}
            ObjectData::Procedure(Procedure::Builtin(_)) => {}
            ObjectData::Cell { first, second } => {
                if let Some(h) = first {
                    self.gather(*h, acc);
                }
                if let Some(h) = second {
                    self.gather(*h, acc);
                }
            }
            ObjectData::Procedure(Procedure::Scoped(p)) => {
                for value in p.captures.values().flatten() {
                    self.gather(*value, acc);
                }
                for body_root in &p.body {
                    self.gather(*body_root, acc);
                }
            }
        }
    }

    /// Mark-and-sweep: destroy every object not present in `roots`.
    pub fn collect(&mut self, roots: &AHashSet<ObjectHandle>) {
        for index in 0..self.slots.len() {
            if self.slots[index].is_some() && !roots.contains(&ObjectHandle(index)) {
                self.slots[index] = None;
                self.free.push(index);
            }
        }
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}
