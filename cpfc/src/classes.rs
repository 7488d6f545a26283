//! In-memory class table.
//!
//! A ready-made [`ClassModel`] for hosts that record class relationships as
//! they process class definitions.

use rustc_hash::FxHashMap;

use crate::oracle::ClassModel;
use crate::types::{TypeId, TypeRef};

/// Direct base classes and enclosing classes, keyed by type id.
#[derive(Debug, Clone, Default)]
pub struct ClassTable {
    bases: FxHashMap<TypeId, Vec<TypeRef>>,
    enclosing: FxHashMap<TypeId, TypeRef>,
}

impl ClassTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `derived` directly derives from `base`.
    ///
    /// Repeated edges are ignored.
    pub fn add_base(&mut self, derived: &TypeRef, base: &TypeRef) -> &mut Self {
        let bases = self.bases.entry(derived.id()).or_default();
        if !bases.contains(base) {
            bases.push(base.clone());
        }
        self
    }

    /// Record that `nested` is declared inside `enclosing`.
    pub fn set_enclosing(&mut self, nested: &TypeRef, enclosing: &TypeRef) -> &mut Self {
        self.enclosing.insert(nested.id(), enclosing.clone());
        self
    }
}

impl ClassModel for ClassTable {
    fn base_classes(&self, class: &TypeRef) -> Vec<TypeRef> {
        self.bases.get(&class.id()).cloned().unwrap_or_default()
    }

    fn enclosing_class(&self, ty: &TypeRef) -> Option<TypeRef> {
        self.enclosing.get(&ty.id()).cloned()
    }
}
