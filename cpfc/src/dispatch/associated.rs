//! Associated classes of a call.
//!
//! Friend-scoped overrides are only visible when their owning class is
//! associated with one of the call's arguments. The associated set is
//! narrower than ordinary argument-dependent lookup:
//!
//! - class or union `T`: `T`, the class `T` is a member of, and every direct
//!   or indirect base class of `T`
//! - enumeration `T`: the class `T` is a member of
//! - anything else: nothing
//!
//! The set for a call is the union over all arguments.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use tracing::trace;

use crate::node::CpfNode;
use crate::oracle::ClassModel;
use crate::types::{TypeId, TypeKind, TypeRef};

/// Classes associated with a call, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssociatedClasses {
    classes: IndexMap<TypeId, TypeRef>,
}

impl AssociatedClasses {
    /// Compute the associated classes of a call with `arg_types`.
    pub fn of_call(model: &dyn ClassModel, arg_types: &[TypeRef]) -> Self {
        let mut set = Self::default();
        for ty in arg_types {
            set.add_argument(model, ty);
        }
        trace!(
            classes = ?set.iter().map(|c| c.name()).collect::<Vec<_>>(),
            "associated classes"
        );
        set
    }

    /// Compute the associated classes of a single argument type.
    pub fn of_type(model: &dyn ClassModel, ty: &TypeRef) -> Self {
        let mut set = Self::default();
        set.add_argument(model, ty);
        set
    }

    fn add_argument(&mut self, model: &dyn ClassModel, ty: &TypeRef) {
        match ty.kind() {
            TypeKind::Class | TypeKind::Union => {
                self.insert(ty);
                if let Some(outer) = model.enclosing_class(ty) {
                    self.insert(&outer);
                }
                self.add_bases(model, ty);
            }
            TypeKind::Enum => {
                if let Some(outer) = model.enclosing_class(ty) {
                    self.insert(&outer);
                }
            }
            TypeKind::Other => {}
        }
    }

    /// Walk base classes transitively; each class is expanded once, so
    /// diamonds (and malformed cyclic tables) terminate.
    fn add_bases(&mut self, model: &dyn ClassModel, class: &TypeRef) {
        let mut worklist = vec![class.clone()];
        let mut expanded: FxHashSet<TypeId> = FxHashSet::default();

        while let Some(current) = worklist.pop() {
            if !expanded.insert(current.id()) {
                continue;
            }

            for base in model.base_classes(&current) {
                self.insert(&base);
                worklist.push(base);
            }
        }
    }

    fn insert(&mut self, class: &TypeRef) {
        self.classes.entry(class.id()).or_insert_with(|| class.clone());
    }

    pub fn contains(&self, class: &TypeRef) -> bool {
        self.classes.contains_key(&class.id())
    }

    /// Whether `node` is a visible candidate: ordinary-scope overrides
    /// always are, friend-scoped ones only if their class is associated.
    pub fn admits(&self, node: &CpfNode) -> bool {
        match node.friend_scope() {
            Some(class) => self.contains(class),
            None => true,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeRef> + '_ {
        self.classes.values()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
