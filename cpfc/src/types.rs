//! Host-owned type handles.
//!
//! The engine never inspects the structure of a type. Types are interned by
//! the host front-end and handed over as [`TypeRef`]s: a stable identity, a
//! coarse category, and a display name for diagnostics. Everything else a
//! type "means" is answered by the host capabilities in [`crate::oracle`].

use std::fmt;
use std::sync::Arc;

/// Identity of a type in the host's type table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId {
    pub index: u32,
}

impl TypeId {
    pub const fn new(index: u32) -> Self {
        Self { index }
    }
}

/// The category of a type, as far as associated-class computation cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// A class type (`class` or `struct`).
    Class,
    /// A union type.
    Union,
    /// An enumeration type (scoped or unscoped).
    Enum,
    /// Fundamental, pointer, reference, function, array types...
    Other,
}

/// A concrete type handed over by the host.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    id: TypeId,
    kind: TypeKind,
    name: Arc<str>,
}

impl TypeRef {
    /// Create a type reference with an explicit category.
    pub fn new(id: TypeId, kind: TypeKind, name: impl Into<Arc<str>>) -> Self {
        Self {
            id,
            kind,
            name: name.into(),
        }
    }

    /// Create a class type reference.
    pub fn class(index: u32, name: impl Into<Arc<str>>) -> Self {
        Self::new(TypeId::new(index), TypeKind::Class, name)
    }

    /// Create a union type reference.
    pub fn union(index: u32, name: impl Into<Arc<str>>) -> Self {
        Self::new(TypeId::new(index), TypeKind::Union, name)
    }

    /// Create an enumeration type reference.
    pub fn enumeration(index: u32, name: impl Into<Arc<str>>) -> Self {
        Self::new(TypeId::new(index), TypeKind::Enum, name)
    }

    /// Create a reference to a non-class, non-enum type.
    pub fn other(index: u32, name: impl Into<Arc<str>>) -> Self {
        Self::new(TypeId::new(index), TypeKind::Other, name)
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Class and union types have associated classes of their own.
    pub fn is_class_like(&self) -> bool {
        matches!(self.kind, TypeKind::Class | TypeKind::Union)
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeRef({}#{})", self.name, self.id.index)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A declared parameter type.
///
/// Template-dependent parameters stay opaque; only the constraint oracle
/// knows how to match them against argument types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// A parameter of a fixed type.
    Concrete(TypeRef),
    /// A parameter whose type depends on template parameters (e.g. `It`, `T&&`).
    Dependent(String),
}

impl ParamType {
    /// Shorthand for a template-dependent parameter.
    pub fn dependent(spelling: impl Into<String>) -> Self {
        ParamType::Dependent(spelling.into())
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Concrete(ty) => write!(f, "{ty}"),
            ParamType::Dependent(spelling) => f.write_str(spelling),
        }
    }
}

/// Format a list of argument types as `(A, B, C)` for diagnostics.
pub(crate) fn display_args(args: &[TypeRef]) -> String {
    let parts: Vec<_> = args.iter().map(|ty| ty.name().to_string()).collect();
    format!("({})", parts.join(", "))
}
