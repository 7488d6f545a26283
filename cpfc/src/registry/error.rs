//! Registration errors.

use std::fmt;

use thiserror::Error;

use crate::namespace::Namespace;
use crate::node::{CpfId, NoexceptSpec, ReturnSpec};
use crate::types::TypeRef;

/// Whether a return type is spelled out or deduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnKind {
    Concrete,
    Deduced,
}

impl ReturnKind {
    pub fn of(spec: &ReturnSpec) -> Self {
        if spec.is_deduced() {
            ReturnKind::Deduced
        } else {
            ReturnKind::Concrete
        }
    }
}

impl fmt::Display for ReturnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnKind::Concrete => f.write_str("concrete"),
            ReturnKind::Deduced => f.write_str("deduced"),
        }
    }
}

/// Structural errors detected when a declaration is registered.
///
/// A failed registration leaves the registry exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("`{name}` is already declared as a function in namespace `{namespace}`")]
    DuplicateName { namespace: Namespace, name: String },

    #[error("cannot override `{parent_name}`: it is declared final")]
    FinalOverride { parent: CpfId, parent_name: String },

    #[error("`{decl_name}` has a {found} return type but seed `{seed_name}` has a {expected} one")]
    ReturnKindMismatch {
        seed_name: String,
        decl_name: String,
        expected: ReturnKind,
        found: ReturnKind,
    },

    #[error("`{decl_name}` is declared {found} but seed `{seed_name}` is noexcept(true)")]
    NoexceptMismatch {
        seed_name: String,
        decl_name: String,
        found: NoexceptSpec,
    },

    #[error("`{decl_name}` returns `{found}`, which does not convert to `{expected}` returned by seed `{seed_name}`")]
    ReturnTypeMismatch {
        seed_name: String,
        decl_name: String,
        expected: TypeRef,
        found: TypeRef,
    },

    #[error("`{decl_name}` is both pure and final")]
    PureFinal { decl_name: String },

    #[error("overridden declaration {parent} is not registered")]
    UnknownParent { parent: CpfId },

    #[error("registry is full: {count} declarations already registered")]
    TooManyDeclarations { count: usize },
}

/// Registration result type.
pub type RegistrationResult<T> = Result<T, RegistrationError>;

/// Error returned when a process-wide registry is installed twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("a process-wide registry is already installed")]
pub struct AlreadyInstalled;
