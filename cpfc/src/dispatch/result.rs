//! Dispatch result types and errors.

use thiserror::Error;

use super::associated::AssociatedClasses;
use crate::namespace::Namespace;
use crate::node::CpfId;
use crate::types::{display_args, TypeRef};

/// A successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The selected declaration.
    pub target: CpfId,
    /// Declarations visited, from the root of the call to `target`.
    pub path: Vec<CpfId>,
    /// Associated classes used to filter friend-scoped overrides.
    pub associated: AssociatedClasses,
}

impl Resolution {
    /// The declaration the call entered the tree at.
    pub fn root(&self) -> CpfId {
        self.path.first().copied().unwrap_or(self.target)
    }

    /// Number of override levels descended below the root.
    pub fn descent(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// Why no declaration could be selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoViableReason {
    /// The root declaration itself rejects the arguments.
    RootRejected,
    /// Descent stopped at a pure declaration with no viable override.
    PureWithoutOverride { node: CpfId, node_name: String },
}

/// Per-call resolution failures.
///
/// These are ordinary results: a host answers "is this customization point
/// usable for these arguments?" by checking for [`DispatchError::NoViableCandidate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("no viable candidate for `{function}{}`{}", display_args(.arg_types), .reason.describe())]
    NoViableCandidate {
        function: String,
        arg_types: Vec<TypeRef>,
        reason: NoViableReason,
    },

    #[error(
        "ambiguous override of `{parent_name}` for arguments {}: candidates are {}",
        display_args(.arg_types),
        .candidate_names.join(", ")
    )]
    AmbiguousOverride {
        parent: CpfId,
        parent_name: String,
        arg_types: Vec<TypeRef>,
        /// Viable overrides, in registration order.
        candidates: Vec<CpfId>,
        candidate_names: Vec<String>,
    },

    #[error("constraint oracle selected {answer}, which is not a viable override of `{parent_name}`")]
    InvalidOracleAnswer {
        parent: CpfId,
        parent_name: String,
        answer: CpfId,
    },

    #[error("declaration {id} is not registered")]
    UnknownNode { id: CpfId },

    #[error("{id} is an unnamed override and can only be reached through its seed")]
    UnnamedEntryPoint { id: CpfId },

    #[error("`{target_name}` returns `{from}`, which does not convert to the seed's `{to}`")]
    ReturnNotConvertible {
        target: CpfId,
        target_name: String,
        from: TypeRef,
        to: TypeRef,
    },

    #[error("no customization point named `{name}` in namespace `{namespace}`")]
    UnknownFunction { namespace: Namespace, name: String },
}

impl NoViableReason {
    fn describe(&self) -> String {
        match self {
            NoViableReason::RootRejected => String::new(),
            NoViableReason::PureWithoutOverride { node_name, .. } => {
                format!(": `{node_name}` is pure and no override is viable")
            }
        }
    }
}

impl DispatchError {
    /// Whether this is the clean "not callable" outcome.
    pub fn is_no_viable_candidate(&self) -> bool {
        matches!(self, DispatchError::NoViableCandidate { .. })
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, DispatchError::AmbiguousOverride { .. })
    }
}

/// Dispatch result type.
pub type DispatchResult<T> = Result<T, DispatchError>;
