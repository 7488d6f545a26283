//! Hierarchical dispatch resolution.

use tracing::{debug, trace, warn};

use super::associated::AssociatedClasses;
use super::result::{DispatchError, DispatchResult, NoViableReason, Resolution};
use crate::namespace::Namespace;
use crate::node::{CpfId, CpfNode};
use crate::oracle::{ClassModel, ConstraintOracle};
use crate::registry::Registry;
use crate::types::TypeRef;

/// Dispatch resolution context.
///
/// Holds only shared references: resolution never mutates anything, so one
/// resolver (or many) may run on any number of threads over a sealed
/// [`Registry`].
pub struct DispatchResolver<'a> {
    registry: &'a Registry,
    oracle: &'a dyn ConstraintOracle,
    classes: &'a dyn ClassModel,
}

impl<'a> DispatchResolver<'a> {
    /// Create a new dispatch resolver.
    pub fn new(
        registry: &'a Registry,
        oracle: &'a dyn ConstraintOracle,
        classes: &'a dyn ClassModel,
    ) -> Self {
        Self {
            registry,
            oracle,
            classes,
        }
    }

    /// Resolve a call entering the tree at `root`.
    ///
    /// `root` is usually a seed, but any named override is a valid entry
    /// point for explicit invocation; resolution then only considers that
    /// override's subtree. Unnamed overrides are only reachable by descent.
    ///
    /// # Algorithm
    ///
    /// 1. **Gate**: the root must accept the arguments, otherwise the call
    ///    is not viable at all.
    /// 2. **Collect**: visible children of the current node (ordinary
    ///    overrides, plus friend-scoped ones whose class is associated).
    /// 3. **Filter**: keep the children the oracle deems viable.
    /// 4. **Select**: none left, stop here (unless pure); one left, descend;
    ///    several left, descend into the unique most specialized one or
    ///    report ambiguity.
    ///
    /// Nodes off the chosen path are never checked, and a branch's children
    /// are only examined once the branch itself was found viable.
    pub fn resolve(&self, root: CpfId, arg_types: &[TypeRef]) -> DispatchResult<Resolution> {
        let root = self.node(root)?;
        if root.name().is_none() {
            debug!(root = %root.id(), "unnamed override used as an entry point");
            return Err(DispatchError::UnnamedEntryPoint { id: root.id() });
        }

        if !self.oracle.is_viable(root, arg_types) {
            debug!(root = %root.display_name(), "root rejects arguments");
            return Err(DispatchError::NoViableCandidate {
                function: root.display_name(),
                arg_types: arg_types.to_vec(),
                reason: NoViableReason::RootRejected,
            });
        }

        let associated = AssociatedClasses::of_call(self.classes, arg_types);
        let mut current = root;
        let mut path = vec![root.id()];

        loop {
            let visible = self.visible_children(current, &associated);
            let viable: Vec<&CpfNode> = visible
                .into_iter()
                .filter(|child| self.oracle.is_viable(child, arg_types))
                .collect();

            trace!(
                current = %current.display_name(),
                viable = viable.len(),
                "examined overrides"
            );

            let next = match viable.as_slice() {
                [] => break,
                [only] => *only,
                _ => self.most_specialized(current, &viable, arg_types)?,
            };

            debug_assert_eq!(next.parent(), Some(current.id()));
            path.push(next.id());
            current = next;
        }

        if current.is_pure() {
            debug!(node = %current.display_name(), "descent stopped at a pure declaration");
            return Err(DispatchError::NoViableCandidate {
                function: root.display_name(),
                arg_types: arg_types.to_vec(),
                reason: NoViableReason::PureWithoutOverride {
                    node: current.id(),
                    node_name: current.display_name(),
                },
            });
        }

        debug!(
            root = %root.display_name(),
            target = %current.display_name(),
            depth = path.len() - 1,
            "resolved customization point call"
        );

        Ok(Resolution {
            target: current.id(),
            path,
            associated,
        })
    }

    /// Resolve an explicit call of a seed or named override.
    pub fn resolve_by_name(
        &self,
        namespace: &Namespace,
        name: &str,
        arg_types: &[TypeRef],
    ) -> DispatchResult<Resolution> {
        let node = self.registry.lookup_by_name(namespace, name).ok_or_else(|| {
            DispatchError::UnknownFunction {
                namespace: namespace.clone(),
                name: name.to_string(),
            }
        })?;
        self.resolve(node.id(), arg_types)
    }

    /// Whether a call entering at `root` resolves, the way a
    /// requires-expression would ask.
    pub fn is_callable(&self, root: CpfId, arg_types: &[TypeRef]) -> bool {
        self.resolve(root, arg_types).is_ok()
    }

    fn node(&self, id: CpfId) -> DispatchResult<&'a CpfNode> {
        self.registry
            .node(id)
            .ok_or(DispatchError::UnknownNode { id })
    }

    /// Children of `parent` that are candidates at this call site.
    fn visible_children(
        &self,
        parent: &CpfNode,
        associated: &AssociatedClasses,
    ) -> Vec<&'a CpfNode> {
        parent
            .children()
            .iter()
            .filter_map(|&child| self.registry.node(child))
            .filter(|child| {
                let visible = associated.admits(child);
                if !visible {
                    trace!(
                        child = %child.display_name(),
                        "friend-scoped override hidden: owning class not associated"
                    );
                }
                visible
            })
            .collect()
    }

    /// Pick the unique most specialized of several viable siblings.
    fn most_specialized(
        &self,
        parent: &CpfNode,
        viable: &[&'a CpfNode],
        arg_types: &[TypeRef],
    ) -> DispatchResult<&'a CpfNode> {
        let Some(answer) = self.oracle.partial_order(viable, arg_types) else {
            debug!(
                parent = %parent.display_name(),
                candidates = viable.len(),
                "ambiguous override"
            );
            return Err(DispatchError::AmbiguousOverride {
                parent: parent.id(),
                parent_name: parent.display_name(),
                arg_types: arg_types.to_vec(),
                candidates: viable.iter().map(|c| c.id()).collect(),
                candidate_names: viable.iter().map(|c| c.display_name()).collect(),
            });
        };

        viable
            .iter()
            .copied()
            .find(|c| c.id() == answer)
            .ok_or_else(|| {
                warn!(
                    parent = %parent.display_name(),
                    answer = %answer,
                    "constraint oracle answered with a non-candidate"
                );
                DispatchError::InvalidOracleAnswer {
                    parent: parent.id(),
                    parent_name: parent.display_name(),
                    answer,
                }
            })
    }
}
