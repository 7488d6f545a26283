//! RegistryBuilder for constructing an immutable Registry.

use tracing::debug;

use super::error::{RegistrationError, RegistrationResult, ReturnKind};
use super::{Forest, Registry, Symbol};
use crate::namespace::Namespace;
use crate::node::{CpfDecl, CpfId, CpfNode};
use crate::oracle::{ConversionModel, IdentityConversions};

/// Load-phase registry.
///
/// Declarations are appended one at a time and validated on arrival. The
/// builder is consumed by [`seal`](RegistryBuilder::seal), which yields the
/// read-only [`Registry`] used for dispatch.
pub struct RegistryBuilder {
    forest: Forest,
    /// Decides whether a concrete override return type converts to the
    /// seed's. Defaults to identity only.
    conversions: Box<dyn ConversionModel>,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self {
            forest: Forest::default(),
            conversions: Box::new(IdentityConversions),
        }
    }
}

impl RegistryBuilder {
    /// A builder that only accepts identical concrete return types.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept concrete override return types that `model` converts to the
    /// seed's.
    pub fn with_conversions(mut self, model: impl ConversionModel + 'static) -> Self {
        self.conversions = Box::new(model);
        self
    }

    /// Announce an ordinary (non-CPF) function.
    ///
    /// Ordinary functions may overload one another, but no customization
    /// point may share their name.
    pub fn declare_function(&mut self, namespace: &Namespace, name: &str) -> RegistrationResult<()> {
        match self.forest.symbol(namespace, name) {
            Some(Symbol::Cpf(_)) => Err(RegistrationError::DuplicateName {
                namespace: namespace.clone(),
                name: name.to_string(),
            }),
            Some(Symbol::Function) => Ok(()),
            None => {
                self.forest.insert_symbol(namespace, name, Symbol::Function);
                Ok(())
            }
        }
    }

    /// Register a declaration.
    ///
    /// Validation happens before anything is inserted, so on error the
    /// builder is unchanged.
    pub fn register(&mut self, decl: CpfDecl) -> RegistrationResult<CpfId> {
        self.validate(&decl)?;

        let id = next_id(self.forest.nodes.len())?;
        let (seed, depth) = match decl.parent {
            Some(parent) => {
                let parent = &self.forest.nodes[parent.index as usize];
                (parent.seed(), parent.depth() + 1)
            }
            None => (id, 0),
        };

        if let Some(name) = &decl.name {
            self.forest
                .insert_symbol(&decl.namespace, name, Symbol::Cpf(id));
        }
        if let Some(parent) = decl.parent {
            self.forest.nodes[parent.index as usize].push_child(id);
        } else {
            self.forest.seeds.push(id);
        }

        let node = CpfNode::new(id, seed, depth, decl);
        debug!(id = %id, seed = %seed, depth, "registered {}", node.display_name());
        self.forest.nodes.push(node);

        Ok(id)
    }

    fn validate(&self, decl: &CpfDecl) -> RegistrationResult<()> {
        let decl_name = || match &decl.name {
            Some(name) => decl.namespace.qualify(name),
            None => "<unnamed override>".to_string(),
        };

        let parent = match decl.parent {
            Some(parent) => Some(
                self.forest
                    .node(parent)
                    .ok_or(RegistrationError::UnknownParent { parent })?,
            ),
            None => None,
        };

        if let Some(parent) = parent {
            if parent.is_final() {
                return Err(RegistrationError::FinalOverride {
                    parent: parent.id(),
                    parent_name: parent.display_name(),
                });
            }
        }

        if let Some(name) = &decl.name {
            if self.forest.symbol(&decl.namespace, name).is_some() {
                return Err(RegistrationError::DuplicateName {
                    namespace: decl.namespace.clone(),
                    name: name.clone(),
                });
            }
        }

        if decl.is_pure && decl.is_final {
            return Err(RegistrationError::PureFinal {
                decl_name: decl_name(),
            });
        }

        // Everything below relates the declaration to its seed.
        let Some(parent) = parent else {
            return Ok(());
        };
        let seed = &self.forest.nodes[parent.seed().index as usize];

        let expected = ReturnKind::of(seed.return_spec());
        let found = ReturnKind::of(&decl.return_spec);
        if expected != found {
            return Err(RegistrationError::ReturnKindMismatch {
                seed_name: seed.display_name(),
                decl_name: decl_name(),
                expected,
                found,
            });
        }

        if let (Some(expected), Some(found)) =
            (seed.return_spec().concrete(), decl.return_spec.concrete())
        {
            if expected != found && !self.conversions.is_implicitly_convertible(found, expected) {
                return Err(RegistrationError::ReturnTypeMismatch {
                    seed_name: seed.display_name(),
                    decl_name: decl_name(),
                    expected: expected.clone(),
                    found: found.clone(),
                });
            }
        }

        if seed.noexcept().is_unconditionally_true() && !decl.noexcept.is_unconditionally_true() {
            return Err(RegistrationError::NoexceptMismatch {
                seed_name: seed.display_name(),
                decl_name: decl_name(),
                found: decl.noexcept.clone(),
            });
        }

        Ok(())
    }

    /// Look up a declaration registered so far.
    pub fn node(&self, id: CpfId) -> Option<&CpfNode> {
        self.forest.node(id)
    }

    /// Look up a named declaration registered so far.
    pub fn lookup_by_name(&self, namespace: &Namespace, name: &str) -> Option<&CpfNode> {
        self.forest.lookup_by_name(namespace, name)
    }

    pub fn len(&self) -> usize {
        self.forest.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forest.nodes.is_empty()
    }

    /// End the registration phase.
    pub fn seal(self) -> Registry {
        debug!(
            declarations = self.forest.nodes.len(),
            seeds = self.forest.seeds.len(),
            "sealed customization point registry"
        );
        Registry {
            forest: self.forest,
        }
    }
}

/// The id the next registered node receives, given the current node count.
pub(super) fn next_id(len: usize) -> RegistrationResult<CpfId> {
    u32::try_from(len)
        .map(CpfId::new)
        .map_err(|_| RegistrationError::TooManyDeclarations { count: len })
}

impl std::fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("forest", &self.forest)
            .finish_non_exhaustive()
    }
}
