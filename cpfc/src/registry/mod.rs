//! Declaration registry.
//!
//! Customization point declarations form one tree per seed. The registry is
//! populated during a single-threaded load phase through a
//! [`RegistryBuilder`], then sealed into an immutable [`Registry`] that any
//! number of threads may read concurrently.
//!
//! # Invariants
//!
//! - Append-only: nodes are never removed or mutated after registration,
//!   apart from their child list growing while the builder is live.
//! - A node's parent is registered before it, so trees are acyclic.
//! - No node has a `final` parent.
//! - Within a tree, return types are either all deduced or all concrete,
//!   and concrete ones convert to the seed's under the builder's model.
//! - A `noexcept(true)` seed has only `noexcept(true)` descendants.
//! - A name belongs to at most one function kind per namespace: either one
//!   customization point declaration or a set of ordinary overloads.

mod builder;
mod error;


use std::sync::OnceLock;

use rustc_hash::FxHashMap;

use crate::namespace::Namespace;
use crate::node::{CpfId, CpfNode};

pub use builder::RegistryBuilder;
pub use error::{AlreadyInstalled, RegistrationError, RegistrationResult, ReturnKind};

/// Process-wide registry, installed once after the load phase.
static GLOBAL_REGISTRY: OnceLock<Registry> = OnceLock::new();

/// What a name in a namespace refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Symbol {
    /// A seed or named override.
    Cpf(CpfId),
    /// One or more ordinary functions.
    Function,
}

/// Node storage shared by the builder and the sealed registry.
#[derive(Debug, Default)]
struct Forest {
    /// All nodes, indexed by `CpfId`.
    nodes: Vec<CpfNode>,
    /// Seeds in registration order.
    seeds: Vec<CpfId>,
    /// Function names per namespace.
    names: FxHashMap<Namespace, FxHashMap<String, Symbol>>,
}

impl Forest {
    fn node(&self, id: CpfId) -> Option<&CpfNode> {
        self.nodes.get(id.index as usize)
    }

    fn symbol(&self, namespace: &Namespace, name: &str) -> Option<Symbol> {
        self.names.get(namespace)?.get(name).copied()
    }

    fn insert_symbol(&mut self, namespace: &Namespace, name: &str, symbol: Symbol) {
        self.names
            .entry(namespace.clone())
            .or_default()
            .insert(name.to_string(), symbol);
    }

    fn lookup_by_name(&self, namespace: &Namespace, name: &str) -> Option<&CpfNode> {
        match self.symbol(namespace, name)? {
            Symbol::Cpf(id) => self.node(id),
            Symbol::Function => None,
        }
    }
}

/// The sealed, read-only registry.
#[derive(Debug)]
pub struct Registry {
    forest: Forest,
}

impl Registry {
    /// Look up a registered declaration.
    pub fn node(&self, id: CpfId) -> Option<&CpfNode> {
        self.forest.node(id)
    }

    /// Find a seed or named override for explicit invocation.
    ///
    /// Unnamed overrides and ordinary functions are never found.
    pub fn lookup_by_name(&self, namespace: &Namespace, name: &str) -> Option<&CpfNode> {
        self.forest.lookup_by_name(namespace, name)
    }

    /// All seeds, in registration order.
    pub fn seeds(&self) -> impl Iterator<Item = &CpfNode> + '_ {
        self.forest.seeds.iter().filter_map(|&id| self.node(id))
    }

    /// Direct overrides of `id`, in registration order.
    pub fn children(&self, id: CpfId) -> impl Iterator<Item = &CpfNode> + '_ {
        self.node(id)
            .map(|node| node.children())
            .unwrap_or_default()
            .iter()
            .filter_map(|&child| self.node(child))
    }

    /// The seed of the tree `id` belongs to.
    pub fn seed_of(&self, id: CpfId) -> Option<&CpfNode> {
        self.node(id).and_then(|node| self.node(node.seed()))
    }

    /// `id` and its ancestors, from `id` up to the seed.
    pub fn ancestors(&self, id: CpfId) -> Ancestors<'_> {
        Ancestors {
            registry: self,
            next: self.node(id),
        }
    }

    /// Whether `ancestor` lies on the path from `id` to its seed (inclusive).
    pub fn is_ancestor_or_self(&self, ancestor: CpfId, id: CpfId) -> bool {
        self.ancestors(id).any(|node| node.id() == ancestor)
    }

    /// All registered declarations, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &CpfNode> + '_ {
        self.forest.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.forest.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forest.nodes.is_empty()
    }
}

/// Iterator from a node up to its seed.
pub struct Ancestors<'r> {
    registry: &'r Registry,
    next: Option<&'r CpfNode>,
}

impl<'r> Iterator for Ancestors<'r> {
    type Item = &'r CpfNode;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent().and_then(|p| self.registry.node(p));
        Some(current)
    }
}

/// Install `registry` as the process-wide registry.
pub fn install(registry: Registry) -> Result<&'static Registry, AlreadyInstalled> {
    GLOBAL_REGISTRY.set(registry).map_err(|_| AlreadyInstalled)?;
    let installed = GLOBAL_REGISTRY.get().ok_or(AlreadyInstalled)?;
    tracing::debug!(declarations = installed.len(), "installed process-wide registry");
    Ok(installed)
}

/// The process-wide registry, if one has been installed.
pub fn global() -> Option<&'static Registry> {
    GLOBAL_REGISTRY.get()
}
