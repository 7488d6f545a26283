//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};

use cpfc::{ConstraintOracle, ConstraintRef, CpfId, CpfNode, TypeRef};
use tracing_subscriber::EnvFilter;

/// Route engine logs to the test harness. Honors `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// A host-like oracle over named concepts.
///
/// A declaration is viable when its arity matches and the first argument
/// models its constraint. One constraint is more specialized than another
/// when it refines it (transitively) and not the other way round.
#[derive(Debug, Default)]
pub struct ConceptOracle {
    /// Concepts each type models, by type name.
    models: HashMap<String, HashSet<u32>>,
    /// Direct refinements: concept -> concepts it refines.
    refines: HashMap<u32, Vec<u32>>,
}

impl ConceptOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn concept(mut self, concept: &ConstraintRef, refines: &[&ConstraintRef]) -> Self {
        self.refines
            .insert(concept.id, refines.iter().map(|c| c.id).collect());
        self
    }

    pub fn model(mut self, ty: &TypeRef, concepts: &[&ConstraintRef]) -> Self {
        self.models
            .entry(ty.name().to_string())
            .or_default()
            .extend(concepts.iter().map(|c| c.id));
        self
    }

    fn subsumes(&self, a: u32, b: u32) -> bool {
        if a == b {
            return true;
        }
        self.refines
            .get(&a)
            .map_or(false, |parents| parents.iter().any(|&p| self.subsumes(p, b)))
    }

    fn at_least_as_constrained(&self, a: Option<&ConstraintRef>, b: Option<&ConstraintRef>) -> bool {
        match (a, b) {
            (_, None) => true,
            (None, Some(_)) => false,
            (Some(a), Some(b)) => self.subsumes(a.id, b.id),
        }
    }
}

impl ConstraintOracle for ConceptOracle {
    fn is_viable(&self, decl: &CpfNode, arg_types: &[TypeRef]) -> bool {
        if decl.parameters().len() != arg_types.len() {
            return false;
        }
        let Some(constraint) = decl.constraint() else {
            return true;
        };
        arg_types.first().map_or(false, |first| {
            self.models
                .get(first.name())
                .map_or(false, |concepts| concepts.contains(&constraint.id))
        })
    }

    fn partial_order(&self, candidates: &[&CpfNode], _arg_types: &[TypeRef]) -> Option<CpfId> {
        cpfc::most_specialized(candidates, |a, b| {
            self.at_least_as_constrained(a.constraint(), b.constraint())
                && !self.at_least_as_constrained(b.constraint(), a.constraint())
        })
    }
}
