//! Capabilities consumed from the host front-end.
//!
//! Constraint satisfaction, specialization ordering, class relationships and
//! conversions are all answered by the host through the traits in this
//! module:
//!
//! - [`ConstraintOracle`]: viability and "more specialized than" ordering
//! - [`ClassModel`]: base classes and enclosing classes, for associated classes
//! - [`ConversionModel`]: implicit convertibility of return types
//!
//! Hosts whose overload machinery answers specialization pairwise can wrap
//! it in a [`PredicateOracle`], which derives the unique most specialized
//! candidate with [`most_specialized`].

use crate::node::{CpfId, CpfNode, NoexceptCondition};
use crate::types::TypeRef;

/// Constraint satisfaction and partial ordering, answered by the host.
pub trait ConstraintOracle {
    /// Whether a call with `arg_types` is valid against the declaration's own
    /// signature and constraint.
    fn is_viable(&self, decl: &CpfNode, arg_types: &[TypeRef]) -> bool;

    /// The unique most specialized declaration among `candidates`, or `None`
    /// if no single candidate is more specialized than all others.
    ///
    /// The answer must be the id of one of `candidates`.
    fn partial_order(&self, candidates: &[&CpfNode], arg_types: &[TypeRef]) -> Option<CpfId>;

    /// Evaluate a `noexcept(expr)` operand for a call with `arg_types`.
    ///
    /// Conditions the host cannot evaluate count as potentially throwing.
    fn evaluate_noexcept(
        &self,
        _decl: &CpfNode,
        _condition: &NoexceptCondition,
        _arg_types: &[TypeRef],
    ) -> bool {
        false
    }
}

/// Class relationships needed for associated-class computation.
pub trait ClassModel {
    /// Direct base classes of a class or union type.
    fn base_classes(&self, class: &TypeRef) -> Vec<TypeRef>;

    /// The class `ty` is a member of, if it is a nested type.
    fn enclosing_class(&self, ty: &TypeRef) -> Option<TypeRef>;
}

/// Implicit conversions between concrete types.
pub trait ConversionModel {
    /// Whether `from` converts implicitly to `to`.
    fn is_implicitly_convertible(&self, from: &TypeRef, to: &TypeRef) -> bool;

    /// Whether that conversion cannot throw.
    fn is_nothrow_convertible(&self, from: &TypeRef, to: &TypeRef) -> bool;
}

/// A conversion model where only identity conversions exist.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityConversions;

impl ConversionModel for IdentityConversions {
    fn is_implicitly_convertible(&self, from: &TypeRef, to: &TypeRef) -> bool {
        from == to
    }

    fn is_nothrow_convertible(&self, from: &TypeRef, to: &TypeRef) -> bool {
        from == to
    }
}

/// Find the maximally specialized candidates.
///
/// A candidate is maximal if no other candidate is strictly more specialized.
pub fn find_maximal<'n, F>(candidates: &[&'n CpfNode], more_specialized: F) -> Vec<&'n CpfNode>
where
    F: Fn(&CpfNode, &CpfNode) -> bool,
{
    candidates
        .iter()
        .filter(|m| {
            !candidates
                .iter()
                .any(|other| other.id() != m.id() && more_specialized(other, m))
        })
        .copied()
        .collect()
}

/// The unique maximal candidate under a pairwise "more specialized than"
/// relation, or `None` when zero or several candidates are maximal.
pub fn most_specialized<F>(candidates: &[&CpfNode], more_specialized: F) -> Option<CpfId>
where
    F: Fn(&CpfNode, &CpfNode) -> bool,
{
    match find_maximal(candidates, more_specialized).as_slice() {
        [winner] => Some(winner.id()),
        _ => None,
    }
}

/// A [`ConstraintOracle`] built from two predicates.
///
/// `viable(decl, args)` decides viability; `more_specialized(a, b, args)`
/// decides whether `a` is strictly more specialized than `b`.
pub struct PredicateOracle<V, S> {
    viable: V,
    more_specialized: S,
}

impl<V, S> PredicateOracle<V, S>
where
    V: Fn(&CpfNode, &[TypeRef]) -> bool,
    S: Fn(&CpfNode, &CpfNode, &[TypeRef]) -> bool,
{
    pub fn new(viable: V, more_specialized: S) -> Self {
        Self {
            viable,
            more_specialized,
        }
    }
}

impl<V, S> ConstraintOracle for PredicateOracle<V, S>
where
    V: Fn(&CpfNode, &[TypeRef]) -> bool,
    S: Fn(&CpfNode, &CpfNode, &[TypeRef]) -> bool,
{
    fn is_viable(&self, decl: &CpfNode, arg_types: &[TypeRef]) -> bool {
        (self.viable)(decl, arg_types)
    }

    fn partial_order(&self, candidates: &[&CpfNode], arg_types: &[TypeRef]) -> Option<CpfId> {
        most_specialized(candidates, |a, b| (self.more_specialized)(a, b, arg_types))
    }
}
