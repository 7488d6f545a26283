//! Call effects: result type and effective `noexcept`.
//!
//! Once dispatch has fixed a target, two properties of the call remain:
//!
//! - **Result type.** Under [`CallPolicy::Forwarding`] a seed with a concrete
//!   return type converts every target's result to that type. The conversion
//!   is always applied, even when it is the identity. A deduced seed uses the
//!   target's own deduced type. Under [`CallPolicy::FlatOverloadSet`] no
//!   seed-level conversion exists and the target's declared type is the
//!   result.
//! - **noexcept.** The call is `noexcept` iff the target is, every argument
//!   conversion the host performed to reach it is, and the return
//!   conversion (if not the identity) cannot throw.


use tracing::debug;

use crate::config::CallPolicy;
use crate::dispatch::{DispatchError, DispatchResult};
use crate::node::{CpfId, CpfNode, NoexceptSpec, ReturnSpec};
use crate::oracle::{ConstraintOracle, ConversionModel};
use crate::registry::Registry;
use crate::types::TypeRef;

/// One implicit argument conversion or forwarding step performed by the
/// host to pass an argument to the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionStep {
    /// Zero-based argument position.
    pub argument: usize,
    pub from: TypeRef,
    pub to: TypeRef,
    pub is_noexcept: bool,
}

impl ConversionStep {
    pub fn new(argument: usize, from: TypeRef, to: TypeRef, is_noexcept: bool) -> Self {
        Self {
            argument,
            from,
            to,
            is_noexcept,
        }
    }
}

/// What the host knows about a call site.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallInfo {
    pub argument_types: Vec<TypeRef>,
    pub conversions: Vec<ConversionStep>,
}

impl CallInfo {
    pub fn new(argument_types: Vec<TypeRef>) -> Self {
        Self {
            argument_types,
            conversions: Vec::new(),
        }
    }

    pub fn with_conversion(mut self, step: ConversionStep) -> Self {
        self.conversions.push(step);
        self
    }
}

/// The conversion applied to the target's result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnConversion {
    /// The target already returns the seed's type; the mandatory
    /// conversion is a no-op.
    Identity(TypeRef),
    /// The target's result is converted to the seed's return type.
    Implicit { from: TypeRef, to: TypeRef },
    /// No seed-level conversion; the call yields what the target declares.
    Unconverted(ReturnSpec),
}

impl ReturnConversion {
    /// The type the caller receives.
    pub fn result_type(&self) -> ReturnSpec {
        match self {
            ReturnConversion::Identity(ty) => ReturnSpec::Concrete(ty.clone()),
            ReturnConversion::Implicit { to, .. } => ReturnSpec::Concrete(to.clone()),
            ReturnConversion::Unconverted(spec) => spec.clone(),
        }
    }

    /// Apply the conversion to a result value.
    ///
    /// `convert` is only invoked for [`ReturnConversion::Implicit`]; every
    /// other case hands `value` back untouched.
    pub fn apply<V, F>(&self, value: V, convert: F) -> V
    where
        F: FnOnce(V, &TypeRef, &TypeRef) -> V,
    {
        match self {
            ReturnConversion::Implicit { from, to } => convert(value, from, to),
            ReturnConversion::Identity(_) | ReturnConversion::Unconverted(_) => value,
        }
    }
}

/// Effects of one resolved call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveCallResult {
    pub target: CpfId,
    pub result_type: ReturnSpec,
    pub is_noexcept: bool,
    pub return_conversion: ReturnConversion,
}

/// Computes [`EffectiveCallResult`]s for resolved targets.
pub struct EffectComputer<'a> {
    registry: &'a Registry,
    oracle: &'a dyn ConstraintOracle,
    conversions: &'a dyn ConversionModel,
    policy: CallPolicy,
}

impl<'a> EffectComputer<'a> {
    pub fn new(
        registry: &'a Registry,
        oracle: &'a dyn ConstraintOracle,
        conversions: &'a dyn ConversionModel,
        policy: CallPolicy,
    ) -> Self {
        Self {
            registry,
            oracle,
            conversions,
            policy,
        }
    }

    /// Compute the result type and effective `noexcept` of calling `target`.
    pub fn compute_effects(
        &self,
        target: CpfId,
        call: &CallInfo,
    ) -> DispatchResult<EffectiveCallResult> {
        let node = self
            .registry
            .node(target)
            .ok_or(DispatchError::UnknownNode { id: target })?;
        let seed = self
            .registry
            .seed_of(target)
            .ok_or(DispatchError::UnknownNode { id: node.seed() })?;

        let return_conversion = self.return_conversion(seed, node)?;
        let target_noexcept = self.target_is_noexcept(node, &call.argument_types);
        let arguments_noexcept = call.conversions.iter().all(|step| step.is_noexcept);
        let return_noexcept = match &return_conversion {
            ReturnConversion::Implicit { from, to } => {
                self.conversions.is_nothrow_convertible(from, to)
            }
            ReturnConversion::Identity(_) | ReturnConversion::Unconverted(_) => true,
        };

        let is_noexcept = target_noexcept && arguments_noexcept && return_noexcept;
        debug!(
            target = %node.display_name(),
            target_noexcept,
            arguments_noexcept,
            return_noexcept,
            "computed call effects"
        );

        Ok(EffectiveCallResult {
            target,
            result_type: return_conversion.result_type(),
            is_noexcept,
            return_conversion,
        })
    }

    fn return_conversion(
        &self,
        seed: &CpfNode,
        target: &CpfNode,
    ) -> DispatchResult<ReturnConversion> {
        if self.policy == CallPolicy::FlatOverloadSet {
            return Ok(ReturnConversion::Unconverted(target.return_spec().clone()));
        }
        let conversion = match (seed.return_spec(), target.return_spec()) {
            (ReturnSpec::Concrete(to), ReturnSpec::Concrete(from)) if from == to => {
                ReturnConversion::Identity(to.clone())
            }
            (ReturnSpec::Concrete(to), ReturnSpec::Concrete(from)) => {
                if !self.conversions.is_implicitly_convertible(from, to) {
                    return Err(DispatchError::ReturnNotConvertible {
                        target: target.id(),
                        target_name: target.display_name(),
                        from: from.clone(),
                        to: to.clone(),
                    });
                }
                ReturnConversion::Implicit {
                    from: from.clone(),
                    to: to.clone(),
                }
            }
            // Deduced trees use the target's own type. Mixed trees are
            // rejected at registration.
            _ => ReturnConversion::Unconverted(target.return_spec().clone()),
        };
        Ok(conversion)
    }

    fn target_is_noexcept(&self, target: &CpfNode, arg_types: &[TypeRef]) -> bool {
        match target.noexcept() {
            NoexceptSpec::True => true,
            NoexceptSpec::False => false,
            NoexceptSpec::Conditional(condition) => {
                self.oracle.evaluate_noexcept(target, condition, arg_types)
            }
        }
    }
}
