//! The resolution engine facade.
//!
//! An [`Engine`] bundles a sealed registry with the host capabilities and
//! configuration, so a front-end can resolve calls and compute their effects
//! through one handle. It is `Clone + Send + Sync` and may be shared freely
//! across threads.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::dispatch::{DispatchResolver, DispatchResult, Resolution};
use crate::effects::{CallInfo, EffectComputer, EffectiveCallResult};
use crate::namespace::Namespace;
use crate::node::CpfId;
use crate::oracle::{ClassModel, ConstraintOracle, ConversionModel, IdentityConversions};
use crate::registry::Registry;
use crate::types::TypeRef;

/// A resolved call together with its effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCall {
    pub resolution: Resolution,
    pub effects: EffectiveCallResult,
}

/// Registry, host capabilities, and configuration in one place.
#[derive(Clone)]
pub struct Engine<'r> {
    registry: &'r Registry,
    oracle: Arc<dyn ConstraintOracle + Send + Sync>,
    classes: Arc<dyn ClassModel + Send + Sync>,
    conversions: Arc<dyn ConversionModel + Send + Sync>,
    config: EngineConfig,
}

impl<'r> Engine<'r> {
    /// Create an engine with identity-only conversions and default config.
    pub fn new(
        registry: &'r Registry,
        oracle: impl ConstraintOracle + Send + Sync + 'static,
        classes: impl ClassModel + Send + Sync + 'static,
    ) -> Self {
        Self {
            registry,
            oracle: Arc::new(oracle),
            classes: Arc::new(classes),
            conversions: Arc::new(IdentityConversions),
            config: EngineConfig::default(),
        }
    }

    pub fn with_conversions(mut self, model: impl ConversionModel + Send + Sync + 'static) -> Self {
        self.conversions = Arc::new(model);
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn resolver(&self) -> DispatchResolver<'_> {
        DispatchResolver::new(self.registry, self.oracle.as_ref(), self.classes.as_ref())
    }

    fn effect_computer(&self) -> EffectComputer<'_> {
        EffectComputer::new(
            self.registry,
            self.oracle.as_ref(),
            self.conversions.as_ref(),
            self.config.call_policy,
        )
    }

    /// Select the declaration a call entering at `root` invokes.
    pub fn resolve(&self, root: CpfId, arg_types: &[TypeRef]) -> DispatchResult<Resolution> {
        self.resolver().resolve(root, arg_types)
    }

    /// Resolve an explicit call of a seed or named override.
    pub fn resolve_by_name(
        &self,
        namespace: &Namespace,
        name: &str,
        arg_types: &[TypeRef],
    ) -> DispatchResult<Resolution> {
        self.resolver().resolve_by_name(namespace, name, arg_types)
    }

    /// Whether a call entering at `root` resolves.
    pub fn is_callable(&self, root: CpfId, arg_types: &[TypeRef]) -> bool {
        self.resolver().is_callable(root, arg_types)
    }

    /// Result type and effective `noexcept` of calling `target`.
    pub fn compute_effects(
        &self,
        target: CpfId,
        call: &CallInfo,
    ) -> DispatchResult<EffectiveCallResult> {
        self.effect_computer().compute_effects(target, call)
    }

    /// Resolve a call and compute its effects.
    pub fn call(&self, root: CpfId, call: &CallInfo) -> DispatchResult<ResolvedCall> {
        let resolution = self.resolve(root, &call.argument_types)?;
        let effects = self.compute_effects(resolution.target, call)?;
        Ok(ResolvedCall {
            resolution,
            effects,
        })
    }
}

impl std::fmt::Debug for Engine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("declarations", &self.registry.len())
            .field("config", &self.config)
            .finish()
    }
}
