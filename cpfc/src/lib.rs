//! Resolution engine for customization point functions.
//!
//! A customization point function is declared once as a *seed* and
//! specialized by a tree of *overrides*, each independently constrained and
//! possibly pure, final, or friend-scoped. Calls are dispatched statically:
//! given the declaration a call enters at and the argument types, the engine
//! walks the override tree to the most derived viable declaration, then
//! computes the call's result type and effective `noexcept`.
//!
//! # Architecture
//!
//! ```text
//! RegistryBuilder --seal--> Registry ---------------------+
//!   (load phase)             (read-only, shared)          |
//!                                                         v
//! call site --> AssociatedClasses --> DispatchResolver --> EffectComputer
//!                    ^                     ^                    ^
//!                ClassModel         ConstraintOracle      ConversionModel
//! ```
//!
//! Constraint satisfaction, specialization ordering, class relationships,
//! and conversions are host capabilities ([`oracle`]); the engine only
//! decides how they combine.
//!
//! # Example
//!
//! ```
//! use cpfc::{ClassTable, CpfDecl, CpfNode, Engine, PredicateOracle, RegistryBuilder, ReturnSpec, TypeRef};
//!
//! let mut builder = RegistryBuilder::new();
//! let seed = builder.register(CpfDecl::seed("std", "swap", ReturnSpec::deduced())).unwrap();
//! let registry = builder.seal();
//!
//! let oracle = PredicateOracle::new(
//!     |_: &CpfNode, _: &[TypeRef]| true,
//!     |_: &CpfNode, _: &CpfNode, _: &[TypeRef]| false,
//! );
//! let engine = Engine::new(&registry, oracle, ClassTable::new());
//! let resolution = engine.resolve(seed, &[TypeRef::class(1, "Widget")]).unwrap();
//! assert_eq!(resolution.target, seed);
//! ```

pub mod classes;
pub mod config;
pub mod dispatch;
pub mod effects;
pub mod engine;
pub mod namespace;
pub mod node;
pub mod oracle;
pub mod registry;
pub mod types;

pub use classes::ClassTable;
pub use config::{CallPolicy, ConfigError, EngineConfig};
pub use dispatch::{
    AssociatedClasses, DispatchError, DispatchResolver, DispatchResult, NoViableReason,
    Resolution,
};
pub use effects::{
    CallInfo, ConversionStep, EffectComputer, EffectiveCallResult, ReturnConversion,
};
pub use engine::{Engine, ResolvedCall};
pub use namespace::Namespace;
pub use node::{
    ConstraintRef, CpfDecl, CpfId, CpfNode, NoexceptCondition, NoexceptSpec, ReturnSpec,
};
pub use oracle::{
    most_specialized, ClassModel, ConstraintOracle, ConversionModel, IdentityConversions,
    PredicateOracle,
};
pub use registry::{Registry, RegistrationError, RegistrationResult, RegistryBuilder};
pub use types::{ParamType, TypeId, TypeKind, TypeRef};
