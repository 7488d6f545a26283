//! Customization point function declarations.
//!
//! A [`CpfDecl`] is what the host hands over when it processes a declaration.
//! Once registered it becomes a [`CpfNode`]: an immutable tree node that knows
//! its parent, its seed, its depth, and (in insertion order) its children.

use std::fmt;
use std::sync::Arc;

use crate::namespace::Namespace;
use crate::types::{ParamType, TypeRef};

/// Identity of a registered declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CpfId {
    pub index: u32,
}

impl CpfId {
    pub const fn new(index: u32) -> Self {
        Self { index }
    }
}

impl fmt::Display for CpfId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// Opaque handle to a constraint (a requires-clause or concept check).
///
/// The engine only stores and forwards it; satisfaction is decided by the
/// [`ConstraintOracle`](crate::oracle::ConstraintOracle).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConstraintRef {
    pub id: u32,
    pub text: Arc<str>,
}

impl ConstraintRef {
    pub fn new(id: u32, text: impl Into<Arc<str>>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

impl fmt::Display for ConstraintRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Opaque `noexcept(expr)` operand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NoexceptCondition {
    pub text: Arc<str>,
}

impl NoexceptCondition {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self { text: text.into() }
    }
}

/// Declared return type of a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReturnSpec {
    /// A fixed return type.
    Concrete(TypeRef),
    /// `auto` / `decltype(auto)`, optionally constrained (`std::integral auto`).
    Deduced { constraint: Option<ConstraintRef> },
}

impl ReturnSpec {
    /// Shorthand for an unconstrained deduced return type.
    pub fn deduced() -> Self {
        ReturnSpec::Deduced { constraint: None }
    }

    pub fn is_deduced(&self) -> bool {
        matches!(self, ReturnSpec::Deduced { .. })
    }

    /// The concrete type, if this is not a deduced return.
    pub fn concrete(&self) -> Option<&TypeRef> {
        match self {
            ReturnSpec::Concrete(ty) => Some(ty),
            ReturnSpec::Deduced { .. } => None,
        }
    }
}

impl fmt::Display for ReturnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnSpec::Concrete(ty) => write!(f, "{ty}"),
            ReturnSpec::Deduced { constraint: None } => f.write_str("auto"),
            ReturnSpec::Deduced {
                constraint: Some(c),
            } => write!(f, "{c} auto"),
        }
    }
}

/// Declared exception specification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum NoexceptSpec {
    /// `noexcept` / `noexcept(true)`.
    True,
    /// No specification, or `noexcept(false)`.
    #[default]
    False,
    /// `noexcept(expr)`, evaluated per call.
    Conditional(NoexceptCondition),
}

impl NoexceptSpec {
    pub fn is_unconditionally_true(&self) -> bool {
        matches!(self, NoexceptSpec::True)
    }
}

impl fmt::Display for NoexceptSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoexceptSpec::True => f.write_str("noexcept(true)"),
            NoexceptSpec::False => f.write_str("noexcept(false)"),
            NoexceptSpec::Conditional(cond) => write!(f, "noexcept({})", cond.text),
        }
    }
}

/// A declaration as processed by the host front-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpfDecl {
    /// Present for seeds and named overrides; absent for unnamed overrides.
    pub name: Option<String>,
    /// The namespace the declaration appears in.
    pub namespace: Namespace,
    /// The overridden declaration; `None` for a seed.
    pub parent: Option<CpfId>,
    /// Declared parameter types.
    pub parameters: Vec<ParamType>,
    pub return_spec: ReturnSpec,
    pub noexcept: NoexceptSpec,
    /// Declared without a body (`= 0`).
    pub is_pure: bool,
    /// Declared `final`: no further overrides allowed.
    pub is_final: bool,
    /// Owning class for overrides declared as friends inside a class body.
    pub friend_scope: Option<TypeRef>,
    /// Requires-clause, if any.
    pub constraint: Option<ConstraintRef>,
}

impl CpfDecl {
    /// An unnamed, unconstrained, non-pure, non-final declaration.
    pub fn new(namespace: impl Into<Namespace>, return_spec: ReturnSpec) -> Self {
        Self {
            name: None,
            namespace: namespace.into(),
            parent: None,
            parameters: Vec::new(),
            return_spec,
            noexcept: NoexceptSpec::False,
            is_pure: false,
            is_final: false,
            friend_scope: None,
            constraint: None,
        }
    }

    /// A seed declaration (the root of a customization point).
    pub fn seed(namespace: impl Into<Namespace>, name: &str, return_spec: ReturnSpec) -> Self {
        Self::new(namespace, return_spec).named(name)
    }

    /// An unnamed override of `parent`.
    pub fn override_of(
        parent: CpfId,
        namespace: impl Into<Namespace>,
        return_spec: ReturnSpec,
    ) -> Self {
        Self::new(namespace, return_spec).overriding(parent)
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn overriding(mut self, parent: CpfId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_params(mut self, parameters: Vec<ParamType>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_constraint(mut self, constraint: ConstraintRef) -> Self {
        self.constraint = Some(constraint);
        self
    }

    pub fn with_noexcept(mut self, noexcept: NoexceptSpec) -> Self {
        self.noexcept = noexcept;
        self
    }

    /// Mark as pure (declared without a body).
    pub fn pure(mut self) -> Self {
        self.is_pure = true;
        self
    }

    /// Mark as `final`.
    pub fn marked_final(mut self) -> Self {
        self.is_final = true;
        self
    }

    /// Declare as a friend inside `class`.
    pub fn friend_of(mut self, class: TypeRef) -> Self {
        self.friend_scope = Some(class);
        self
    }
}

/// A registered, immutable declaration.
#[derive(Debug, Clone)]
pub struct CpfNode {
    id: CpfId,
    seed: CpfId,
    depth: usize,
    decl: CpfDecl,
    children: Vec<CpfId>,
}

impl CpfNode {
    pub(crate) fn new(id: CpfId, seed: CpfId, depth: usize, decl: CpfDecl) -> Self {
        Self {
            id,
            seed,
            depth,
            decl,
            children: Vec::new(),
        }
    }

    pub(crate) fn push_child(&mut self, child: CpfId) {
        self.children.push(child);
    }

    pub fn id(&self) -> CpfId {
        self.id
    }

    /// The root of the tree this node belongs to (itself, for a seed).
    pub fn seed(&self) -> CpfId {
        self.seed
    }

    /// Distance from the seed; seeds have depth 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn decl(&self) -> &CpfDecl {
        &self.decl
    }

    pub fn name(&self) -> Option<&str> {
        self.decl.name.as_deref()
    }

    pub fn namespace(&self) -> &Namespace {
        &self.decl.namespace
    }

    pub fn parent(&self) -> Option<CpfId> {
        self.decl.parent
    }

    pub fn parameters(&self) -> &[ParamType] {
        &self.decl.parameters
    }

    pub fn return_spec(&self) -> &ReturnSpec {
        &self.decl.return_spec
    }

    pub fn noexcept(&self) -> &NoexceptSpec {
        &self.decl.noexcept
    }

    pub fn is_pure(&self) -> bool {
        self.decl.is_pure
    }

    pub fn is_final(&self) -> bool {
        self.decl.is_final
    }

    pub fn is_seed(&self) -> bool {
        self.decl.parent.is_none()
    }

    pub fn friend_scope(&self) -> Option<&TypeRef> {
        self.decl.friend_scope.as_ref()
    }

    pub fn constraint(&self) -> Option<&ConstraintRef> {
        self.decl.constraint.as_ref()
    }

    /// Direct overrides, in registration order.
    pub fn children(&self) -> &[CpfId] {
        &self.children
    }

    /// Name used in diagnostics: the qualified name, or a positional label
    /// for unnamed overrides.
    pub fn display_name(&self) -> String {
        match self.name() {
            Some(name) => self.namespace().qualify(name),
            None => format!("<unnamed override {}>", self.id),
        }
    }
}

impl fmt::Display for CpfNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}(", self.decl.return_spec, self.display_name())?;
        for (i, param) in self.decl.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, ")")?;
        if let Some(constraint) = &self.decl.constraint {
            write!(f, " requires {constraint}")?;
        }
        if self.decl.is_pure {
            write!(f, " = 0")?;
        }
        Ok(())
    }
}
