//! End-to-end scenarios for customization point resolution.
//!
//! These tests drive the engine the way a front-end would: register
//! declarations during a load phase, seal, then resolve calls and compute
//! their effects.

mod common;

use cpfc::{
    CallInfo, CallPolicy, ClassTable, ConstraintRef, ConversionModel, ConversionStep, CpfDecl,
    DispatchError, Engine, EngineConfig, Namespace, NoViableReason, NoexceptSpec, ParamType,
    RegistrationError, Registry, RegistryBuilder, ReturnConversion, ReturnSpec, TypeRef,
};
use pretty_assertions::assert_eq;

use common::{init_tracing, ConceptOracle};

fn input_iterator() -> ConstraintRef {
    ConstraintRef::new(1, "input_iterator<It>")
}

fn bidirectional_iterator() -> ConstraintRef {
    ConstraintRef::new(2, "bidirectional_iterator<It>")
}

fn random_access_iterator() -> ConstraintRef {
    ConstraintRef::new(3, "random_access_iterator<It>")
}

fn regular() -> ConstraintRef {
    ConstraintRef::new(4, "regular<T>")
}

fn istream_iterator() -> TypeRef {
    TypeRef::class(100, "istream_iterator<int>")
}

fn list_iterator() -> TypeRef {
    TypeRef::class(101, "list<int>::iterator")
}

fn vector_iterator() -> TypeRef {
    TypeRef::class(102, "vector<int>::iterator")
}

fn difference_type() -> TypeRef {
    TypeRef::other(1, "ptrdiff_t")
}

fn iterator_oracle() -> ConceptOracle {
    let (input, bidi, random) = (
        input_iterator(),
        bidirectional_iterator(),
        random_access_iterator(),
    );
    ConceptOracle::new()
        .concept(&bidi, &[&input])
        .concept(&random, &[&bidi])
        .model(&istream_iterator(), &[&input])
        .model(&list_iterator(), &[&input, &bidi])
        .model(&vector_iterator(), &[&input, &bidi, &random])
}

fn iterator_params() -> Vec<ParamType> {
    vec![
        ParamType::dependent("It&"),
        ParamType::Concrete(difference_type()),
    ]
}

fn advance_args(it: TypeRef) -> Vec<TypeRef> {
    vec![it, difference_type()]
}

/// Scenario 1 tree: `advance` <- `advance_bidirectional` <- `advance_random_access`.
fn advance_registry() -> Registry {
    let mut builder = RegistryBuilder::new();
    let seed = builder
        .register(
            CpfDecl::seed("std", "advance", ReturnSpec::deduced())
                .with_params(iterator_params())
                .with_constraint(input_iterator()),
        )
        .unwrap();
    let bidi = builder
        .register(
            CpfDecl::override_of(seed, "std", ReturnSpec::deduced())
                .named("advance_bidirectional")
                .with_params(iterator_params())
                .with_constraint(bidirectional_iterator()),
        )
        .unwrap();
    builder
        .register(
            CpfDecl::override_of(bidi, "std", ReturnSpec::deduced())
                .named("advance_random_access")
                .with_params(iterator_params())
                .with_constraint(random_access_iterator()),
        )
        .unwrap();
    builder.seal()
}

fn name_of(registry: &Registry, resolution: &cpfc::Resolution) -> String {
    registry.node(resolution.target).unwrap().display_name()
}

#[test]
fn scenario_iterator_hierarchy() {
    init_tracing();
    let registry = advance_registry();
    let engine = Engine::new(&registry, iterator_oracle(), ClassTable::new());
    let std_ns = Namespace::new("std");
    let seed = registry.lookup_by_name(&std_ns, "advance").unwrap().id();

    let resolution = engine.resolve(seed, &advance_args(vector_iterator())).unwrap();
    assert_eq!(name_of(&registry, &resolution), "std::advance_random_access");
    assert_eq!(resolution.descent(), 2);

    let resolution = engine.resolve(seed, &advance_args(list_iterator())).unwrap();
    assert_eq!(name_of(&registry, &resolution), "std::advance_bidirectional");

    let resolution = engine.resolve(seed, &advance_args(istream_iterator())).unwrap();
    assert_eq!(resolution.target, seed);
    assert_eq!(resolution.path, vec![seed]);
}

#[test]
fn scenario_explicit_call_of_named_override() {
    let registry = advance_registry();
    let engine = Engine::new(&registry, iterator_oracle(), ClassTable::new());
    let std_ns = Namespace::new("std");

    let resolution = engine
        .resolve_by_name(&std_ns, "advance_bidirectional", &advance_args(vector_iterator()))
        .unwrap();
    assert_eq!(name_of(&registry, &resolution), "std::advance_random_access");

    let err = engine
        .resolve_by_name(&std_ns, "advance_random_access", &advance_args(list_iterator()))
        .unwrap_err();
    assert!(err.is_no_viable_candidate());
}

#[test]
fn scenario_pure_seed_without_overrides() {
    let mut builder = RegistryBuilder::new();
    let seed = builder
        .register(
            CpfDecl::seed("std::ranges", "begin", ReturnSpec::deduced())
                .with_params(vec![ParamType::dependent("R&&")])
                .pure(),
        )
        .unwrap();
    let registry = builder.seal();
    let engine = Engine::new(&registry, iterator_oracle(), ClassTable::new());

    for ty in [vector_iterator(), difference_type(), TypeRef::class(7, "Widget")] {
        let err = engine.resolve(seed, &[ty]).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::NoViableCandidate {
                reason: NoViableReason::PureWithoutOverride { .. },
                ..
            }
        ));
        assert!(!engine.is_callable(seed, &[TypeRef::class(7, "Widget")]));
    }
}

#[test]
fn scenario_equally_specialized_siblings() {
    let mut builder = RegistryBuilder::new();
    let seed = builder
        .register(
            CpfDecl::seed("lib", "distance", ReturnSpec::deduced()).with_params(iterator_params()),
        )
        .unwrap();
    for name in ["distance_fast", "distance_faster"] {
        builder
            .register(
                CpfDecl::override_of(seed, "lib", ReturnSpec::deduced())
                    .named(name)
                    .with_params(iterator_params())
                    .with_constraint(random_access_iterator()),
            )
            .unwrap();
    }
    let registry = builder.seal();
    let engine = Engine::new(&registry, iterator_oracle(), ClassTable::new());

    let err = engine.resolve(seed, &advance_args(vector_iterator())).unwrap_err();
    match err {
        DispatchError::AmbiguousOverride {
            candidate_names, ..
        } => assert_eq!(
            candidate_names,
            vec!["lib::distance_fast".to_string(), "lib::distance_faster".to_string()]
        ),
        other => panic!("Expected AmbiguousOverride, got {:?}", other),
    }

    // Arguments that satisfy neither override never reach the tie
    let resolution = engine.resolve(seed, &advance_args(list_iterator())).unwrap();
    assert_eq!(resolution.target, seed);
}

#[test]
fn scenario_final_override_rejected() {
    let mut builder = RegistryBuilder::new();
    let seed = builder
        .register(CpfDecl::seed("std", "hash_value", ReturnSpec::deduced()))
        .unwrap();
    let sealed_leaf = builder
        .register(
            CpfDecl::override_of(seed, "std", ReturnSpec::deduced())
                .named("hash_value_final")
                .marked_final(),
        )
        .unwrap();
    let before = builder.len();

    let err = builder
        .register(CpfDecl::override_of(sealed_leaf, "std", ReturnSpec::deduced()))
        .unwrap_err();
    assert!(matches!(err, RegistrationError::FinalOverride { parent, .. } if parent == sealed_leaf));
    assert_eq!(builder.len(), before);

    let registry = builder.seal();
    for node in registry.iter() {
        if let Some(parent) = node.parent() {
            assert!(!registry.node(parent).unwrap().is_final());
        }
    }
}

#[test]
fn scenario_friend_override_requires_associated_class() {
    let widget = TypeRef::class(200, "Widget");
    let gadget = TypeRef::class(201, "Gadget");
    let element = TypeRef::class(202, "Widget::Element");

    let mut builder = RegistryBuilder::new();
    let seed = builder
        .register(
            CpfDecl::seed("lib", "swap", ReturnSpec::deduced())
                .with_params(vec![ParamType::dependent("T&"), ParamType::dependent("T&")])
                .with_constraint(regular()),
        )
        .unwrap();
    let friend = builder
        .register(
            CpfDecl::override_of(seed, "lib", ReturnSpec::deduced())
                .with_params(vec![ParamType::dependent("T&"), ParamType::dependent("T&")])
                .with_constraint(regular())
                .friend_of(widget.clone()),
        )
        .unwrap();
    let registry = builder.seal();

    let regular = regular();
    let oracle = ConceptOracle::new()
        .model(&widget, &[&regular])
        .model(&gadget, &[&regular])
        .model(&element, &[&regular]);
    let mut classes = ClassTable::new();
    classes.set_enclosing(&element, &widget);
    let engine = Engine::new(&registry, oracle, classes);

    // Viable, but Widget is not associated with Gadget
    let resolution = engine.resolve(seed, &[gadget.clone(), gadget]).unwrap();
    assert_eq!(resolution.target, seed);

    let resolution = engine.resolve(seed, &[widget.clone(), widget]).unwrap();
    assert_eq!(resolution.target, friend);

    // A nested class makes its enclosing class associated
    let resolution = engine.resolve(seed, &[element.clone(), element]).unwrap();
    assert_eq!(resolution.target, friend);
}

// === Effects ===

fn size_type() -> TypeRef {
    TypeRef::other(2, "size_t")
}

fn unsigned_int() -> TypeRef {
    TypeRef::other(3, "unsigned")
}

/// Integral promotions to `size_t`, all non-throwing.
struct Promotions;

impl ConversionModel for Promotions {
    fn is_implicitly_convertible(&self, from: &TypeRef, to: &TypeRef) -> bool {
        from == to || (*from == unsigned_int() && *to == size_type())
    }

    fn is_nothrow_convertible(&self, from: &TypeRef, to: &TypeRef) -> bool {
        self.is_implicitly_convertible(from, to)
    }
}

fn size_registry() -> Registry {
    let mut builder = RegistryBuilder::new().with_conversions(Promotions);
    let seed = builder
        .register(
            CpfDecl::seed("std", "size", ReturnSpec::Concrete(size_type()))
                .with_params(vec![ParamType::dependent("const C&")]),
        )
        .unwrap();
    builder
        .register(
            CpfDecl::override_of(seed, "std", ReturnSpec::Concrete(unsigned_int()))
                .named("size_small")
                .with_params(vec![ParamType::dependent("const C&")])
                .with_constraint(input_iterator())
                .with_noexcept(NoexceptSpec::True),
        )
        .unwrap();
    builder.seal()
}

#[test]
fn effects_forwarding_converts_to_seed_type() {
    let registry = size_registry();
    let engine = Engine::new(&registry, iterator_oracle(), ClassTable::new())
        .with_conversions(Promotions);
    let seed = registry.lookup_by_name(&Namespace::new("std"), "size").unwrap().id();

    let call = CallInfo::new(vec![vector_iterator()]);
    let resolved = engine.call(seed, &call).unwrap();
    assert_eq!(resolved.effects.result_type, ReturnSpec::Concrete(size_type()));
    assert_eq!(
        resolved.effects.return_conversion,
        ReturnConversion::Implicit {
            from: unsigned_int(),
            to: size_type(),
        }
    );
    assert!(resolved.effects.is_noexcept);

    // A throwing argument conversion makes the call potentially throwing
    let call = call.with_conversion(ConversionStep::new(
        0,
        vector_iterator(),
        vector_iterator(),
        false,
    ));
    assert!(!engine.call(seed, &call).unwrap().effects.is_noexcept);

    // Falling back to the (throwing) seed
    let resolved = engine.call(seed, &CallInfo::new(vec![difference_type()])).unwrap();
    assert_eq!(resolved.resolution.target, seed);
    assert_eq!(
        resolved.effects.return_conversion,
        ReturnConversion::Identity(size_type())
    );
    assert!(!resolved.effects.is_noexcept);
}

#[test]
fn effects_flat_policy_from_config() {
    let registry = size_registry();
    let config = EngineConfig::from_toml_str("call_policy = \"flat-overload-set\"").unwrap();
    let engine = Engine::new(&registry, iterator_oracle(), ClassTable::new())
        .with_conversions(Promotions)
        .with_config(config);
    assert_eq!(engine.config().call_policy, CallPolicy::FlatOverloadSet);

    let seed = registry.lookup_by_name(&Namespace::new("std"), "size").unwrap().id();
    let resolved = engine.call(seed, &CallInfo::new(vec![vector_iterator()])).unwrap();
    assert_eq!(resolved.effects.result_type, ReturnSpec::Concrete(unsigned_int()));
}

#[test]
fn effects_require_conversion_known_to_engine() {
    let registry = size_registry();
    // Identity conversions only
    let engine = Engine::new(&registry, iterator_oracle(), ClassTable::new());
    let seed = registry.lookup_by_name(&Namespace::new("std"), "size").unwrap().id();

    let err = engine.call(seed, &CallInfo::new(vec![vector_iterator()])).unwrap_err();
    match err {
        DispatchError::ReturnNotConvertible { target_name, from, to, .. } => {
            assert_eq!(target_name, "std::size_small");
            assert_eq!((from, to), (unsigned_int(), size_type()));
        }
        other => panic!("Expected ReturnNotConvertible, got {:?}", other),
    }

    // Resolution alone does not look at return types
    let resolution = engine.resolve(seed, &[vector_iterator()]).unwrap();
    assert_eq!(name_of(&registry, &resolution), "std::size_small");
}

#[test]
fn registration_rejects_unrelated_return_type() {
    let mut builder = RegistryBuilder::new();
    let seed = builder
        .register(CpfDecl::seed("std", "size", ReturnSpec::Concrete(size_type())))
        .unwrap();
    let err = builder
        .register(CpfDecl::override_of(
            seed,
            "std",
            ReturnSpec::Concrete(TypeRef::class(9, "std::string")),
        ))
        .unwrap_err();
    assert!(matches!(err, RegistrationError::ReturnTypeMismatch { .. }));
    assert_eq!(builder.len(), 1);
}

#[test]
fn unnamed_override_cannot_be_called_directly() {
    let mut builder = RegistryBuilder::new();
    let seed = builder
        .register(
            CpfDecl::seed("lib", "f", ReturnSpec::deduced())
                .with_params(vec![ParamType::dependent("T")]),
        )
        .unwrap();
    let unnamed = builder
        .register(
            CpfDecl::override_of(seed, "lib", ReturnSpec::deduced())
                .with_params(vec![ParamType::dependent("T")]),
        )
        .unwrap();
    let registry = builder.seal();
    let engine = Engine::new(&registry, iterator_oracle(), ClassTable::new());
    let widget = TypeRef::class(7, "Widget");

    assert_eq!(
        engine.resolve(unnamed, &[widget.clone()]).unwrap_err(),
        DispatchError::UnnamedEntryPoint { id: unnamed }
    );
    assert_eq!(engine.resolve(seed, &[widget]).unwrap().target, unnamed);
}

// === Sharing ===

#[test]
fn sealed_registry_is_shared_across_threads() {
    let registry = advance_registry();
    let engine = Engine::new(&registry, iterator_oracle(), ClassTable::new());
    let seed = registry
        .lookup_by_name(&Namespace::new("std"), "advance")
        .unwrap()
        .id();
    let expected = engine.resolve(seed, &advance_args(vector_iterator())).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let engine = engine.clone();
                scope.spawn(move || engine.resolve(seed, &advance_args(vector_iterator())))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), expected);
        }
    });
}

#[test]
fn process_wide_registry() {
    let installed = cpfc::registry::install(advance_registry()).unwrap();
    assert!(std::ptr::eq(installed, cpfc::registry::global().unwrap()));

    let engine = Engine::new(installed, iterator_oracle(), ClassTable::new());
    let resolution = engine
        .resolve_by_name(&Namespace::new("std"), "advance", &advance_args(list_iterator()))
        .unwrap();
    assert_eq!(name_of(installed, &resolution), "std::advance_bidirectional");
}
