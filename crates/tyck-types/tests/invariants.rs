//! The testable properties the type algebra promises.

use tyck_types::{
    equals, is_assignable, new_union, substitute, widen, LiteralType, Primitive, SubstitutionMap, Type, TypeArena,
};

#[test]
fn equals_implies_mutual_assignability() {
    let mut arena = TypeArena::new();
    let a = arena.alloc(Type::Literal(LiteralType {
        value: tyck_ast::Value::Number(1.0),
    }));
    let b = arena.alloc(Type::Literal(LiteralType {
        value: tyck_ast::Value::Number(1.0),
    }));
    assert!(equals(&arena, a, b));
    assert!(is_assignable(&arena, a, b));
    assert!(is_assignable(&arena, b, a));
}

#[test]
fn everything_is_assignable_to_and_from_any_and_never_assigns_to_anything() {
    let mut arena = TypeArena::new();
    let any = arena.any();
    let never = arena.never();
    let string = arena.primitive(Primitive::String);
    let obj = arena.alloc(Type::Object(tyck_types::ObjectType::empty()));

    for t in [string, obj, any] {
        assert!(is_assignable(&arena, t, any));
        assert!(is_assignable(&arena, any, t));
        assert!(is_assignable(&arena, never, t));
    }
}

#[test]
fn union_construction_is_idempotent_and_absorbs_never() {
    let mut arena = TypeArena::new();
    let a = arena.primitive(Primitive::String);
    let never = arena.never();
    assert_eq!(new_union(&mut arena, [a, a]), a);
    assert_eq!(new_union(&mut arena, [a, never]), a);
}

#[test]
fn substitution_is_idempotent_when_the_map_range_is_disjoint_from_its_domain() {
    let mut arena = TypeArena::new();
    let param = arena.alloc(Type::TypeParameter(tyck_types::TypeParameter {
        name: "T".into(),
        constraint: None,
        default: None,
    }));
    let param_ref = arena.alloc(Type::ParameterRef(param));
    let array_of_param = arena.alloc(Type::Array(param_ref));
    let string = arena.primitive(Primitive::String);

    let mut map = SubstitutionMap::default();
    map.insert(param, string);

    let once = substitute(&mut arena, array_of_param, &map);
    let twice = substitute(&mut arena, once, &map);
    assert_eq!(once, twice);
}

#[test]
fn widen_of_a_string_literal_is_string_and_widen_is_idempotent() {
    let mut arena = TypeArena::new();
    let lit = arena.alloc(Type::Literal(LiteralType {
        value: tyck_ast::Value::String("x".into()),
    }));
    let widened = widen(&mut arena, lit);
    assert!(matches!(arena.get(widened), Type::Primitive(Primitive::String)));
    assert_eq!(widen(&mut arena, widened), widened);
}

#[test]
fn interface_extends_inherits_required_properties_unless_overridden() {
    let mut arena = TypeArena::new();
    let number = arena.primitive(Primitive::Number);
    let string = arena.primitive(Primitive::String);

    let mut base = tyck_types::ObjectType::empty();
    base.properties.insert("id".into(), number);
    base.properties.insert("name".into(), string);

    let mut derived = tyck_types::ObjectType::empty();
    derived.properties.insert("id".into(), number);
    derived.properties.insert("name".into(), string);
    derived.properties.insert("extra".into(), number);

    let base_id = arena.alloc(Type::Object(base));
    let derived_id = arena.alloc(Type::Object(derived));

    assert!(is_assignable(&arena, derived_id, base_id));
}
