use rustc_hash::FxHashSet;
use tyck_common::TypeId;

use crate::arena::TypeArena;
use crate::types::Type;

/// Structural equality with an identity-comparison fast path.
///
/// Type graphs may be cyclic (recursive aliases); a `(a, b)` pair
/// already on the visited set is assumed equal on revisit rather than
/// recursing forever (assume structural equality on the first
/// visit of a given pair").
pub fn equals(arena: &TypeArena, a: TypeId, b: TypeId) -> bool {
    equals_inner(arena, a, b, &mut FxHashSet::default())
}

fn equals_inner(arena: &TypeArena, a: TypeId, b: TypeId, visiting: &mut FxHashSet<(TypeId, TypeId)>) -> bool {
    if a == b {
        return true;
    }
    let pair = (a, b);
    if !visiting.insert(pair) {
        return true;
    }
    let result = equals_structural(arena, a, b, visiting);
    visiting.remove(&pair);
    result
}

fn equals_structural(arena: &TypeArena, a: TypeId, b: TypeId, visiting: &mut FxHashSet<(TypeId, TypeId)>) -> bool {
    use Type::*;
    match (arena.get(a), arena.get(b)) {
        (Primitive(p1), Primitive(p2)) => p1 == p2,
        (Literal(l1), Literal(l2)) => l1.value == l2.value,
        (Array(e1), Array(e2)) => equals_inner(arena, *e1, *e2, visiting),
        (Tuple(t1), Tuple(t2)) => {
            t1.elements.len() == t2.elements.len()
                && t1.optional == t2.optional
                && t1
                    .elements
                    .iter()
                    .zip(&t2.elements)
                    .all(|(x, y)| equals_inner(arena, *x, *y, visiting))
                && match (t1.rest, t2.rest) {
                    (Some(r1), Some(r2)) => equals_inner(arena, r1, r2, visiting),
                    (None, None) => true,
                    _ => false,
                }
        }
        (Object(o1), Object(o2)) => {
            o1.properties.len() == o2.properties.len()
                && o1.properties.iter().all(|(name, ty)| {
                    o2.properties
                        .get(name)
                        .is_some_and(|other_ty| equals_inner(arena, *ty, *other_ty, visiting))
                })
                && o1.optional == o2.optional
                && o1.readonly == o2.readonly
                && o1.call_signatures.len() == o2.call_signatures.len()
                && o1
                    .call_signatures
                    .iter()
                    .zip(&o2.call_signatures)
                    .all(|(s1, s2)| signatures_equal(arena, s1, s2, visiting))
                && o1.construct_signatures.len() == o2.construct_signatures.len()
                && o1
                    .construct_signatures
                    .iter()
                    .zip(&o2.construct_signatures)
                    .all(|(s1, s2)| signatures_equal(arena, s1, s2, visiting))
                && o1.index_signatures.len() == o2.index_signatures.len()
                && o1.index_signatures.iter().zip(&o2.index_signatures).all(|(i1, i2)| {
                    i1.readonly == i2.readonly
                        && equals_inner(arena, i1.key, i2.key, visiting)
                        && equals_inner(arena, i1.value, i2.value, visiting)
                })
                && class_meta_equal(&o1.class_meta, &o2.class_meta)
        }
        (Union(m1), Union(m2)) | (Intersection(m1), Intersection(m2)) => {
            m1.len() == m2.len() && m1.iter().all(|x| m2.iter().any(|y| equals_inner(arena, *x, *y, visiting)))
        }
        (ParameterRef(p1), ParameterRef(p2)) => p1 == p2,
        (ForwardReference(n1), ForwardReference(n2)) => n1 == n2,
        (GenericForwardReference { name: n1, args: a1 }, GenericForwardReference { name: n2, args: a2 }) => {
            n1 == n2 && a1.len() == a2.len() && a1.iter().zip(a2).all(|(x, y)| equals_inner(arena, *x, *y, visiting))
        }
        (Enum(e1), Enum(e2)) => e1.name == e2.name,
        (EnumMember(m1), EnumMember(m2)) => {
            m1.enum_name == m2.enum_name && m1.member_name == m2.member_name
        }
        (Keyof(o1), Keyof(o2)) => equals_inner(arena, *o1, *o2, visiting),
        (IndexedAccess { object: o1, index: i1 }, IndexedAccess { object: o2, index: i2 }) => {
            equals_inner(arena, *o1, *o2, visiting) && equals_inner(arena, *i1, *i2, visiting)
        }
        (TypePredicate { param_name: n1, ty: t1 }, TypePredicate { param_name: n2, ty: t2 }) => {
            n1 == n2 && equals_inner(arena, *t1, *t2, visiting)
        }
        (Instantiated(i1), Instantiated(i2)) => equals_inner(arena, i1.result, i2.result, visiting),
        _ => false,
    }
}

fn class_meta_equal(a: &Option<crate::types::ClassMeta>, b: &Option<crate::types::ClassMeta>) -> bool {
    match (a, b) {
        (Some(m1), Some(m2)) => m1.class_name == m2.class_name && m1.is_instance == m2.is_instance && m1.is_constructor == m2.is_constructor,
        (None, None) => true,
        _ => false,
    }
}

fn signatures_equal(
    arena: &TypeArena,
    s1: &crate::types::Signature,
    s2: &crate::types::Signature,
    visiting: &mut FxHashSet<(TypeId, TypeId)>,
) -> bool {
    s1.param_types.len() == s2.param_types.len()
        && s1.variadic == s2.variadic
        && s1
            .param_types
            .iter()
            .zip(&s2.param_types)
            .all(|(x, y)| equals_inner(arena, *x, *y, visiting))
        && equals_inner(arena, s1.return_type, s2.return_type, visiting)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LiteralType, Primitive};
    use tyck_ast::Value;

    #[test]
    fn identical_ids_are_equal_without_recursing() {
        let mut arena = TypeArena::new();
        let s = arena.primitive(Primitive::String);
        assert!(equals(&arena, s, s));
    }

    #[test]
    fn structurally_identical_literals_are_equal() {
        let mut arena = TypeArena::new();
        let a = arena.alloc(Type::Literal(LiteralType {
            value: Value::String("x".into()),
        }));
        let b = arena.alloc(Type::Literal(LiteralType {
            value: Value::String("x".into()),
        }));
        assert!(equals(&arena, a, b));
    }

    #[test]
    fn recursive_aliases_do_not_infinite_loop() {
        let mut arena = TypeArena::new();
        let a = arena.alloc(Type::ForwardReference("placeholder".into()));
        let array_a = arena.alloc(Type::Array(a));
        arena.replace(a, Type::Array(array_a));
        // comparing the cyclic type to itself must terminate
        assert!(equals(&arena, a, a));
    }
}
