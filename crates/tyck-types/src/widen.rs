use tyck_common::TypeId;

use crate::arena::TypeArena;
use crate::types::{Primitive, Type};

/// `Widen(t)` — literal types fall back to their base primitive, tuples
/// fall back to `Array<union-of-elements>`, readonly markers are
/// dropped. Used when a variable's declared type is inferred from an
/// initializer rather than an explicit annotation.
///
/// Idempotent: `widen(widen(t)) == widen(t)`, since every
/// branch either returns `t` unchanged or a type this function would
/// widen to itself on a second pass.
pub fn widen(arena: &mut TypeArena, t: TypeId) -> TypeId {
    match arena.get(t).clone() {
        Type::Literal(lit) => arena.primitive(lit.base_primitive()),
        Type::Tuple(tuple) => {
            let element = crate::union_intersection::new_union(arena, tuple.elements.clone());
            let element = widen(arena, element);
            arena.alloc(Type::Array(element))
        }
        Type::Array(elem) => {
            let widened = widen(arena, elem);
            if widened == elem {
                t
            } else {
                arena.alloc(Type::Array(widened))
            }
        }
        Type::Union(members) => {
            let widened: Vec<TypeId> = members.iter().map(|m| widen(arena, *m)).collect();
            crate::union_intersection::new_union(arena, widened)
        }
        _ => t,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LiteralType;
    use tyck_ast::Value;

    #[test]
    fn string_literal_widens_to_string() {
        let mut arena = TypeArena::new();
        let lit = arena.alloc(Type::Literal(LiteralType {
            value: Value::String("hi".into()),
        }));
        let widened = widen(&mut arena, lit);
        assert!(matches!(arena.get(widened), Type::Primitive(Primitive::String)));
    }

    #[test]
    fn widen_is_idempotent() {
        let mut arena = TypeArena::new();
        let lit = arena.alloc(Type::Literal(LiteralType {
            value: Value::Number(1.0),
        }));
        let once = widen(&mut arena, lit);
        let twice = widen(&mut arena, once);
        assert_eq!(once, twice);
    }

    #[test]
    fn tuple_widens_to_array_of_union() {
        let mut arena = TypeArena::new();
        let a = arena.alloc(Type::Literal(LiteralType {
            value: Value::String("a".into()),
        }));
        let b = arena.alloc(Type::Literal(LiteralType {
            value: Value::String("b".into()),
        }));
        let tuple = arena.alloc(Type::Tuple(crate::types::TupleType {
            elements: vec![a, b],
            optional: vec![false, false],
            rest: None,
        }));
        let widened = widen(&mut arena, tuple);
        match arena.get(widened) {
            Type::Array(elem) => {
                assert!(matches!(arena.get(*elem), Type::Primitive(Primitive::String)));
            }
            other => panic!("expected Array, got {other:?}"),
        }
    }
}
