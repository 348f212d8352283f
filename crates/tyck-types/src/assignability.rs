use rustc_hash::FxHashSet;
use tyck_common::TypeId;

use crate::arena::TypeArena;
use crate::types::{Primitive, Type};

/// `IsAssignable(src, tgt)` — the core relation, applied in
/// the order these rules are usually checked so earlier, cheaper checks
/// (identity, `any`/`unknown`/`never`) short-circuit before the
/// structural cases.
pub fn is_assignable(arena: &TypeArena, src: TypeId, tgt: TypeId) -> bool {
    is_assignable_inner(arena, src, tgt, &mut FxHashSet::default())
}

fn is_assignable_inner(arena: &TypeArena, src: TypeId, tgt: TypeId, visiting: &mut FxHashSet<(TypeId, TypeId)>) -> bool {
    if src == tgt {
        return true;
    }
    let pair = (src, tgt);
    if !visiting.insert(pair) {
        return true;
    }
    let result = is_assignable_structural(arena, src, tgt, visiting);
    visiting.remove(&pair);
    result
}

fn is_assignable_structural(
    arena: &TypeArena,
    src: TypeId,
    tgt: TypeId,
    visiting: &mut FxHashSet<(TypeId, TypeId)>,
) -> bool {
    use Type::*;

    if let Primitive(Primitive::Any | Primitive::Unknown) = arena.get(tgt) {
        return true;
    }
    if let Primitive(Primitive::Any) = arena.get(src) {
        return true;
    }
    if let Primitive(Primitive::Never) = arena.get(src) {
        return true;
    }

    match (arena.get(src), arena.get(tgt)) {
        (Primitive(p1), Primitive(p2)) => p1 == p2,

        (Literal(l), Primitive(p)) => l.base_primitive() == *p,
        (Literal(l1), Literal(l2)) => l1.value == l2.value,
        (Literal(_), Union(members)) => members
            .iter()
            .any(|m| is_assignable_inner(arena, src, *m, visiting)),

        (Union(members), _) => members
            .iter()
            .all(|m| is_assignable_inner(arena, *m, tgt, visiting)),
        (_, Union(members)) => members
            .iter()
            .any(|m| is_assignable_inner(arena, src, *m, visiting)),

        (Intersection(members), _) => members
            .iter()
            .any(|m| is_assignable_inner(arena, *m, tgt, visiting)),
        (_, Intersection(members)) => members
            .iter()
            .all(|m| is_assignable_inner(arena, src, *m, visiting)),

        (Array(e1), Array(e2)) => is_assignable_inner(arena, *e1, *e2, visiting),
        (Tuple(t), Array(e)) => t
            .elements
            .iter()
            .all(|x| is_assignable_inner(arena, *x, *e, visiting))
            && match t.rest {
                Some(r) => is_assignable_inner(arena, r, *e, visiting),
                None => true,
            },
        (Array(e), Tuple(t)) => t.rest.is_some()
            && t.elements
                .iter()
                .all(|x| is_assignable_inner(arena, *e, *x, visiting)),
        (Tuple(t1), Tuple(t2)) => tuple_assignable(arena, t1, t2, visiting),

        (Object(o1), Object(o2)) => object_assignable(arena, o1, o2, visiting),

        // An unconstrained type parameter's upper bound is `unknown`: as a
        // source it is assignable only to `any`/`unknown` (already
        // handled above), and as a target `unknown` accepts anything.
        (TypeParameter(tp), _) => match tp.constraint {
            Some(upper) => is_assignable_inner(arena, upper, tgt, visiting),
            None => false,
        },
        (ParameterRef(p), _) => is_assignable_inner(arena, *p, tgt, visiting),
        (_, ParameterRef(p)) => is_assignable_inner(arena, src, *p, visiting),
        (_, TypeParameter(tp)) => match tp.constraint {
            Some(upper) => is_assignable_inner(arena, src, upper, visiting),
            None => true,
        },

        (EnumMember(m), Enum(e)) => m.enum_name == e.name,
        (Enum(e1), Enum(e2)) => e1.name == e2.name,

        (Instantiated(i1), _) => is_assignable_inner(arena, i1.result, tgt, visiting),
        (_, Instantiated(i2)) => is_assignable_inner(arena, src, i2.result, visiting),

        _ => crate::equals::equals(arena, src, tgt),
    }
}

fn tuple_assignable(
    arena: &TypeArena,
    src: &crate::types::TupleType,
    tgt: &crate::types::TupleType,
    visiting: &mut FxHashSet<(TypeId, TypeId)>,
) -> bool {
    let required_len = tgt.optional.iter().filter(|o| !**o).count();
    if tgt.rest.is_none() && src.elements.len() != tgt.elements.len() {
        return false;
    }
    if src.elements.len() < required_len {
        return false;
    }
    for (i, tgt_elem) in tgt.elements.iter().enumerate() {
        match src.elements.get(i) {
            Some(src_elem) => {
                if !is_assignable_inner(arena, *src_elem, *tgt_elem, visiting) {
                    return false;
                }
            }
            None => {
                if !tgt.optional.get(i).copied().unwrap_or(false) {
                    return false;
                }
            }
        }
    }
    if let Some(rest) = tgt.rest {
        for extra in src.elements.iter().skip(tgt.elements.len()) {
            if !is_assignable_inner(arena, *extra, rest, visiting) {
                return false;
            }
        }
    }
    true
}

fn object_assignable(
    arena: &TypeArena,
    src: &crate::types::ObjectType,
    tgt: &crate::types::ObjectType,
    visiting: &mut FxHashSet<(TypeId, TypeId)>,
) -> bool {
    for (name, tgt_ty) in &tgt.properties {
        if tgt.optional.contains(name) {
            continue;
        }
        let Some(src_ty) = src.properties.get(name) else {
            if src
                .index_signatures
                .iter()
                .any(|ix| is_assignable_inner(arena, *tgt_ty, ix.value, visiting))
            {
                continue;
            }
            return false;
        };
        if !is_assignable_inner(arena, *src_ty, *tgt_ty, visiting) {
            return false;
        }
    }

    if tgt.call_signatures.len() > src.call_signatures.len() {
        return false;
    }
    for (tgt_sig, src_sig) in tgt.call_signatures.iter().zip(&src.call_signatures) {
        if !signature_compatible(arena, src_sig, tgt_sig, visiting) {
            return false;
        }
    }
    if tgt.construct_signatures.len() > src.construct_signatures.len() {
        return false;
    }
    for (tgt_sig, src_sig) in tgt.construct_signatures.iter().zip(&src.construct_signatures) {
        if !signature_compatible(arena, src_sig, tgt_sig, visiting) {
            return false;
        }
    }

    for tgt_ix in &tgt.index_signatures {
        let covered = src.index_signatures.iter().any(|src_ix| {
            is_assignable_inner(arena, src_ix.key, tgt_ix.key, visiting)
                && is_assignable_inner(arena, src_ix.value, tgt_ix.value, visiting)
        }) || src.properties.values().all(|v| is_assignable_inner(arena, *v, tgt_ix.value, visiting));
        if !covered {
            return false;
        }
    }

    true
}

/// Call/construct signature compatibility: covariant on return type,
/// contravariant on parameters.
fn signature_compatible(
    arena: &TypeArena,
    src: &crate::types::Signature,
    tgt: &crate::types::Signature,
    visiting: &mut FxHashSet<(TypeId, TypeId)>,
) -> bool {
    if !is_assignable_inner(arena, src.return_type, tgt.return_type, visiting) {
        return false;
    }
    let n = src.param_types.len().max(tgt.param_types.len());
    for i in 0..n {
        let tgt_param = tgt.param_types.get(i).copied().or(tgt.rest_type);
        let src_param = src.param_types.get(i).copied().or(src.rest_type);
        match (tgt_param, src_param) {
            (Some(t), Some(s)) => {
                // contravariant: tgt's param must accept anything src's param accepts
                if !is_assignable_inner(arena, t, s, visiting) {
                    return false;
                }
            }
            (None, Some(_)) => return false,
            _ => {}
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LiteralType;
    use tyck_ast::Value;

    fn seeded_arena() -> TypeArena {
        let mut arena = TypeArena::new();
        arena.primitive(Primitive::Any);
        arena.primitive(Primitive::Unknown);
        arena.primitive(Primitive::Never);
        arena.primitive(Primitive::String);
        arena.primitive(Primitive::Number);
        arena.primitive(Primitive::Boolean);
        arena
    }

    #[test]
    fn any_and_unknown_absorb_everything() {
        let mut arena = seeded_arena();
        let any = arena.primitive(Primitive::Any);
        let unknown = arena.primitive(Primitive::Unknown);
        let never = arena.primitive(Primitive::Never);
        let string = arena.primitive(Primitive::String);
        assert!(is_assignable(&arena, string, any));
        assert!(is_assignable(&arena, string, unknown));
        assert!(is_assignable(&arena, any, string));
        assert!(is_assignable(&arena, never, string));
    }

    #[test]
    fn literal_is_assignable_to_its_base_primitive() {
        let mut arena = seeded_arena();
        let string = arena.primitive(Primitive::String);
        let lit = arena.alloc(Type::Literal(LiteralType {
            value: Value::String("hi".into()),
        }));
        assert!(is_assignable(&arena, lit, string));
        assert!(!is_assignable(&arena, string, lit));
    }

    #[test]
    fn union_source_requires_every_member_assignable() {
        let mut arena = seeded_arena();
        let string = arena.primitive(Primitive::String);
        let number = arena.primitive(Primitive::Number);
        let boolean = arena.primitive(Primitive::Boolean);
        let union = arena.alloc(Type::Union(smallvec::smallvec![string, number]));
        assert!(!is_assignable(&arena, union, boolean));
    }

    #[test]
    fn union_target_needs_one_matching_member() {
        let mut arena = seeded_arena();
        let string = arena.primitive(Primitive::String);
        let number = arena.primitive(Primitive::Number);
        let union = arena.alloc(Type::Union(smallvec::smallvec![string, number]));
        assert!(is_assignable(&arena, string, union));
    }
}
