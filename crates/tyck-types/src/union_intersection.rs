use tyck_common::TypeId;

use crate::arena::TypeArena;
use crate::equals::equals;
use crate::types::{Type, TypeIdVec};

/// Flattens nested unions, drops `never`, dedupes by [`equals`], and
/// collapses to the single member (or `never` for an empty input) when
/// fewer than two distinct members remain.
pub fn new_union(arena: &mut TypeArena, members: impl IntoIterator<Item = TypeId>) -> TypeId {
    let mut flat: TypeIdVec = TypeIdVec::new();
    flatten_union(arena, members, &mut flat);

    let never = arena.never();
    flat.retain(|m| *m != never);

    let mut deduped: TypeIdVec = TypeIdVec::new();
    for m in flat {
        if !deduped.iter().any(|d| equals(arena, *d, m)) {
            deduped.push(m);
        }
    }

    match deduped.len() {
        0 => never,
        1 => deduped[0],
        _ => arena.alloc(Type::Union(deduped)),
    }
}

fn flatten_union(arena: &TypeArena, members: impl IntoIterator<Item = TypeId>, out: &mut TypeIdVec) {
    for m in members {
        match arena.get(m) {
            Type::Union(inner) => {
                let inner = inner.clone();
                flatten_union(arena, inner, out);
            }
            _ => out.push(m),
        }
    }
}

/// Flattens nested intersections, drops duplicate `any`s, and collapses
/// a single-member result the same way [`new_union`] does.
pub fn new_intersection(arena: &mut TypeArena, members: impl IntoIterator<Item = TypeId>) -> TypeId {
    let mut flat: TypeIdVec = TypeIdVec::new();
    flatten_intersection(arena, members, &mut flat);

    let mut deduped: TypeIdVec = TypeIdVec::new();
    for m in flat {
        if !deduped.iter().any(|d| equals(arena, *d, m)) {
            deduped.push(m);
        }
    }

    if deduped.len() > 1 {
        if let Some(merged) = try_merge_objects(arena, &deduped) {
            return merged;
        }
    }

    match deduped.len() {
        0 => arena.never(),
        1 => deduped[0],
        _ => arena.alloc(Type::Intersection(deduped)),
    }
}

fn flatten_intersection(arena: &TypeArena, members: impl IntoIterator<Item = TypeId>, out: &mut TypeIdVec) {
    for m in members {
        match arena.get(m) {
            Type::Intersection(inner) => {
                let inner = inner.clone();
                flatten_intersection(arena, inner, out);
            }
            _ => out.push(m),
        }
    }
}

/// `{a:1} & {b:2}` is obviously just `{a:1,b:2}`; this merges when every
/// member is a plain object with no call/construct signatures, leaving
/// anything else (e.g. a function intersected with an object) as a
/// symbolic `IntersectionType`.
fn try_merge_objects(arena: &mut TypeArena, members: &[TypeId]) -> Option<TypeId> {
    let all_plain_objects = members.iter().all(|m| {
        matches!(
            arena.get(*m),
            Type::Object(o) if o.call_signatures.is_empty() && o.construct_signatures.is_empty()
        )
    });
    if !all_plain_objects {
        return None;
    }

    let mut merged = crate::types::ObjectType::empty();
    for m in members {
        let Type::Object(o) = arena.get(*m).clone() else {
            unreachable!()
        };
        for (name, ty) in o.properties {
            merged.properties.insert(name, ty);
        }
        merged.optional.extend(o.optional);
        merged.readonly.extend(o.readonly);
        merged.index_signatures.extend(o.index_signatures);
    }
    Some(arena.alloc(Type::Object(merged)))
}
