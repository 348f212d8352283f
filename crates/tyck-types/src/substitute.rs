use rustc_hash::FxHashMap;
use tyck_common::{limits::MAX_INSTANTIATION_DEPTH, TypeId};

use crate::arena::TypeArena;
use crate::types::{ConditionalType, GenericType, MappedType, Type};

/// A substitution map from `TypeParameter` declaration ids (the
/// `TypeId` a `ParameterRef` points at) to the type they're bound to.
pub type SubstitutionMap = FxHashMap<TypeId, TypeId>;

/// Recurses through every compound variant, replacing `ParameterRef`
/// leaves whose parameter appears in `map`; parameters absent from the
/// map are left in place.
///
/// Indexed-access/keyof/conditional/mapped/template variants are
/// re-computed after substitution and collapsed where possible, since
/// substituting concrete arguments into e.g. `T extends string ? 1 : 0`
/// often makes the conditional resolvable.
pub fn substitute(arena: &mut TypeArena, t: TypeId, map: &SubstitutionMap) -> TypeId {
    if map.is_empty() {
        return t;
    }
    match arena.get(t).clone() {
        Type::ParameterRef(p) => map.get(&p).copied().unwrap_or_else(|| {
            tracing::warn!(?p, "substituting a parameter reference with no binding in the map");
            t
        }),

        Type::Array(elem) => {
            let new_elem = substitute(arena, elem, map);
            if new_elem == elem {
                t
            } else {
                arena.alloc(Type::Array(new_elem))
            }
        }

        Type::Tuple(tuple) => {
            let elements: Vec<TypeId> = tuple.elements.iter().map(|e| substitute(arena, *e, map)).collect();
            let rest = tuple.rest.map(|r| substitute(arena, r, map));
            arena.alloc(Type::Tuple(crate::types::TupleType {
                elements,
                optional: tuple.optional.clone(),
                rest,
            }))
        }

        Type::Object(obj) => {
            let mut new_obj = obj.clone();
            for ty in new_obj.properties.values_mut() {
                *ty = substitute(arena, *ty, map);
            }
            for sig in new_obj
                .call_signatures
                .iter_mut()
                .chain(new_obj.construct_signatures.iter_mut())
            {
                for p in &mut sig.param_types {
                    *p = substitute(arena, *p, map);
                }
                sig.return_type = substitute(arena, sig.return_type, map);
                if let Some(r) = sig.rest_type {
                    sig.rest_type = Some(substitute(arena, r, map));
                }
            }
            for ix in &mut new_obj.index_signatures {
                ix.key = substitute(arena, ix.key, map);
                ix.value = substitute(arena, ix.value, map);
            }
            arena.alloc(Type::Object(new_obj))
        }

        Type::Union(members) => {
            let subbed: Vec<TypeId> = members.iter().map(|m| substitute(arena, *m, map)).collect();
            crate::union_intersection::new_union(arena, subbed)
        }
        Type::Intersection(members) => {
            let subbed: Vec<TypeId> = members.iter().map(|m| substitute(arena, *m, map)).collect();
            crate::union_intersection::new_intersection(arena, subbed)
        }

        Type::Keyof(operand) => {
            let new_operand = substitute(arena, operand, map);
            crate::compute::keyof(arena, new_operand)
        }

        Type::IndexedAccess { object, index } => {
            let new_object = substitute(arena, object, map);
            let new_index = substitute(arena, index, map);
            crate::compute::indexed_access(arena, new_object, new_index)
        }

        Type::Conditional(cond) => {
            let check = substitute(arena, cond.check, map);
            let extends = substitute(arena, cond.extends, map);
            let then_branch = substitute(arena, cond.true_branch, map);
            let else_branch = substitute(arena, cond.false_branch, map);
            crate::compute::compute_conditional(
                arena,
                ConditionalType {
                    check,
                    extends,
                    true_branch: then_branch,
                    false_branch: else_branch,
                },
            )
        }

        Type::Mapped(mapped) => {
            let constraint = substitute(arena, mapped.constraint, map);
            let value = substitute(arena, mapped.value, map);
            let name_remap = mapped.name_remap.map(|n| substitute(arena, n, map));
            crate::compute::expand_mapped(
                arena,
                MappedType {
                    param_name: mapped.param_name.clone(),
                    param_id: mapped.param_id,
                    constraint,
                    value,
                    name_remap,
                    optional_mod: mapped.optional_mod,
                    readonly_mod: mapped.readonly_mod,
                },
            )
        }

        Type::TemplateLiteral(tmpl) => {
            let parts: Vec<crate::types::TemplatePart> = tmpl
                .parts
                .iter()
                .map(|p| match p {
                    crate::types::TemplatePart::Literal(s) => crate::types::TemplatePart::Literal(s.clone()),
                    crate::types::TemplatePart::Type(ty) => crate::types::TemplatePart::Type(substitute(arena, *ty, map)),
                })
                .collect();
            crate::compute::compute_template_literal(arena, parts)
        }

        Type::TypePredicate { param_name, ty } => {
            let new_ty = substitute(arena, ty, map);
            arena.alloc(Type::TypePredicate {
                param_name: param_name.clone(),
                ty: new_ty,
            })
        }

        Type::GenericForwardReference { name, args } => {
            let new_args: Vec<TypeId> = args.iter().map(|a| substitute(arena, *a, map)).collect();
            arena.alloc(Type::GenericForwardReference { name: name.clone(), args: new_args })
        }

        Type::Instantiated(inst) => {
            let new_result = substitute(arena, inst.result, map);
            if new_result == inst.result {
                t
            } else {
                new_result
            }
        }

        // Primitives, literals, forward references, enums, type
        // parameter declarations themselves: nothing to substitute.
        _ => t,
    }
}

/// Instantiates a `GenericType` by binding each declared parameter to
/// the corresponding argument (or its own default, or the parameter's
/// constraint, or `any` if nothing else is available) and substituting
/// through the body.
pub fn instantiate_generic(arena: &mut TypeArena, generic_id: TypeId, args: &[TypeId]) -> TypeId {
    instantiate_generic_depth(arena, generic_id, args, 0)
}

fn instantiate_generic_depth(arena: &mut TypeArena, generic_id: TypeId, args: &[TypeId], depth: u32) -> TypeId {
    let generic = match arena.get(generic_id) {
        Type::Generic(g) => g.clone(),
        _ => return arena.any(),
    };
    if depth > MAX_INSTANTIATION_DEPTH {
        tracing::warn!(name = %generic.name, "instantiation depth limit exceeded");
        return arena.any();
    }

    let map = build_substitution_map(arena, &generic, args);
    let result = substitute(arena, generic.body, &map);
    arena.alloc(Type::Instantiated(crate::types::InstantiatedType {
        generic: generic_id,
        args: args.to_vec(),
        result,
    }))
}

fn build_substitution_map(arena: &mut TypeArena, generic: &GenericType, args: &[TypeId]) -> SubstitutionMap {
    let mut map = SubstitutionMap::default();
    for (i, param_id) in generic.params.iter().enumerate() {
        let bound = match args.get(i) {
            Some(a) => *a,
            None => {
                let Type::TypeParameter(tp) = arena.get(*param_id).clone() else {
                    continue;
                };
                tp.default.or(tp.constraint).unwrap_or_else(|| arena.any())
            }
        };
        map.insert(*param_id, bound);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Primitive;

    #[test]
    fn substitution_is_idempotent_when_range_avoids_domain() {
        let mut arena = TypeArena::new();
        let param = arena.alloc(Type::TypeParameter(crate::types::TypeParameter {
            name: "T".into(),
            constraint: None,
            default: None,
        }));
        let param_ref = arena.alloc(Type::ParameterRef(param));
        let string = arena.primitive(Primitive::String);
        let mut map = SubstitutionMap::default();
        map.insert(param, string);

        let once = substitute(&mut arena, param_ref, &map);
        let twice = substitute(&mut arena, once, &map);
        assert_eq!(once, twice);
        assert_eq!(once, string);
    }

    #[test]
    fn unmapped_parameters_are_left_in_place() {
        let mut arena = TypeArena::new();
        let param = arena.alloc(Type::TypeParameter(crate::types::TypeParameter {
            name: "T".into(),
            constraint: None,
            default: None,
        }));
        let param_ref = arena.alloc(Type::ParameterRef(param));
        let map = SubstitutionMap::default();
        assert_eq!(substitute(&mut arena, param_ref, &map), param_ref);
    }

    #[test]
    fn instantiate_generic_substitutes_array_of_param() {
        let mut arena = TypeArena::new();
        let param = arena.alloc(Type::TypeParameter(crate::types::TypeParameter {
            name: "T".into(),
            constraint: None,
            default: None,
        }));
        let param_ref = arena.alloc(Type::ParameterRef(param));
        let body = arena.alloc(Type::Array(param_ref));
        let generic = arena.alloc(Type::Generic(GenericType {
            name: "Wrap".into(),
            params: vec![param],
            body,
        }));
        let string = arena.primitive(Primitive::String);
        let instantiated = instantiate_generic(&mut arena, generic, &[string]);
        match arena.get(instantiated) {
            Type::Instantiated(inst) => match arena.get(inst.result) {
                Type::Array(e) => assert_eq!(*e, string),
                other => panic!("expected Array, got {other:?}"),
            },
            other => panic!("expected Instantiated, got {other:?}"),
        }
    }
}
