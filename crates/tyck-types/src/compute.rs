//! Keyof, indexed-access, conditional, mapped, and template-literal
//! computation.
//!
//! Every function here follows the algebra's error contract: no
//! mutation of inputs, no panics on malformed input, and a symbolic
//! form returned unchanged when the result genuinely can't be reduced
//! yet (e.g. a conditional whose `check` still contains a free type
//! parameter).

use rustc_hash::FxHashSet;
use tracing::warn;
use tyck_common::{limits::MAX_MAPPED_KEYS, TypeId};

use crate::arena::TypeArena;
use crate::types::{ConditionalType, LiteralType, MappedType, Modifier, ObjectType, TemplatePart, Type};

/// `keyof T`: a union of string-literal property names for an object
/// type, `string` for `any` (a deliberate simplification
/// calls out), and `never` for everything else.
pub fn keyof(arena: &mut TypeArena, operand: TypeId) -> TypeId {
    match arena.get(operand).clone() {
        Type::Object(obj) => keyof_object(arena, &obj),
        Type::Primitive(crate::types::Primitive::Any) => arena.primitive(crate::types::Primitive::String),
        _ => arena.never(),
    }
}

fn keyof_object(arena: &mut TypeArena, obj: &ObjectType) -> TypeId {
    if obj.properties.is_empty() {
        return arena.never();
    }
    let keys: Vec<TypeId> = obj
        .properties
        .keys()
        .map(|name| {
            arena.alloc(Type::Literal(LiteralType {
                value: tyck_ast::Value::String(name.clone()),
            }))
        })
        .collect();
    crate::union_intersection::new_union(arena, keys)
}

/// `O[L]` — resolves a literal key, `keyof O`, or a union of either
/// against `O`'s properties. Anything else (a bare type parameter, an
/// unresolved alias) is returned as a symbolic `IndexedAccessType`.
pub fn indexed_access(arena: &mut TypeArena, object: TypeId, index: TypeId) -> TypeId {
    let Type::Object(obj) = arena.get(object).clone() else {
        return arena.alloc(Type::IndexedAccess { object, index });
    };

    // `O[keyof O]` — union of every property's type.
    if let Type::Keyof(inner) = arena.get(index) {
        if *inner == object {
            let types: Vec<TypeId> = obj.properties.values().copied().collect();
            return crate::union_intersection::new_union(arena, types);
        }
    }

    match resolve_index_keys(arena, index) {
        Some(keys) => {
            let mut resolved = Vec::with_capacity(keys.len());
            for key in &keys {
                match obj.properties.get(key) {
                    Some(ty) => resolved.push(*ty),
                    None => return arena.alloc(Type::IndexedAccess { object, index }),
                }
            }
            crate::union_intersection::new_union(arena, resolved)
        }
        None => arena.alloc(Type::IndexedAccess { object, index }),
    }
}

/// Tries to read `index` as one or more concrete string-literal keys.
fn resolve_index_keys(arena: &TypeArena, index: TypeId) -> Option<Vec<String>> {
    match arena.get(index) {
        Type::Literal(LiteralType {
            value: tyck_ast::Value::String(s),
        }) => Some(vec![s.clone()]),
        Type::Union(members) => {
            let mut keys = Vec::with_capacity(members.len());
            for m in members {
                match arena.get(*m) {
                    Type::Literal(LiteralType {
                        value: tyck_ast::Value::String(s),
                    }) => keys.push(s.clone()),
                    _ => return None,
                }
            }
            Some(keys)
        }
        _ => None,
    }
}

/// `Check extends Extends ? True : False`.
///
/// Resolved eagerly when neither `check` nor `extends` mentions a free
/// type parameter; otherwise the conditional is kept symbolic so it can
/// be re-evaluated after substitution binds the parameter.
pub fn compute_conditional(arena: &mut TypeArena, cond: ConditionalType) -> TypeId {
    if has_free_parameter(arena, cond.check) || has_free_parameter(arena, cond.extends) {
        return arena.alloc(Type::Conditional(cond));
    }
    if crate::assignability::is_assignable(arena, cond.check, cond.extends) {
        cond.true_branch
    } else {
        cond.false_branch
    }
}

fn has_free_parameter(arena: &TypeArena, t: TypeId) -> bool {
    has_free_parameter_inner(arena, t, &mut FxHashSet::default())
}

fn has_free_parameter_inner(arena: &TypeArena, t: TypeId, visiting: &mut FxHashSet<TypeId>) -> bool {
    if !visiting.insert(t) {
        return false;
    }
    let result = match arena.get(t) {
        Type::ParameterRef(_) => true,
        Type::Array(e) => has_free_parameter_inner(arena, *e, visiting),
        Type::Tuple(tuple) => {
            tuple.elements.iter().any(|e| has_free_parameter_inner(arena, *e, visiting))
                || tuple.rest.is_some_and(|r| has_free_parameter_inner(arena, r, visiting))
        }
        Type::Union(members) | Type::Intersection(members) => {
            members.iter().any(|m| has_free_parameter_inner(arena, *m, visiting))
        }
        Type::Object(obj) => obj.properties.values().any(|v| has_free_parameter_inner(arena, *v, visiting)),
        Type::Keyof(o) => has_free_parameter_inner(arena, *o, visiting),
        Type::IndexedAccess { object, index } => {
            has_free_parameter_inner(arena, *object, visiting) || has_free_parameter_inner(arena, *index, visiting)
        }
        Type::Conditional(c) => {
            has_free_parameter_inner(arena, c.check, visiting) || has_free_parameter_inner(arena, c.extends, visiting)
        }
        _ => false,
    };
    visiting.remove(&t);
    result
}

/// `{ [P in K]: V }` — materialises one property per key in `K`.
///
/// Returns the mapped type symbolically when `K` doesn't resolve to a
/// concrete set of string-literal keys yet (a mapped type over
/// an unresolved generic constraint stays symbolic until substitution).
pub fn expand_mapped(arena: &mut TypeArena, mapped: MappedType) -> TypeId {
    let Some(keys) = concrete_keys_of(arena, mapped.constraint) else {
        return arena.alloc(Type::Mapped(mapped));
    };

    let source = source_object_of(arena, mapped.constraint);
    let mut result = ObjectType::empty();

    let truncated = keys.len() > MAX_MAPPED_KEYS;
    if truncated {
        warn!(count = keys.len(), limit = MAX_MAPPED_KEYS, "mapped type key set truncated");
    }

    for key in keys.into_iter().take(MAX_MAPPED_KEYS) {
        let key_literal = arena.alloc(Type::Literal(LiteralType {
            value: tyck_ast::Value::String(key.clone()),
        }));
        let mut subst = crate::substitute::SubstitutionMap::default();
        subst.insert(mapped.param_id, key_literal);

        let prop_ty = crate::substitute::substitute(arena, mapped.value, &subst);

        let out_name = match mapped.name_remap {
            Some(remap) => {
                let remapped = crate::substitute::substitute(arena, remap, &subst);
                match arena.get(remapped) {
                    Type::Literal(LiteralType {
                        value: tyck_ast::Value::String(s),
                    }) => s.clone(),
                    _ => key.clone(),
                }
            }
            None => key.clone(),
        };

        let was_optional = source.as_ref().is_some_and(|s| s.optional.contains(&key));
        let was_readonly = source.as_ref().is_some_and(|s| s.readonly.contains(&key));

        let optional = match mapped.optional_mod {
            Modifier::Add => true,
            Modifier::Remove => false,
            Modifier::Unchanged => was_optional,
        };
        let readonly = match mapped.readonly_mod {
            Modifier::Add => true,
            Modifier::Remove => false,
            Modifier::Unchanged => was_readonly,
        };

        result.properties.insert(out_name.clone(), prop_ty);
        if optional {
            result.optional.insert(out_name.clone());
        }
        if readonly {
            result.readonly.insert(out_name);
        }
    }

    arena.alloc(Type::Object(result))
}

fn concrete_keys_of(arena: &mut TypeArena, constraint: TypeId) -> Option<Vec<String>> {
    let resolved = match arena.get(constraint).clone() {
        Type::Keyof(inner) => keyof(arena, inner),
        _ => constraint,
    };
    resolve_index_keys(arena, resolved)
}

fn source_object_of(arena: &TypeArena, constraint: TypeId) -> Option<ObjectType> {
    match arena.get(constraint) {
        Type::Keyof(inner) => match arena.get(*inner) {
            Type::Object(o) => Some(o.clone()),
            _ => None,
        },
        _ => None,
    }
}

/// Template-literal folding: when every interpolated type is a string
/// literal, the whole template collapses to one concatenated
/// `LiteralType`; otherwise it stays symbolic.
pub fn compute_template_literal(arena: &mut TypeArena, parts: Vec<TemplatePart>) -> TypeId {
    let mut folded = String::new();
    let mut all_literal = true;
    for part in &parts {
        match part {
            TemplatePart::Literal(s) => folded.push_str(s),
            TemplatePart::Type(ty) => match arena.get(*ty) {
                Type::Literal(LiteralType {
                    value: tyck_ast::Value::String(s),
                }) => folded.push_str(s),
                _ => {
                    all_literal = false;
                    break;
                }
            },
        }
    }

    if all_literal {
        arena.alloc(Type::Literal(LiteralType {
            value: tyck_ast::Value::String(folded),
        }))
    } else {
        arena.alloc(Type::TemplateLiteral(crate::types::TemplateLiteralType { parts }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Primitive, TypeParameter};

    fn object_with(arena: &mut TypeArena, props: &[(&str, TypeId)]) -> TypeId {
        let mut obj = ObjectType::empty();
        for (name, ty) in props {
            obj.properties.insert((*name).to_string(), *ty);
        }
        arena.alloc(Type::Object(obj))
    }

    #[test]
    fn keyof_object_yields_union_of_literal_keys() {
        let mut arena = TypeArena::new();
        let number = arena.primitive(Primitive::Number);
        let obj = object_with(&mut arena, &[("a", number), ("b", number)]);
        let keys = keyof(&mut arena, obj);
        match arena.get(keys) {
            Type::Union(members) => assert_eq!(members.len(), 2),
            other => panic!("expected union, got {other:?}"),
        }
    }

    #[test]
    fn keyof_empty_object_is_never() {
        let mut arena = TypeArena::new();
        let obj = object_with(&mut arena, &[]);
        let keys = keyof(&mut arena, obj);
        let never = arena.never();
        assert_eq!(keys, never);
    }

    #[test]
    fn indexed_access_by_literal_key_returns_property_type() {
        let mut arena = TypeArena::new();
        let number = arena.primitive(Primitive::Number);
        let obj = object_with(&mut arena, &[("a", number)]);
        let key = arena.alloc(Type::Literal(LiteralType {
            value: tyck_ast::Value::String("a".into()),
        }));
        assert_eq!(indexed_access(&mut arena, obj, key), number);
    }

    #[test]
    fn conditional_resolves_eagerly_without_free_parameters() {
        let mut arena = TypeArena::new();
        let string = arena.primitive(Primitive::String);
        let one = arena.alloc(Type::Literal(LiteralType {
            value: tyck_ast::Value::Number(1.0),
        }));
        let zero = arena.alloc(Type::Literal(LiteralType {
            value: tyck_ast::Value::Number(0.0),
        }));
        let result = compute_conditional(
            &mut arena,
            ConditionalType {
                check: string,
                extends: string,
                true_branch: one,
                false_branch: zero,
            },
        );
        assert_eq!(result, one);
    }

    #[test]
    fn conditional_stays_symbolic_with_a_free_parameter() {
        let mut arena = TypeArena::new();
        let string = arena.primitive(Primitive::String);
        let param = arena.alloc(Type::TypeParameter(TypeParameter {
            name: "T".into(),
            constraint: None,
            default: None,
        }));
        let param_ref = arena.alloc(Type::ParameterRef(param));
        let one = arena.alloc(Type::Literal(LiteralType {
            value: tyck_ast::Value::Number(1.0),
        }));
        let zero = arena.alloc(Type::Literal(LiteralType {
            value: tyck_ast::Value::Number(0.0),
        }));
        let result = compute_conditional(
            &mut arena,
            ConditionalType {
                check: param_ref,
                extends: string,
                true_branch: one,
                false_branch: zero,
            },
        );
        assert!(matches!(arena.get(result), Type::Conditional(_)));
    }

    #[test]
    fn mapped_type_materialises_one_property_per_key() {
        let mut arena = TypeArena::new();
        let number = arena.primitive(Primitive::Number);
        let source = object_with(&mut arena, &[("a", number)]);
        let keyof_source = arena.alloc(Type::Keyof(source));

        let param = arena.alloc(Type::TypeParameter(TypeParameter {
            name: "P".into(),
            constraint: None,
            default: None,
        }));
        let param_ref = arena.alloc(Type::ParameterRef(param));
        let value = arena.alloc(Type::IndexedAccess {
            object: source,
            index: param_ref,
        });

        let mapped = MappedType {
            param_name: "P".into(),
            param_id: param,
            constraint: keyof_source,
            value,
            name_remap: None,
            optional_mod: Modifier::Unchanged,
            readonly_mod: Modifier::Unchanged,
        };
        let result = expand_mapped(&mut arena, mapped);
        match arena.get(result) {
            Type::Object(obj) => {
                assert_eq!(obj.properties.get("a"), Some(&number));
            }
            other => panic!("expected Object, got {other:?}"),
        }
    }

    #[test]
    fn template_literal_folds_when_fully_string_literal() {
        let mut arena = TypeArena::new();
        let interp = arena.alloc(Type::Literal(LiteralType {
            value: tyck_ast::Value::String("world".into()),
        }));
        let result = compute_template_literal(
            &mut arena,
            vec![
                TemplatePart::Literal("hello-".into()),
                TemplatePart::Type(interp),
            ],
        );
        match arena.get(result) {
            Type::Literal(LiteralType {
                value: tyck_ast::Value::String(s),
            }) => assert_eq!(s, "hello-world"),
            other => panic!("expected folded literal, got {other:?}"),
        }
    }
}
