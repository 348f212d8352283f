//! Narrowing engine: detects the handful of
//! guard shapes an `if` condition can take and produces the narrowed
//! child environment each branch sees.

use tyck_ast::{BinaryOp, Expr, ENode, UnaryOp};
use tyck_common::diagnostics::{diagnostic_codes, diagnostic_messages};
use tyck_common::{format_message, Span, TypeId};
use tyck_types::{display_type, equals, is_assignable, LiteralType, ObjectType, Primitive, Signature, Type};

use crate::checker::Checker;
use crate::environment::EnvId;

/// A detected `if`/ternary guard: narrow `variable` to `narrowed_type`
/// in the positive branch (or the negative branch, if `negated`).
#[derive(Debug, Clone)]
pub struct TypeGuard {
    pub variable: String,
    pub narrowed_type: TypeId,
    pub negated: bool,
}

/// Looks for one of the three guard shapes recognized on
/// `cond`. Returns `None` when `cond` isn't a guard this checker
/// understands — the branches then check against the unnarrowed
/// environment.
pub fn detect_guard(checker: &mut Checker, cond: &ENode) -> Option<TypeGuard> {
    match &cond.kind {
        Expr::Unary {
            op: UnaryOp::Not,
            operand,
        } => detect_guard(checker, operand).map(|mut g| {
            g.negated = !g.negated;
            g
        }),
        Expr::Binary { op, left, right } if is_equality(*op) => {
            let negated = matches!(op, BinaryOp::NotEq | BinaryOp::StrictNotEq);
            typeof_guard(checker, left, right, negated).or_else(|| literal_guard(checker, left, right, negated))
        }
        Expr::Call { callee, args, .. } => predicate_guard_resolved(checker, callee, args),
        _ => None,
    }
}

fn is_equality(op: BinaryOp) -> bool {
    matches!(op, BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::StrictEq | BinaryOp::StrictNotEq)
}

/// `typeof X === "string"` and friends.
fn typeof_guard(checker: &mut Checker, left: &ENode, right: &ENode, negated: bool) -> Option<TypeGuard> {
    let (typeof_operand, literal) = match (&left.kind, &right.kind) {
        (Expr::TypeofExpr(inner), Expr::Literal(tyck_ast::Value::String(s))) => (inner, s),
        (Expr::Literal(tyck_ast::Value::String(s)), Expr::TypeofExpr(inner)) => (inner, s),
        _ => return None,
    };
    let Expr::Identifier(name) = &typeof_operand.kind else { return None };
    let narrowed_type = match literal.as_str() {
        "string" => checker.arena.primitive(Primitive::String),
        "number" => checker.arena.primitive(Primitive::Number),
        "boolean" => checker.arena.primitive(Primitive::Boolean),
        "undefined" => checker.arena.primitive(Primitive::Undefined),
        "function" => {
            let any = checker.arena.any();
            let mut obj = ObjectType::empty();
            obj.call_signatures.push(Signature {
                param_types: vec![],
                optional: vec![],
                return_type: any,
                variadic: true,
                rest_type: Some(any),
            });
            checker.arena.alloc(Type::Object(obj))
        }
        // "object" is deliberately not narrowed: null and arrays both
        // report typeof "object".
        _ => return None,
    };
    Some(TypeGuard {
        variable: name.clone(),
        narrowed_type,
        negated,
    })
}

/// `X === L` / `L === X` for a string/number/boolean literal `L`.
/// `Value` carries no null/undefined payload, so those
/// literal comparisons aren't representable here.
fn literal_guard(checker: &mut Checker, left: &ENode, right: &ENode, negated: bool) -> Option<TypeGuard> {
    let (name, value) = match (&left.kind, &right.kind) {
        (Expr::Identifier(name), Expr::Literal(v)) => (name, v),
        (Expr::Literal(v), Expr::Identifier(name)) => (name, v),
        _ => return None,
    };
    let narrowed_type = checker.arena.alloc(Type::Literal(LiteralType { value: value.clone() }));
    Some(TypeGuard {
        variable: name.clone(),
        narrowed_type,
        negated,
    })
}

/// `f(x)` where `f`'s return type is a `TypePredicate`.
/// Only a single identifier argument is recognized.
fn predicate_guard_resolved(checker: &Checker, callee: &ENode, args: &[ENode]) -> Option<TypeGuard> {
    if args.len() != 1 {
        return None;
    }
    let Expr::Identifier(name) = &args[0].kind else { return None };
    let callee_ty = callee.ty()?;
    let Type::Object(obj) = checker.arena.get(callee_ty) else { return None };
    for sig in &obj.call_signatures {
        if let Type::TypePredicate { ty, .. } = checker.arena.get(sig.return_type) {
            return Some(TypeGuard {
                variable: name.clone(),
                narrowed_type: *ty,
                negated: false,
            });
        }
    }
    None
}

/// Applies `guard` positively, returning a child of `env` with the
/// variable shadowed by its narrowed type.
pub fn apply_positive(checker: &mut Checker, env: EnvId, guard: &TypeGuard) -> EnvId {
    let child = checker.envs.push_child(env);
    let Some(binding) = checker.envs.resolve(env, &guard.variable) else { return child };
    let narrowed = guard.narrowed_type;
    let final_ty = match checker.arena.get(binding.ty).clone() {
        Type::Primitive(Primitive::Unknown) => narrowed,
        Type::Union(members) => {
            let is_callable_guard = matches!(checker.arena.get(narrowed), Type::Object(o) if o.is_callable());
            let kept: Vec<TypeId> = members
                .iter()
                .copied()
                .filter(|&m| {
                    equals(&checker.arena, m, narrowed)
                        || is_assignable(&checker.arena, m, narrowed)
                        || (is_callable_guard && matches!(checker.arena.get(m), Type::Object(o) if o.is_callable()))
                })
                .collect();
            if kept.is_empty() {
                narrowed
            } else {
                tyck_types::new_union(&mut checker.arena, kept)
            }
        }
        _ => {
            if is_assignable(&checker.arena, narrowed, binding.ty) {
                narrowed
            } else {
                binding.ty
            }
        }
    };
    checker.envs.define(child, &guard.variable, final_ty, binding.is_const);
    child
}

/// Applies `guard` negatively (the else branch).
pub fn apply_negative(checker: &mut Checker, env: EnvId, guard: &TypeGuard) -> EnvId {
    let child = checker.envs.push_child(env);
    let Some(binding) = checker.envs.resolve(env, &guard.variable) else { return child };
    let final_ty = match checker.arena.get(binding.ty).clone() {
        Type::Union(members) => {
            let kept: Vec<TypeId> = members
                .iter()
                .copied()
                .filter(|&m| !equals(&checker.arena, m, guard.narrowed_type))
                .collect();
            if kept.is_empty() {
                binding.ty
            } else {
                tyck_types::new_union(&mut checker.arena, kept)
            }
        }
        // `unknown` and plain-type literal narrowing have no useful
        // inverse.
        _ => binding.ty,
    };
    checker.envs.define(child, &guard.variable, final_ty, binding.is_const);
    child
}

/// Reports `COMPARISON_NO_OVERLAP` for an equality comparison whose
/// operand types can never overlap.
pub fn check_comparison_overlap(checker: &mut Checker, op: BinaryOp, left: TypeId, right: TypeId, span: Span) {
    if !is_equality(op) {
        return;
    }
    if types_have_overlap(&checker.arena, left, right) {
        return;
    }
    let (l, r) = (display_type(&checker.arena, left), display_type(&checker.arena, right));
    checker.error(
        span,
        diagnostic_codes::COMPARISON_NO_OVERLAP,
        format_message(diagnostic_messages::COMPARISON_NO_OVERLAP, &[&l, &r]),
    );
}

fn types_have_overlap(arena: &tyck_types::TypeArena, a: TypeId, b: TypeId) -> bool {
    if a == b || equals(arena, a, b) {
        return true;
    }
    match (arena.get(a).clone(), arena.get(b).clone()) {
        (Type::Primitive(Primitive::Any | Primitive::Unknown | Primitive::Never), _) => true,
        (_, Type::Primitive(Primitive::Any | Primitive::Unknown | Primitive::Never)) => true,
        (Type::Union(ms), _) => ms.iter().any(|m| types_have_overlap(arena, *m, b)),
        (_, Type::Union(ms)) => ms.iter().any(|m| types_have_overlap(arena, a, *m)),
        (Type::Literal(l), Type::Primitive(p)) | (Type::Primitive(p), Type::Literal(l)) => l.base_primitive() == p,
        (Type::Literal(l1), Type::Literal(l2)) => l1.value == l2.value,
        (Type::Primitive(p1), Type::Primitive(p2)) => {
            p1 == p2 || (matches!(p1, Primitive::Null | Primitive::Undefined) && matches!(p2, Primitive::Null | Primitive::Undefined))
        }
        (Type::Object(_), Type::Object(_)) | (Type::Array(_), Type::Array(_)) | (Type::Tuple(_), Type::Tuple(_)) => true,
        _ => is_assignable(arena, a, b) || is_assignable(arena, b, a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tyck_ast::node::Node;
    use tyck_common::CheckerOptions;

    fn ident(name: &str) -> ENode {
        Node::new(Span::dummy(), Expr::Identifier(name.to_string()))
    }

    fn str_lit(s: &str) -> ENode {
        Node::new(Span::dummy(), Expr::Literal(tyck_ast::Value::String(s.to_string())))
    }

    #[test]
    fn typeof_equality_narrows_to_the_named_primitive() {
        let mut checker = Checker::new(CheckerOptions::default());
        let cond = Node::new(
            Span::dummy(),
            Expr::Binary {
                op: BinaryOp::StrictEq,
                left: Box::new(Node::new(Span::dummy(), Expr::TypeofExpr(Box::new(ident("x"))))),
                right: Box::new(str_lit("string")),
            },
        );
        let guard = detect_guard(&mut checker, &cond).unwrap();
        assert_eq!(guard.variable, "x");
        assert!(!guard.negated);
        assert!(matches!(checker.arena.get(guard.narrowed_type), Type::Primitive(Primitive::String)));
    }

    #[test]
    fn typeof_object_is_not_narrowed() {
        let mut checker = Checker::new(CheckerOptions::default());
        let cond = Node::new(
            Span::dummy(),
            Expr::Binary {
                op: BinaryOp::StrictEq,
                left: Box::new(Node::new(Span::dummy(), Expr::TypeofExpr(Box::new(ident("x"))))),
                right: Box::new(str_lit("object")),
            },
        );
        assert!(detect_guard(&mut checker, &cond).is_none());
    }

    #[test]
    fn negated_typeof_guard_flips_through_a_leading_not() {
        let mut checker = Checker::new(CheckerOptions::default());
        let eq = Node::new(
            Span::dummy(),
            Expr::Binary {
                op: BinaryOp::StrictEq,
                left: Box::new(Node::new(Span::dummy(), Expr::TypeofExpr(Box::new(ident("x"))))),
                right: Box::new(str_lit("number")),
            },
        );
        let not = Node::new(
            Span::dummy(),
            Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(eq),
            },
        );
        let guard = detect_guard(&mut checker, &not).unwrap();
        assert!(guard.negated);
    }

    #[test]
    fn positive_narrowing_on_a_union_drops_incompatible_members() {
        let mut checker = Checker::new(CheckerOptions::default());
        let root = checker.root_env();
        let string = checker.arena.primitive(Primitive::String);
        let number = checker.arena.primitive(Primitive::Number);
        let union = tyck_types::new_union(&mut checker.arena, vec![string, number]);
        checker.envs.define(root, "x", union, false);
        let guard = TypeGuard {
            variable: "x".to_string(),
            narrowed_type: string,
            negated: false,
        };
        let child = apply_positive(&mut checker, root, &guard);
        let narrowed = checker.envs.resolve(child, "x").unwrap().ty;
        assert_eq!(narrowed, string);
    }

    #[test]
    fn negative_narrowing_on_a_union_has_fewer_members() {
        let mut checker = Checker::new(CheckerOptions::default());
        let root = checker.root_env();
        let string = checker.arena.primitive(Primitive::String);
        let number = checker.arena.primitive(Primitive::Number);
        let union = tyck_types::new_union(&mut checker.arena, vec![string, number]);
        checker.envs.define(root, "x", union, false);
        let guard = TypeGuard {
            variable: "x".to_string(),
            narrowed_type: string,
            negated: false,
        };
        let child = apply_negative(&mut checker, root, &guard);
        let narrowed = checker.envs.resolve(child, "x").unwrap().ty;
        assert_eq!(narrowed, number);
    }

    #[test]
    fn disjoint_primitives_have_no_overlap() {
        let mut checker = Checker::new(CheckerOptions::default());
        let string = checker.arena.primitive(Primitive::String);
        let number = checker.arena.primitive(Primitive::Number);
        let left = ident("x");
        left.set_type(string);
        check_comparison_overlap(&mut checker, BinaryOp::StrictEq, string, number, Span::dummy());
        assert_eq!(checker.diagnostics.len(), 1);
        assert_eq!(checker.diagnostics[0].code, diagnostic_codes::COMPARISON_NO_OVERLAP);
    }
}
