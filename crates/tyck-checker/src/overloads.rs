//! Call matching and overload resolution: picking which
//! `Signature` of a (possibly multi-signature) callable `ObjectType`
//! applies to a given call site, and the bidirectional
//! implementation-vs-overload compatibility check run once hoisting
//! completes.

use tyck_ast::ENode;
use tyck_common::diagnostics::{diagnostic_codes, diagnostic_messages};
use tyck_common::{format_message, Span, TypeId};
use tyck_types::{display_type, is_assignable, Signature};

use crate::checker::Checker;

/// Checks `args` against `signatures` and returns the call's result
/// type, reporting diagnostics along the way.
///
/// A single signature is validated directly; multiple signatures go
/// through overload resolution (first match in declaration order) and,
/// on no match, a `NO_OVERLOAD_MATCHES` diagnostic listing every
/// candidate.
pub fn check_call(checker: &mut Checker, signatures: &[Signature], args: &[ENode], call_span: Span) -> TypeId {
    let arg_types: Vec<TypeId> = args.iter().map(|a| a.ty().unwrap_or_else(|| checker.arena.any())).collect();

    match signatures.len() {
        0 => checker.degrade_to_any("call on a type with no signatures"),
        1 => {
            let sig = signatures[0].clone();
            validate_arguments(checker, &sig, args, &arg_types);
            sig.return_type
        }
        _ => {
            let any = checker.arena.any();
            let chosen = signatures.iter().position(|s| signature_matches(&checker.arena, s, &arg_types, any));
            match chosen {
                Some(idx) => {
                    let sig = signatures[idx].clone();
                    validate_arguments(checker, &sig, args, &arg_types);
                    sig.return_type
                }
                None => {
                    let message = no_overload_matches_message(&checker.arena, &arg_types, signatures);
                    checker.error(call_span, diagnostic_codes::NO_OVERLOAD_MATCHES, message);
                    checker.arena.any()
                }
            }
        }
    }
}

/// One candidate's match test.
fn signature_matches(arena: &tyck_types::TypeArena, sig: &Signature, arg_types: &[TypeId], any: TypeId) -> bool {
    if sig.variadic {
        let fixed = sig.param_types.len();
        if arg_types.len() < fixed {
            return false;
        }
        for i in 0..fixed {
            if !is_assignable(arena, arg_types[i], sig.param_types[i]) {
                return false;
            }
        }
        let rest = sig.rest_type.unwrap_or(any);
        arg_types[fixed..].iter().all(|a| is_assignable(arena, *a, rest))
    } else {
        if arg_types.len() != sig.param_types.len() {
            return false;
        }
        arg_types
            .iter()
            .zip(&sig.param_types)
            .all(|(a, p)| is_assignable(arena, *a, *p))
    }
}

/// Re-validates `args` against the (already-matched, or only) `sig`,
/// reporting `ARGUMENT_NOT_ASSIGNABLE` per offending argument (re-validates
/// arguments against the chosen signature).
fn validate_arguments(checker: &mut Checker, sig: &Signature, args: &[ENode], arg_types: &[TypeId]) {
    for (i, (arg_node, &arg_ty)) in args.iter().zip(arg_types).enumerate() {
        let expected = if i < sig.param_types.len() {
            sig.param_types[i]
        } else if sig.variadic {
            sig.rest_type.unwrap_or_else(|| checker.arena.any())
        } else {
            continue;
        };
        if !is_assignable(&checker.arena, arg_ty, expected) {
            let (arg_str, expected_str) = (display_type(&checker.arena, arg_ty), display_type(&checker.arena, expected));
            checker.error(
                arg_node.span,
                diagnostic_codes::ARGUMENT_NOT_ASSIGNABLE,
                format_message(diagnostic_messages::ARGUMENT_NOT_ASSIGNABLE, &[&(i + 1).to_string(), &arg_str, &expected_str]),
            );
        }
    }
}

fn no_overload_matches_message(arena: &tyck_types::TypeArena, arg_types: &[TypeId], signatures: &[Signature]) -> String {
    let args_str = arg_types.iter().map(|t| display_type(arena, *t)).collect::<Vec<_>>().join(", ");
    let candidates = signatures
        .iter()
        .map(|s| format!("  {}", describe_signature(arena, s)))
        .collect::<Vec<_>>()
        .join("\n");
    format_message(diagnostic_messages::NO_OVERLOAD_MATCHES, &[&args_str, &candidates])
}

fn describe_signature(arena: &tyck_types::TypeArena, sig: &Signature) -> String {
    let mut s = String::from("(");
    for (i, p) in sig.param_types.iter().enumerate() {
        if i > 0 {
            s.push_str(", ");
        }
        s.push_str(&display_type(arena, *p));
        if sig.optional.get(i).copied().unwrap_or(false) {
            s.push('?');
        }
    }
    if sig.variadic {
        if !sig.param_types.is_empty() {
            s.push_str(", ");
        }
        s.push_str("...");
        if let Some(rest) = sig.rest_type {
            s.push_str(&display_type(arena, rest));
            s.push_str("[]");
        }
    }
    s.push_str(") => ");
    s.push_str(&display_type(arena, sig.return_type));
    s
}

/// Runs the bidirectional implementation-vs-overload compatibility
/// check for every function name that had pending overloads
/// at hoisting time. Call once after [`Checker::hoist_program`].
pub fn check_overload_implementations(checker: &mut Checker) {
    let root = checker.root_env();
    let pairs: Vec<(String, Signature)> = checker.implementation_signatures.clone().into_iter().collect();
    for (name, implementation) in pairs {
        let Some(object_ty) = checker.envs.completed_overload(root, &name) else { continue };
        let tyck_types::Type::Object(obj) = checker.arena.get(object_ty).clone() else { continue };
        for overload in &obj.call_signatures {
            if !compatible_with_implementation(&checker.arena, overload, &implementation) {
                let (overload_str, impl_str) = (
                    describe_signature(&checker.arena, overload),
                    describe_signature(&checker.arena, &implementation),
                );
                checker.error(
                    Span::dummy(),
                    diagnostic_codes::OVERLOAD_IMPLEMENTATION_INCOMPATIBLE,
                    format_message(diagnostic_messages::OVERLOAD_IMPLEMENTATION_INCOMPATIBLE, &[&impl_str, &overload_str]),
                );
            }
        }
    }
}

fn compatible_with_implementation(arena: &tyck_types::TypeArena, overload: &Signature, implementation: &Signature) -> bool {
    if overload.param_types.len() != implementation.param_types.len() {
        return false;
    }
    let params_ok = overload
        .param_types
        .iter()
        .zip(&implementation.param_types)
        .all(|(o, i)| is_assignable(arena, *o, *i));
    params_ok && is_assignable(arena, overload.return_type, implementation.return_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tyck_ast::node::Node;
    use tyck_common::CheckerOptions;
    use tyck_types::{ObjectType, Primitive, Type};

    fn lit_num(checker: &mut Checker, n: f64) -> ENode {
        let span = Span::dummy();
        let node = Node::new(span, tyck_ast::Expr::Literal(tyck_ast::Value::Number(n)));
        let ty = checker.arena.alloc(Type::Literal(tyck_types::LiteralType {
            value: tyck_ast::Value::Number(n),
        }));
        node.set_type(ty);
        node
    }

    #[test]
    fn picks_first_matching_overload_in_declaration_order() {
        let mut checker = Checker::new(CheckerOptions::default());
        let number = checker.arena.primitive(Primitive::Number);
        let string = checker.arena.primitive(Primitive::String);
        let sigs = vec![
            Signature {
                param_types: vec![number],
                optional: vec![false],
                return_type: number,
                variadic: false,
                rest_type: None,
            },
            Signature {
                param_types: vec![string],
                optional: vec![false],
                return_type: string,
                variadic: false,
                rest_type: None,
            },
        ];
        let arg = lit_num(&mut checker, 1.0);
        let ret = check_call(&mut checker, &sigs, std::slice::from_ref(&arg), Span::dummy());
        assert_eq!(ret, number);
        assert!(checker.diagnostics.is_empty());
    }

    #[test]
    fn no_match_reports_every_candidate() {
        let mut checker = Checker::new(CheckerOptions::default());
        let number = checker.arena.primitive(Primitive::Number);
        let boolean = checker.arena.primitive(Primitive::Boolean);
        let string = checker.arena.primitive(Primitive::String);
        let sigs = vec![
            Signature {
                param_types: vec![number],
                optional: vec![false],
                return_type: number,
                variadic: false,
                rest_type: None,
            },
            Signature {
                param_types: vec![string],
                optional: vec![false],
                return_type: string,
                variadic: false,
                rest_type: None,
            },
        ];
        let node = Node::new(Span::dummy(), tyck_ast::Expr::Literal(tyck_ast::Value::Boolean(true)));
        node.set_type(boolean);
        let ret = check_call(&mut checker, &sigs, std::slice::from_ref(&node), Span::dummy());
        assert_eq!(ret, checker.arena.any());
        assert_eq!(checker.diagnostics.len(), 1);
        assert_eq!(checker.diagnostics[0].code, diagnostic_codes::NO_OVERLOAD_MATCHES);
        assert!(checker.diagnostics[0].message.contains("boolean"));
    }

    #[test]
    fn implementation_incompatible_with_a_narrower_overload_is_flagged() {
        let mut checker = Checker::new(CheckerOptions::default());
        let number = checker.arena.primitive(Primitive::Number);
        let string = checker.arena.primitive(Primitive::String);
        let overload = Signature {
            param_types: vec![string],
            optional: vec![false],
            return_type: string,
            variadic: false,
            rest_type: None,
        };
        let mut obj = ObjectType::empty();
        obj.call_signatures.push(overload);
        let object_ty = checker.arena.alloc(Type::Object(obj));
        let root = checker.root_env();
        checker.envs.set_completed_overload(root, "f", object_ty);
        checker.implementation_signatures.insert(
            "f".to_string(),
            Signature {
                param_types: vec![number],
                optional: vec![false],
                return_type: number,
                variadic: false,
                rest_type: None,
            },
        );
        check_overload_implementations(&mut checker);
        assert_eq!(checker.diagnostics.len(), 1);
        assert_eq!(checker.diagnostics[0].code, diagnostic_codes::OVERLOAD_IMPLEMENTATION_INCOMPATIBLE);
    }
}
