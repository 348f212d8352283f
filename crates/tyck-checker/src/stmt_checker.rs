//! Statement checker: visits every statement
//! form in source order, manages block/loop/switch scoping, and feeds
//! the narrowing engine on `if` conditions.
//!
//! Mirrors [`crate::expr_checker`]'s shape — a `check_stmt` dispatch plus
//! one private helper per statement kind — so the two visitors read as
//! one family rather than two unrelated styles.

use tyck_ast::{Decl, ENode, SNode, Stmt, SwitchCase, VarKind};
use tyck_common::diagnostics::{diagnostic_codes, diagnostic_messages};
use tyck_common::{format_message, TypeId};
use tyck_types::{display_type, instantiate_generic, is_assignable, widen, Primitive, Type};

use crate::checker::Checker;
use crate::environment::EnvId;
use crate::expr_checker::{check_expr, check_nested_function_decl};
use crate::narrowing;

/// Checks `stmt` in `env`. Unlike [`check_expr`], statements carry no
/// single "computed type" worth recording on the node itself — the
/// interesting output is the diagnostics and the bindings it leaves in
/// `env` for the statements that follow it.
pub fn check_stmt(checker: &mut Checker, stmt: &SNode, env: EnvId) {
    match &stmt.kind {
        Stmt::Expr(e) => {
            check_expr(checker, e, env);
        }
        Stmt::VarDecl { kind, name, ty, init } => check_var_decl(checker, *kind, name, ty.as_ref(), init.as_ref(), env),
        Stmt::Decl(decl) => check_nested_decl(checker, decl, env),
        Stmt::Block(stmts) => {
            let mut scope = checker.enter_scope();
            let body_env = scope.current;
            for s in stmts {
                check_stmt(&mut scope, s, body_env);
            }
        }
        Stmt::If { test, consequent, alternate } => check_if(checker, test, consequent, alternate.as_deref(), env),
        Stmt::While { test, body } => check_while(checker, test, body, env),
        Stmt::For { init, test, update, body } => check_for(checker, init.as_deref(), test.as_ref(), update.as_ref(), body, env),
        Stmt::Switch { discriminant, cases } => check_switch(checker, discriminant, cases, env),
        Stmt::ForOf { decl_name, iterable, body } => check_for_of(checker, decl_name, iterable, body, env),
        Stmt::ForIn { decl_name, object, body } => check_for_in(checker, decl_name, object, body, env),
        Stmt::Return(expr) => check_return(checker, expr.as_ref(), env),
        Stmt::With { object, body } => check_with(checker, object, body, env),
        Stmt::Throw(e) => {
            check_expr(checker, e, env);
        }
    }
}

/// Annotated type wins; otherwise the initializer's type is widened
/// (except for `const`, which keeps a literal initializer's literal type
/// — variable declarations).
fn check_var_decl(checker: &mut Checker, kind: VarKind, name: &str, ty: Option<&tyck_ast::TNode>, init: Option<&ENode>, env: EnvId) {
    let declared = ty.map(|t| checker.resolve_type_annotation(t, env));
    let init_ty = init.map(|e| check_expr(checker, e, env));

    let final_ty = match (declared, init_ty) {
        (Some(d), Some(i)) => {
            if !is_assignable(&checker.arena, i, d) {
                let (i_str, d_str) = (display_type(&checker.arena, i), display_type(&checker.arena, d));
                checker.error(
                    init.expect("init_ty implies init").span,
                    diagnostic_codes::ELEMENT_NOT_ASSIGNABLE_TO_VARIABLE,
                    format_message(diagnostic_messages::ELEMENT_NOT_ASSIGNABLE_TO_VARIABLE, &[&i_str, &d_str]),
                );
            }
            d
        }
        (Some(d), None) => d,
        (None, Some(i)) => {
            if kind == VarKind::Const {
                i
            } else {
                widen(&mut checker.arena, i)
            }
        }
        (None, None) => checker.arena.any(),
    };
    checker.envs.define(env, name, final_ty, kind == VarKind::Const);
}

/// A function declaration nested inside a block: hoisting
/// pass is top-level only, so it's resolved and bound here, where it's
/// encountered. Nested type-level declarations (interfaces, aliases,
/// enums, classes) aren't hoisted here — Pass 1 names them
/// top-level only — so they're left unbound rather than invented.
fn check_nested_decl(checker: &mut Checker, decl: &Decl, env: EnvId) {
    if let Decl::Function(f) = decl {
        check_nested_function_decl(checker, f, env);
    }
}

fn check_if(checker: &mut Checker, test: &ENode, consequent: &SNode, alternate: Option<&SNode>, env: EnvId) {
    check_expr(checker, test, env);
    let guard = narrowing::detect_guard(checker, test);
    let (then_env, else_env) = match &guard {
        Some(g) if !g.negated => (narrowing::apply_positive(checker, env, g), narrowing::apply_negative(checker, env, g)),
        Some(g) => (narrowing::apply_negative(checker, env, g), narrowing::apply_positive(checker, env, g)),
        None => (env, env),
    };
    check_stmt(checker, consequent, then_env);
    if let Some(alt) = alternate {
        check_stmt(checker, alt, else_env);
    }
}

fn check_while(checker: &mut Checker, test: &ENode, body: &SNode, env: EnvId) {
    check_expr(checker, test, env);
    let mut scope = checker.enter_scope();
    let body_env = scope.current;
    check_stmt(&mut scope, body, body_env);
}

/// Loop header and body execute in one shared child scope so
/// `for (let i = 0; ...)` binds `i` visibly to `test`,
/// `update`, and `body` alike.
fn check_for(checker: &mut Checker, init: Option<&SNode>, test: Option<&ENode>, update: Option<&ENode>, body: &SNode, env: EnvId) {
    let mut scope = checker.enter_scope();
    let loop_env = scope.current;
    if let Some(init) = init {
        check_stmt(&mut scope, init, loop_env);
    }
    if let Some(test) = test {
        check_expr(&mut scope, test, loop_env);
    }
    if let Some(update) = update {
        check_expr(&mut scope, update, loop_env);
    }
    check_stmt(&mut scope, body, loop_env);
}

/// Compares every case's widened type to the subject's widened type
///; all cases run in one shared child scope so a
/// `let` in one fallthrough case stays visible to the next.
fn check_switch(checker: &mut Checker, discriminant: &ENode, cases: &[SwitchCase], env: EnvId) {
    let subject_ty = check_expr(checker, discriminant, env);
    let subject_widened = widen(&mut checker.arena, subject_ty);

    let mut scope = checker.enter_scope();
    let switch_env = scope.current;
    for case in cases {
        if let Some(test) = &case.test {
            let test_ty = check_expr(&mut scope, test, switch_env);
            let test_widened = widen(&mut scope.arena, test_ty);
            let any_or_unknown = is_any_or_unknown(&scope.arena, subject_widened) || is_any_or_unknown(&scope.arena, test_widened);
            if !any_or_unknown && is_callable_or_array(&scope.arena, subject_widened) != is_callable_or_array(&scope.arena, test_widened) {
                let (t_str, s_str) = (display_type(&scope.arena, test_widened), display_type(&scope.arena, subject_widened));
                scope.error(
                    test.span,
                    diagnostic_codes::SWITCH_CASE_NOT_COMPARABLE,
                    format_message(diagnostic_messages::SWITCH_CASE_NOT_COMPARABLE, &[&t_str, &s_str]),
                );
            }
        }
        for s in &case.body {
            check_stmt(&mut scope, s, switch_env);
        }
    }
}

fn is_any_or_unknown(arena: &tyck_types::TypeArena, t: TypeId) -> bool {
    matches!(arena.get(t), Type::Primitive(Primitive::Any | Primitive::Unknown))
}

fn is_callable_or_array(arena: &tyck_types::TypeArena, t: TypeId) -> bool {
    match arena.get(t) {
        Type::Object(obj) => obj.is_callable(),
        Type::Array(_) => true,
        _ => false,
    }
}

/// Element type for a for-of loop: array element, `string` on
/// `string`, `any` on `any`/generator, else assignability to
/// `Iterable<any>` (if installed) falls back to `any`, else
/// `TYPE_NOT_ITERABLE`.
fn check_for_of(checker: &mut Checker, decl_name: &str, iterable: &ENode, body: &SNode, env: EnvId) {
    let iterable_ty = check_expr(checker, iterable, env);
    let element_ty = for_of_element_type(checker, iterable_ty, iterable.span, env);

    let mut scope = checker.enter_scope();
    let body_env = scope.current;
    scope.envs.define(body_env, decl_name, element_ty, false);
    check_stmt(&mut scope, body, body_env);
}

fn for_of_element_type(checker: &mut Checker, iterable_ty: TypeId, span: tyck_common::Span, env: EnvId) -> TypeId {
    match checker.arena.get(iterable_ty).clone() {
        Type::Array(elem) => elem,
        Type::Primitive(Primitive::String) => checker.arena.primitive(Primitive::String),
        Type::Primitive(Primitive::Any) => checker.arena.any(),
        Type::Object(obj) if obj.class_meta.as_ref().is_some_and(|m| m.class_name == "Generator") => checker.arena.any(),
        _ => {
            let Some(iterable_generic) = checker.envs.resolve_type(env, "Iterable") else {
                report_not_iterable(checker, iterable_ty, span);
                return checker.arena.any();
            };
            let any = checker.arena.any();
            let iterable_any = instantiate_generic(&mut checker.arena, iterable_generic, &[any]);
            if is_assignable(&checker.arena, iterable_ty, iterable_any) {
                checker.arena.any()
            } else {
                report_not_iterable(checker, iterable_ty, span);
                checker.arena.any()
            }
        }
    }
}

fn report_not_iterable(checker: &mut Checker, ty: TypeId, span: tyck_common::Span) {
    let t_str = display_type(&checker.arena, ty);
    checker.error(
        span,
        diagnostic_codes::TYPE_NOT_ITERABLE,
        format_message(diagnostic_messages::TYPE_NOT_ITERABLE, &[&t_str]),
    );
}

/// Element type is always `string`; `null`/
/// `undefined` subjects are reported via the same "not iterable"
/// diagnostic family, other primitives are allowed through.
fn check_for_in(checker: &mut Checker, decl_name: &str, object: &ENode, body: &SNode, env: EnvId) {
    let object_ty = check_expr(checker, object, env);
    if matches!(checker.arena.get(object_ty), Type::Primitive(Primitive::Null | Primitive::Undefined)) {
        report_not_iterable(checker, object_ty, object.span);
    }
    let string_ty = checker.arena.primitive(Primitive::String);

    let mut scope = checker.enter_scope();
    let body_env = scope.current;
    scope.envs.define(body_env, decl_name, string_ty, false);
    check_stmt(&mut scope, body, body_env);
}

fn check_return(checker: &mut Checker, expr: Option<&ENode>, env: EnvId) {
    let ty = match expr {
        Some(e) => check_expr(checker, e, env),
        None => checker.arena.undefined(),
    };
    let Some(&expected) = checker.return_type_stack.last() else { return };
    if !is_assignable(&checker.arena, ty, expected) {
        let (t_str, e_str) = (display_type(&checker.arena, ty), display_type(&checker.arena, expected));
        let span = expr.map_or(tyck_common::Span::dummy(), |e| e.span);
        checker.error(
            span,
            diagnostic_codes::NOT_ASSIGNABLE,
            format_message(diagnostic_messages::NOT_ASSIGNABLE, &[&t_str, &e_str]),
        );
    }
}

/// Pushes a with-object frame for the body's duration. Only object
/// and `any` heads are pushed — non-object heads contribute no
/// properties, since resolution falls through for them — `any` is
/// pushed too because [`crate::expr_checker`]'s identifier lookup treats
/// an `any` frame as "resolution silently succeeds".
fn check_with(checker: &mut Checker, object: &ENode, body: &SNode, env: EnvId) {
    let object_ty = check_expr(checker, object, env);
    let should_push = matches!(checker.arena.get(object_ty), Type::Object(_) | Type::Primitive(Primitive::Any));

    let mut scope = checker.enter_scope();
    if should_push {
        scope.with_stack.push(object_ty);
    }
    let body_env = scope.current;
    check_stmt(&mut scope, body, body_env);
    if should_push {
        scope.with_stack.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tyck_ast::node::Node;
    use tyck_ast::{BinaryOp, Expr, Value};
    use tyck_common::{CheckerOptions, Span};
    use tyck_types::Primitive;

    fn ident(name: &str) -> ENode {
        Node::new(Span::dummy(), Expr::Identifier(name.to_string()))
    }

    fn num_lit(n: f64) -> ENode {
        Node::new(Span::dummy(), Expr::Literal(Value::Number(n)))
    }

    #[test]
    fn let_without_annotation_widens_the_initializer() {
        let mut checker = Checker::new(CheckerOptions::default());
        let root = checker.root_env();
        let stmt = Node::new(
            Span::dummy(),
            Stmt::VarDecl {
                kind: VarKind::Let,
                name: "x".to_string(),
                ty: None,
                init: Some(num_lit(1.0)),
            },
        );
        check_stmt(&mut checker, &stmt, root);
        let binding = checker.envs.resolve(root, "x").unwrap();
        assert!(matches!(checker.arena.get(binding.ty), Type::Primitive(Primitive::Number)));
        assert!(!binding.is_const);
    }

    #[test]
    fn const_without_annotation_keeps_the_literal_type() {
        let mut checker = Checker::new(CheckerOptions::default());
        let root = checker.root_env();
        let stmt = Node::new(
            Span::dummy(),
            Stmt::VarDecl {
                kind: VarKind::Const,
                name: "x".to_string(),
                ty: None,
                init: Some(num_lit(1.0)),
            },
        );
        check_stmt(&mut checker, &stmt, root);
        let binding = checker.envs.resolve(root, "x").unwrap();
        match checker.arena.get(binding.ty) {
            Type::Literal(l) => assert_eq!(l.value, Value::Number(1.0)),
            other => panic!("expected Literal, got {other:?}"),
        }
        assert!(binding.is_const);
    }

    #[test]
    fn if_with_typeof_guard_narrows_inside_the_then_branch() {
        let mut checker = Checker::new(CheckerOptions::default());
        let root = checker.root_env();
        let string = checker.arena.primitive(Primitive::String);
        let number = checker.arena.primitive(Primitive::Number);
        let union = tyck_types::new_union(&mut checker.arena, vec![string, number]);
        checker.envs.define(root, "x", union, false);

        let cond = Node::new(
            Span::dummy(),
            Expr::Binary {
                op: BinaryOp::StrictEq,
                left: Box::new(Node::new(Span::dummy(), Expr::TypeofExpr(Box::new(ident("x"))))),
                right: Box::new(Node::new(Span::dummy(), Expr::Literal(Value::String("string".to_string())))),
            },
        );
        let consequent = Node::new(
            Span::dummy(),
            Stmt::Expr(Node::new(
                Span::dummy(),
                Expr::Binary {
                    op: BinaryOp::Add,
                    left: Box::new(ident("x")),
                    right: Box::new(Node::new(Span::dummy(), Expr::Literal(Value::String("!".to_string())))),
                },
            )),
        );
        let if_stmt = Node::new(
            Span::dummy(),
            Stmt::If {
                test: cond,
                consequent: Box::new(consequent),
                alternate: None,
            },
        );
        check_stmt(&mut checker, &if_stmt, root);
        assert!(checker.diagnostics.is_empty());
    }

    #[test]
    fn for_of_over_an_array_binds_the_element_type() {
        let mut checker = Checker::new(CheckerOptions::default());
        let root = checker.root_env();
        let number = checker.arena.primitive(Primitive::Number);
        let array = checker.arena.alloc(Type::Array(number));
        checker.envs.define(root, "xs", array, false);

        let body = Node::new(Span::dummy(), Stmt::Expr(ident("n")));
        let for_of = Node::new(
            Span::dummy(),
            Stmt::ForOf {
                decl_name: "n".to_string(),
                iterable: ident("xs"),
                body: Box::new(body),
            },
        );
        check_stmt(&mut checker, &for_of, root);
        assert!(checker.diagnostics.is_empty());
    }

    #[test]
    fn for_of_over_a_non_iterable_reports_type_not_iterable() {
        let mut checker = Checker::new(CheckerOptions::default());
        let root = checker.root_env();
        let number = checker.arena.primitive(Primitive::Number);
        checker.envs.define(root, "n", number, false);

        let body = Node::new(Span::dummy(), Stmt::Block(vec![]));
        let for_of = Node::new(
            Span::dummy(),
            Stmt::ForOf {
                decl_name: "x".to_string(),
                iterable: ident("n"),
                body: Box::new(body),
            },
        );
        check_stmt(&mut checker, &for_of, root);
        assert_eq!(checker.diagnostics.len(), 1);
        assert_eq!(checker.diagnostics[0].code, diagnostic_codes::TYPE_NOT_ITERABLE);
    }

    #[test]
    fn for_in_binds_the_key_as_string() {
        let mut checker = Checker::new(CheckerOptions::default());
        let root = checker.root_env();
        let obj = checker.arena.alloc(Type::Object(tyck_types::ObjectType::empty()));
        checker.envs.define(root, "o", obj, false);

        let body = Node::new(Span::dummy(), Stmt::Expr(ident("k")));
        let for_in = Node::new(
            Span::dummy(),
            Stmt::ForIn {
                decl_name: "k".to_string(),
                object: ident("o"),
                body: Box::new(body),
            },
        );
        check_stmt(&mut checker, &for_in, root);
        assert!(checker.diagnostics.is_empty());
    }

    #[test]
    fn switch_case_incompatible_with_subject_is_reported() {
        let mut checker = Checker::new(CheckerOptions::default());
        let root = checker.root_env();
        let any = checker.arena.any();
        let mut obj = tyck_types::ObjectType::empty();
        obj.call_signatures.push(tyck_types::Signature {
            param_types: vec![],
            optional: vec![],
            return_type: any,
            variadic: false,
            rest_type: None,
        });
        let callable = checker.arena.alloc(Type::Object(obj));
        let discriminant = ident("f");
        checker.envs.define(root, "f", callable, false);

        let case = SwitchCase {
            test: Some(num_lit(1.0)),
            body: vec![],
        };
        let switch = Node::new(
            Span::dummy(),
            Stmt::Switch {
                discriminant,
                cases: vec![case],
            },
        );
        check_stmt(&mut checker, &switch, root);
        assert_eq!(checker.diagnostics.len(), 1);
        assert_eq!(checker.diagnostics[0].code, diagnostic_codes::SWITCH_CASE_NOT_COMPARABLE);
    }
}
