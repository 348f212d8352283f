//! The static type checker: wires the
//! environment (C2), resolver (C3), declaration checker (C4), expression
//! and statement checkers (C5), narrowing engine (C6), and overload
//! resolution together behind one [`check`] entry point.
//!
//! [`builtins::install`] must run once on a fresh [`Checker`] before
//! [`check`] — it's a separate step rather than folded into `check`
//! itself so a caller checking many small snippets against the same
//! global library only pays the installation cost once.

pub mod builtins;
pub mod checker;
pub mod declarations;
pub mod environment;
pub mod expr_checker;
pub mod narrowing;
pub mod overloads;
pub mod resolver;
pub mod stmt_checker;

pub use checker::{Checker, ScopeGuard, SelfReference};
pub use environment::{EnvId, EnvironmentArena, ValueBinding};
pub use expr_checker::check_expr;
pub use narrowing::{apply_negative, apply_positive, detect_guard, TypeGuard};
pub use overloads::{check_call, check_overload_implementations};
pub use stmt_checker::check_stmt;

use tyck_ast::{ClassDecl, ClassMember, Decl, Program, Stmt};
use tyck_common::diagnostics::{diagnostic_codes, diagnostic_messages};
use tyck_common::format_message;
use tyck_types::{display_type, is_assignable};

/// Runs both passes over `program` against `checker`'s current
/// environment: Pass 1 hoists every top-level type/function
/// declaration, Pass 2 then visits every top-level statement in source
/// order — function and class bodies included — and finally the
/// bidirectional overload/implementation compatibility check runs once
/// every signature is known, followed by a sweep for any
/// `ForwardReference`/`GenericForwardReference` placeholder Pass 2 left
/// unresolved.
///
/// Diagnostics accumulate on `checker.diagnostics`; this function's
/// return value is only the side effect of running the passes.
pub fn check(checker: &mut Checker, program: &Program) {
    checker.hoist_program(program);
    let root = checker.root_env();
    for stmt in &program.statements {
        match &stmt.kind {
            Stmt::Decl(decl) => check_top_level_decl(checker, decl, root),
            _ => stmt_checker::check_stmt(checker, stmt, root),
        }
    }
    overloads::check_overload_implementations(checker);
    checker.sweep_lingering_forward_references();
}

/// Pass 2's half of a top-level declaration: interfaces/aliases/enums
/// are pure type-level constructs with no body to revisit, so only
/// function and class declarations do anything here.
fn check_top_level_decl(checker: &mut Checker, decl: &Decl, root: EnvId) {
    match decl {
        Decl::Function(f) => expr_checker::check_function_body_only(checker, f, root),
        Decl::Class(c) => check_class_body(checker, c, root),
        Decl::Interface(_) | Decl::TypeAlias(_) | Decl::Enum(_) => {}
    }
}

/// Re-resolves a class's own type parameters in a fresh child scope
/// (mirroring [`Checker::hoist_program`]'s Pass 1 treatment, but
/// discarding the recomputed shape once diagnostics are collected — the
/// same "recompute, don't cross-reference Pass 1's ids" pattern
/// [`expr_checker::check_function_body_only`] uses for a function's own
/// type parameters), then checks every field initializer against its
/// declared type and every method body against its own signature.
fn check_class_body(checker: &mut Checker, class: &ClassDecl, root: EnvId) {
    let env = if class.type_params.is_empty() {
        root
    } else {
        let child = checker.envs.push_child(root);
        checker.bind_type_params(&class.type_params, child);
        child
    };

    for member in &class.members {
        match member {
            ClassMember::Field { ty, initializer: Some(init), .. } => {
                let declared = match ty {
                    Some(t) => checker.resolve_type_annotation(t, env),
                    None => checker.arena.any(),
                };
                let init_ty = expr_checker::check_expr(checker, init, env);
                if !is_assignable(&checker.arena, init_ty, declared) {
                    let (i_str, d_str) = (display_type(&checker.arena, init_ty), display_type(&checker.arena, declared));
                    checker.error(
                        init.span,
                        diagnostic_codes::ELEMENT_NOT_ASSIGNABLE_TO_VARIABLE,
                        format_message(diagnostic_messages::ELEMENT_NOT_ASSIGNABLE_TO_VARIABLE, &[&i_str, &d_str]),
                    );
                }
            }
            ClassMember::Field { initializer: None, .. } => {}
            ClassMember::Method { function, .. } => {
                expr_checker::check_function_body_only(checker, function, env);
            }
        }
    }
}
