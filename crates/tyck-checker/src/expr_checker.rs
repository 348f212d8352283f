//! Expression checker: computes each
//! expression node's `TypeId` in source order and stores it on the node
//! via [`tyck_ast::node::Node::set_type`].

use tyck_ast::{BinaryOp, ENode, Expr, FunctionExpr, ObjectProp, Param, SNode, TNode, TypeParamDecl, UnaryOp, Value};
use tyck_common::diagnostics::{diagnostic_codes, diagnostic_messages};
use tyck_common::{format_message, Span, TypeId};
use tyck_types::{display_type, instantiate_generic, is_assignable, new_union, ObjectType, Primitive, Signature, Type};

use crate::checker::Checker;
use crate::environment::EnvId;
use crate::narrowing;
use crate::overloads;

/// Checks `node` in `env`, records its type on the node, and returns it.
pub fn check_expr(checker: &mut Checker, node: &ENode, env: EnvId) -> TypeId {
    let ty = compute_expr(checker, node, env);
    node.set_type(ty);
    ty
}

fn compute_expr(checker: &mut Checker, node: &ENode, env: EnvId) -> TypeId {
    match &node.kind {
        Expr::Literal(value) => check_literal(checker, value),
        Expr::Identifier(name) => check_identifier(checker, name, env, node.span),
        Expr::This => checker.arena.any(),
        Expr::Array(elements) => check_array(checker, elements, env),
        Expr::Object(props) => check_object(checker, props, env),
        Expr::Call { callee, args, .. } => check_call_expr(checker, callee, args, env, node.span),
        Expr::New { callee, args, .. } => check_new_expr(checker, callee, args, env, node.span),
        Expr::Member { object, property, optional } => check_member(checker, object, property, *optional, env),
        Expr::Index { object, index, optional } => check_index(checker, object, index, *optional, env),
        Expr::Binary { op, left, right } => check_binary(checker, *op, left, right, env, node.span),
        Expr::Unary { op, operand } => check_unary(checker, *op, operand, env),
        Expr::Assign { target, value } => check_assign(checker, target, value, env, node.span),
        Expr::Conditional { test, consequent, alternate } => check_conditional(checker, test, consequent, alternate, env),
        Expr::TypeAssertion { expr, ty } => {
            check_expr(checker, expr, env);
            checker.resolve_type_annotation(ty, env)
        }
        Expr::TypeofExpr(inner) => {
            check_expr(checker, inner, env);
            checker.arena.primitive(Primitive::String)
        }
        Expr::Yield(operand) => check_yield(checker, operand.as_deref(), env),
        Expr::Await(operand) => check_await(checker, operand, env),
        Expr::Function(f) | Expr::Arrow(f) => check_function_like(checker, f, env),
    }
}

fn check_literal(checker: &mut Checker, value: &Value) -> TypeId {
    checker.arena.alloc(Type::Literal(tyck_types::LiteralType { value: value.clone() }))
}

/// Identifiers resolve through any enclosing `with` frames first,
/// innermost last, before falling back to lexical scope.
fn check_identifier(checker: &mut Checker, name: &str, env: EnvId, span: Span) -> TypeId {
    for &frame in checker.with_stack.clone().iter().rev() {
        if matches!(checker.arena.get(frame), Type::Primitive(Primitive::Any)) {
            return checker.arena.any();
        }
        if let Type::Object(obj) = checker.arena.get(frame) {
            if let Some(&ty) = obj.properties.get(name) {
                return ty;
            }
        }
    }
    match checker.envs.resolve(env, name) {
        Some(binding) => binding.ty,
        None => {
            checker.error(
                span,
                diagnostic_codes::UNDEFINED_VARIABLE,
                format_message(diagnostic_messages::UNDEFINED_VARIABLE, &[name]),
            );
            checker.arena.any()
        }
    }
}

/// `[]` infers `Array<any>`; `[e1, e2, ...]` infers `Array<union of
/// element types>`. Widening to the
/// variable's declared type, if any, happens at the assignment site.
fn check_array(checker: &mut Checker, elements: &[ENode], env: EnvId) -> TypeId {
    if elements.is_empty() {
        let any = checker.arena.any();
        return checker.arena.alloc(Type::Array(any));
    }
    let element_types: Vec<TypeId> = elements.iter().map(|e| check_expr(checker, e, env)).collect();
    let elem = new_union(&mut checker.arena, element_types);
    checker.arena.alloc(Type::Array(elem))
}

fn check_object(checker: &mut Checker, props: &[ObjectProp], env: EnvId) -> TypeId {
    let mut obj = ObjectType::empty();
    for prop in props {
        let ty = check_expr(checker, &prop.value, env);
        obj.properties.insert(prop.key.clone(), ty);
    }
    checker.arena.alloc(Type::Object(obj))
}

fn check_call_expr(checker: &mut Checker, callee: &ENode, args: &[ENode], env: EnvId, call_span: Span) -> TypeId {
    let callee_ty = check_expr(checker, callee, env);
    for arg in args {
        check_expr(checker, arg, env);
    }
    let signatures = match checker.arena.get(callee_ty) {
        Type::Object(obj) => obj.call_signatures.clone(),
        Type::Primitive(Primitive::Any) => return checker.arena.any(),
        _ => Vec::new(),
    };
    overloads::check_call(checker, &signatures, args, call_span)
}

fn check_new_expr(checker: &mut Checker, callee: &ENode, args: &[ENode], env: EnvId, call_span: Span) -> TypeId {
    let callee_ty = check_expr(checker, callee, env);
    for arg in args {
        check_expr(checker, arg, env);
    }
    let signatures = match checker.arena.get(callee_ty) {
        Type::Object(obj) => obj.construct_signatures.clone(),
        Type::Primitive(Primitive::Any) => return checker.arena.any(),
        _ => Vec::new(),
    };
    overloads::check_call(checker, &signatures, args, call_span)
}

/// A property that doesn't exist on the object's structural shape
/// degrades to `any` rather than raising a diagnostic: no catalog entry
/// covers this case,
/// so inventing a new code here would not be grounded in anything.
fn check_member(checker: &mut Checker, object: &ENode, property: &str, optional: bool, env: EnvId) -> TypeId {
    let object_ty = check_expr(checker, object, env);
    let _ = optional;
    property_type(checker, object_ty, property)
}

fn property_type(checker: &mut Checker, object_ty: TypeId, property: &str) -> TypeId {
    match checker.arena.get(object_ty).clone() {
        Type::Primitive(Primitive::Any | Primitive::Unknown) => checker.arena.any(),
        Type::Object(obj) => {
            if let Some(&ty) = obj.properties.get(property) {
                return ty;
            }
            for index in &obj.index_signatures {
                if matches!(checker.arena.get(index.key), Type::Primitive(Primitive::String)) {
                    return index.value;
                }
            }
            checker.degrade_to_any("member access on an object type with no matching property")
        }
        Type::Primitive(p) => {
            let root = checker.root_env();
            match checker.envs.primitive_prototype(root, p) {
                Some(proto) => property_type(checker, proto, property),
                None => checker.degrade_to_any("member access on a primitive with no installed prototype"),
            }
        }
        Type::Array(_) if property == "length" => checker.arena.primitive(Primitive::Number),
        _ => checker.degrade_to_any("member access on a type with no properties"),
    }
}

fn check_index(checker: &mut Checker, object: &ENode, index: &ENode, _optional: bool, env: EnvId) -> TypeId {
    let object_ty = check_expr(checker, object, env);
    let index_ty = check_expr(checker, index, env);
    match checker.arena.get(object_ty).clone() {
        Type::Array(elem) => elem,
        Type::Tuple(tuple) => {
            if let Type::Literal(lit) = checker.arena.get(index_ty) {
                if let Value::Number(n) = &lit.value {
                    if let Some(&ty) = tuple.elements.get(*n as usize) {
                        return ty;
                    }
                }
            }
            new_union(&mut checker.arena, tuple.elements.clone())
        }
        Type::Object(obj) => {
            if let Type::Literal(lit) = checker.arena.get(index_ty) {
                if let Value::String(key) = &lit.value {
                    if let Some(&ty) = obj.properties.get(key) {
                        return ty;
                    }
                }
            }
            for sig in &obj.index_signatures {
                if is_assignable(&checker.arena, index_ty, sig.key) {
                    return sig.value;
                }
            }
            checker.degrade_to_any("indexed access with no matching index signature")
        }
        Type::Primitive(Primitive::Any) => checker.arena.any(),
        _ => checker.degrade_to_any("indexed access on a non-indexable type"),
    }
}

fn check_binary(checker: &mut Checker, op: BinaryOp, left: &ENode, right: &ENode, env: EnvId, span: Span) -> TypeId {
    let left_ty = check_expr(checker, left, env);
    let right_ty = check_expr(checker, right, env);
    match op {
        BinaryOp::Add => {
            let string = checker.arena.primitive(Primitive::String);
            if is_assignable(&checker.arena, left_ty, string) || is_assignable(&checker.arena, right_ty, string) {
                string
            } else {
                checker.arena.primitive(Primitive::Number)
            }
        }
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => checker.arena.primitive(Primitive::Number),
        BinaryOp::Lt | BinaryOp::Gt => checker.arena.primitive(Primitive::Boolean),
        BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::StrictEq | BinaryOp::StrictNotEq => {
            narrowing::check_comparison_overlap(checker, op, left_ty, right_ty, span);
            checker.arena.primitive(Primitive::Boolean)
        }
        BinaryOp::And => right_ty,
        BinaryOp::Or => new_union(&mut checker.arena, vec![left_ty, right_ty]),
        BinaryOp::Instanceof | BinaryOp::In => checker.arena.primitive(Primitive::Boolean),
    }
}

fn check_unary(checker: &mut Checker, op: UnaryOp, operand: &ENode, env: EnvId) -> TypeId {
    let operand_ty = check_expr(checker, operand, env);
    match op {
        UnaryOp::Not => checker.arena.primitive(Primitive::Boolean),
        UnaryOp::Neg => checker.arena.primitive(Primitive::Number),
        UnaryOp::TypeofOp => {
            let _ = operand_ty;
            checker.arena.primitive(Primitive::String)
        }
    }
}

fn check_assign(checker: &mut Checker, target: &ENode, value: &ENode, env: EnvId, span: Span) -> TypeId {
    let target_ty = check_expr(checker, target, env);
    let value_ty = check_expr(checker, value, env);
    if !is_assignable(&checker.arena, value_ty, target_ty) {
        let (v, t) = (display_type(&checker.arena, value_ty), display_type(&checker.arena, target_ty));
        checker.error(
            span,
            diagnostic_codes::NOT_ASSIGNABLE,
            format_message(diagnostic_messages::NOT_ASSIGNABLE, &[&v, &t]),
        );
    }
    target_ty
}

fn check_conditional(checker: &mut Checker, test: &ENode, consequent: &ENode, alternate: &ENode, env: EnvId) -> TypeId {
    check_expr(checker, test, env);
    let guard = narrowing::detect_guard(checker, test);
    let consequent_ty = match &guard {
        Some(g) if !g.negated => {
            let narrowed_env = narrowing::apply_positive(checker, env, g);
            check_expr(checker, consequent, narrowed_env)
        }
        Some(g) => {
            let narrowed_env = narrowing::apply_negative(checker, env, g);
            check_expr(checker, consequent, narrowed_env)
        }
        None => check_expr(checker, consequent, env),
    };
    let alternate_ty = match &guard {
        Some(g) if !g.negated => {
            let narrowed_env = narrowing::apply_negative(checker, env, g);
            check_expr(checker, alternate, narrowed_env)
        }
        Some(g) => {
            let narrowed_env = narrowing::apply_positive(checker, env, g);
            check_expr(checker, alternate, narrowed_env)
        }
        None => check_expr(checker, alternate, env),
    };
    new_union(&mut checker.arena, vec![consequent_ty, alternate_ty])
}

fn check_yield(checker: &mut Checker, operand: Option<&ENode>, env: EnvId) -> TypeId {
    let operand_ty = match operand {
        Some(node) => check_expr(checker, node, env),
        None => checker.arena.undefined(),
    };
    if let Some(frame) = checker.yield_stack.last_mut() {
        frame.push(operand_ty);
    }
    checker.arena.any()
}

fn check_await(checker: &mut Checker, operand: &ENode, env: EnvId) -> TypeId {
    let operand_ty = check_expr(checker, operand, env);
    match checker.arena.get(operand_ty) {
        Type::Object(obj) => obj.properties.get("__resolved").copied().unwrap_or(operand_ty),
        _ => operand_ty,
    }
}

/// Checks a function/arrow expression's parameters and body, returning a
/// callable `ObjectType` wrapping its signature.
pub(crate) fn check_function_like(checker: &mut Checker, f: &FunctionExpr, env: EnvId) -> TypeId {
    let (final_return, param_types, optional, variadic, rest_type) = check_function_core(
        checker,
        &f.type_params,
        &f.params,
        f.return_type.as_ref(),
        &f.body,
        f.is_generator,
        f.is_async,
        env,
    );
    let mut obj = ObjectType::empty();
    obj.call_signatures.push(Signature {
        param_types,
        optional,
        return_type: final_return,
        variadic,
        rest_type,
    });
    checker.arena.alloc(Type::Object(obj))
}

/// Re-checks a top-level function declaration's body against its
/// already-hoisted signature, discarding the
/// recomputed signature and keeping only diagnostic side effects. A
/// bodyless overload signature has nothing to check here.
pub(crate) fn check_function_body_only(checker: &mut Checker, f: &tyck_ast::FunctionDecl, env: EnvId) {
    let Some(body) = &f.body else { return };
    check_function_core(
        checker,
        &f.type_params,
        &f.params,
        f.return_type.as_ref(),
        body,
        f.is_generator,
        f.is_async,
        env,
    );
}

/// A function declaration met outside top-level hoisting (nested in a
/// block): resolves its signature and checks its body in one pass, then
/// binds its name into `env` (hoisting only runs over top-level
/// only, so nested declarations are bound where they're encountered).
pub(crate) fn check_nested_function_decl(checker: &mut Checker, f: &tyck_ast::FunctionDecl, env: EnvId) {
    let body: &[SNode] = f.body.as_deref().unwrap_or(&[]);
    let (final_return, param_types, optional, variadic, rest_type) =
        check_function_core(checker, &f.type_params, &f.params, f.return_type.as_ref(), body, f.is_generator, f.is_async, env);
    let mut obj = ObjectType::empty();
    obj.call_signatures.push(Signature {
        param_types,
        optional,
        return_type: final_return,
        variadic,
        rest_type,
    });
    let fn_ty = checker.arena.alloc(Type::Object(obj));
    checker.envs.define(env, &f.name, fn_ty, true);
}

/// Pulls the `Returns` argument (2nd type argument) out of a resolved
/// `Generator<Yields, Returns, Next>` annotation; an annotation that
/// isn't an instantiation of the `Generator` builtin is returned as-is.
fn extract_generator_return_type(checker: &Checker, declared: TypeId) -> TypeId {
    if let Type::Instantiated(inst) = checker.arena.get(declared) {
        if let Type::Generic(g) = checker.arena.get(inst.generic) {
            if g.name == "Generator" && inst.args.len() >= 2 {
                return inst.args[1];
            }
        }
    }
    declared
}

/// Shared parameter-binding and body-checking core for both function
/// expressions (which build a fresh `Signature` from the result) and
/// top-level function declarations (which only need the diagnostic side
/// effects, the signature itself having already been hoisted).
#[allow(clippy::too_many_arguments)]
fn check_function_core(
    checker: &mut Checker,
    type_params: &[TypeParamDecl],
    params: &[Param],
    return_type: Option<&TNode>,
    body: &[SNode],
    is_generator: bool,
    is_async: bool,
    env: EnvId,
) -> (TypeId, Vec<TypeId>, Vec<bool>, bool, Option<TypeId>) {
    let mut scope = checker.enter_scope();
    let body_env = scope.current;
    let _ = scope.bind_type_params(type_params, body_env);

    let mut param_types = Vec::with_capacity(params.len());
    let mut optional = Vec::with_capacity(params.len());
    let mut variadic = false;
    let mut rest_type = None;
    for p in params {
        let declared = match &p.ty {
            Some(t) => scope.resolve_type_annotation(t, body_env),
            None => scope.arena.any(),
        };
        if let Some(default) = &p.default {
            let default_ty = check_expr(&mut scope, default, body_env);
            if !is_assignable(&scope.arena, default_ty, declared) {
                let (d, t) = (display_type(&scope.arena, default_ty), display_type(&scope.arena, declared));
                scope.error(
                    default.span,
                    diagnostic_codes::DEFAULT_VALUE_NOT_ASSIGNABLE,
                    format_message(diagnostic_messages::DEFAULT_VALUE_NOT_ASSIGNABLE, &[&p.name, &d, &t]),
                );
            }
        }
        if p.rest {
            variadic = true;
            rest_type = Some(match scope.arena.get(declared) {
                Type::Array(inner) => *inner,
                _ => {
                    scope.error(
                        Span::dummy(),
                        diagnostic_codes::REST_PARAM_MUST_BE_ARRAY,
                        format_message(diagnostic_messages::REST_PARAM_MUST_BE_ARRAY, &[&display_type(&scope.arena, declared)]),
                    );
                    scope.arena.any()
                }
            });
            scope.envs.define(body_env, &p.name, rest_type.unwrap_or_else(|| scope.arena.any()), false);
            continue;
        }
        param_types.push(declared);
        optional.push(p.optional);
        scope.envs.define(body_env, &p.name, declared, false);
    }

    let declared_return = return_type.map(|t| scope.resolve_type_annotation(t, body_env));
    let return_type = declared_return.unwrap_or_else(|| scope.arena.any());
    // An annotated generator's declared type is the whole `Generator<Yields,
    // Returns, Next>` shape; `return` statements inside the body are checked
    // against just `Returns`, not the wrapper.
    let body_return_type = if is_generator {
        declared_return.map_or(return_type, |d| extract_generator_return_type(&scope, d))
    } else {
        return_type
    };

    if is_generator {
        scope.yield_stack.push(Vec::new());
    }
    scope.return_type_stack.push(body_return_type);
    for stmt in body {
        crate::stmt_checker::check_stmt(&mut scope, stmt, body_env);
    }
    scope.return_type_stack.pop();
    let yielded = if is_generator { scope.yield_stack.pop() } else { None };

    let final_return = if is_generator {
        let yields = yielded.unwrap_or_default();
        let yield_ty = if yields.is_empty() {
            scope.arena.any()
        } else {
            new_union(&mut scope.arena, yields)
        };
        let next = scope.arena.any();
        match scope.envs.resolve_type(body_env, "Generator") {
            Some(generic) => instantiate_generic(&mut scope.arena, generic, &[yield_ty, body_return_type, next]),
            None => scope.degrade_to_any("Generator builtin not installed"),
        }
    } else if is_async {
        match scope.envs.resolve_type(body_env, "Promise") {
            Some(generic) => instantiate_generic(&mut scope.arena, generic, &[return_type]),
            None => scope.degrade_to_any("Promise builtin not installed"),
        }
    } else {
        return_type
    };

    drop(scope);
    (final_return, param_types, optional, variadic, rest_type)
}
