//! End-to-end programs driven through [`tyck_checker::check`] rather
//! than through a single module's unit tests — each one exercises a
//! feature that only shows up once several modules cooperate: generic
//! tuple instantiation through the resolver and substitution together,
//! type-predicate narrowing through the expression checker and the
//! narrowing engine together, and a conditional type's two branches
//! resolving differently depending on the type argument substituted in.

use tyck_ast::node::Node;
use tyck_ast::{
    Decl, Expr, FunctionDecl, Keyword, Param, Program, Stmt, TNode, TupleElement, TypeAliasDecl,
    TypeNode, TypeParamDecl, Value, VarKind,
};
use tyck_checker::Checker;
use tyck_common::diagnostics::diagnostic_codes;
use tyck_common::{CheckerOptions, Span};

fn kw(k: Keyword) -> TNode {
    Node::new(Span::dummy(), TypeNode::Keyword(k))
}

fn reference(name: &str, type_args: Vec<TNode>) -> TNode {
    Node::new(Span::dummy(), TypeNode::Reference { name: name.to_string(), type_args })
}

fn ident(name: &str) -> Node<Expr> {
    Node::new(Span::dummy(), Expr::Identifier(name.to_string()))
}

fn string_lit(s: &str) -> Node<Expr> {
    Node::new(Span::dummy(), Expr::Literal(Value::String(s.to_string())))
}

fn number_lit(n: f64) -> Node<Expr> {
    Node::new(Span::dummy(), Expr::Literal(Value::Number(n)))
}

/// `type Pair<T> = [T, T];` then `const p: Pair<string> = (["a", "b"]
/// as Pair<string>);` — the generic alias resolves to a two-element
/// tuple once instantiated with `string`, and the annotation's own
/// instantiation is structurally equal to the assertion's.
#[test]
fn generic_tuple_alias_instantiates_and_type_checks() {
    let mut checker = Checker::new(CheckerOptions::default());

    let pair_alias = Decl::TypeAlias(TypeAliasDecl {
        name: "Pair".to_string(),
        type_params: vec![TypeParamDecl { name: "T".to_string(), constraint: None, default: None }],
        value: Node::new(
            Span::dummy(),
            TypeNode::Tuple(vec![
                TupleElement { label: None, ty: reference("T", vec![]), optional: false, rest: false },
                TupleElement { label: None, ty: reference("T", vec![]), optional: false, rest: false },
            ]),
        ),
    });

    let pair_of_string = || reference("Pair", vec![kw(Keyword::String)]);
    let array_literal = Node::new(Span::dummy(), Expr::Array(vec![string_lit("a"), string_lit("b")]));
    let assertion = Node::new(
        Span::dummy(),
        Expr::TypeAssertion { expr: Box::new(array_literal), ty: pair_of_string() },
    );
    let p_decl = Stmt::VarDecl {
        kind: VarKind::Const,
        name: "p".to_string(),
        ty: Some(pair_of_string()),
        init: Some(assertion),
    };

    let program = Program {
        statements: vec![
            Node::new(Span::dummy(), Stmt::Decl(pair_alias)),
            Node::new(Span::dummy(), p_decl),
        ],
    };
    tyck_checker::check(&mut checker, &program);

    assert!(checker.diagnostics.is_empty(), "unexpected diagnostics: {:?}", checker.diagnostics);

    let root = checker.root_env();
    let p_ty = checker.envs.resolve(root, "p").expect("p is bound").ty;
    let string_ty = checker.arena.primitive(tyck_types::Primitive::String);
    match unwrap_instantiated(&checker.arena, p_ty) {
        tyck_types::Type::Tuple(tuple) => {
            assert_eq!(tuple.elements.len(), 2);
            assert!(tuple.elements.iter().all(|e| *e == string_ty));
            assert!(tuple.rest.is_none());
        }
        other => panic!("expected a two-element tuple, got {other:?}"),
    }
}

fn unwrap_instantiated(arena: &tyck_types::TypeArena, ty: tyck_common::TypeId) -> tyck_types::Type {
    match arena.get(ty) {
        tyck_types::Type::Instantiated(inst) => unwrap_instantiated(arena, inst.result),
        other => other.clone(),
    }
}

/// `function isS(x: unknown): x is string { return typeof x === "string"; }`
/// drives narrowing through a real `if (isS(v)) { ... } else { ... }`:
/// the then-branch sees `v` narrowed to `string`, so assigning it to a
/// `string`-typed local is clean; the else-branch still sees `v` as
/// `unknown`, so the same assignment is rejected.
#[test]
fn type_predicate_call_narrows_an_unknown_to_string() {
    let mut checker = Checker::new(CheckerOptions::default());

    let is_s = FunctionDecl {
        name: "isS".to_string(),
        type_params: vec![],
        params: vec![Param { name: "x".to_string(), ty: Some(kw(Keyword::Unknown)), optional: false, rest: false, default: None }],
        return_type: Some(Node::new(
            Span::dummy(),
            TypeNode::Predicate { param_name: "x".to_string(), asserted: Box::new(kw(Keyword::String)) },
        )),
        body: Some(vec![Node::new(
            Span::dummy(),
            Stmt::Return(Some(Node::new(
                Span::dummy(),
                Expr::Binary {
                    op: tyck_ast::BinaryOp::StrictEq,
                    left: Box::new(Node::new(Span::dummy(), Expr::TypeofExpr(Box::new(ident("x"))))),
                    right: Box::new(string_lit("string")),
                },
            ))),
        )]),
        is_generator: false,
        is_async: false,
    };

    let v_decl = Stmt::VarDecl { kind: VarKind::Let, name: "v".to_string(), ty: Some(kw(Keyword::Unknown)), init: None };

    let call_is_s_v = Node::new(
        Span::dummy(),
        Expr::Call { callee: Box::new(ident("isS")), type_args: vec![], args: vec![ident("v")] },
    );
    let then_branch = Stmt::Block(vec![Node::new(
        Span::dummy(),
        Stmt::VarDecl { kind: VarKind::Let, name: "s".to_string(), ty: Some(kw(Keyword::String)), init: Some(ident("v")) },
    )]);
    let else_branch = Stmt::Block(vec![Node::new(
        Span::dummy(),
        Stmt::VarDecl { kind: VarKind::Let, name: "s2".to_string(), ty: Some(kw(Keyword::String)), init: Some(ident("v")) },
    )]);
    let if_stmt = Stmt::If {
        test: call_is_s_v,
        consequent: Box::new(Node::new(Span::dummy(), then_branch)),
        alternate: Some(Box::new(Node::new(Span::dummy(), else_branch))),
    };

    let program = Program {
        statements: vec![
            Node::new(Span::dummy(), Stmt::Decl(Decl::Function(is_s))),
            Node::new(Span::dummy(), v_decl),
            Node::new(Span::dummy(), if_stmt),
        ],
    };
    tyck_checker::check(&mut checker, &program);

    assert_eq!(
        checker.diagnostics.len(),
        1,
        "expected exactly the else-branch mismatch, got {:?}",
        checker.diagnostics
    );
    assert_eq!(checker.diagnostics[0].code, diagnostic_codes::ELEMENT_NOT_ASSIGNABLE_TO_VARIABLE);
}

/// `type X<T> = T extends string ? 1 : 0;` stays symbolic while `T` is
/// free, then collapses to the matching branch once a concrete type
/// argument is substituted in: `X<"hi">` is `1`, `X<number>` is `0`.
#[test]
fn conditional_type_resolves_a_different_branch_per_type_argument() {
    let mut checker = Checker::new(CheckerOptions::default());

    let x_alias = Decl::TypeAlias(TypeAliasDecl {
        name: "X".to_string(),
        type_params: vec![TypeParamDecl { name: "T".to_string(), constraint: None, default: None }],
        value: Node::new(
            Span::dummy(),
            TypeNode::Conditional {
                check: Box::new(reference("T", vec![])),
                extends: Box::new(kw(Keyword::String)),
                then_branch: Box::new(Node::new(Span::dummy(), TypeNode::Literal(Value::Number(1.0)))),
                else_branch: Box::new(Node::new(Span::dummy(), TypeNode::Literal(Value::Number(0.0)))),
            },
        ),
    });

    let hi_literal = || Node::new(Span::dummy(), TypeNode::Literal(Value::String("hi".to_string())));
    let a_decl = Stmt::VarDecl {
        kind: VarKind::Const,
        name: "a".to_string(),
        ty: Some(reference("X", vec![hi_literal()])),
        init: Some(number_lit(1.0)),
    };
    let b_decl = Stmt::VarDecl {
        kind: VarKind::Const,
        name: "b".to_string(),
        ty: Some(reference("X", vec![kw(Keyword::Number)])),
        init: Some(number_lit(0.0)),
    };
    let c_decl = Stmt::VarDecl {
        kind: VarKind::Const,
        name: "c".to_string(),
        ty: Some(reference("X", vec![hi_literal()])),
        init: Some(number_lit(0.0)),
    };

    let program = Program {
        statements: vec![
            Node::new(Span::dummy(), Stmt::Decl(x_alias)),
            Node::new(Span::dummy(), a_decl),
            Node::new(Span::dummy(), b_decl),
            Node::new(Span::dummy(), c_decl),
        ],
    };
    tyck_checker::check(&mut checker, &program);

    assert_eq!(
        checker.diagnostics.len(),
        1,
        "expected only c's mismatch (X<\"hi\"> is 1, not 0), got {:?}",
        checker.diagnostics
    );
    assert_eq!(checker.diagnostics[0].code, diagnostic_codes::ELEMENT_NOT_ASSIGNABLE_TO_VARIABLE);
}
