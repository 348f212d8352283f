//! Expression forms the checker visits in Pass 2.
//!
//! This is the minimum expression surface the type-checking rules in
//! this checker actually need to reference; there is no evaluator behind
//! it, since runtime semantics are out of scope entirely.

use crate::node::Node;
use crate::ty::TNode;
use crate::value::Value;

pub type ENode = Node<Expr>;

#[derive(Debug)]
pub enum Expr {
    Literal(Value),
    Identifier(String),
    This,

    Array(Vec<ENode>),
    Object(Vec<ObjectProp>),

    Call {
        callee: Box<ENode>,
        type_args: Vec<TNode>,
        args: Vec<ENode>,
    },
    New {
        callee: Box<ENode>,
        type_args: Vec<TNode>,
        args: Vec<ENode>,
    },

    Member {
        object: Box<ENode>,
        property: String,
        optional: bool,
    },
    Index {
        object: Box<ENode>,
        index: Box<ENode>,
        optional: bool,
    },

    Binary {
        op: BinaryOp,
        left: Box<ENode>,
        right: Box<ENode>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<ENode>,
    },
    Assign {
        target: Box<ENode>,
        value: Box<ENode>,
    },
    Conditional {
        test: Box<ENode>,
        consequent: Box<ENode>,
        alternate: Box<ENode>,
    },

    /// `x as T`, a user-asserted type that the checker trusts without
    /// re-deriving (type assertions bypass assignability
    /// checking against the expression's inferred type").
    TypeAssertion { expr: Box<ENode>, ty: TNode },

    /// `typeof x === "string"`, `x instanceof Foo`, and similar narrowing
    /// guards are ordinary `Binary`/`Unary` expressions — `TypeofExpr`
    /// is only the operand form `typeof x` itself, distinct from the
    /// `typeof T` *type* query in `TypeNode`.
    TypeofExpr(Box<ENode>),

    /// `yield expr` / bare `yield` inside a generator body; the checker
    /// collects every yielded type to build the function's inferred
    /// `Generator<Yields, ..>`.
    Yield(Option<Box<ENode>>),
    /// `await expr` inside an async function body; unwraps a `Promise<T>`
    /// operand to `T` (and passes anything else through unchanged).
    Await(Box<ENode>),

    Function(FunctionExpr),
    Arrow(FunctionExpr),
}

#[derive(Debug)]
pub struct ObjectProp {
    pub key: String,
    pub value: ENode,
}

#[derive(Debug)]
pub struct FunctionExpr {
    pub type_params: Vec<crate::decl::TypeParamDecl>,
    pub params: Vec<crate::decl::Param>,
    pub return_type: Option<TNode>,
    pub body: Vec<Node<crate::stmt::Stmt>>,
    pub is_generator: bool,
    pub is_async: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Lt,
    Gt,
    And,
    Or,
    Instanceof,
    In,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    TypeofOp,
}
