//! Declaration forms hoisted in Pass 1.

use crate::expr::ENode;
use crate::node::Node;
use crate::ty::TNode;

pub type DeclNode = Node<Decl>;

#[derive(Debug)]
pub enum Decl {
    Function(FunctionDecl),
    Class(ClassDecl),
    Interface(InterfaceDecl),
    TypeAlias(TypeAliasDecl),
    Enum(EnumDecl),
}

/// A single overload signature or a final implementation signature
///: overload resolution tries `overloads` in declaration
/// order before falling back to `implementation`.
#[derive(Debug)]
pub struct FunctionDecl {
    pub name: String,
    pub type_params: Vec<TypeParamDecl>,
    pub params: Vec<Param>,
    pub return_type: Option<TNode>,
    /// `None` for an overload signature with no body; `Some` for the
    /// implementation (or for an ordinary, non-overloaded function).
    pub body: Option<Vec<Node<crate::stmt::Stmt>>>,
    /// `function* f() { ... }` — the body's `yield`s feed the inferred
    /// `Generator<Yields, Returns, unknown>` return type (Pass
    /// 2).
    pub is_generator: bool,
    /// `async function f() { ... }` — the checked return type is wrapped
    /// in `Promise<T>`.
    pub is_async: bool,
}

#[derive(Debug)]
pub struct Param {
    pub name: String,
    pub ty: Option<TNode>,
    pub optional: bool,
    pub rest: bool,
    pub default: Option<ENode>,
}

#[derive(Debug)]
pub struct TypeParamDecl {
    pub name: String,
    pub constraint: Option<TNode>,
    pub default: Option<TNode>,
}

#[derive(Debug)]
pub struct InterfaceDecl {
    pub name: String,
    pub type_params: Vec<TypeParamDecl>,
    pub extends: Vec<TNode>,
    pub members: Vec<crate::ty::ObjectMember>,
}

#[derive(Debug)]
pub struct TypeAliasDecl {
    pub name: String,
    pub type_params: Vec<TypeParamDecl>,
    pub value: TNode,
}

#[derive(Debug)]
pub struct EnumDecl {
    pub name: String,
    pub members: Vec<EnumMember>,
    pub is_const: bool,
}

#[derive(Debug)]
pub struct EnumMember {
    pub name: String,
    /// A constant numeric or string initializer, if one was written.
    /// An absent initializer continues the auto-increment sequence from
    /// the previous numeric member.
    pub initializer: Option<ENode>,
}

/// A class member: class declarations support fields and methods
/// but, unlike interfaces, do not support `extends` (single-level
/// nominal inheritance is out of scope).
#[derive(Debug)]
pub struct ClassDecl {
    pub name: String,
    pub type_params: Vec<TypeParamDecl>,
    pub implements: Vec<TNode>,
    pub members: Vec<ClassMember>,
}

#[derive(Debug)]
pub enum ClassMember {
    Field {
        name: String,
        ty: Option<TNode>,
        optional: bool,
        readonly: bool,
        is_static: bool,
        initializer: Option<ENode>,
    },
    /// `constructor(...)` is a method named `"constructor"` like any
    /// other (compute constructor Signature from the
    /// constructor method"), never `is_static`.
    Method { is_static: bool, function: FunctionDecl },
}
