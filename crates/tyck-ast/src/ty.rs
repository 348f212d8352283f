//! The type-annotation AST: the syntax the checker resolves into a
//! [`tyck_types::Type`](../../tyck_types/enum.Type.html) via
//! `resolve_type_annotation`.
//!
//! This is deliberately a separate tree from `TypeNode`'s semantic
//! counterpart in `tyck-types`: the annotation as written (`keyof T`,
//! `A extends B ? C : D`) and the type it denotes are different things,
//! and conflating them is exactly the kind of node/symbol ambiguity the
//! teacher's checker keeps apart with distinct `NodeIndex`/`SymbolId`
//! domains.

use crate::node::Node;
use crate::value::Value;

pub type TNode = Node<TypeNode>;

#[derive(Debug)]
pub enum TypeNode {
    /// `string`, `number`, `boolean`, `any`, `unknown`, `never`, `void`,
    /// `null`, `undefined`, `object`, `symbol`, `bigint`.
    Keyword(Keyword),

    /// A named reference, optionally with type arguments: `Foo`,
    /// `Array<T>`, `Map<K, V>`.
    Reference { name: String, type_args: Vec<TNode> },

    /// A literal type: `"a"`, `42`, `true`.
    Literal(Value),

    /// `T[]`.
    Array(Box<TNode>),

    /// `[A, B, C?, ...D[]]`.
    Tuple(Vec<TupleElement>),

    /// An inline object-literal type: `{ a: string; b?: number }`,
    /// optionally carrying call/construct/index signatures alongside
    /// named properties (reserves `__call`/`__new` keys for
    /// these on the resolved `ObjectType`).
    ObjectLiteral(Vec<ObjectMember>),

    /// `A | B | C`.
    Union(Vec<TNode>),

    /// `A & B & C`.
    Intersection(Vec<TNode>),

    /// `(a: A, b?: B, ...rest: C[]) => R`.
    Function {
        type_params: Vec<super::decl::TypeParamDecl>,
        params: Vec<super::decl::Param>,
        return_type: Box<TNode>,
    },

    /// `new (a: A) => R`.
    Constructor {
        type_params: Vec<super::decl::TypeParamDecl>,
        params: Vec<super::decl::Param>,
        return_type: Box<TNode>,
    },

    /// `keyof T`.
    Keyof(Box<TNode>),

    /// `T[K]`.
    IndexedAccess { object: Box<TNode>, index: Box<TNode> },

    /// `{ [P in K]: T }`, with an optional `as` remapping clause and the
    /// `readonly`/`?` modifiers written either present, absent, `+`, or
    /// `-`.
    Mapped {
        param_name: String,
        constraint: Box<TNode>,
        name_remap: Option<Box<TNode>>,
        value: Box<TNode>,
        readonly_mod: Modifier,
        optional_mod: Modifier,
    },

    /// `Check extends Extends ? True : False`.
    Conditional {
        check: Box<TNode>,
        extends: Box<TNode>,
        then_branch: Box<TNode>,
        else_branch: Box<TNode>,
    },

    /// `infer X` inside the `extends` clause of a conditional type.
    Infer(String),

    /// `` `prefix-${T}-suffix` ``.
    TemplateLiteral { quasis: Vec<String>, types: Vec<TNode> },

    /// `x is T` (only valid as a function's return-type annotation).
    Predicate { param_name: String, asserted: Box<TNode> },

    /// `typeof x` — refers to the type of an already-declared value.
    TypeofQuery(String),

    Parenthesized(Box<TNode>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Keyword {
    String,
    Number,
    Boolean,
    Any,
    Unknown,
    Never,
    Void,
    Null,
    Undefined,
    Object,
    Symbol,
    BigInt,
}

#[derive(Debug)]
pub struct TupleElement {
    pub label: Option<String>,
    pub ty: TNode,
    pub optional: bool,
    pub rest: bool,
}

#[derive(Debug)]
pub struct ObjectTypeMember {
    pub name: String,
    pub ty: TNode,
    pub optional: bool,
    pub readonly: bool,
}

/// One member of an interface body or object-literal type: a named
/// property, or one of the three signature forms an `ObjectType` can
/// carry (`ObjectType`: `call_signatures`, `construct_signatures`,
/// `index_signatures`).
#[derive(Debug)]
pub enum ObjectMember {
    Property(ObjectTypeMember),
    /// `(a: A, b?: B): R` written directly in an object/interface body.
    CallSignature {
        type_params: Vec<super::decl::TypeParamDecl>,
        params: Vec<super::decl::Param>,
        return_type: TNode,
    },
    /// `new (a: A): R` written directly in an object/interface body.
    ConstructSignature {
        type_params: Vec<super::decl::TypeParamDecl>,
        params: Vec<super::decl::Param>,
        return_type: TNode,
    },
    /// `[key: K]: V`.
    IndexSignature {
        key_name: String,
        key_type: TNode,
        value_type: TNode,
        readonly: bool,
    },
}

/// A mapped-type modifier that can be left as-is, or explicitly added
/// (`+`) or removed (`-`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Modifier {
    #[default]
    Unchanged,
    Add,
    Remove,
}
