//! The canonical type representation.
//!
//! Primitives are interned singletons (`TypeArena::primitive` always
//! returns the same `TypeId` for a given [`Primitive`]); every other
//! variant is structural — two object types are "the same type" when
//! their shapes match, not when their `TypeId`s match, which is why
//! [`crate::equals`] exists instead of relying on `PartialEq` on `TypeId`.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use tyck_ast::Value;
use tyck_common::{limits::TYPE_LIST_INLINE, TypeId};

/// A small-vector of member types; most unions/tuples fit inline
/// without a heap allocation (see [`TYPE_LIST_INLINE`]).
pub type TypeIdVec = SmallVec<[TypeId; TYPE_LIST_INLINE]>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    Number,
    String,
    Boolean,
    Null,
    Undefined,
    Any,
    Unknown,
    Never,
    Void,
}

impl Primitive {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Number => "number",
            Primitive::String => "string",
            Primitive::Boolean => "boolean",
            Primitive::Null => "null",
            Primitive::Undefined => "undefined",
            Primitive::Any => "any",
            Primitive::Unknown => "unknown",
            Primitive::Never => "never",
            Primitive::Void => "void",
        }
    }
}

/// The closed sum every type in the checker is one variant of.
#[derive(Clone, Debug)]
pub enum Type {
    Primitive(Primitive),
    Literal(LiteralType),
    Array(TypeId),
    Tuple(TupleType),
    Object(ObjectType),
    /// Invariant: ≥2 members, none of them itself a `Union` (flattened
    /// by [`crate::union_intersection::new_union`] before allocation).
    Union(TypeIdVec),
    Intersection(TypeIdVec),
    /// The declaration site of a generic parameter (`T` in `Pair<T>`).
    /// Allocated exactly once per declaration; its own `TypeId` *is* its
    /// identity.
    TypeParameter(TypeParameter),
    /// A reference to a `TypeParameter` by identity — the `TypeId` here
    /// always points at a `Type::TypeParameter` entry.
    ParameterRef(TypeId),
    Generic(GenericType),
    Instantiated(InstantiatedType),
    /// A placeholder for a type alias/class/enum still being resolved
    /// — must not survive past the end of Pass 2.
    ForwardReference(String),
    GenericForwardReference { name: String, args: Vec<TypeId> },
    Enum(EnumType),
    EnumMember(EnumMemberType),
    Keyof(TypeId),
    IndexedAccess { object: TypeId, index: TypeId },
    Conditional(ConditionalType),
    Mapped(MappedType),
    TypePredicate { param_name: String, ty: TypeId },
    TemplateLiteral(TemplateLiteralType),
}

#[derive(Clone, Debug)]
pub struct LiteralType {
    pub value: Value,
}

/// Which primitive a literal widens to and narrows from.
impl LiteralType {
    #[must_use]
    pub fn base_primitive(&self) -> Primitive {
        match &self.value {
            Value::String(_) => Primitive::String,
            Value::Number(_) => Primitive::Number,
            Value::Boolean(_) => Primitive::Boolean,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TupleType {
    pub elements: Vec<TypeId>,
    pub optional: Vec<bool>,
    /// The element type of a trailing `...rest: T[]`, if present.
    pub rest: Option<TypeId>,
}

#[derive(Clone, Debug)]
pub struct ObjectType {
    /// Ordered so error messages and display list properties in
    /// declaration order, not hash order.
    pub properties: IndexMap<String, TypeId>,
    pub optional: FxHashSet<String>,
    pub readonly: FxHashSet<String>,
    pub call_signatures: Vec<Signature>,
    pub construct_signatures: Vec<Signature>,
    pub index_signatures: Vec<IndexSignature>,
    pub class_meta: Option<ClassMeta>,
}

impl ObjectType {
    #[must_use]
    pub fn empty() -> Self {
        ObjectType {
            properties: IndexMap::new(),
            optional: FxHashSet::default(),
            readonly: FxHashSet::default(),
            call_signatures: Vec::new(),
            construct_signatures: Vec::new(),
            index_signatures: Vec::new(),
            class_meta: None,
        }
    }

    #[must_use]
    pub fn is_callable(&self) -> bool {
        !self.call_signatures.is_empty()
    }

    #[must_use]
    pub fn is_newable(&self) -> bool {
        !self.construct_signatures.is_empty()
    }

    /// A "pure function": callable, no properties beyond the signature
    /// itself, and exactly one overload.
    #[must_use]
    pub fn is_pure_function(&self) -> bool {
        self.properties.is_empty() && self.call_signatures.len() == 1 && self.construct_signatures.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct Signature {
    pub param_types: Vec<TypeId>,
    pub optional: Vec<bool>,
    pub return_type: TypeId,
    pub variadic: bool,
    /// Element type of the rest parameter, when `variadic`.
    pub rest_type: Option<TypeId>,
}

impl Signature {
    #[must_use]
    pub fn min_argument_count(&self) -> usize {
        self.optional.iter().take_while(|o| !**o).count().max(
            self.param_types
                .len()
                .saturating_sub(self.optional.iter().filter(|o| **o).count()),
        )
    }
}

#[derive(Clone, Debug)]
pub struct IndexSignature {
    pub key: TypeId,
    pub value: TypeId,
    pub readonly: bool,
}

#[derive(Clone, Debug)]
pub struct ClassMeta {
    pub class_name: String,
    pub is_instance: bool,
    pub is_constructor: bool,
}

#[derive(Clone, Debug)]
pub struct TypeParameter {
    pub name: String,
    pub constraint: Option<TypeId>,
    pub default: Option<TypeId>,
}

#[derive(Clone, Debug)]
pub struct GenericType {
    pub name: String,
    pub params: Vec<TypeId>,
    pub body: TypeId,
}

#[derive(Clone, Debug)]
pub struct InstantiatedType {
    pub generic: TypeId,
    pub args: Vec<TypeId>,
    /// `body[params -> args]`, computed once at instantiation time and
    /// cached here so repeated use doesn't re-substitute.
    pub result: TypeId,
}

#[derive(Clone, Debug)]
pub struct EnumType {
    pub name: String,
    pub is_const: bool,
    pub is_numeric: bool,
    pub members: IndexMap<String, TypeId>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EnumValue {
    Number(f64),
    String(String),
}

#[derive(Clone, Debug)]
pub struct EnumMemberType {
    pub enum_name: String,
    pub member_name: String,
    pub value: EnumValue,
}

#[derive(Clone, Debug)]
pub struct ConditionalType {
    pub check: TypeId,
    pub extends: TypeId,
    pub true_branch: TypeId,
    pub false_branch: TypeId,
}

/// Mirrors `tyck_ast::Modifier` for the annotation-writer's `+`/`-`/unset
/// spelling, kept as a distinct type since a mapped type's modifiers are
/// evaluated against a source property's own modifiers at expansion
/// time, not at parse time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Modifier {
    #[default]
    Unchanged,
    Add,
    Remove,
}

#[derive(Clone, Debug)]
pub struct MappedType {
    pub param_name: String,
    /// The `TypeId` of the `Type::TypeParameter` declaration for `P`
    /// that `value`/`name_remap` reference via `ParameterRef` — lets
    /// expansion substitute in each materialised key by identity rather
    /// than by matching on `param_name`.
    pub param_id: TypeId,
    pub constraint: TypeId,
    pub value: TypeId,
    pub name_remap: Option<TypeId>,
    pub optional_mod: Modifier,
    pub readonly_mod: Modifier,
}

#[derive(Clone, Debug)]
pub struct TemplateLiteralType {
    pub parts: Vec<TemplatePart>,
}

#[derive(Clone, Debug)]
pub enum TemplatePart {
    Literal(String),
    Type(TypeId),
}
