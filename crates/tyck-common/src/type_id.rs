//! `TypeId` — the handle every AST node's computed-type slot holds.
//!
//! Lives in `tyck-common` rather than `tyck-types` so that `tyck-ast` can
//! give each node a computed-type slot without depending on the type
//! algebra crate itself (the AST only ever stores and compares handles;
//! it never constructs or inspects a `Type`).

use serde::Serialize;

/// Unique identifier for a type held in a `tyck_types::TypeArena`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Sentinel for "no type computed yet" / "resolution failed".
    pub const NONE: TypeId = TypeId(u32::MAX);

    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }
}

impl Default for TypeId {
    fn default() -> Self {
        TypeId::NONE
    }
}
