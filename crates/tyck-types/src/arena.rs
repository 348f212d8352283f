use tyck_common::TypeId;

use crate::types::{Primitive, Type};

/// Owns every `Type` allocated during a single check, addressed by
/// [`TypeId`]. Primitives are interned: asking for the same
/// [`Primitive`] twice returns the same id, giving primitive equality
/// its reference-identity fast path (reference identity with
/// interning for primitives").
pub struct TypeArena {
    types: Vec<Type>,
    primitives: [Option<TypeId>; PRIMITIVE_COUNT],
}

const PRIMITIVE_COUNT: usize = 9;

fn primitive_slot(p: Primitive) -> usize {
    match p {
        Primitive::Number => 0,
        Primitive::String => 1,
        Primitive::Boolean => 2,
        Primitive::Null => 3,
        Primitive::Undefined => 4,
        Primitive::Any => 5,
        Primitive::Unknown => 6,
        Primitive::Never => 7,
        Primitive::Void => 8,
    }
}

impl Default for TypeArena {
    fn default() -> Self {
        TypeArena::new()
    }
}

impl TypeArena {
    #[must_use]
    pub fn new() -> Self {
        TypeArena {
            types: Vec::new(),
            primitives: [None; PRIMITIVE_COUNT],
        }
    }

    pub fn alloc(&mut self, ty: Type) -> TypeId {
        let id = TypeId(u32::try_from(self.types.len()).expect("type arena overflowed u32"));
        self.types.push(ty);
        id
    }

    #[must_use]
    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.0 as usize]
    }

    /// Every id currently allocated, in allocation order — used by the
    /// checker's post-Pass-2 sweep for residual `ForwardReference`/
    /// `GenericForwardReference` placeholders.
    pub fn ids(&self) -> impl Iterator<Item = TypeId> + '_ {
        (0..self.types.len()).map(|i| TypeId(u32::try_from(i).expect("type arena overflowed u32")))
    }

    /// Overwrites the type stored at `id` in place.
    ///
    /// Used to patch a `ForwardReference` placeholder with the real type
    /// once its declaration finishes resolving: every other
    /// type that already references `id` sees the patched type without
    /// needing to be revisited.
    pub fn replace(&mut self, id: TypeId, ty: Type) {
        self.types[id.0 as usize] = ty;
    }

    /// Returns the interned `TypeId` for `p`, allocating it on first use.
    pub fn primitive(&mut self, p: Primitive) -> TypeId {
        let slot = primitive_slot(p);
        if let Some(id) = self.primitives[slot] {
            return id;
        }
        let id = self.alloc(Type::Primitive(p));
        self.primitives[slot] = Some(id);
        id
    }

    pub fn any(&mut self) -> TypeId {
        self.primitive(Primitive::Any)
    }

    pub fn unknown(&mut self) -> TypeId {
        self.primitive(Primitive::Unknown)
    }

    pub fn never(&mut self) -> TypeId {
        self.primitive(Primitive::Never)
    }

    pub fn undefined(&mut self) -> TypeId {
        self.primitive(Primitive::Undefined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_are_interned() {
        let mut arena = TypeArena::new();
        let a = arena.primitive(Primitive::String);
        let b = arena.primitive(Primitive::String);
        assert_eq!(a, b);
        let c = arena.primitive(Primitive::Number);
        assert_ne!(a, c);
    }

    #[test]
    fn replace_patches_a_forward_reference_in_place() {
        let mut arena = TypeArena::new();
        let placeholder = arena.alloc(Type::ForwardReference("Box".into()));
        let string_ty = arena.primitive(Primitive::String);
        arena.replace(placeholder, Type::Array(string_ty));
        assert!(matches!(arena.get(placeholder), Type::Array(_)));
    }
}
