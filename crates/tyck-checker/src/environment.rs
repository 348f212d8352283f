//! Nested scopes.
//!
//! Scopes are held in a flat arena (`EnvironmentArena`) addressed by
//! [`EnvId`] rather than as a `Rc<RefCell<..>>` tree: the checker is
//! single-threaded and scopes never outlive the check that created them,
//! so a `Vec`-backed arena with parent links is simpler than shared
//! mutability and gives `resolve`/`resolve_type` a plain integer to walk.

use rustc_hash::FxHashMap;
use tyck_common::TypeId;
use tyck_types::{Primitive, Signature};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EnvId(pub u32);

/// A value binding: its type and whether it was declared `const`.
#[derive(Clone, Copy, Debug)]
pub struct ValueBinding {
    pub ty: TypeId,
    pub is_const: bool,
}

/// One lexical scope: values, type aliases, type parameters,
/// in-flight/finished overloads, and (root-only) primitive prototypes.
#[derive(Default)]
pub struct Scope {
    parent: Option<EnvId>,
    symbols: FxHashMap<String, ValueBinding>,
    type_aliases: FxHashMap<String, TypeId>,
    type_parameters: FxHashMap<String, TypeId>,
    pending_overloads: FxHashMap<String, Vec<Signature>>,
    completed_overloads: FxHashMap<String, TypeId>,
    /// Only ever populated on the root environment, which holds it for
    /// every descendant scope to reach.
    primitive_prototypes: Option<FxHashMap<u8, TypeId>>,
}

fn primitive_key(p: Primitive) -> u8 {
    p as u8
}

pub struct EnvironmentArena {
    scopes: Vec<Scope>,
    root: EnvId,
}

impl Default for EnvironmentArena {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvironmentArena {
    #[must_use]
    pub fn new() -> Self {
        let mut scopes = Vec::new();
        scopes.push(Scope {
            primitive_prototypes: Some(FxHashMap::default()),
            ..Scope::default()
        });
        EnvironmentArena { scopes, root: EnvId(0) }
    }

    #[must_use]
    pub fn root(&self) -> EnvId {
        self.root
    }

    /// Pushes a new scope whose parent is `parent`, returning its id.
    /// Paired with [`EnvironmentArena::pop_is_a_noop`] — scopes are never
    /// physically removed (their storage is cheap and the checker only
    /// ever moves `current` back to the parent), matching the "child
    /// scopes never mutate ancestors.
    pub fn push_child(&mut self, parent: EnvId) -> EnvId {
        let id = EnvId(u32::try_from(self.scopes.len()).expect("environment arena overflowed u32"));
        self.scopes.push(Scope {
            parent: Some(parent),
            ..Scope::default()
        });
        id
    }

    fn scope(&self, id: EnvId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    fn scope_mut(&mut self, id: EnvId) -> &mut Scope {
        &mut self.scopes[id.0 as usize]
    }

    #[must_use]
    pub fn parent_of(&self, id: EnvId) -> Option<EnvId> {
        self.scope(id).parent
    }

    /// `Define(name, type, isConst)` — fails iff `name` is already a
    /// value in this exact scope. A same-name type alias may
    /// coexist (declaration merging for classes/enums).
    pub fn define(&mut self, id: EnvId, name: &str, ty: TypeId, is_const: bool) -> bool {
        let scope = self.scope_mut(id);
        if scope.symbols.contains_key(name) {
            return false;
        }
        scope.symbols.insert(name.to_string(), ValueBinding { ty, is_const });
        true
    }

    pub fn define_type_alias(&mut self, id: EnvId, name: &str, ty: TypeId) -> bool {
        let scope = self.scope_mut(id);
        if scope.type_aliases.contains_key(name) {
            return false;
        }
        scope.type_aliases.insert(name.to_string(), ty);
        true
    }

    pub fn define_type_parameter(&mut self, id: EnvId, name: &str, ty: TypeId) {
        self.scope_mut(id).type_parameters.insert(name.to_string(), ty);
    }

    /// Overwrites an *existing* value binding's type, preserving
    /// `is_const`, searching outward from `id` for the scope that holds
    /// it.
    pub fn update(&mut self, id: EnvId, name: &str, ty: TypeId) -> bool {
        let mut cur = Some(id);
        while let Some(at) = cur {
            if let Some(binding) = self.scope(at).symbols.get(name).copied() {
                self.scope_mut(at).symbols.insert(
                    name.to_string(),
                    ValueBinding {
                        ty,
                        is_const: binding.is_const,
                    },
                );
                return true;
            }
            cur = self.scope(at).parent;
        }
        false
    }

    /// Overwrites a type-alias binding's target type in place, at
    /// whichever ancestor scope declared `name` — used to patch a
    /// `ForwardReference` placeholder once its real type is known
    ///.
    pub fn rebind_type_alias(&mut self, id: EnvId, name: &str, ty: TypeId) -> bool {
        let mut cur = Some(id);
        while let Some(at) = cur {
            if self.scope(at).type_aliases.contains_key(name) {
                self.scope_mut(at).type_aliases.insert(name.to_string(), ty);
                return true;
            }
            cur = self.scope(at).parent;
        }
        false
    }

    #[must_use]
    pub fn resolve(&self, id: EnvId, name: &str) -> Option<ValueBinding> {
        let mut cur = Some(id);
        while let Some(at) = cur {
            if let Some(b) = self.scope(at).symbols.get(name) {
                return Some(*b);
            }
            cur = self.scope(at).parent;
        }
        None
    }

    #[must_use]
    pub fn resolve_type(&self, id: EnvId, name: &str) -> Option<TypeId> {
        let mut cur = Some(id);
        while let Some(at) = cur {
            if let Some(t) = self.scope(at).type_aliases.get(name) {
                return Some(*t);
            }
            cur = self.scope(at).parent;
        }
        None
    }

    #[must_use]
    pub fn resolve_type_parameter(&self, id: EnvId, name: &str) -> Option<TypeId> {
        let mut cur = Some(id);
        while let Some(at) = cur {
            if let Some(t) = self.scope(at).type_parameters.get(name) {
                return Some(*t);
            }
            cur = self.scope(at).parent;
        }
        None
    }

    /// Records a bare overload signature against `name` in the *current*
    /// scope.
    pub fn add_pending_overload(&mut self, id: EnvId, name: &str, sig: Signature) {
        self.scope_mut(id).pending_overloads.entry(name.to_string()).or_default().push(sig);
    }

    #[must_use]
    pub fn take_pending_overloads(&mut self, id: EnvId, name: &str) -> Vec<Signature> {
        self.scope_mut(id).pending_overloads.remove(name).unwrap_or_default()
    }

    #[must_use]
    pub fn has_pending_overloads(&self, id: EnvId, name: &str) -> bool {
        self.scope(id).pending_overloads.contains_key(name)
    }

    pub fn set_completed_overload(&mut self, id: EnvId, name: &str, object_ty: TypeId) {
        self.scope_mut(id).completed_overloads.insert(name.to_string(), object_ty);
    }

    #[must_use]
    pub fn completed_overload(&self, id: EnvId, name: &str) -> Option<TypeId> {
        self.scope(id).completed_overloads.get(name).copied()
    }

    /// Walks to the environment that owns `primitive_prototypes` (only
    /// the root) and looks up `p`'s prototype object.
    #[must_use]
    pub fn primitive_prototype(&self, id: EnvId, p: Primitive) -> Option<TypeId> {
        let mut cur = Some(id);
        while let Some(at) = cur {
            if let Some(map) = &self.scope(at).primitive_prototypes {
                return map.get(&primitive_key(p)).copied();
            }
            cur = self.scope(at).parent;
        }
        None
    }

    pub fn set_primitive_prototype(&mut self, id: EnvId, p: Primitive, object_ty: TypeId) {
        let mut cur = Some(id);
        while let Some(at) = cur {
            if self.scope(at).primitive_prototypes.is_some() {
                self.scope_mut(at).primitive_prototypes.as_mut().unwrap().insert(primitive_key(p), object_ty);
                return;
            }
            cur = self.scope(at).parent;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_fails_on_duplicate_in_same_scope() {
        let mut envs = EnvironmentArena::new();
        let root = envs.root();
        assert!(envs.define(root, "x", TypeId(1), false));
        assert!(!envs.define(root, "x", TypeId(2), false));
    }

    #[test]
    fn child_scope_shadows_parent() {
        let mut envs = EnvironmentArena::new();
        let root = envs.root();
        envs.define(root, "x", TypeId(1), false);
        let child = envs.push_child(root);
        envs.define(child, "x", TypeId(2), false);
        assert_eq!(envs.resolve(child, "x").unwrap().ty, TypeId(2));
        assert_eq!(envs.resolve(root, "x").unwrap().ty, TypeId(1));
    }

    #[test]
    fn resolve_walks_to_parent_when_absent_in_child() {
        let mut envs = EnvironmentArena::new();
        let root = envs.root();
        envs.define(root, "y", TypeId(7), true);
        let child = envs.push_child(root);
        assert_eq!(envs.resolve(child, "y").unwrap().ty, TypeId(7));
    }

    #[test]
    fn update_preserves_is_const_and_finds_ancestor_binding() {
        let mut envs = EnvironmentArena::new();
        let root = envs.root();
        envs.define(root, "z", TypeId(1), true);
        let child = envs.push_child(root);
        assert!(envs.update(child, "z", TypeId(9)));
        let binding = envs.resolve(child, "z").unwrap();
        assert_eq!(binding.ty, TypeId(9));
        assert!(binding.is_const);
    }

    #[test]
    fn rebind_type_alias_patches_the_declaring_scope() {
        let mut envs = EnvironmentArena::new();
        let root = envs.root();
        envs.define_type_alias(root, "A", TypeId(1));
        let child = envs.push_child(root);
        assert!(envs.rebind_type_alias(child, "A", TypeId(2)));
        assert_eq!(envs.resolve_type(root, "A"), Some(TypeId(2)));
    }
}
