//! The `Checker` struct: all mutable state the passes in this crate
//! share.
//!
//! Every piece of state here is explicitly scoped — the current
//! environment pointer, the alias-recursion guard, the yield collector,
//! the with-object stack — and restored on every return path via RAII
//! guards rather than left for callers to remember to undo.

use std::ops::{Deref, DerefMut};

use rustc_hash::{FxHashMap, FxHashSet};
use tyck_common::{CheckerOptions, Diagnostic, DiagnosticCategory, Span, TypeId};
use tyck_types::{Signature, TypeArena};

use crate::environment::{EnvId, EnvironmentArena};

/// A class/alias currently being declared, so a self-reference to its
/// own name with its own type parameters resolves to the in-progress
/// placeholder instead of a fresh `GenericForwardReference`
/// (self-referential classes in generic position).
pub struct SelfReference {
    pub name: String,
    pub own_params: Vec<TypeId>,
    pub placeholder: TypeId,
}

pub struct Checker {
    pub arena: TypeArena,
    pub envs: EnvironmentArena,
    pub current: EnvId,
    pub diagnostics: Vec<Diagnostic>,
    pub options: CheckerOptions,

    /// Alias/interface/enum/class names whose declaration is currently
    /// being resolved.
    pub(crate) resolving_aliases: FxHashSet<String>,
    pub(crate) self_reference_stack: Vec<SelfReference>,
    /// Each frame is the `ObjectType` `TypeId` of one `with (obj)` head,
    /// innermost last.
    pub(crate) with_stack: Vec<TypeId>,
    /// One frame per enclosing generator function body, collecting every
    /// `yield`'s operand type.
    pub(crate) yield_stack: Vec<Vec<TypeId>>,
    /// A function's true implementation signature, kept out of its
    /// caller-visible `call_signatures` list (see "Overload
    /// dispatch"); consulted only for the bidirectional
    /// implementation-vs-overload compatibility check.
    pub(crate) implementation_signatures: FxHashMap<String, Signature>,
    /// The declared return type of each function body currently being
    /// checked, innermost last, so a nested `return` is checked against
    /// its own enclosing function rather than an outer one.
    pub(crate) return_type_stack: Vec<TypeId>,
}

impl Default for Checker {
    fn default() -> Self {
        Checker::new(CheckerOptions::default())
    }
}

impl Checker {
    #[must_use]
    pub fn new(options: CheckerOptions) -> Self {
        let envs = EnvironmentArena::new();
        let root = envs.root();
        Checker {
            arena: TypeArena::new(),
            current: root,
            envs,
            diagnostics: Vec::new(),
            options,
            resolving_aliases: FxHashSet::default(),
            self_reference_stack: Vec::new(),
            with_stack: Vec::new(),
            yield_stack: Vec::new(),
            implementation_signatures: FxHashMap::default(),
            return_type_stack: Vec::new(),
        }
    }

    pub(crate) fn implementation_signatures_mut(&mut self) -> &mut FxHashMap<String, Signature> {
        &mut self.implementation_signatures
    }

    #[must_use]
    pub fn root_env(&self) -> EnvId {
        self.envs.root()
    }

    pub fn error(&mut self, span: Span, code: u32, message: String) {
        self.diagnostics.push(Diagnostic {
            span,
            message,
            category: DiagnosticCategory::Error,
            code,
        });
    }

    /// Degrades an incomputable sub-expression to `any`, logging the
    /// internal-invariant failure rather than silently swallowing it
    ///.
    pub fn degrade_to_any(&mut self, context: &str) -> TypeId {
        tracing::warn!(context, "degrading to any after an internal invariant failure");
        self.arena.any()
    }

    /// Pushes a child of the current environment and returns a guard
    /// that restores `current` to the parent on drop, however the caller
    /// returns (must restore the prior value on every return
    /// path").
    pub fn enter_scope(&mut self) -> ScopeGuard<'_> {
        let prev = self.current;
        self.current = self.envs.push_child(prev);
        ScopeGuard { checker: self, prev }
    }
}

/// RAII guard for [`Checker::enter_scope`]. Derefs to `Checker` so the
/// guard itself is used in place of the checker for the scope's
/// duration; on drop, `current` is restored to the scope active before
/// `enter_scope` was called.
pub struct ScopeGuard<'a> {
    checker: &'a mut Checker,
    prev: EnvId,
}

impl Deref for ScopeGuard<'_> {
    type Target = Checker;
    fn deref(&self) -> &Checker {
        self.checker
    }
}

impl DerefMut for ScopeGuard<'_> {
    fn deref_mut(&mut self) -> &mut Checker {
        self.checker
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.checker.current = self.prev;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_guard_restores_the_parent_environment_on_drop() {
        let mut checker = Checker::default();
        let root = checker.current;
        {
            let mut scoped = checker.enter_scope();
            assert_ne!(scoped.current, root);
            scoped.envs.define(scoped.current, "x", TypeId(1), false);
        }
        assert_eq!(checker.current, root);
        assert!(checker.envs.resolve(checker.current, "x").is_none());
    }
}
