//! Structural type algebra (component C1): the canonical `Type`
//! representation and the operations the checker builds on —
//! `equals`, `is_assignable`, union/intersection construction,
//! widening, substitution/instantiation, and keyof/indexed-access/
//! conditional/mapped/template-literal computation.
//!
//! Everything here is pure with respect to the program being checked:
//! no diagnostics are raised from this crate (that's the checker's job
//! in `tyck-checker`), and no AST is consulted — this crate only knows
//! about `Type`s and `TypeId`s.

pub mod arena;
pub mod assignability;
pub mod compute;
pub mod display;
pub mod equals;
pub mod substitute;
pub mod types;
pub mod union_intersection;
pub mod widen;

pub use arena::TypeArena;
pub use assignability::is_assignable;
pub use compute::{compute_conditional, compute_template_literal, expand_mapped, indexed_access, keyof};
pub use display::display_type;
pub use equals::equals;
pub use substitute::{instantiate_generic, substitute, SubstitutionMap};
pub use types::*;
pub use union_intersection::{new_intersection, new_union};
pub use widen::widen;
