//! Centralized recursion-depth and iteration-count limits.
//!
//! Centralizing these values documents the rationale for each one in a
//! single place instead of scattering magic numbers through the checker
//! and solver.

/// Maximum depth for alias resolution chains.
///
/// Prevents infinite recursion when the resolver follows `type A = B;
/// type B = C; ...` chains. A genuine cycle (`type Loop = Loop;`) is
/// caught earlier by the resolution-guard set; this is a backstop
/// for pathologically long non-cyclic chains.
pub const MAX_ALIAS_RESOLUTION_DEPTH: u32 = 128;

/// Maximum depth for general recursion guards in `equals`/`is_assignable`.
///
/// Recursive types (`type Tree<T> = { value: T; children: Tree<T>[] }`)
/// are compared structurally; this bounds how deep that structural
/// comparison can recurse before the pair is assumed equal, matching the
/// "assume structural equality on first visit" rule.
pub const MAX_CHECKER_RECURSION_DEPTH: u32 = 64;

/// Maximum depth for generic type instantiation.
///
/// Guards against a generic whose body keeps re-instantiating itself with
/// a growing argument, e.g. `type Wrap<T> = { v: Wrap<Wrap<T>> }`.
pub const MAX_INSTANTIATION_DEPTH: u32 = 50;

/// Maximum keys materialised by a single mapped-type expansion.
///
/// `{ [P in keyof S]: ... }` iterates over every key of `S`; this caps
/// the count to avoid unbounded memory use on a pathological source key
/// set.
pub const MAX_MAPPED_KEYS: usize = 1_000;

/// Maximum union members shown before eliding the rest with `| ...` in a
/// diagnostic message.
pub const UNION_MEMBER_DIAGNOSTIC_LIMIT: usize = 5;

/// Inline capacity for `SmallVec`-backed type lists (union members, tuple
/// elements). Most unions/tuples in practice have fewer members than
/// this, so the common case avoids a heap allocation.
pub const TYPE_LIST_INLINE: usize = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_are_positive() {
        assert!(MAX_ALIAS_RESOLUTION_DEPTH > 0);
        assert!(MAX_CHECKER_RECURSION_DEPTH > 0);
        assert!(MAX_INSTANTIATION_DEPTH > 0);
        assert!(MAX_MAPPED_KEYS > 0);
    }
}
