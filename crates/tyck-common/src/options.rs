//! Compiler options for type checking.

/// Options controlling how strictly the checker enforces the type system.
///
/// Trimmed from the much larger set of flags a full TypeScript compiler
/// exposes down to the ones this checker's feature surface can actually
/// honor.
#[derive(Debug, Clone, Default)]
pub struct CheckerOptions {
    /// Turns on the strict family below unless a flag is explicitly set.
    pub strict: bool,
    /// Disallow an implicit `any` fallback for unannotated parameters
    /// (Pass 2 still falls back to `any`, but this flag makes
    /// that fallback itself a reported diagnostic rather than silent).
    pub no_implicit_any: bool,
    /// `null`/`undefined` are not implicitly assignable to other types.
    pub strict_null_checks: bool,
    /// Optional properties are exactly `T | undefined`, not elided.
    pub exact_optional_property_types: bool,
}

impl CheckerOptions {
    /// Apply the `strict` flag's defaults to the individual strict flags,
    /// OR-ing each one in rather than overwriting it, so an explicitly
    /// disabled sub-flag survives enabling `strict`.
    #[must_use]
    pub fn apply_strict_defaults(mut self) -> Self {
        if self.strict {
            self.no_implicit_any = true;
            self.strict_null_checks = true;
            self.exact_optional_property_types = true;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_turns_on_sub_flags() {
        let opts = CheckerOptions {
            strict: true,
            ..Default::default()
        }
        .apply_strict_defaults();
        assert!(opts.no_implicit_any);
        assert!(opts.strict_null_checks);
    }

    #[test]
    fn non_strict_leaves_sub_flags_alone() {
        let opts = CheckerOptions::default().apply_strict_defaults();
        assert!(!opts.no_implicit_any);
    }
}
