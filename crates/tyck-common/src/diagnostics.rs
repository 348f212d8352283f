//! Diagnostic types and message templates for the type checker.
//!
//! Diagnostics are collected, never raised: the checker keeps visiting
//! after an error and substitutes `any` for the failed sub-computation so
//! downstream errors stay actionable.

use crate::span::Span;
use serde::Serialize;

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Error,
    Warning,
    Suggestion,
}

/// A type-checking diagnostic message.
#[derive(Clone, Debug, Serialize)]
pub struct Diagnostic {
    pub span: Span,
    pub message: String,
    pub category: DiagnosticCategory,
    pub code: u32,
}

impl Diagnostic {
    #[must_use]
    pub fn error(span: Span, code: u32, message: String) -> Self {
        Diagnostic {
            span,
            message,
            category: DiagnosticCategory::Error,
            code,
        }
    }
}

/// Format a diagnostic message by replacing `{0}`, `{1}`, etc. with
/// arguments.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

/// Diagnostic codes, grouped by kind.
pub mod diagnostic_codes {
    pub const DUPLICATE_IDENTIFIER: u32 = 1001;
    pub const DUPLICATE_IDENTIFIER_GENERIC: u32 = 1002;
    pub const UNKNOWN_TYPE_NAME: u32 = 1101;
    pub const UNDEFINED_VARIABLE: u32 = 1102;
    pub const GENERIC_ARITY_MISMATCH: u32 = 1201;
    pub const GENERIC_CONSTRAINT_VIOLATION: u32 = 1202;
    pub const NOT_A_GENERIC_TYPE: u32 = 1203;
    pub const REST_PARAM_MUST_BE_ARRAY: u32 = 1301;
    pub const DEFAULT_VALUE_NOT_ASSIGNABLE: u32 = 1302;
    pub const ENUM_MEMBER_MISSING_INITIALIZER: u32 = 1401;
    pub const ENUM_MEMBER_NOT_CONSTANT: u32 = 1402;
    pub const NO_OVERLOAD_MATCHES: u32 = 1501;
    pub const OVERLOAD_IMPLEMENTATION_INCOMPATIBLE: u32 = 1502;
    pub const COMPARISON_NO_OVERLAP: u32 = 1601;
    pub const TYPE_NOT_ITERABLE: u32 = 1602;
    pub const SWITCH_CASE_NOT_COMPARABLE: u32 = 1603;
    pub const ARGUMENT_NOT_ASSIGNABLE: u32 = 1701;
    pub const ELEMENT_NOT_ASSIGNABLE_TO_VARIABLE: u32 = 1702;
    pub const NOT_ASSIGNABLE: u32 = 1703;
    pub const LINGERING_FORWARD_REFERENCE: u32 = 1801;
}

/// Message templates keyed by meaning. Placeholders use `{0}`, `{1}`, …
/// and are filled in with [`format_message`].
pub mod diagnostic_messages {
    pub const DUPLICATE_IDENTIFIER: &str = "identifier '{0}' already declared";
    pub const DUPLICATE_IDENTIFIER_GENERIC: &str = "duplicate identifier '{0}'";
    pub const UNKNOWN_TYPE_NAME: &str = "unknown type name: {0}";
    pub const UNDEFINED_VARIABLE: &str = "undefined variable '{0}'";
    pub const GENERIC_ARITY_MISMATCH: &str =
        "Generic type '{0}' expects {1} type arguments, got {2}";
    pub const GENERIC_CONSTRAINT_VIOLATION: &str =
        "Type '{0}' does not satisfy constraint '{1}' for type parameter '{2}'";
    pub const NOT_A_GENERIC_TYPE: &str = "Type '{0}' is not a generic type";
    pub const REST_PARAM_MUST_BE_ARRAY: &str = "rest parameter type must be an array type, got '{0}'";
    pub const DEFAULT_VALUE_NOT_ASSIGNABLE: &str =
        "default value type '{0}' is not assignable to parameter type '{1}'";
    pub const ENUM_MEMBER_MISSING_INITIALIZER: &str = "enum member must have initializer";
    pub const ENUM_MEMBER_NOT_CONSTANT: &str =
        "enum member initializer must be a constant expression";
    pub const NO_OVERLOAD_MATCHES: &str =
        "no overload matches call with arguments ({0}). Available overloads:\n{1}";
    pub const OVERLOAD_IMPLEMENTATION_INCOMPATIBLE: &str =
        "function implementation signature '{0}' is not compatible with overload signature '{1}'";
    pub const COMPARISON_NO_OVERLAP: &str = "This comparison appears to be unintentional because the types '{0}' and '{1}' have no overlap.";
    pub const TYPE_NOT_ITERABLE: &str = "type '{0}' is not iterable";
    pub const SWITCH_CASE_NOT_COMPARABLE: &str =
        "this case expression type ({0}) is not comparable to the switch expression type ({1})";
    pub const ARGUMENT_NOT_ASSIGNABLE: &str =
        "argument {0}: cannot assign type '{1}' to parameter of type '{2}'";
    pub const ELEMENT_NOT_ASSIGNABLE_TO_VARIABLE: &str =
        "cannot assign element type '{0}' to variable type '{1}'";
    pub const NOT_ASSIGNABLE: &str = "Type '{0}' is not assignable to type '{1}'.";
    pub const LINGERING_FORWARD_REFERENCE: &str =
        "internal error: type '{0}' was never resolved and has been treated as 'any'";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_message_fills_placeholders() {
        let s = format_message(diagnostic_messages::UNKNOWN_TYPE_NAME, &["Foo"]);
        assert_eq!(s, "unknown type name: Foo");
    }

    #[test]
    fn format_message_fills_multiple_placeholders() {
        let s = format_message(
            diagnostic_messages::GENERIC_ARITY_MISMATCH,
            &["Pair", "2", "1"],
        );
        assert_eq!(s, "Generic type 'Pair' expects 2 type arguments, got 1");
    }
}
