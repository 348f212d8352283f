//! Common types shared across the type checker's crates.
//!
//! This crate provides foundational types used by both `tyck-ast` and
//! `tyck-checker`:
//! - Source spans (`Span`)
//! - Diagnostics (`Diagnostic`, `DiagnosticCategory`, message templates)
//! - Checker configuration (`CheckerOptions`)
//! - Recursion/iteration limits (`limits`)

pub mod diagnostics;
pub mod limits;
pub mod options;
pub mod span;
pub mod type_id;

pub use diagnostics::{format_message, Diagnostic, DiagnosticCategory};
pub use options::CheckerOptions;
pub use span::Span;
pub use type_id::TypeId;
