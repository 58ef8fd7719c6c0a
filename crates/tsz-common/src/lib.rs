//! Common types shared across the tsz-lowering workspace.
//!
//! This crate provides the foundational types used by `tsz-ast`, `tsz-lowering`,
//! and `tsz-json`:
//! - Source spans (`Span`)
//! - Diagnostics (`Diagnostic`, `DiagnosticCategory`, `DiagnosticBag`)
//! - Logging setup helpers

pub mod diagnostics;
pub mod span;

pub use diagnostics::{Diagnostic, DiagnosticBag, DiagnosticCategory};
pub use span::Span;
