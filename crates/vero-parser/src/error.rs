//! Error and diagnostic system for the Vero toolchain.
//!
//! This module provides an error handling system with:
//! - Error codes for documentation and searchability
//! - Multiple labeled spans for rich error context
//! - Severity levels
//! - Name suggestions for undefined-reference errors
//! - Diagnostic collector for accumulating multiple errors
//!
//! # Overview
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error or warning message with optional error code, multiple source
//! locations, suggestions, and help text. Multiple diagnostics are wrapped in
//! [`ParseError`] for returning from the compilation lifecycle. The semantic
//! validator reuses the same types so downstream consumers handle one
//! diagnostic shape for every phase.
//!
//! # Example
//!
//! ```
//! # use vero_parser::error::{Diagnostic, ErrorCode};
//! # use vero_core::Span;
//!
//! let span = Span::new(100..120);
//! let original_span = Span::new(50..70);
//!
//! let diag = Diagnostic::error("page `Checkout` is defined multiple times")
//!     .with_code(ErrorCode::DuplicatePage)
//!     .with_label(span, "duplicate definition")
//!     .with_secondary_label(original_span, "first defined here")
//!     .with_help("remove the duplicate or use a different name");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub use collector::DiagnosticCollector;
pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
