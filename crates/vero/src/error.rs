//! Error types for Vero operations.
//!
//! This module provides the main error type [`VeroError`] which wraps
//! various error conditions that can occur while compiling a program.

use std::io;

use thiserror::Error;

use vero_parser::error::ParseError;

use crate::transpile::TranspileError;

/// The main error type for Vero operations.
///
/// # Diagnostic Variants
///
/// The `Parse` and `Validation` variants carry structured diagnostics
/// with source code spans. These provide detailed error information that
/// can be used for rich error reporting.
#[derive(Debug, Error)]
pub enum VeroError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("{count} validation error(s)")]
    Validation {
        count: usize,
        diagnostics: Vec<vero_parser::error::Diagnostic>,
        src: String,
    },

    #[error("{err}")]
    Transpile { err: TranspileError, src: String },
}

impl VeroError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }

    /// Create a new `Validation` error from the diagnostics of a failed
    /// validation pass.
    pub fn new_validation_error(
        count: usize,
        diagnostics: Vec<vero_parser::error::Diagnostic>,
        src: impl Into<String>,
    ) -> Self {
        Self::Validation {
            count,
            diagnostics,
            src: src.into(),
        }
    }

    /// Create a new `Transpile` error with the associated source code.
    pub fn new_transpile_error(err: TranspileError, src: impl Into<String>) -> Self {
        Self::Transpile {
            err,
            src: src.into(),
        }
    }
}
