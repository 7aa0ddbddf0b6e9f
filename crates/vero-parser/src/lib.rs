//! # Vero Parser
//!
//! Lexer and parser for the Vero test-automation language. This crate
//! provides the front half of the compilation pipeline, from source
//! text to the AST defined in [`vero_core`].
//!
//! ## Usage
//!
//! ```
//! # use vero_parser::{parse, ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"
//!         page LoginPage {
//!             field submit = "button.submit"
//!         }
//!
//!         feature Login {
//!             scenario "submits the form" {
//!                 click LoginPage.submit
//!             }
//!         }
//!     "#;
//!
//!     let program = parse(source)?;
//!     assert_eq!(program.features.len(), 1);
//!     Ok(())
//! }
//! ```

pub mod error;

mod lexer;
mod parser;
mod tokens;

pub use error::{Diagnostic, DiagnosticCollector, ErrorCode, Label, ParseError, Severity};
pub use lexer::tokenize;
pub use parser::build_program;
pub use tokens::{PositionedToken, Token};

use vero_core::ast::Program;

/// Parse Vero source text into a [`Program`].
///
/// This is the main entry point for the parsing front end. It runs the
/// two lexical stages in order:
///
/// 1. **Tokenize** - Convert source text to positioned tokens
/// 2. **Parse** - Build the program AST from the token stream
///
/// Each stage collects every diagnostic it can before failing, so a
/// returned [`ParseError`] lists all lexical errors or all syntax
/// errors found in `source`. Lexical errors abort the pipeline before
/// parsing; a token stream is only parsed once it lexed cleanly.
///
/// # Example
///
/// ```
/// # use vero_parser::parse;
/// let error = parse("feature Broken {").unwrap_err();
/// assert_eq!(error.diagnostics().len(), 1);
/// ```
pub fn parse(source: &str) -> Result<Program, ParseError> {
    let tokens = tokenize(source)?;
    build_program(&tokens)
}
