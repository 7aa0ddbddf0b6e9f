//! Vero - A plain-language DSL for browser test automation.
//!
//! Parsing, validation, and code generation for the Vero language.
//! Programs written in Vero compile to Playwright TypeScript test
//! files, one per feature.

pub mod config;
pub mod suggest;

mod error;
mod symbols;
mod transpile;
mod validate;

pub use vero_core::{LineCol, LineIndex, Span, Spanned, ast};

pub use error::VeroError;
pub use symbols::{ActionContainer, SymbolTable};
pub use transpile::{TranspileError, TranspileOutput, transpile};
pub use validate::{Validation, ValidationResult, validate};

use indexmap::IndexMap;
use log::{debug, info, trace};

use vero_core::ast::Program;
use vero_parser::error::Diagnostic;

use config::AppConfig;

/// Compiler for Vero programs.
///
/// This provides an API for processing Vero source through parsing,
/// validation, and code generation stages.
///
/// # Examples
///
/// ```
/// use vero::{Compiler, config::AppConfig};
///
/// let source = r#"
///     page LoginPage {
///         field submit = "button.submit"
///     }
///
///     feature Login {
///         scenario "submits the form" {
///             click LoginPage.submit
///         }
///     }
/// "#;
///
/// // With custom config
/// let config = AppConfig::default();
/// let compiler = Compiler::new(config);
///
/// // Full pipeline: source to generated Playwright files
/// let output = compiler.compile(source)
///     .expect("Failed to compile");
/// assert!(output.tests().contains_key("Login"));
///
/// // Or use default config
/// let compiler = Compiler::default();
/// ```
#[derive(Default)]
pub struct Compiler {
    config: AppConfig,
}

/// The result of a successful compilation: generated files keyed by
/// feature name, plus any non-fatal diagnostics raised on the way.
#[derive(Debug)]
pub struct CompileOutput {
    tests: IndexMap<String, String>,
    warnings: Vec<Diagnostic>,
}

impl CompileOutput {
    /// Generated TypeScript sources as `feature name -> file contents`.
    pub fn tests(&self) -> &IndexMap<String, String> {
        &self.tests
    }

    /// Warnings produced during validation.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn into_parts(self) -> (IndexMap<String, String>, Vec<Diagnostic>) {
        (self.tests, self.warnings)
    }
}

impl Compiler {
    /// Create a new compiler with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration including code generation
    ///   settings
    ///
    /// # Examples
    ///
    /// ```
    /// use vero::{Compiler, config::AppConfig};
    ///
    /// let config = AppConfig::default();
    /// let compiler = Compiler::new(config);
    /// ```
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Parse source code into a program AST.
    ///
    /// # Arguments
    ///
    /// * `source` - Vero source code as a string
    ///
    /// # Errors
    ///
    /// Returns `VeroError` when the source contains lexical or syntax
    /// errors.
    pub fn parse(&self, source: &str) -> Result<Program, VeroError> {
        info!("Parsing program");

        let program = vero_parser::parse(source)
            .map_err(|err| VeroError::new_parse_error(err, source))?;

        debug!("Program parsed successfully");
        trace!(program:?; "Parsed program");

        Ok(program)
    }

    /// Parse and validate source code, returning every diagnostic found.
    ///
    /// Unlike [`Compiler::compile`], semantic problems are data here
    /// rather than errors: the returned [`ValidationResult`] carries
    /// both errors and warnings for reporting.
    ///
    /// # Arguments
    ///
    /// * `source` - Vero source code as a string
    ///
    /// # Errors
    ///
    /// Returns `VeroError` when the source contains lexical or syntax
    /// errors.
    ///
    /// # Examples
    ///
    /// ```
    /// use vero::Compiler;
    ///
    /// let compiler = Compiler::default();
    /// let result = compiler.check("feature Empty { }")
    ///     .expect("Failed to parse");
    /// assert!(result.is_valid());
    /// ```
    pub fn check(&self, source: &str) -> Result<ValidationResult, VeroError> {
        let program = self.parse(source)?;
        let validation = validate(&program);
        let (_, result) = validation.into_parts();
        Ok(result)
    }

    /// Compile source code into Playwright test files.
    ///
    /// This performs parsing, validation, and code generation to produce
    /// one TypeScript file per feature.
    ///
    /// # Arguments
    ///
    /// * `source` - Vero source code as a string
    ///
    /// # Errors
    ///
    /// Returns `VeroError` for syntax errors, validation errors, or code
    /// generation errors.
    ///
    /// # Examples
    ///
    /// ```
    /// use vero::{Compiler, config::AppConfig};
    ///
    /// let source = r#"
    ///     feature Smoke {
    ///         scenario "loads the home page" {
    ///             open "https://example.com"
    ///         }
    ///     }
    /// "#;
    ///
    /// let compiler = Compiler::new(AppConfig::default());
    /// let output = compiler.compile(source)
    ///     .expect("Failed to compile");
    ///
    /// let code = output.tests().get("Smoke").unwrap();
    /// assert!(code.contains("test.describe('Smoke'"));
    /// ```
    pub fn compile(&self, source: &str) -> Result<CompileOutput, VeroError> {
        let program = self.parse(source)?;

        let validation = validate(&program);
        if !validation.is_valid() {
            let (_, result) = validation.into_parts();
            return Err(VeroError::new_validation_error(
                result.error_count(),
                result.into_diagnostics(),
                source,
            ));
        }

        let tests = transpile(&program, validation.symbols(), self.config.transpile())
            .map_err(|err| VeroError::new_transpile_error(err, source))?
            .into_tests();
        let (_, result) = validation.into_parts();
        let warnings = result.into_diagnostics();

        info!(files = tests.len(), warnings = warnings.len(); "Compilation finished");
        Ok(CompileOutput { tests, warnings })
    }
}
