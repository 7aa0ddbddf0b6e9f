//! CLI logic for the Vero compiler.
//!
//! This module contains the core CLI logic for the `vero` binary.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, Command};

use std::{fs, path::Path};

use log::{info, warn};

use vero::{Compiler, LineIndex, VeroError};
use vero_parser::error::Diagnostic;

use error_adapter::{DiagnosticAdapter, Reportable};

/// Run the Vero CLI application
///
/// Dispatches to the selected subcommand: `check` parses and validates
/// the input file, `compile` additionally writes one Playwright test
/// file per feature into the output directory.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `VeroError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Parsing errors
/// - Validation errors
/// - Code generation errors
pub fn run(args: &Args) -> Result<(), VeroError> {
    match &args.command {
        Command::Check { input } => check(input),
        Command::Compile {
            input,
            output,
            config,
        } => compile(input, output, config.as_ref()),
    }
}

/// Parse and validate the input file, reporting every diagnostic.
fn check(input: &str) -> Result<(), VeroError> {
    info!(input_path = input; "Checking program");

    let source = fs::read_to_string(input)?;

    let compiler = Compiler::default();
    let result = compiler.check(&source)?;

    if !result.is_valid() {
        return Err(VeroError::new_validation_error(
            result.error_count(),
            result.into_diagnostics(),
            source,
        ));
    }

    report_warnings(result.diagnostics(), &source);

    info!(input_path = input; "No errors found");
    Ok(())
}

/// Compile the input file and write the generated tests.
fn compile(input: &str, output: &str, config_path: Option<&String>) -> Result<(), VeroError> {
    info!(input_path = input, output_dir = output; "Compiling program");

    // Load configuration
    let app_config = config::load_config(config_path)?;

    // Read input file
    let source = fs::read_to_string(input)?;

    // Process the program using the Compiler API
    let compiler = Compiler::new(app_config);
    let compiled = compiler.compile(&source)?;
    let (tests, warnings) = compiled.into_parts();

    report_warnings(&warnings, &source);

    // Write one file per feature
    fs::create_dir_all(output)?;
    for (feature, code) in &tests {
        let path = Path::new(output).join(format!("{feature}.spec.ts"));
        fs::write(&path, code)?;
        info!(file = path.display().to_string(); "Wrote test file");
    }

    info!(files = tests.len(), output_dir = output; "Tests exported successfully");

    Ok(())
}

/// Render non-fatal diagnostics through miette at warn level.
///
/// The log record carries the 1-based position of the primary label so
/// structured log collectors keep it even without the rendered snippet.
fn report_warnings(diagnostics: &[Diagnostic], src: &str) {
    let reporter = miette::GraphicalReportHandler::new();
    let index = LineIndex::new(src);

    for diag in diagnostics {
        let reportable = Reportable::Diagnostic(DiagnosticAdapter::new(diag, src));
        let mut writer = String::new();
        reporter
            .render_report(&mut writer, &reportable)
            .expect("Writing to String buffer is infallible");

        match diag.primary_span() {
            Some(span) => {
                let pos = index.line_col(span.start());
                warn!(line = pos.line, column = pos.column; "{writer}");
            }
            None => warn!("{writer}"),
        }
    }
}
