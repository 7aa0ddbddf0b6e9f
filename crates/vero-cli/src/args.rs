//! Command-line argument definitions for the Vero CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. The CLI is subcommand based: `check` validates a source
//! file and reports diagnostics, `compile` additionally generates the
//! Playwright test files.

use clap::{Parser, Subcommand};

/// Command-line arguments for the Vero compiler
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

/// The available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse and validate a Vero file without generating code
    Check {
        /// Path to the input Vero file
        #[arg(help = "Path to the input file")]
        input: String,
    },

    /// Compile a Vero file into Playwright test files
    Compile {
        /// Path to the input Vero file
        #[arg(help = "Path to the input file")]
        input: String,

        /// Directory for the generated `.spec.ts` files
        #[arg(short, long, default_value = "tests")]
        output: String,

        /// Path to configuration file (TOML)
        #[arg(short, long)]
        config: Option<String>,
    },
}
