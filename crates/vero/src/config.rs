//! Configuration types for Vero compilation.
//!
//! This module provides configuration structures that control how
//! generated Playwright code behaves at runtime. All types implement
//! [`serde::Deserialize`] for flexible loading from external sources.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level application configuration.
//! - [`TranspileConfig`] - Timing parameters baked into generated tab
//!   operations.
//!
//! # Example
//!
//! ```
//! # use vero::config::AppConfig;
//! // Use default configuration
//! let config = AppConfig::default();
//! assert_eq!(config.transpile().new_tab_timeout_ms(), 5000);
//! ```

use serde::Deserialize;

/// Top-level application configuration.
///
/// Currently wraps [`TranspileConfig`]; the indirection keeps room for
/// further sections without breaking configuration files.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct AppConfig {
    /// Code generation section.
    #[serde(default)]
    transpile: TranspileConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified transpile
    /// configuration.
    ///
    /// # Arguments
    ///
    /// * `transpile` - Timing parameters for generated tab operations.
    pub fn new(transpile: TranspileConfig) -> Self {
        Self { transpile }
    }

    /// Returns the transpile configuration.
    pub fn transpile(&self) -> &TranspileConfig {
        &self.transpile
    }
}

/// Timing parameters baked into generated tab operations.
///
/// These values end up as literals in the generated TypeScript, so they
/// are fixed at compile time rather than read by the tests at runtime.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TranspileConfig {
    /// How long a generated `switch to new tab` waits for a tab to
    /// appear, in milliseconds. Also bounds the wait for a numbered tab.
    #[serde(default = "default_new_tab_timeout_ms")]
    new_tab_timeout_ms: u64,

    /// Polling interval while waiting for a numbered tab to open, in
    /// milliseconds.
    #[serde(default = "default_tab_poll_interval_ms")]
    tab_poll_interval_ms: u64,
}

impl TranspileConfig {
    /// Creates a new [`TranspileConfig`] with the specified timings.
    ///
    /// # Arguments
    ///
    /// * `new_tab_timeout_ms` - Timeout for new-tab waits in milliseconds.
    /// * `tab_poll_interval_ms` - Polling interval in milliseconds.
    pub fn new(new_tab_timeout_ms: u64, tab_poll_interval_ms: u64) -> Self {
        Self {
            new_tab_timeout_ms,
            tab_poll_interval_ms,
        }
    }

    /// Returns the new-tab wait timeout in milliseconds.
    pub fn new_tab_timeout_ms(&self) -> u64 {
        self.new_tab_timeout_ms
    }

    /// Returns the numbered-tab polling interval in milliseconds.
    pub fn tab_poll_interval_ms(&self) -> u64 {
        self.tab_poll_interval_ms
    }
}

impl Default for TranspileConfig {
    fn default() -> Self {
        Self {
            new_tab_timeout_ms: default_new_tab_timeout_ms(),
            tab_poll_interval_ms: default_tab_poll_interval_ms(),
        }
    }
}

fn default_new_tab_timeout_ms() -> u64 {
    5000
}

fn default_tab_poll_interval_ms() -> u64 {
    150
}
