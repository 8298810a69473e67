//! Configuration management for the booking CLI.
//!
//! Loads configuration from environment variables with sensible defaults.
//! A `.env` file in the working directory is read first by the binary.

use crate::catalog::{CatalogError, StaticCatalog};
use std::env;
use std::path::PathBuf;

/// Default tracing filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info,encore_booking=debug";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Catalog file replacing the built-in fixture (`ENCORE_CATALOG_PATH`)
    pub catalog_path: Option<PathBuf>,
    /// Print the current step above each screen (`ENCORE_DEBUG_STEP`)
    pub debug_step: bool,
    /// Tracing filter directives (`RUST_LOG`)
    pub log_filter: String,
}

impl Config {
    /// Load configuration from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            catalog_path: var("ENCORE_CATALOG_PATH")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            debug_step: var("ENCORE_DEBUG_STEP")
                .and_then(|s| parse_flag(&s))
                .unwrap_or(false),
            log_filter: var("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        }
    }

    /// The configured catalog, or the built-in one
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the configured file cannot be loaded.
    pub fn load_catalog(&self) -> Result<StaticCatalog, CatalogError> {
        match &self.catalog_path {
            Some(path) => {
                tracing::info!(path = %path.display(), "Loading catalog from file");
                StaticCatalog::load(path)
            },
            None => StaticCatalog::builtin(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_vars(|_| None)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
