//! # Error Handling
//!
//! This module defines the centralized error type for the `repo-fleet`
//! library. It uses `thiserror` to build a single `Error` enum covering every
//! failure the selection engine can report.
//!
//! The variants fall into three groups:
//!
//! - **Cache read problems** (`CacheMissing`, `CacheCorrupt`, `CacheExpired`).
//!   These are recoverable: the catalog service logs them and falls back to a
//!   live fetch from the provider.
//! - **Fetch and persistence problems** (`ProviderFetch`, `CacheWrite`). These
//!   propagate to the caller with the failing project or path attached.
//! - **Configuration problems** (`UnregisteredProvider`, `ConfigParse`). These
//!   are caught at startup, before any repository is touched.
//!
//! Unknown labels or repository names in filter tokens are never errors; they
//! simply contribute nothing to a selection.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Main error type for repo-fleet operations
#[derive(Error, Debug)]
pub enum Error {
    /// The cache file does not exist or could not be opened.
    #[error("Repository cache not found: {}", path.display())]
    CacheMissing { path: PathBuf },

    /// The cache file exists but its content could not be decoded.
    #[error("Repository cache is corrupt: {}: {message}", path.display())]
    CacheCorrupt { path: PathBuf, message: String },

    /// The cache record is older than the configured TTL.
    #[error("Repository cache expired: {} is {}s old", path.display(), age.as_secs())]
    CacheExpired { path: PathBuf, age: Duration },

    /// The cache record could not be written.
    ///
    /// The in-memory catalog stays usable when this is returned after a
    /// successful fetch.
    #[error("Failed to write repository cache {}: {source}", path.display())]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Listing repositories failed for one configured project.
    #[error("Failed to fetch repositories for project '{project}': {message}")]
    ProviderFetch { project: String, message: String },

    /// No provider factory is registered under the configured name.
    #[error("Provider '{name}' is not registered (available: {available})")]
    UnregisteredProvider { name: String, available: String },

    /// The provider does not implement the requested operation.
    #[error("Provider '{provider}' does not support {operation}")]
    Unsupported { provider: String, operation: String },

    /// An error occurred while parsing or validating the configuration file.
    ///
    /// This error includes the specific parsing issue and optionally a hint
    /// about how to fix it.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// An error indicating that the catalog lock has been poisoned.
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns true for cache read failures that should trigger a fetch.
    pub fn is_cache_miss(&self) -> bool {
        matches!(
            self,
            Error::CacheMissing { .. } | Error::CacheCorrupt { .. } | Error::CacheExpired { .. }
        )
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::ConfigParse {
            message: message.into(),
            hint: None,
        }
    }

    pub(crate) fn config_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Error::ConfigParse {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
