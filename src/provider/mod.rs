//! # Source-Control Providers
//!
//! The selection engine only needs one thing from a source-control server:
//! the list of repositories in a project. This module defines that
//! capability as the `Provider` trait, together with the pull-request
//! operations the rest of the tool builds on.
//!
//! ## Registry
//!
//! Providers are created through a `ProviderRegistry`, an explicit map from
//! provider name to factory function. The registry is built once at startup
//! and injected into the `CatalogService`; nothing registers itself behind
//! the caller's back.
//!
//! ```
//! use repo_fleet::provider::{ProviderRegistry, ProviderSettings};
//!
//! let registry = ProviderRegistry::with_builtin();
//! assert!(registry.contains("static"));
//! assert!(registry.create("nope", &ProviderSettings::new("platform")).is_err());
//! ```
//!
//! The built-in `static` provider reads repositories from an inventory file,
//! see [`inventory`].

pub mod inventory;

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::repository::Repository;

/// Request to open a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRequest {
    pub repository: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub source_branch: String,
    pub target_branch: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestState {
    Open,
    Merged,
    Declined,
}

/// A pull request as reported by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub id: u64,
    pub repository: String,
    pub title: String,
    pub source_branch: String,
    pub target_branch: String,
    pub state: PullRequestState,
    #[serde(default)]
    pub url: Option<String>,
}

/// A source-control provider bound to a single project.
///
/// Only `list_repositories` is required. The pull-request operations default
/// to `Error::Unsupported` so read-only providers stay small.
pub trait Provider: Send {
    /// Registry name of this provider.
    fn name(&self) -> &str;

    /// List every repository in the provider's project.
    fn list_repositories(&self) -> Result<Vec<Repository>>;

    fn create_pull_request(&self, _request: &PullRequestRequest) -> Result<PullRequest> {
        Err(unsupported(self.name(), "creating pull requests"))
    }

    fn list_pull_requests(&self, _repository: &str) -> Result<Vec<PullRequest>> {
        Err(unsupported(self.name(), "listing pull requests"))
    }

    fn merge_pull_request(&self, _repository: &str, _id: u64) -> Result<()> {
        Err(unsupported(self.name(), "merging pull requests"))
    }
}

fn unsupported(provider: &str, operation: &str) -> Error {
    Error::Unsupported {
        provider: provider.to_string(),
        operation: operation.to_string(),
    }
}

/// Everything a factory needs to build a provider for one project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderSettings {
    pub project: String,
    pub git_host: Option<String>,
    /// Provider-specific options from `provider_options`.
    pub options: BTreeMap<String, String>,
    /// Directory relative option paths resolve against.
    pub base_dir: PathBuf,
    /// Time left for the whole fetch when the provider is created. Network
    /// providers should not block past it.
    pub timeout: Option<Duration>,
}

impl ProviderSettings {
    pub fn new(project: &str) -> Self {
        Self {
            project: project.to_string(),
            ..Self::default()
        }
    }

    pub fn with_option(mut self, key: &str, value: &str) -> Self {
        self.options.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Settings for `project` taken from the configuration.
    pub fn from_config(config: &Config, project: &str) -> Self {
        Self {
            project: project.to_string(),
            git_host: config.git_host.clone(),
            options: config.provider_options.clone(),
            base_dir: config.base_dir.clone(),
            timeout: config.fetch_timeout,
        }
    }

    /// Look up a required option.
    pub fn require(&self, key: &str) -> Result<&str> {
        self.options.get(key).map(String::as_str).ok_or_else(|| {
            Error::config_with_hint(
                format!("provider option '{}' is required", key),
                format!("Add '{}:' under 'provider_options:'", key),
            )
        })
    }
}

/// Builds a provider for one project.
pub type ProviderFactory =
    Box<dyn Fn(&ProviderSettings) -> Result<Box<dyn Provider>> + Send + Sync>;

/// Provider name to factory.
#[derive(Default)]
pub struct ProviderRegistry {
    factories: BTreeMap<String, ProviderFactory>,
}

impl ProviderRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the providers shipped with this crate.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(inventory::PROVIDER_NAME, |settings: &ProviderSettings| {
            inventory::InventoryProvider::from_settings(settings)
                .map(|provider| Box::new(provider) as Box<dyn Provider>)
        });
        registry
    }

    /// Register `factory` under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&ProviderSettings) -> Result<Box<dyn Provider>> + Send + Sync + 'static,
    {
        self.factories.insert(name.to_string(), Box::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names in alphabetical order.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Fail with `UnregisteredProvider` unless `name` is registered.
    pub fn ensure_registered(&self, name: &str) -> Result<()> {
        if self.contains(name) {
            Ok(())
        } else {
            Err(Error::UnregisteredProvider {
                name: name.to_string(),
                available: self.names().join(", "),
            })
        }
    }

    /// Build the provider registered as `name` for `settings.project`.
    pub fn create(&self, name: &str, settings: &ProviderSettings) -> Result<Box<dyn Provider>> {
        self.ensure_registered(name)?;
        let factory = &self.factories[name];
        factory(settings)
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.names())
            .finish()
    }
}
