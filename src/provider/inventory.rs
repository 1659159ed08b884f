//! The `static` provider: repositories listed in an inventory file.
//!
//! The inventory maps each project to the repositories it contains. YAML is
//! the default format; files ending in `.json` are read as JSON.
//!
//! ```yaml
//! platform:
//!   - name: web-app
//!     description: Customer-facing site
//!     default_branch: main
//!     labels: [frontend]
//!   - name: api-server
//!     labels: [backend]
//! ```
//!
//! The file is re-read on every `list_repositories` call, so edits show up
//! on the next catalog refresh.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::debug;

use super::{Provider, ProviderSettings};
use crate::error::{Error, Result};
use crate::repository::Repository;

/// Registry name of the inventory provider.
pub const PROVIDER_NAME: &str = "static";

/// Provider option naming the inventory file.
pub const INVENTORY_OPTION: &str = "inventory";

type Inventory = BTreeMap<String, Vec<Repository>>;

/// Lists repositories of one project from an inventory file.
#[derive(Debug, Clone)]
pub struct InventoryProvider {
    project: String,
    path: PathBuf,
}

impl InventoryProvider {
    pub fn new(project: &str, path: impl Into<PathBuf>) -> Self {
        Self {
            project: project.to_string(),
            path: path.into(),
        }
    }

    /// Build from provider settings; requires the `inventory` option.
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self> {
        let raw = Path::new(settings.require(INVENTORY_OPTION)?);
        let path = if raw.is_absolute() {
            raw.to_path_buf()
        } else {
            settings.base_dir.join(raw)
        };
        Ok(Self::new(&settings.project, path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_inventory(&self) -> Result<Inventory> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| self.fetch_error(e))?;
        let is_json = self
            .path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            serde_json::from_str(&content).map_err(|e| self.fetch_error(e))
        } else {
            serde_yaml::from_str(&content).map_err(|e| self.fetch_error(e))
        }
    }

    fn fetch_error(&self, error: impl std::fmt::Display) -> Error {
        Error::ProviderFetch {
            project: self.project.clone(),
            message: format!("{}: {}", self.path.display(), error),
        }
    }
}

impl Provider for InventoryProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn list_repositories(&self) -> Result<Vec<Repository>> {
        let mut inventory = self.read_inventory()?;
        let repos = inventory.remove(&self.project).ok_or_else(|| {
            self.fetch_error(format!("project '{}' not found in inventory", self.project))
        })?;
        debug!(
            "Inventory {} lists {} repositories for project '{}'",
            self.path.display(),
            repos.len(),
            self.project
        );

        Ok(repos
            .into_iter()
            .map(|mut repo| {
                repo.project = self.project.clone();
                repo
            })
            .collect())
    }
}
