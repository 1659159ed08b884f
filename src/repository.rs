//! # Repository Records
//!
//! A `Repository` is the provider-agnostic metadata the selection engine
//! keeps for each repository: enough to resolve labels and to answer
//! default-branch lookups. The `Catalog` maps each repository's qualified
//! name to its record.
//!
//! ## Qualified names
//!
//! Repositories of the default project (the first configured project) are
//! keyed by their bare name. Repositories of any other project are keyed as
//! `project/name`, so two projects may each own a repository called `api`
//! without colliding.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Metadata for one repository as listed by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub default_branch: String,
    /// Labels in the order the provider reported them.
    #[serde(default)]
    pub labels: Vec<String>,
}

impl Repository {
    /// Create a repository record with empty metadata.
    pub fn new(project: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            public: false,
            project: project.to_string(),
            default_branch: String::new(),
            labels: Vec::new(),
        }
    }

    pub fn with_labels<S: Into<String>>(mut self, labels: impl IntoIterator<Item = S>) -> Self {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default_branch(mut self, branch: &str) -> Self {
        self.default_branch = branch.to_string();
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// The catalog key for this repository given the default project.
    pub fn qualified_name(&self, default_project: &str) -> String {
        qualified_name(&self.project, &self.name, default_project)
    }
}

/// Build the catalog key for `name` in `project`.
pub fn qualified_name(project: &str, name: &str, default_project: &str) -> String {
    if project.is_empty() || project == default_project {
        name.to_string()
    } else {
        format!("{}/{}", project, name)
    }
}

/// Qualified repository name to repository metadata.
pub type Catalog = BTreeMap<String, Repository>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_name_default_project_is_bare() {
        let repo = Repository::new("platform", "web-app");
        assert_eq!(repo.qualified_name("platform"), "web-app");
    }

    #[test]
    fn test_qualified_name_other_project_is_prefixed() {
        let repo = Repository::new("tools", "web-app");
        assert_eq!(repo.qualified_name("platform"), "tools/web-app");
    }

    #[test]
    fn test_qualified_name_without_project() {
        assert_eq!(qualified_name("", "api", "platform"), "api");
    }

    #[test]
    fn test_repository_deserializes_with_defaults() {
        let repo: Repository = serde_json::from_str(r#"{"name": "worker"}"#).unwrap();
        assert_eq!(repo.name, "worker");
        assert!(repo.labels.is_empty());
        assert!(!repo.public);
        assert!(repo.default_branch.is_empty());
    }

    #[test]
    fn test_builders() {
        let repo = Repository::new("platform", "api")
            .with_labels(["backend", "go"])
            .with_default_branch("main")
            .with_description("Public API");
        assert_eq!(repo.labels, vec!["backend", "go"]);
        assert_eq!(repo.default_branch, "main");
        assert_eq!(repo.description, "Public API");
    }
}
