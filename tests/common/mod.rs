//! Shared test utilities for E2E tests.
//!
//! This module provides common fixtures and helper functions to reduce
//! duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_fleet();
//!     fixture.command().arg("list").arg("~frontend").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use super::configs;
    pub use super::TestFixture;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;
}

/// Common configuration and inventory snippets for testing.
#[allow(dead_code)]
pub mod configs {
    /// One project read from `inventory.yaml`, unwanted labels skipped.
    pub const FLEET: &str = r#"
provider: static
projects: [platform]
provider_options:
  inventory: inventory.yaml
filter:
  skip_unwanted: true
  unwanted: [deprecated, poc]
aliases:
  backend: [billing]
"#;

    /// Two projects; `tools` repositories get qualified names.
    pub const TWO_PROJECTS: &str = r#"
provider: static
projects: [platform, tools]
provider_options:
  inventory: inventory.yaml
"#;

    /// Points at a provider nobody registered.
    pub const UNKNOWN_PROVIDER: &str = r#"
provider: statik
projects: [platform]
"#;

    /// Names an inventory file that does not exist.
    pub const MISSING_INVENTORY: &str = r#"
provider: static
projects: [platform]
provider_options:
  inventory: nowhere.yaml
"#;

    /// Invalid YAML for error testing.
    pub const INVALID_YAML: &str = "invalid: yaml: content:";

    pub const INVENTORY: &str = r#"
platform:
  - name: web-app
    description: Customer web app
    default_branch: main
    labels: [frontend]
  - name: mobile-app
    default_branch: main
    labels: [frontend]
  - name: api-server
    default_branch: develop
    labels: [backend]
  - name: worker
    labels: [backend]
  - name: legacy
    labels: [deprecated]
  - name: spike
    labels: [poc, frontend]
tools:
  - name: linter
    labels: [backend]
  - name: api-server
    labels: [backend]
"#;
}

/// A temporary directory holding a fleet configuration and inventory.
///
/// Commands created from the fixture run inside the directory, keep their
/// cache under `cache/` and never use colour.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `.repo-fleet.yaml` configuration file with the given content.
    pub fn with_config(self, content: &str) -> Self {
        self.with_file(".repo-fleet.yaml", content)
    }

    /// Add the default inventory file.
    pub fn with_inventory(self) -> Self {
        self.with_file("inventory.yaml", configs::INVENTORY)
    }

    /// Add the single-project configuration and its inventory.
    pub fn with_fleet(self) -> Self {
        self.with_config(configs::FLEET).with_inventory()
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path to the config file.
    #[allow(dead_code)]
    pub fn config_path(&self) -> PathBuf {
        self.temp_dir.path().join(".repo-fleet.yaml")
    }

    /// Root directory of the catalog cache used by `command`.
    pub fn cache_dir(&self) -> PathBuf {
        self.temp_dir.path().join("cache")
    }

    /// Where the single-project configuration keeps its cache file.
    #[allow(dead_code)]
    pub fn cache_file(&self) -> PathBuf {
        self.cache_dir()
            .join("local")
            .join("platform")
            .join("repositories.json")
    }

    /// Create a command configured to run in this fixture's directory.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("repo-fleet");
        cmd.current_dir(self.path())
            .env_remove("REPO_FLEET_CONFIG")
            .env("REPO_FLEET_CACHE", self.cache_dir())
            .env("NO_COLOR", "1");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
