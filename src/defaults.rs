//! Default values for repo-fleet configuration.
//!
//! This module provides centralized default values used across the library
//! and the CLI commands, ensuring consistency and avoiding duplication.

use std::path::PathBuf;
use std::time::Duration;

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILENAME: &str = ".repo-fleet.yaml";

/// Name of the catalog cache file inside the derived cache directory.
pub const DEFAULT_CACHE_FILENAME: &str = "repositories.json";

/// How long a cached catalog stays valid.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Marker for tokens naming a label instead of a repository.
pub const DEFAULT_LABEL_MARKER: &str = "~";

/// Marker for tokens whose selection is removed from the result.
pub const DEFAULT_SKIP_MARKER: &str = "!";

/// Marker for tokens whose selection is kept regardless of exclusions.
pub const DEFAULT_FORCE_MARKER: &str = "+";

/// Label that always contains every repository in the catalog.
pub const DEFAULT_SUPERSET_LABEL: &str = "all";

/// Returns the default cache root directory.
///
/// Uses the platform-appropriate cache directory:
/// - Linux: `~/.cache/repo-fleet` (XDG Base Directory)
/// - macOS: `~/Library/Caches/repo-fleet`
/// - Windows: `{FOLDERID_LocalAppData}\repo-fleet`
///
/// Falls back to `.repo-fleet-cache` in the current directory if the
/// platform cache directory cannot be determined.
///
/// This can be overridden by `cache.dir` in the configuration file, the
/// `--cache-dir` CLI flag, or the `REPO_FLEET_CACHE` environment variable.
pub fn default_cache_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".repo-fleet-cache"))
        .join("repo-fleet")
}
