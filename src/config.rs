//! # Configuration Schema and Parsing
//!
//! This module defines the structure of the `.repo-fleet.yaml` configuration
//! file and the logic for parsing and validating it.
//!
//! ## Example
//!
//! ```yaml
//! provider: static
//! projects: [platform, tools]
//! git_host: https://bitbucket.example.com
//! fetch_timeout: 2m
//! provider_options:
//!   inventory: inventory.yaml
//! cache:
//!   ttl: 24h
//! filter:
//!   skip_unwanted: true
//!   unwanted: [deprecated, poc]
//!   sort: true
//!   markers: { label: "~", skip: "!", force: "+" }
//! aliases:
//!   backend: [billing-api]
//! ```
//!
//! Relative paths in the file (`cache.dir`, `cache.file`, provider options
//! that name files) are resolved against the directory holding the
//! configuration file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::{Error, Result};
use crate::filter::Markers;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Name of the registered provider used to list repositories.
    pub provider: String,
    /// Source projects to fetch. The first one is the default project and its
    /// repositories keep their bare names.
    #[serde(alias = "project", deserialize_with = "one_or_many")]
    pub projects: Vec<String>,
    /// Base URL or host name of the source-control server.
    #[serde(default)]
    pub git_host: Option<String>,
    /// Upper bound on a whole catalog fetch across all projects.
    #[serde(default, with = "optional_duration", skip_serializing_if = "Option::is_none")]
    pub fetch_timeout: Option<Duration>,
    /// Free-form settings handed to the provider factory.
    #[serde(default)]
    pub provider_options: BTreeMap<String, String>,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    /// Extra labels: label name to explicit repository names.
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<String>>,
    /// Directory relative paths are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Catalog cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// How long a cached catalog stays valid (e.g. `24h`, `30m`, `7d`).
    #[serde(with = "duration_format")]
    pub ttl: Duration,
    /// Root directory the cache path is derived under.
    pub dir: Option<PathBuf>,
    /// Explicit cache file; takes precedence over the derived path.
    pub file: Option<PathBuf>,
    /// File name used inside the derived cache directory.
    pub filename: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: defaults::DEFAULT_CACHE_TTL,
            dir: None,
            file: None,
            filename: defaults::DEFAULT_CACHE_FILENAME.to_string(),
        }
    }
}

/// Filter evaluation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    /// Exclude the `unwanted` labels unless a token forces them back in.
    pub skip_unwanted: bool,
    pub unwanted: Vec<String>,
    /// Sort selections and label listings alphabetically.
    pub sort: bool,
    /// Name of the label that holds every repository.
    pub superset: String,
    pub markers: Markers,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            skip_unwanted: false,
            unwanted: Vec::new(),
            sort: true,
            superset: defaults::DEFAULT_SUPERSET_LABEL.to_string(),
            markers: Markers::default(),
        }
    }
}

impl Config {
    /// Create a configuration for `provider` over `projects`, with every
    /// other setting at its default.
    pub fn new<S: Into<String>>(provider: &str, projects: impl IntoIterator<Item = S>) -> Self {
        Self {
            provider: provider.to_string(),
            projects: projects.into_iter().map(Into::into).collect(),
            git_host: None,
            fetch_timeout: None,
            provider_options: BTreeMap::new(),
            cache: CacheConfig::default(),
            filter: FilterConfig::default(),
            aliases: BTreeMap::new(),
            base_dir: PathBuf::new(),
        }
    }

    /// The project whose repositories are keyed by bare name.
    pub fn default_project(&self) -> &str {
        self.projects.first().map(String::as_str).unwrap_or_default()
    }

    /// Resolve a path from the configuration against `base_dir`.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Check the semantic constraints serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.provider.trim().is_empty() {
            return Err(Error::config_with_hint(
                "provider must not be empty",
                "Set 'provider:' to a registered provider such as 'static'",
            ));
        }
        if self.projects.is_empty() {
            return Err(Error::config_with_hint(
                "no projects configured",
                "Add 'projects: [<name>]' with at least one project",
            ));
        }
        if let Some(empty) = self.projects.iter().find(|p| p.trim().is_empty()) {
            return Err(Error::config(format!("invalid project name '{}'", empty)));
        }
        if self.cache.ttl.is_zero() {
            return Err(Error::config_with_hint(
                "cache.ttl must be greater than zero",
                "Use a duration such as '24h' or '30m'",
            ));
        }
        if self.fetch_timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(Error::config_with_hint(
                "fetch_timeout must be greater than zero",
                "Remove 'fetch_timeout:' to wait for providers indefinitely",
            ));
        }
        if self.cache.filename.trim().is_empty() {
            return Err(Error::config("cache.filename must not be empty"));
        }
        if self.filter.superset.trim().is_empty() {
            return Err(Error::config("filter.superset must not be empty"));
        }
        self.filter.markers.validate()
    }
}

/// Parse a YAML string into a validated `Config`.
pub fn parse(yaml: &str) -> Result<Config> {
    let config: Config = serde_yaml::from_str(yaml)?;
    config.validate()?;
    Ok(config)
}

/// Load and validate a configuration file.
///
/// Relative paths inside the file resolve against the file's directory.
pub fn from_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)?;
    let mut config = parse(&content)?;
    config.base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    Ok(config)
}

/// Parse a duration string such as `30s`, `15m`, `24h`, `7d` or `2w`.
pub fn parse_duration(duration_str: &str) -> Result<Duration> {
    let duration_str = duration_str.trim().to_lowercase();

    if duration_str.is_empty() {
        return Err(Error::config("duration string cannot be empty"));
    }

    // Find the split point between number and unit
    let split_idx = duration_str
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit() && *c != '.')
        .map(|(i, _)| i)
        .unwrap_or(duration_str.len());

    if split_idx == 0 {
        return Err(Error::config(format!(
            "duration '{}' must start with a number",
            duration_str
        )));
    }

    let number_str = &duration_str[..split_idx];
    let unit_str = duration_str[split_idx..].trim();

    let number: f64 = number_str
        .parse()
        .map_err(|_| Error::config(format!("invalid number in duration: '{}'", number_str)))?;

    let seconds = match unit_str {
        "ms" => number / 1000.0,
        "" | "s" | "sec" | "second" | "seconds" => number,
        "m" | "min" | "minute" | "minutes" => number * 60.0,
        "h" | "hr" | "hour" | "hours" => number * 3600.0,
        "d" | "day" | "days" => number * 86400.0,
        "w" | "week" | "weeks" => number * 604800.0,
        _ => {
            return Err(Error::config_with_hint(
                format!("invalid duration unit: '{}'", unit_str),
                "Valid units: ms, s, m, h, d, w",
            ));
        }
    };

    Duration::try_from_secs_f64(seconds)
        .map_err(|e| Error::config(format!("duration '{}' out of range: {}", duration_str, e)))
}

/// Render a duration in the largest unit that divides it evenly.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if duration.subsec_nanos() != 0 || secs == 0 {
        return format!("{}ms", duration.as_millis());
    }
    for (unit, size) in [("w", 604800), ("d", 86400), ("h", 3600), ("m", 60)] {
        if secs % size == 0 {
            return format!("{}{}", secs / size, unit);
        }
    }
    format!("{}s", secs)
}

mod duration_format {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_duration(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Seconds(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Seconds(secs) => Ok(Duration::from_secs(secs)),
            Raw::Text(text) => super::parse_duration(&text).map_err(serde::de::Error::custom),
        }
    }
}

mod optional_duration {
    use std::time::Duration;

    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => super::duration_format::serialize(duration, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        super::duration_format::deserialize(deserializer).map(Some)
    }
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(project) => vec![project],
        OneOrMany::Many(projects) => projects,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_minimal_config() {
        let config = parse("provider: static\nprojects: [platform]\n").unwrap();
        assert_eq!(config.provider, "static");
        assert_eq!(config.projects, vec!["platform"]);
        assert_eq!(config.cache.ttl, defaults::DEFAULT_CACHE_TTL);
        assert_eq!(config.filter.superset, "all");
        assert_eq!(config.filter.markers, Markers::default());
        assert!(config.aliases.is_empty());
    }

    #[test]
    fn test_parse_single_project_alias() {
        let config = parse("provider: static\nproject: platform\n").unwrap();
        assert_eq!(config.projects, vec!["platform"]);
        assert_eq!(config.default_project(), "platform");
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
provider: static
projects: [platform, tools]
git_host: https://bitbucket.example.com
provider_options:
  inventory: inventory.yaml
cache:
  ttl: 30m
  file: /tmp/repos.json
filter:
  skip_unwanted: true
  unwanted: [deprecated, poc]
  sort: false
  superset: everything
  markers:
    label: "@"
    skip: "-"
    force: "="
aliases:
  backend: [repo-3]
"#;
        let config = parse(yaml).unwrap();
        assert_eq!(config.default_project(), "platform");
        assert_eq!(config.cache.ttl, Duration::from_secs(1800));
        assert_eq!(config.cache.file, Some(PathBuf::from("/tmp/repos.json")));
        assert!(config.filter.skip_unwanted);
        assert!(!config.filter.sort);
        assert_eq!(config.filter.superset, "everything");
        assert_eq!(config.filter.markers.label, "@");
        assert_eq!(config.aliases["backend"], vec!["repo-3"]);
        assert_eq!(config.provider_options["inventory"], "inventory.yaml");
    }

    #[test]
    fn test_parse_rejects_unknown_fields() {
        let result = parse("provider: static\nprojects: [a]\nbogus: true\n");
        assert!(matches!(result, Err(Error::Yaml(_))));
    }

    #[test]
    fn test_validate_requires_projects() {
        let result = parse("provider: static\nprojects: []\n");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("no projects configured"));
        assert!(err.to_string().contains("hint:"));
    }

    #[test]
    fn test_validate_rejects_duplicate_markers() {
        let yaml = r#"
provider: static
projects: [a]
filter:
  markers: { label: "~", skip: "~", force: "+" }
"#;
        assert!(matches!(parse(yaml), Err(Error::ConfigParse { .. })));
    }

    #[test]
    fn test_validate_rejects_zero_ttl() {
        let yaml = "provider: static\nprojects: [a]\ncache:\n  ttl: 0s\n";
        assert!(parse(yaml).is_err());
    }

    #[test]
    fn test_fetch_timeout() {
        let config = parse("provider: static\nprojects: [a]\n").unwrap();
        assert_eq!(config.fetch_timeout, None);

        let config = parse("provider: static\nprojects: [a]\nfetch_timeout: 90s\n").unwrap();
        assert_eq!(config.fetch_timeout, Some(Duration::from_secs(90)));

        let err = parse("provider: static\nprojects: [a]\nfetch_timeout: 0s\n").unwrap_err();
        assert!(err.to_string().contains("fetch_timeout"));
    }

    #[test]
    fn test_ttl_accepts_plain_seconds() {
        let config = parse("provider: static\nprojects: [a]\ncache:\n  ttl: 3600\n").unwrap();
        assert_eq!(config.cache.ttl, Duration::from_secs(3600));
    }

    #[test]
    fn test_from_file_sets_base_dir() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".repo-fleet.yaml");
        std::fs::write(&path, "provider: static\nprojects: [a]\n").unwrap();

        let config = from_file(&path).unwrap();
        assert_eq!(config.base_dir, temp.path());
        assert_eq!(
            config.resolve_path(Path::new("inventory.yaml")),
            temp.path().join("inventory.yaml")
        );
        assert_eq!(
            config.resolve_path(Path::new("/abs/inventory.yaml")),
            PathBuf::from("/abs/inventory.yaml")
        );
    }

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("15m").unwrap(), Duration::from_secs(900));
        assert_eq!(parse_duration("24h").unwrap(), Duration::from_secs(86400));
        assert_eq!(parse_duration("7d").unwrap(), Duration::from_secs(604800));
        assert_eq!(parse_duration("2w").unwrap(), Duration::from_secs(1209600));
        assert_eq!(parse_duration("1.5h").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("45").unwrap(), Duration::from_secs(45));
    }

    #[test]
    fn test_parse_duration_errors() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("h").is_err());
        assert!(parse_duration("10y").is_err());
        assert!(parse_duration("1.2.3h").is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(86400)), "1d");
        assert_eq!(format_duration(Duration::from_secs(7200)), "2h");
        assert_eq!(format_duration(Duration::from_secs(90)), "90s");
        assert_eq!(format_duration(Duration::from_secs(1209600)), "2w");
        assert_eq!(format_duration(Duration::from_millis(1)), "1ms");
    }

    #[test]
    fn test_config_serializes_back_to_yaml() {
        let config = parse("provider: static\nprojects: [a]\ncache:\n  ttl: 12h\n").unwrap();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("ttl: 12h"));
        let reparsed = parse(&yaml).unwrap();
        assert_eq!(reparsed, config);
    }
}
