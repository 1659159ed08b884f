//! # Catalog Cache
//!
//! The catalog cache is a timestamped JSON snapshot of the repositories a
//! provider returned, kept on disk so most invocations skip the network.
//!
//! ```json
//! {
//!   "updated_at": "2026-10-17T09:30:00Z",
//!   "repositories": {
//!     "web-app": { "name": "web-app", "project": "platform", ... }
//!   }
//! }
//! ```
//!
//! A record older than the TTL counts as expired. A forced refresh does not
//! load the record at all; the catalog service goes straight to the provider.
//!
//! ## Location
//!
//! `cache.file` wins when set. Otherwise the file lives at
//! `<cache.dir>/<host>/<projects>/<cache.filename>`, with `<host>` taken
//! from `git_host` and `<projects>` the configured projects joined by `+`.

use std::fs;
use std::io::{self, BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::defaults;
use crate::error::{Error, Result};
use crate::repository::Catalog;

/// The persisted form of a catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub updated_at: DateTime<Utc>,
    pub repositories: Catalog,
}

impl CacheRecord {
    /// A record of `repositories` stamped with the current time.
    pub fn now(repositories: Catalog) -> Self {
        Self {
            updated_at: Utc::now(),
            repositories,
        }
    }

    /// Time elapsed since `updated_at`; zero for timestamps in the future.
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.updated_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}

/// Reads and writes the catalog snapshot at a fixed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogCache {
    path: PathBuf,
}

impl CatalogCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Cache at the location derived from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(cache_path(config))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the record if it is younger than `ttl`.
    pub fn load(&self, ttl: Duration) -> Result<CacheRecord> {
        self.load_at(ttl, Utc::now())
    }

    /// Load the record, judging its age against `now`.
    pub fn load_at(&self, ttl: Duration, now: DateTime<Utc>) -> Result<CacheRecord> {
        let record = self.read()?;
        let age = record.age_at(now);
        if age > ttl {
            return Err(Error::CacheExpired {
                path: self.path.clone(),
                age,
            });
        }
        debug!(
            "Loaded {} repositories from cache {} ({}s old)",
            record.repositories.len(),
            self.path.display(),
            age.as_secs()
        );
        Ok(record)
    }

    /// Read the record regardless of its age.
    pub fn read(&self) -> Result<CacheRecord> {
        let file = fs::File::open(&self.path).map_err(|_| Error::CacheMissing {
            path: self.path.clone(),
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| Error::CacheCorrupt {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// Persist `repositories` stamped with the current UTC time.
    pub fn save(&self, repositories: &Catalog) -> Result<()> {
        let record = CacheRecord {
            updated_at: Utc::now(),
            repositories: repositories.clone(),
        };
        self.save_record(&record)
    }

    /// Persist `record` as is, creating parent directories as needed.
    ///
    /// The record is written to a sibling temporary file first and renamed
    /// into place, so readers never observe a partial file.
    pub fn save_record(&self, record: &CacheRecord) -> Result<()> {
        let write_error = |source: io::Error| Error::CacheWrite {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_error)?;
        }

        let json = serde_json::to_vec_pretty(record)
            .map_err(|e| write_error(io::Error::new(ErrorKind::InvalidData, e)))?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(write_error)?;
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            write_error(e)
        })?;

        debug!(
            "Saved {} repositories to cache {}",
            record.repositories.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Delete the cache file. Returns whether a file was removed.
    pub fn flush(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::Io(e)),
        }
    }
}

/// Resolve the cache file location for `config`.
pub fn cache_path(config: &Config) -> PathBuf {
    if let Some(file) = &config.cache.file {
        return config.resolve_path(file);
    }

    let root = config
        .cache
        .dir
        .as_ref()
        .map(|dir| config.resolve_path(dir))
        .unwrap_or_else(defaults::default_cache_root);

    root.join(host_component(config.git_host.as_deref()))
        .join(sanitize_component(&config.projects.join("+")))
        .join(&config.cache.filename)
}

fn host_component(git_host: Option<&str>) -> String {
    let Some(raw) = git_host.map(str::trim).filter(|h| !h.is_empty()) else {
        return "local".to_string();
    };

    match url::Url::parse(raw) {
        Ok(parsed) if parsed.host_str().is_some() => {
            let host = parsed.host_str().unwrap_or_default();
            match parsed.port() {
                Some(port) => sanitize_component(&format!("{}-{}", host, port)),
                None => sanitize_component(host),
            }
        }
        _ => sanitize_component(raw.trim_end_matches('/')),
    }
}

/// Replace characters that are unsafe in a single path component.
fn sanitize_component(raw: &str) -> String {
    let sanitized: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '+') {
                c
            } else {
                '-'
            }
        })
        .collect();

    match sanitized.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => sanitized,
    }
}
