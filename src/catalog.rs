//! # Catalog Service
//!
//! `CatalogService` owns the repository catalog and the label index derived
//! from it. One instance is created per process and shared by reference with
//! every consumer; there is no global state.
//!
//! ## Initialization
//!
//! `initialize(flush)` fills the catalog:
//!
//! 1.  A populated catalog is left alone unless `flush` is set.
//! 2.  Without `flush` the on-disk cache is tried with the configured TTL.
//!     A flush never reads the cache.
//! 3.  On any cache miss every configured project is listed through its
//!     provider, in parallel. A single failing project aborts the fetch and
//!     the catalog keeps its previous content. With `fetch_timeout` set, a
//!     fetch that runs past it fails for the project that overran.
//! 4.  The fetched catalog replaces the old one, labels are rebuilt and the
//!     cache file is rewritten. A failed write is reported, but the fresh
//!     catalog stays in memory.
//!
//! ## Concurrency
//!
//! State sits behind an `RwLock`. Initialization holds the write lock for its
//! whole run, so concurrent callers are serialized and later ones find the
//! catalog already loaded. Selections and lookups take the read lock and can
//! run in parallel once the catalog is stable.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::cache::{CacheRecord, CatalogCache};
use crate::config::{format_duration, Config};
use crate::error::{Error, Result};
use crate::filter::{Filter, LabelGroup};
use crate::labels::LabelIndex;
use crate::provider::{ProviderRegistry, ProviderSettings};
use crate::repository::{qualified_name, Catalog, Repository};

/// Where `initialize` got its catalog from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// The catalog was already populated; nothing was read or fetched.
    AlreadyLoaded,
    /// Loaded from the on-disk cache.
    Cache,
    /// Fetched from the provider and written to the cache.
    Provider,
}

/// The catalog together with its derived label index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogState {
    pub repositories: Catalog,
    pub labels: LabelIndex,
}

/// Owns the catalog, the label index and the machinery that fills them.
#[derive(Debug)]
pub struct CatalogService {
    provider: String,
    projects: Vec<String>,
    settings: Vec<ProviderSettings>,
    aliases: BTreeMap<String, Vec<String>>,
    superset: String,
    ttl: Duration,
    fetch_timeout: Option<Duration>,
    filter: Filter,
    cache: CatalogCache,
    registry: ProviderRegistry,
    state: RwLock<CatalogState>,
}

impl CatalogService {
    /// Create the service for `config`, using `registry` to build providers.
    ///
    /// Fails with `UnregisteredProvider` when the configured provider is
    /// unknown to the registry.
    pub fn new(config: &Config, registry: ProviderRegistry) -> Result<Self> {
        Self::with_cache(config, registry, CatalogCache::from_config(config))
    }

    /// Like `new`, with an explicit cache location.
    pub fn with_cache(config: &Config, registry: ProviderRegistry, cache: CatalogCache) -> Result<Self> {
        config.validate()?;
        registry.ensure_registered(&config.provider)?;

        let settings = config
            .projects
            .iter()
            .map(|project| ProviderSettings::from_config(config, project))
            .collect();

        Ok(Self {
            provider: config.provider.clone(),
            projects: config.projects.clone(),
            settings,
            aliases: config.aliases.clone(),
            superset: config.filter.superset.clone(),
            ttl: config.cache.ttl,
            fetch_timeout: config.fetch_timeout,
            filter: Filter::from_config(&config.filter),
            cache,
            registry,
            state: RwLock::new(CatalogState::default()),
        })
    }

    pub fn cache(&self) -> &CatalogCache {
        &self.cache
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// The project whose repositories carry bare names.
    pub fn default_project(&self) -> &str {
        self.projects.first().map(String::as_str).unwrap_or_default()
    }

    /// Populate the catalog from the cache or the provider.
    pub fn initialize(&self, flush: bool) -> Result<InitOutcome> {
        let mut state = self.write_state()?;

        if !flush && !state.repositories.is_empty() {
            return Ok(InitOutcome::AlreadyLoaded);
        }

        if flush {
            debug!("Refreshing catalog from provider '{}'", self.provider);
        } else {
            match self.cache.load(self.ttl) {
                Ok(record) => {
                    *state = self.build_state(record.repositories);
                    return Ok(InitOutcome::Cache);
                }
                Err(e) if e.is_cache_miss() => {
                    info!("{}; fetching from provider '{}'", e, self.provider);
                }
                Err(e) => return Err(e),
            }
        }

        let repositories = self.fetch()?;
        *state = self.build_state(repositories);
        info!(
            "Fetched {} repositories from {} project(s)",
            state.repositories.len(),
            self.projects.len()
        );

        self.cache.save(&state.repositories)?;
        Ok(InitOutcome::Provider)
    }

    /// Delete the cache file and empty the in-memory catalog.
    pub fn flush(&self) -> Result<bool> {
        let removed = self.cache.flush()?;
        *self.write_state()? = CatalogState::default();
        Ok(removed)
    }

    /// Replace the catalog with `repositories`, rebuilding labels.
    pub fn replace(&self, repositories: Catalog) -> Result<()> {
        *self.write_state()? = self.build_state(repositories);
        Ok(())
    }

    /// List every project through its provider and merge the results.
    ///
    /// Keys are derived from the configured project, whatever project name
    /// the provider reports on the records.
    fn fetch(&self) -> Result<Catalog> {
        let default_project = self.default_project();
        let started = Instant::now();

        let per_project: Vec<(&str, Vec<Repository>)> = self
            .settings
            .par_iter()
            .map(|settings| {
                let project = settings.project.as_str();
                let settings = ProviderSettings {
                    timeout: self.time_left(started, project)?,
                    ..settings.clone()
                };
                let provider = self
                    .registry
                    .create(&self.provider, &settings)
                    .map_err(|e| fetch_error(project, e))?;
                let mut repos = provider
                    .list_repositories()
                    .map_err(|e| fetch_error(project, e))?;
                self.time_left(started, project)?;

                for repo in &mut repos {
                    if repo.project.is_empty() {
                        repo.project = project.to_string();
                    }
                }
                debug!("Project '{}' lists {} repositories", project, repos.len());
                Ok((project, repos))
            })
            .collect::<Result<_>>()?;

        let mut catalog = Catalog::new();
        let entries = per_project
            .into_iter()
            .flat_map(|(project, repos)| repos.into_iter().map(move |repo| (project, repo)));
        for (project, repo) in entries {
            let key = qualified_name(project, &repo.name, default_project);
            if let Some(previous) = catalog.insert(key.clone(), repo) {
                warn!(
                    "Repository '{}' listed twice (project '{}'); keeping the last entry",
                    key, previous.project
                );
            }
        }
        Ok(catalog)
    }

    /// Time remaining before `fetch_timeout` runs out, or `None` without one.
    fn time_left(&self, started: Instant, project: &str) -> Result<Option<Duration>> {
        let Some(timeout) = self.fetch_timeout else {
            return Ok(None);
        };
        match timeout.checked_sub(started.elapsed()) {
            Some(left) if !left.is_zero() => Ok(Some(left)),
            _ => Err(Error::ProviderFetch {
                project: project.to_string(),
                message: format!("timed out after {}", format_duration(timeout)),
            }),
        }
    }

    fn build_state(&self, repositories: Catalog) -> CatalogState {
        let labels = LabelIndex::build(&repositories, &self.aliases, &self.superset);
        CatalogState {
            repositories,
            labels,
        }
    }

    fn read_state(&self) -> Result<RwLockReadGuard<'_, CatalogState>> {
        self.state.read().map_err(|_| Error::LockPoisoned {
            context: "catalog state".to_string(),
        })
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, CatalogState>> {
        self.state.write().map_err(|_| Error::LockPoisoned {
            context: "catalog state".to_string(),
        })
    }

    /// Evaluate filter tokens against the current catalog.
    pub fn select(&self, tokens: &[String]) -> Result<Vec<String>> {
        let state = self.read_state()?;
        Ok(self.filter.evaluate(tokens, &state.labels))
    }

    /// The set-notation view of filter tokens.
    pub fn label_group(&self, tokens: &[String]) -> LabelGroup {
        self.filter.label_group(tokens)
    }

    /// A copy of the current catalog and label index.
    pub fn snapshot(&self) -> Result<CatalogState> {
        Ok(self.read_state()?.clone())
    }

    /// A copy of the label index.
    pub fn labels(&self) -> Result<LabelIndex> {
        Ok(self.read_state()?.labels.clone())
    }

    pub fn repository(&self, name: &str) -> Result<Option<Repository>> {
        Ok(self.read_state()?.repositories.get(name).cloned())
    }

    /// Default branch of `name`, if known and non-empty.
    pub fn default_branch(&self, name: &str) -> Result<Option<String>> {
        Ok(self
            .read_state()?
            .repositories
            .get(name)
            .map(|repo| repo.default_branch.clone())
            .filter(|branch| !branch.is_empty()))
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read_state()?.repositories.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read_state()?.repositories.is_empty())
    }

    /// Completion candidates for a partially typed filter token.
    ///
    /// Candidates are every repository name and every label name with the
    /// label marker in front. Leading skip and force markers of `prefix` are
    /// kept on each candidate, so `!~fr` completes to `!~frontend`.
    pub fn completion_candidates(&self, prefix: &str) -> Result<Vec<String>> {
        let markers = &self.filter.markers;
        let mut rest = prefix;
        let mut lead = String::new();
        'strip: loop {
            for marker in [markers.skip.as_str(), markers.force.as_str()] {
                if let Some(stripped) = rest.strip_prefix(marker) {
                    lead.push_str(marker);
                    rest = stripped;
                    continue 'strip;
                }
            }
            break;
        }

        let state = self.read_state()?;
        let labels = state
            .labels
            .names()
            .into_iter()
            .map(|name| format!("{}{}", markers.label, name));
        let repos = state.repositories.keys().cloned();

        let mut candidates: Vec<String> = labels
            .chain(repos)
            .filter(|candidate| candidate.starts_with(rest))
            .map(|candidate| format!("{}{}", lead, candidate))
            .collect();
        candidates.sort_unstable();
        candidates.dedup();
        Ok(candidates)
    }

    /// Read the cache file regardless of age, for status reporting.
    pub fn cache_record(&self) -> Result<CacheRecord> {
        self.cache.read()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

fn fetch_error(project: &str, error: Error) -> Error {
    match error {
        Error::ProviderFetch { .. } => error,
        other => Error::ProviderFetch {
            project: project.to_string(),
            message: other.to_string(),
        },
    }
}
