//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `repo-fleet` command-line tool, one file per command.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function taking the shared [`Context`] and the parsed
//!   `Args`.
//!
//! The `Context` carries the global flags. It loads the configuration and
//! builds the `CatalogService` every command works against.

pub mod cache;
pub mod complete;
pub mod explain;
pub mod labels;
pub mod list;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;

use repo_fleet::catalog::{CatalogService, InitOutcome};
use repo_fleet::config::{self, Config};
use repo_fleet::error::Error;
use repo_fleet::output::OutputConfig;
use repo_fleet::provider::ProviderRegistry;
use repo_fleet::suggestions;

/// Global options shared by every command.
#[derive(Debug)]
pub struct Context {
    pub config_path: PathBuf,
    pub cache_dir: Option<PathBuf>,
    pub refresh: bool,
    pub output: OutputConfig,
}

impl Context {
    /// Relative `cache_dir` values resolve against the current directory.
    pub fn new(
        config_path: PathBuf,
        cache_dir: Option<PathBuf>,
        refresh: bool,
        output: OutputConfig,
    ) -> Result<Self> {
        let cache_dir = match cache_dir {
            Some(dir) if dir.is_relative() => Some(std::env::current_dir()?.join(dir)),
            other => other,
        };
        Ok(Self {
            config_path,
            cache_dir,
            refresh,
            output,
        })
    }

    /// Load the configuration, applying the `--cache-dir` override.
    pub fn load_config(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Err(suggestions::config_not_found(&self.config_path));
        }

        let mut config = config::from_file(&self.config_path)
            .map_err(|e| suggestions::config_invalid(&self.config_path, e))?;
        if let Some(dir) = &self.cache_dir {
            config.cache.dir = Some(dir.clone());
        }
        Ok(config)
    }

    /// Build the catalog service without loading anything.
    pub fn service(&self) -> Result<CatalogService> {
        let config = self.load_config()?;
        let registry = ProviderRegistry::with_builtin();
        match CatalogService::new(&config, registry) {
            Ok(service) => Ok(service),
            Err(Error::UnregisteredProvider { name, available }) => {
                let available: Vec<&str> = available.split(", ").collect();
                Err(suggestions::unregistered_provider(&name, &available))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Build the catalog service and populate it.
    ///
    /// Initialization failures are reported as warnings; the command carries
    /// on with whatever catalog the service holds.
    pub fn loaded_service(&self) -> Result<CatalogService> {
        let service = self.service()?;
        match self.initialize(&service, self.refresh) {
            Ok(outcome) => debug!("Catalog initialized: {:?}", outcome),
            Err(e) => eprintln!("{}", self.output.warning(&e)),
        }
        Ok(service)
    }

    /// Run `initialize` behind a spinner on stderr.
    pub fn initialize(&self, service: &CatalogService, flush: bool) -> repo_fleet::error::Result<InitOutcome> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .expect("Invalid template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        spinner.set_message("Loading repository catalog");
        spinner.enable_steady_tick(Duration::from_millis(100));

        let result = service.initialize(flush);
        spinner.finish_and_clear();
        result
    }
}
