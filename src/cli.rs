//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use repo_fleet::defaults::DEFAULT_CONFIG_FILENAME;
use repo_fleet::output::OutputConfig;

use crate::commands::{self, Context};

/// Repo Fleet - Select repositories for batch operations by name and label
#[derive(Parser, Debug)]
#[command(name = "repo-fleet")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Path to the .repo-fleet.yaml configuration file.
    #[arg(
        short,
        long,
        global = true,
        value_name = "FILE",
        env = "REPO_FLEET_CONFIG",
        default_value = DEFAULT_CONFIG_FILENAME
    )]
    config: PathBuf,

    /// Root directory for the catalog cache.
    ///
    /// Defaults to the system cache directory (`~/.cache/repo-fleet` on Linux,
    /// `~/Library/Caches/repo-fleet` on macOS).
    #[arg(long, global = true, value_name = "DIR", env = "REPO_FLEET_CACHE")]
    cache_dir: Option<PathBuf>,

    /// Ignore the cached catalog and fetch it from the provider again
    #[arg(long, global = true)]
    refresh: bool,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the repositories selected by a filter
    #[command(visible_alias = "ls")]
    List(commands::list::ListArgs),

    /// Show labels and the repositories they hold
    Labels(commands::labels::LabelsArgs),

    /// Show how a filter is read, then what it selects
    Explain(commands::explain::ExplainArgs),

    /// Inspect and manage the catalog cache
    Cache(commands::cache::CacheArgs),

    /// Print completion candidates for a partial filter token
    #[command(hide = true)]
    Complete(commands::complete::CompleteArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        // A logger may already be installed when the CLI runs inside tests
        let _ = env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(self.log_level.as_str()),
        )
        .format_timestamp(None)
        .try_init();

        let output = OutputConfig::from_env_and_flag(&self.color);
        console::set_colors_enabled(output.use_color);
        console::set_colors_enabled_stderr(output.use_color);

        let context = Context::new(self.config, self.cache_dir, self.refresh, output)?;

        match self.command {
            Commands::List(args) => commands::list::execute(&context, args),
            Commands::Labels(args) => commands::labels::execute(&context, args),
            Commands::Explain(args) => commands::explain::execute(&context, args),
            Commands::Cache(args) => commands::cache::execute(&context, args),
            Commands::Complete(args) => commands::complete::execute(&context, args),
        }
    }
}
