//! # Cache Command Implementation
//!
//! This module implements the `cache` subcommand, which inspects and manages
//! the on-disk catalog cache.
//!
//! ## Subcommands
//!
//! - **`path`**: Print where the cache file lives for this configuration
//! - **`status`**: Show the cache age, TTL and repository count
//! - **`flush`**: Delete the cache file
//! - **`refresh`**: Fetch the catalog from the provider and rewrite the cache

use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;

use repo_fleet::catalog::InitOutcome;
use repo_fleet::config::format_duration;
use repo_fleet::error::Error;

use super::Context;

/// Inspect and manage the catalog cache
#[derive(Args, Debug)]
pub struct CacheArgs {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: CacheSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum CacheSubcommand {
    /// Print the cache file location
    Path,
    /// Show cache age, TTL and size
    Status(StatusArgs),
    /// Delete the cache file
    Flush,
    /// Fetch the catalog from the provider and rewrite the cache
    Refresh,
}

/// Arguments for the cache status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Cache state as reported by `cache status`.
#[derive(Debug, Serialize, PartialEq)]
struct CacheStatus {
    path: String,
    exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    age: Option<String>,
    ttl: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fresh: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    repositories: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Execute the `cache` command.
pub fn execute(context: &Context, args: CacheArgs) -> Result<()> {
    match args.command {
        CacheSubcommand::Path => execute_path(context),
        CacheSubcommand::Status(status_args) => execute_status(context, status_args),
        CacheSubcommand::Flush => execute_flush(context),
        CacheSubcommand::Refresh => execute_refresh(context),
    }
}

fn execute_path(context: &Context) -> Result<()> {
    let service = context.service()?;
    println!("{}", service.cache().path().display());
    Ok(())
}

fn execute_status(context: &Context, args: StatusArgs) -> Result<()> {
    let service = context.service()?;
    let status = status_at(
        service.cache().path().display().to_string(),
        service.cache_record(),
        service.ttl(),
        Utc::now(),
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        print!("{}", render_status(&status, context));
    }
    Ok(())
}

fn execute_flush(context: &Context) -> Result<()> {
    let service = context.service()?;
    let path = service.cache().path().display().to_string();
    if service.flush()? {
        println!("Removed catalog cache: {}", path);
    } else {
        println!("No catalog cache at: {}", path);
    }
    Ok(())
}

fn execute_refresh(context: &Context) -> Result<()> {
    let service = context.service()?;
    let outcome = context.initialize(&service, true)?;
    let count = service.len()?;
    match outcome {
        InitOutcome::Provider => println!(
            "Fetched {} repositories into {}",
            count,
            service.cache().path().display()
        ),
        other => println!("Catalog loaded ({:?}): {} repositories", other, count),
    }
    Ok(())
}

fn status_at(
    path: String,
    record: repo_fleet::error::Result<repo_fleet::cache::CacheRecord>,
    ttl: Duration,
    now: DateTime<Utc>,
) -> CacheStatus {
    let mut status = CacheStatus {
        path,
        exists: false,
        updated_at: None,
        age: None,
        ttl: format_duration(ttl),
        fresh: None,
        repositories: None,
        error: None,
    };

    match record {
        Ok(record) => {
            let age = record.age_at(now);
            status.exists = true;
            status.updated_at = Some(record.updated_at);
            status.age = Some(format_age(age));
            status.fresh = Some(age <= ttl);
            status.repositories = Some(record.repositories.len());
        }
        Err(Error::CacheMissing { .. }) => {}
        Err(e) => {
            status.exists = true;
            status.error = Some(e.to_string());
        }
    }
    status
}

/// Whole seconds, in the largest unit that divides them.
fn format_age(age: Duration) -> String {
    format_duration(Duration::from_secs(age.as_secs().max(1)))
}

fn render_status(status: &CacheStatus, context: &Context) -> String {
    let mut out = format!("Cache file: {}\n", status.path);
    if !status.exists {
        out.push_str("Status:     not populated\n");
        out.push_str(&format!("TTL:        {}\n", status.ttl));
        return out;
    }
    if let Some(error) = &status.error {
        out.push_str(&format!("Status:     {}\n", context.output.warning(error)));
        return out;
    }

    let state = match status.fresh {
        Some(true) => "fresh",
        _ => "expired",
    };
    out.push_str(&format!("Status:     {}\n", state));
    if let Some(updated_at) = status.updated_at {
        out.push_str(&format!(
            "Updated:    {} ({} ago)\n",
            updated_at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            status.age.as_deref().unwrap_or_default()
        ));
    }
    out.push_str(&format!("TTL:        {}\n", status.ttl));
    out.push_str(&format!(
        "Repos:      {}\n",
        status.repositories.unwrap_or_default()
    ));
    out
}
