//! # List Command Implementation
//!
//! This module implements the `list` subcommand (alias `ls`), which prints
//! the repositories a filter selects, one per line.
//!
//! ## Functionality
//!
//! - **Selection**: Evaluates the filter tokens against the catalog
//! - **Detailed Output**: `--long` adds project, default branch and description
//! - **Machine Output**: `--json` prints an array of entries
//! - **Counting**: `--count` prints only the number of selected repositories
//!
//! Names that are not in the catalog are still listed; the filter does not
//! check plain names against it.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use repo_fleet::catalog::CatalogState;

use super::Context;

/// List the repositories selected by a filter
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Filter tokens: names, `~label`, `!skip`, `+force`.
    #[arg(value_name = "FILTER")]
    pub filter: Vec<String>,

    /// Use long listing format showing project, branch and description.
    #[arg(short, long, conflicts_with = "json")]
    pub long: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Show only the number of selected repositories.
    #[arg(long, conflicts_with_all = ["long", "json"])]
    pub count: bool,
}

/// One selected repository as printed by `--json`.
#[derive(Debug, Serialize, PartialEq)]
struct ListEntry<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    project: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_branch: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    labels: Option<&'a [String]>,
}

/// Execute the `list` command.
pub fn execute(context: &Context, args: ListArgs) -> Result<()> {
    let service = context.loaded_service()?;
    let selected = service.select(&args.filter)?;

    if args.count {
        println!("{}", selected.len());
        return Ok(());
    }

    let state = service.snapshot()?;
    let rendered = if args.json {
        render_json(&selected, &state)?
    } else if args.long {
        render_long(&selected, &state, context)
    } else {
        render_plain(&selected)
    };
    print!("{}", rendered);

    Ok(())
}

fn render_plain(selected: &[String]) -> String {
    selected.iter().map(|name| format!("{}\n", name)).collect()
}

fn render_json(selected: &[String], state: &CatalogState) -> Result<String> {
    let entries: Vec<ListEntry> = selected
        .iter()
        .map(|name| {
            let repo = state.repositories.get(name);
            ListEntry {
                name,
                project: repo.map(|r| r.project.as_str()),
                default_branch: repo.map(|r| r.default_branch.as_str()),
                description: repo.map(|r| r.description.as_str()),
                labels: repo.map(|r| r.labels.as_slice()),
            }
        })
        .collect();
    Ok(format!("{}\n", serde_json::to_string_pretty(&entries)?))
}

/// Columns: name, project, default branch, description.
fn render_long(selected: &[String], state: &CatalogState, context: &Context) -> String {
    let rows: Vec<[&str; 4]> = selected
        .iter()
        .map(|name| match state.repositories.get(name) {
            Some(repo) => [
                name.as_str(),
                repo.project.as_str(),
                or_dash(&repo.default_branch),
                repo.description.as_str(),
            ],
            None => [name.as_str(), "-", "-", "(not in catalog)"],
        })
        .collect();

    let name_width = rows.iter().map(|r| r[0].chars().count()).max().unwrap_or(0);
    let project_width = rows.iter().map(|r| r[1].chars().count()).max().unwrap_or(0);
    let branch_width = rows.iter().map(|r| r[2].chars().count()).max().unwrap_or(0);

    let mut out = String::new();
    for [name, project, branch, description] in rows {
        let line = format!(
            "{:<name_width$}  {:<project_width$}  {:<branch_width$}  {}",
            name,
            project,
            branch,
            context.output.dim(description),
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
