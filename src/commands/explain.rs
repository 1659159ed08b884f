//! # Explain Command Implementation
//!
//! Shows how a filter is read before showing what it selects: first the
//! set notation of the tokens, then the selected repositories.
//!
//! ```text
//! $ repo-fleet explain ~all '!~deprecated' +legacy
//! (legacy) ∪ ((~all) ∖ (~deprecated))
//!
//! 3 repositories selected:
//!   api-server
//!   legacy
//!   web-app
//! ```

use anyhow::Result;
use clap::Args;

use repo_fleet::filter::LabelGroup;

use super::Context;

/// Show how a filter is read, then what it selects
#[derive(Args, Debug)]
pub struct ExplainArgs {
    /// Filter tokens: names, `~label`, `!skip`, `+force`.
    #[arg(value_name = "FILTER")]
    pub filter: Vec<String>,
}

/// Execute the `explain` command.
pub fn execute(context: &Context, args: ExplainArgs) -> Result<()> {
    let service = context.loaded_service()?;
    let group = service.label_group(&args.filter);
    let selected = service.select(&args.filter)?;
    print!("{}", render(&group, &selected, context));
    Ok(())
}

fn render(group: &LabelGroup, selected: &[String], context: &Context) -> String {
    let mut out = format!("{}\n\n", context.output.emphasis(&group.to_string()));
    let noun = if selected.len() == 1 {
        "repository"
    } else {
        "repositories"
    };
    out.push_str(&format!("{} {} selected", selected.len(), noun));
    if selected.is_empty() {
        out.push('\n');
        return out;
    }
    out.push_str(":\n");
    for name in selected {
        out.push_str(&format!("  {}\n", name));
    }
    out
}
