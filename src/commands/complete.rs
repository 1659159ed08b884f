//! # Complete Command Implementation
//!
//! Hidden helper for shell completion scripts: prints every filter token
//! that can complete `PREFIX`, one per line.

use anyhow::Result;
use clap::Args;

use super::Context;

/// Print completion candidates for a partial filter token
#[derive(Args, Debug)]
pub struct CompleteArgs {
    /// The partially typed token. Empty lists every candidate.
    #[arg(value_name = "PREFIX", default_value = "", allow_hyphen_values = true)]
    pub prefix: String,
}

/// Execute the `complete` command.
pub fn execute(context: &Context, args: CompleteArgs) -> Result<()> {
    let service = context.loaded_service()?;
    for candidate in service.completion_candidates(&args.prefix)? {
        println!("{}", candidate);
    }
    Ok(())
}
