//! # Labels Command Implementation
//!
//! Prints the label index: every label (or the ones named on the command
//! line) with the repositories it holds, either as `name (count): a, b` lines
//! or as a tree.

use std::borrow::Cow;
use std::io::Write;

use anyhow::Result;
use clap::Args;
use ptree::{print_tree, Style, TreeItem};

use repo_fleet::labels::{render_labels, LabelIndex};

use super::Context;

/// Show labels and the repositories they hold
#[derive(Args, Debug)]
pub struct LabelsArgs {
    /// Labels to show, with or without the label marker. Shows all when empty.
    #[arg(value_name = "NAME")]
    pub names: Vec<String>,

    /// Display labels as a tree of repositories.
    #[arg(long)]
    pub tree: bool,
}

/// Execute the `labels` command.
pub fn execute(context: &Context, args: LabelsArgs) -> Result<()> {
    let service = context.loaded_service()?;
    let index = service.labels()?;
    let filter = service.filter();
    let names: Vec<String> = args
        .names
        .iter()
        .map(|name| {
            name.strip_prefix(filter.markers.label.as_str())
                .unwrap_or(name)
                .to_string()
        })
        .collect();

    if args.tree {
        let root = build_tree(&index, &names, filter.sort);
        print_tree(&root).map_err(|e| anyhow::anyhow!("Failed to display tree: {}", e))?;
    } else {
        print!(
            "{}",
            render_labels(&index, &names, filter.sort, context.output.use_color)
        );
    }

    Ok(())
}

/// Root node "labels", one child per label, one grandchild per repository.
fn build_tree(index: &LabelIndex, names: &[String], sort: bool) -> TreeNode {
    let children = index
        .names()
        .into_iter()
        .filter(|name| names.is_empty() || names.iter().any(|n| n == name))
        .filter_map(|name| index.label(name))
        .map(|label| TreeNode {
            text: format!("{} ({})", label.name, label.repos.len()),
            children: label
                .members(sort)
                .into_iter()
                .map(|repo| TreeNode {
                    text: repo.to_string(),
                    children: Vec::new(),
                })
                .collect(),
        })
        .collect();

    TreeNode {
        text: "labels".to_string(),
        children,
    }
}

/// Tree node structure for ptree visualization
#[derive(Clone)]
struct TreeNode {
    text: String,
    children: Vec<TreeNode>,
}

impl TreeItem for TreeNode {
    type Child = TreeNode;

    fn write_self<W: Write>(&self, f: &mut W, _style: &Style) -> std::io::Result<()> {
        write!(f, "{}", self.text)
    }

    fn children(&self) -> Cow<'_, [Self::Child]> {
        Cow::Borrowed(&self.children)
    }
}
