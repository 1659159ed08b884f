//! # Filter Evaluation
//!
//! A filter is a list of tokens, each naming a repository or (with the label
//! marker) a label. Markers in front of the name decide what happens to the
//! selection:
//!
//! | Token            | Meaning                                          |
//! |------------------|--------------------------------------------------|
//! | `web-app`        | include the repository                           |
//! | `~frontend`      | include every repository labelled `frontend`     |
//! | `!mobile-app`    | exclude the repository                           |
//! | `+legacy`        | keep the repository whatever the exclusions say  |
//! | `+~deprecated`   | keep every repository of the label               |
//!
//! Every token lands in exactly one bucket. Force beats skip, skip beats
//! plain inclusion, and the selection is
//!
//! ```text
//! Forced ∪ (Included ∖ Excluded)
//! ```
//!
//! Unknown labels contribute nothing. Plain names are carried through
//! without checking them against the catalog.
//!
//! ```
//! use std::collections::BTreeMap;
//! use repo_fleet::filter::Filter;
//! use repo_fleet::labels::LabelIndex;
//! use repo_fleet::repository::{Catalog, Repository};
//!
//! let mut catalog = Catalog::new();
//! catalog.insert("web-app".into(), Repository::new("p", "web-app").with_labels(["frontend"]));
//! catalog.insert("legacy".into(), Repository::new("p", "legacy").with_labels(["frontend"]));
//! let labels = LabelIndex::build(&catalog, &BTreeMap::new(), "all");
//!
//! let filter = Filter::default();
//! let tokens = vec!["~frontend".to_string(), "!legacy".to_string()];
//! assert_eq!(filter.evaluate(&tokens, &labels), vec!["web-app"]);
//! ```

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::FilterConfig;
use crate::defaults;
use crate::error::{Error, Result};
use crate::labels::{Label, LabelIndex, RepoSet};

/// The marker strings recognised in front of a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Markers {
    pub label: String,
    pub skip: String,
    pub force: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            label: defaults::DEFAULT_LABEL_MARKER.to_string(),
            skip: defaults::DEFAULT_SKIP_MARKER.to_string(),
            force: defaults::DEFAULT_FORCE_MARKER.to_string(),
        }
    }
}

impl Markers {
    /// Markers must be non-empty, free of whitespace and pairwise distinct.
    pub fn validate(&self) -> Result<()> {
        for (kind, marker) in self.by_kind() {
            if marker.is_empty() || marker.chars().any(char::is_whitespace) {
                return Err(Error::config(format!(
                    "filter.markers.{} must be a non-empty string without whitespace",
                    kind
                )));
            }
        }
        if self.label == self.skip || self.label == self.force || self.skip == self.force {
            return Err(Error::config_with_hint(
                "filter markers must be distinct",
                "Defaults are label '~', skip '!' and force '+'",
            ));
        }
        Ok(())
    }

    fn by_kind(&self) -> [(&'static str, &str); 3] {
        [
            ("label", self.label.as_str()),
            ("skip", self.skip.as_str()),
            ("force", self.force.as_str()),
        ]
    }
}

/// Which part of the selection a token feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Forced,
    Excluded,
    Included,
}

/// One filter argument split into its bare name and markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterToken {
    pub name: String,
    pub is_label: bool,
    pub is_forced: bool,
    pub is_skipped: bool,
}

impl FilterToken {
    /// Strip the leading run of markers, in any order, from `raw`.
    pub fn parse(raw: &str, markers: &Markers) -> Self {
        let mut token = FilterToken {
            name: String::new(),
            is_label: false,
            is_forced: false,
            is_skipped: false,
        };

        // Longest marker first so a marker that prefixes another never shadows it.
        let mut ordered = markers.by_kind();
        ordered.sort_by_key(|(_, marker)| std::cmp::Reverse(marker.len()));

        let mut rest = raw.trim();
        'strip: loop {
            for (kind, marker) in ordered {
                if marker.is_empty() {
                    continue;
                }
                if let Some(stripped) = rest.strip_prefix(marker) {
                    match kind {
                        "label" => token.is_label = true,
                        "skip" => token.is_skipped = true,
                        _ => token.is_forced = true,
                    }
                    rest = stripped;
                    continue 'strip;
                }
            }
            break;
        }

        token.name = rest.to_string();
        token
    }

    pub fn bucket(&self) -> Bucket {
        match (self.is_forced, self.is_skipped) {
            (true, _) => Bucket::Forced,
            (false, true) => Bucket::Excluded,
            (false, false) => Bucket::Included,
        }
    }

    /// The name as shown in set notation: labels keep their marker.
    pub fn display_name(&self, markers: &Markers) -> String {
        if self.is_label {
            format!("{}{}", markers.label, self.name)
        } else {
            self.name.clone()
        }
    }
}

/// Resolved repository sets of a filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub forced: RepoSet,
    pub included: RepoSet,
    pub excluded: RepoSet,
}

impl Partition {
    /// `forced ∪ (included ∖ excluded)`
    pub fn selection(&self) -> RepoSet {
        let mut result: RepoSet = self.included.difference(&self.excluded).cloned().collect();
        result.extend(self.forced.iter().cloned());
        result
    }
}

/// The raw names of a filter grouped per bucket, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelGroup {
    pub forced: Label,
    pub included: Label,
    pub excluded: Label,
    pub sorted: bool,
}

impl LabelGroup {
    fn new(sorted: bool) -> Self {
        Self {
            forced: Label::new("forced"),
            included: Label::new("included"),
            excluded: Label::new("excluded"),
            sorted,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.forced.repos.is_empty() && self.included.repos.is_empty() && self.excluded.repos.is_empty()
    }

    fn render(&self, label: &Label) -> String {
        format!("({})", label.members(self.sorted).join(" ∪ "))
    }
}

impl fmt::Display for LabelGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let has_exclusions = !self.excluded.repos.is_empty();
        let include_part = if self.included.repos.is_empty() && !has_exclusions {
            None
        } else {
            let included = if self.included.repos.is_empty() {
                "∅".to_string()
            } else {
                self.render(&self.included)
            };
            Some(if has_exclusions {
                format!("{} ∖ {}", included, self.render(&self.excluded))
            } else {
                included
            })
        };
        let forced_part = (!self.forced.repos.is_empty()).then(|| self.render(&self.forced));

        match (forced_part, include_part) {
            (Some(forced), Some(include)) if has_exclusions => {
                write!(f, "{} ∪ ({})", forced, include)
            }
            (Some(forced), Some(include)) => write!(f, "{} ∪ {}", forced, include),
            (Some(forced), None) => write!(f, "{}", forced),
            (None, Some(include)) => write!(f, "{}", include),
            (None, None) => write!(f, "∅"),
        }
    }
}

/// Filter settings: markers, unwanted-label handling and output order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub markers: Markers,
    pub skip_unwanted: bool,
    pub unwanted: Vec<String>,
    pub sort: bool,
}

impl Default for Filter {
    fn default() -> Self {
        Self::from_config(&FilterConfig::default())
    }
}

impl Filter {
    pub fn from_config(config: &FilterConfig) -> Self {
        Self {
            markers: config.markers.clone(),
            skip_unwanted: config.skip_unwanted,
            unwanted: config.unwanted.clone(),
            sort: config.sort,
        }
    }

    /// The user's tokens followed by one skip-label token per unwanted label
    /// when `skip_unwanted` is on.
    pub fn expand(&self, tokens: &[String]) -> Vec<String> {
        let mut expanded = tokens.to_vec();
        if self.skip_unwanted {
            expanded.extend(
                self.unwanted
                    .iter()
                    .map(|label| format!("{}{}{}", self.markers.skip, self.markers.label, label)),
            );
        }
        expanded
    }

    /// Parse the expanded token list, dropping tokens with no name left.
    pub fn tokenize(&self, tokens: &[String]) -> Vec<FilterToken> {
        self.expand(tokens)
            .iter()
            .map(|raw| FilterToken::parse(raw, &self.markers))
            .filter(|token| {
                if token.name.is_empty() {
                    debug!("Ignoring filter token without a name");
                    false
                } else {
                    true
                }
            })
            .collect()
    }

    /// Resolve every token into its bucket's repository set.
    pub fn partition(&self, tokens: &[String], labels: &LabelIndex) -> Partition {
        let mut partition = Partition::default();
        for token in self.tokenize(tokens) {
            let bucket = match token.bucket() {
                Bucket::Forced => &mut partition.forced,
                Bucket::Excluded => &mut partition.excluded,
                Bucket::Included => &mut partition.included,
            };
            if token.is_label {
                match labels.get(&token.name) {
                    Some(repos) => bucket.extend(repos.iter().cloned()),
                    None => debug!("Unknown label '{}' selects nothing", token.name),
                }
            } else {
                bucket.insert(token.name);
            }
        }
        partition
    }

    /// Evaluate `tokens` to the selected repository names.
    ///
    /// An empty token list selects nothing. The result is sorted when `sort`
    /// is set; otherwise its order is unspecified.
    pub fn evaluate(&self, tokens: &[String], labels: &LabelIndex) -> Vec<String> {
        let mut selected: Vec<String> = self.partition(tokens, labels).selection().into_iter().collect();
        if self.sort {
            selected.sort_unstable();
        }
        selected
    }

    /// Group the raw names of `tokens` per bucket without resolving labels.
    pub fn label_group(&self, tokens: &[String]) -> LabelGroup {
        let mut group = LabelGroup::new(self.sort);
        for token in self.tokenize(tokens) {
            let name = token.display_name(&self.markers);
            let target = match token.bucket() {
                Bucket::Forced => &mut group.forced,
                Bucket::Excluded => &mut group.excluded,
                Bucket::Included => &mut group.included,
            };
            target.repos.insert(name);
        }
        group
    }
}
