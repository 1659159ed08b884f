//! # Label Index
//!
//! Labels group repositories under a name so filters can select many of them
//! at once. The index is always derived from the catalog, in three passes:
//!
//! 1. **Intrinsic labels**: every repository is added to each label it
//!    declares in its own metadata.
//! 2. **Aliases**: configured `label -> [repo, ...]` lists are unioned into
//!    the label of the same name, creating it when needed. Aliases only ever
//!    add repositories.
//! 3. **Superset**: the superset label (`all` by default) is set to every
//!    repository in the catalog.
//!
//! The index is rebuilt from scratch whenever the catalog is replaced.

use std::collections::{BTreeMap, HashMap, HashSet};

use console::style;

use crate::repository::Catalog;

/// A deduplicated set of repository names.
pub type RepoSet = HashSet<String>;

/// A label name together with its repositories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Label {
    pub name: String,
    pub repos: RepoSet,
}

impl Label {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            repos: RepoSet::new(),
        }
    }

    /// Repository names, sorted when `sort` is set.
    pub fn members(&self, sort: bool) -> Vec<&str> {
        let mut members: Vec<&str> = self.repos.iter().map(String::as_str).collect();
        if sort {
            members.sort_unstable();
        }
        members
    }
}

/// Label name to repository set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelIndex {
    labels: HashMap<String, RepoSet>,
}

impl LabelIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the full index for `catalog`.
    pub fn build(catalog: &Catalog, aliases: &BTreeMap<String, Vec<String>>, superset: &str) -> Self {
        let mut index = Self::new();
        index.add_intrinsic(catalog);
        index.merge_aliases(aliases);
        index.set_superset(superset, catalog);
        index
    }

    /// Add each repository to the labels it declares.
    pub fn add_intrinsic(&mut self, catalog: &Catalog) {
        for (qualified, repo) in catalog {
            for label in &repo.labels {
                self.insert(label, qualified);
            }
        }
    }

    /// Union configured alias lists into the index.
    pub fn merge_aliases(&mut self, aliases: &BTreeMap<String, Vec<String>>) {
        for (label, repos) in aliases {
            let set = self.labels.entry(label.clone()).or_default();
            set.extend(repos.iter().cloned());
        }
    }

    /// Define `name` as every repository in `catalog`.
    pub fn set_superset(&mut self, name: &str, catalog: &Catalog) {
        self.labels
            .insert(name.to_string(), catalog.keys().cloned().collect());
    }

    pub fn insert(&mut self, label: &str, repo: &str) {
        self.labels
            .entry(label.to_string())
            .or_default()
            .insert(repo.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&RepoSet> {
        self.labels.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.labels.contains_key(name)
    }

    /// The label called `name`, if it exists.
    pub fn label(&self, name: &str) -> Option<Label> {
        self.labels.get(name).map(|repos| Label {
            name: name.to_string(),
            repos: repos.clone(),
        })
    }

    /// Label names in alphabetical order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.labels.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RepoSet)> {
        self.labels.iter()
    }
}

/// Render labels one per line as `name (count): repo, repo`.
///
/// Labels are listed by name. When `names` is non-empty only those labels are
/// shown; unknown names are skipped. Members are sorted when `sort` is set.
pub fn render_labels(index: &LabelIndex, names: &[String], sort: bool, use_color: bool) -> String {
    let selected: Vec<&str> = if names.is_empty() {
        index.names()
    } else {
        let mut wanted: Vec<&str> = names
            .iter()
            .map(String::as_str)
            .filter(|name| index.contains(name))
            .collect();
        wanted.sort_unstable();
        wanted.dedup();
        wanted
    };

    let mut out = String::new();
    for name in selected {
        let Some(label) = index.label(name) else {
            continue;
        };
        let title = if use_color {
            style(name).bold().force_styling(true).to_string()
        } else {
            name.to_string()
        };
        out.push_str(&format!(
            "{} ({}): {}\n",
            title,
            label.repos.len(),
            label.members(sort).join(", ")
        ));
    }
    out
}
