//! # Repo Fleet Library
//!
//! This library provides the repository selection engine behind the
//! `repo-fleet` command-line tool: it keeps a cached catalog of the
//! repositories hosted by a source-control provider, groups them under
//! labels, and evaluates filter expressions to decide which repositories a
//! batch operation should touch.
//!
//! ## Quick Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use repo_fleet::filter::Filter;
//! use repo_fleet::labels::LabelIndex;
//! use repo_fleet::repository::{Catalog, Repository};
//!
//! let mut catalog = Catalog::new();
//! for (name, label) in [("web-app", "frontend"), ("api-server", "backend"), ("worker", "backend")] {
//!     catalog.insert(name.to_string(), Repository::new("platform", name).with_labels([label]));
//! }
//! let labels = LabelIndex::build(&catalog, &BTreeMap::new(), "all");
//!
//! let tokens = vec!["~all".to_string(), "!~backend".to_string(), "+worker".to_string()];
//! assert_eq!(Filter::default().evaluate(&tokens, &labels), vec!["web-app", "worker"]);
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`)**: The `.repo-fleet.yaml` schema: provider,
//!   projects, cache settings, filter markers and label aliases.
//! - **Providers (`provider`)**: The capability trait a source-control
//!   backend implements, and the explicit registry the service builds
//!   providers from.
//! - **Cache (`cache`)**: The JSON snapshot of the catalog with its TTL.
//! - **Labels (`labels`)**: Intrinsic labels, aliases and the superset label.
//! - **Filters (`filter`)**: Token markers and the selection rule
//!   `Forced ∪ (Included ∖ Excluded)`.
//! - **Catalog service (`catalog`)**: Owns the catalog and label index behind
//!   a lock, and fills them from the cache or the provider.
//!
//! ## Data Flow
//!
//! 1.  **Initialization**: `CatalogService::initialize` loads the cache or,
//!     on a miss, fetches every project through its provider.
//! 2.  **Labelling**: The label index is rebuilt from the fresh catalog.
//! 3.  **Selection**: Filter tokens are evaluated against the label index,
//!     producing the repository names a batch operation runs over.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod defaults;
pub mod error;
pub mod filter;
pub mod labels;
pub mod output;
pub mod provider;
pub mod repository;
pub mod suggestions;

#[cfg(test)]
mod filter_proptest;
