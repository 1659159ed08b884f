//! # Error Suggestions
//!
//! Helper functions that turn failures into `anyhow` errors telling users
//! what went wrong AND how to fix it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use repo_fleet::suggestions;
//!
//! // Instead of:
//! anyhow::bail!("Configuration file not found: {}", path.display());
//!
//! // Use:
//! return Err(suggestions::config_not_found(path));
//! ```

use std::path::Path;

use crate::error::Error;

/// Generate an error for when the configuration file is not found.
pub fn config_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Configuration file not found: {path}\n\n\
         hint: Create a .repo-fleet.yaml file listing 'provider' and 'projects'\n\
         hint: Use -c/--config to specify a different path\n\
         hint: Set REPO_FLEET_CONFIG environment variable",
        path = path.display()
    )
}

/// Generate an error for a configuration file that fails to load.
pub fn config_invalid(path: &Path, error: Error) -> anyhow::Error {
    anyhow::anyhow!(
        "Failed to load config from {path}: {error}",
        path = path.display()
    )
}

/// Generate an error for a provider name missing from the registry.
///
/// Suggests the closest registered name when one is near.
pub fn unregistered_provider(name: &str, available: &[&str]) -> anyhow::Error {
    let did_you_mean = find_similar(name, available)
        .map(|s| format!("\nhint: Did you mean '{s}'?"))
        .unwrap_or_default();

    anyhow::anyhow!(
        "Unknown provider: {name}{did_you_mean}\n\n\
         Registered providers are: {providers}\n\
         hint: Set 'provider:' in .repo-fleet.yaml to one of them",
        providers = available.join(", ")
    )
}

/// Find a similar string from a list of candidates using edit distance.
///
/// Returns Some(candidate) if a close match is found (edit distance <= 2).
pub fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = edit_distance(input, candidate);
            if distance <= 2 && distance < input.len() {
                Some((candidate, distance))
            } else {
                None
            }
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Levenshtein edit distance between two strings.
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();
    for (i, a_char) in a_chars.iter().enumerate() {
        let mut current = vec![i + 1; b_chars.len() + 1];
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        previous = current;
    }
    previous[b_chars.len()]
}
