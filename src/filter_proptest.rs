//! Property-based tests for filter evaluation.
//!
//! These tests use proptest to generate random catalogs and token lists and
//! verify that the selection rule `Forced ∪ (Included ∖ Excluded)` holds.

#[cfg(test)]
mod proptest_tests {
    use std::collections::{BTreeMap, HashSet};

    use crate::filter::Filter;
    use crate::labels::LabelIndex;
    use crate::repository::{Catalog, Repository};
    use proptest::prelude::*;

    const LABELS: [&str; 4] = ["frontend", "backend", "deprecated", "poc"];

    /// A catalog of up to 12 repositories, each carrying a subset of LABELS.
    fn catalog_strategy() -> impl Strategy<Value = Catalog> {
        prop::collection::btree_map(
            "[a-z]{1,6}",
            prop::collection::vec(prop::sample::select(LABELS.to_vec()), 0..3),
            0..12,
        )
        .prop_map(|entries| {
            entries
                .into_iter()
                .map(|(name, labels)| {
                    let repo = Repository::new("platform", &name).with_labels(labels);
                    (name, repo)
                })
                .collect()
        })
    }

    /// A token built from an optional marker prefix and a name.
    fn token_strategy() -> impl Strategy<Value = String> {
        let prefix = prop::sample::select(vec!["", "~", "!", "+", "!~", "+~", "+!", "~+!"]);
        let name = prop_oneof![
            prop::sample::select(LABELS.to_vec()).prop_map(str::to_string),
            Just("all".to_string()),
            "[a-z]{1,6}",
        ];
        (prefix, name).prop_map(|(prefix, name)| format!("{}{}", prefix, name))
    }

    fn labels_for(catalog: &Catalog) -> LabelIndex {
        LabelIndex::build(catalog, &BTreeMap::new(), "all")
    }

    // ============================================================================
    // selection rule
    // ============================================================================

    proptest! {
        /// Property: every forced repository is selected, whatever else the filter says
        #[test]
        fn forced_repositories_are_always_selected(
            catalog in catalog_strategy(),
            tokens in prop::collection::vec(token_strategy(), 0..8),
        ) {
            let labels = labels_for(&catalog);
            let filter = Filter::default();
            let partition = filter.partition(&tokens, &labels);
            let selected: HashSet<String> = filter.evaluate(&tokens, &labels).into_iter().collect();

            for repo in &partition.forced {
                prop_assert!(selected.contains(repo), "forced {} missing", repo);
            }
        }

        /// Property: anything selected is forced, or included and not excluded
        #[test]
        fn selection_matches_set_formula(
            catalog in catalog_strategy(),
            tokens in prop::collection::vec(token_strategy(), 0..8),
        ) {
            let labels = labels_for(&catalog);
            let filter = Filter::default();
            let partition = filter.partition(&tokens, &labels);

            for repo in filter.evaluate(&tokens, &labels) {
                let forced = partition.forced.contains(&repo);
                let kept = partition.included.contains(&repo) && !partition.excluded.contains(&repo);
                prop_assert!(forced || kept, "{} selected without reason", repo);
            }
        }

        /// Property: without markers the selection is the union of the resolved names,
        /// independent of token order
        #[test]
        fn plain_tokens_are_order_independent(
            catalog in catalog_strategy(),
            names in prop::collection::vec("~?[a-z]{1,6}", 0..8),
        ) {
            let labels = labels_for(&catalog);
            let filter = Filter::default();

            let forward = filter.evaluate(&names, &labels);
            let mut reversed_tokens = names.clone();
            reversed_tokens.reverse();
            let reversed = filter.evaluate(&reversed_tokens, &labels);
            prop_assert_eq!(&forward, &reversed);

            let mut doubled = names.clone();
            doubled.extend(names.iter().cloned());
            prop_assert_eq!(filter.evaluate(&doubled, &labels), forward);
        }

        /// Property: sorted output is sorted and free of duplicates
        #[test]
        fn sorted_output_is_strictly_increasing(
            catalog in catalog_strategy(),
            tokens in prop::collection::vec(token_strategy(), 0..8),
        ) {
            let labels = labels_for(&catalog);
            let result = Filter::default().evaluate(&tokens, &labels);
            for pair in result.windows(2) {
                prop_assert!(pair[0] < pair[1]);
            }
        }
    }
}
