//! Property-based tests for path classification and replace reconciliation.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::path::is_local_path;
    use crate::replace::{deduplicate, Replace};
    use crate::version::compare_versions;
    use proptest::prelude::*;
    use std::cmp::Ordering;

    // ============================================================================
    // is_local_path property tests
    // ============================================================================

    proptest! {
        /// Property: anything under ./ or ../ is local
        #[test]
        fn relative_prefix_is_always_local(rest in ".*") {
            let dot = format!("./{}", rest);
            let dotdot = format!("../{}", rest);
            prop_assert!(is_local_path(&dot));
            prop_assert!(is_local_path(&dotdot));
        }

        /// Property: rooted paths are local
        #[test]
        fn rooted_paths_are_always_local(rest in ".*") {
            let rooted = format!("/{}", rest);
            prop_assert!(is_local_path(&rooted));
        }

        /// Property: host/path module identities are never local
        #[test]
        fn module_paths_are_never_local(
            host in "[a-z][a-z0-9-]{0,10}\\.[a-z]{2,5}",
            segments in prop::collection::vec("[a-zA-Z0-9_-][a-zA-Z0-9._-]{0,10}", 0..4)
        ) {
            let mut path = host;
            for segment in segments {
                path.push('/');
                path.push_str(&segment);
            }
            prop_assert!(!is_local_path(&path), "{} classified as local", path);
        }
    }

    // ============================================================================
    // deduplicate property tests
    // ============================================================================

    fn replace_strategy() -> impl Strategy<Value = Replace> {
        (
            prop::sample::select(vec!["example.com/a", "example.com/b", "example.com/c"]),
            prop::option::of(prop::sample::select(vec!["v1.0.0", "v2.0.0"])),
            (0u64..4, 0u64..4, 0u64..4),
            prop::sample::select(vec!["dep1", "dep2", "dep3"]),
        )
            .prop_map(|(old, old_version, (major, minor, patch), source)| Replace {
                old: old.to_string(),
                old_version: old_version.map(str::to_string),
                new: format!("{}-fork", old),
                new_version: Some(format!("v{}.{}.{}", major, minor, patch)),
                source: Some(source.to_string()),
            })
    }

    proptest! {
        /// Property: deduplicating twice gives the same result as once
        #[test]
        fn deduplicate_is_idempotent(replaces in prop::collection::vec(replace_strategy(), 0..20)) {
            let once = deduplicate(replaces);
            let twice = deduplicate(once.clone());
            prop_assert_eq!(once, twice);
        }

        /// Property: the winner of each key has the lowest version among its candidates
        #[test]
        fn deduplicate_keeps_lowest_version(replaces in prop::collection::vec(replace_strategy(), 1..20)) {
            let result = deduplicate(replaces.clone());
            for winner in &result {
                for candidate in replaces.iter().filter(|r| r.key() == winner.key()) {
                    let ordering = compare_versions(
                        winner.new_version.as_deref().unwrap_or_default(),
                        candidate.new_version.as_deref().unwrap_or_default(),
                    );
                    prop_assert_ne!(ordering, Ordering::Greater);
                }
            }
        }

        /// Property: one output entry per distinct key
        #[test]
        fn deduplicate_has_one_entry_per_key(replaces in prop::collection::vec(replace_strategy(), 0..20)) {
            let mut keys: Vec<_> = replaces.iter().map(|r| r.key()).collect();
            keys.sort();
            keys.dedup();
            let distinct = keys.len();
            let result = deduplicate(replaces);
            prop_assert_eq!(result.len(), distinct);
        }
    }
}
