//! Property-based tests for prefix and identifier handling.
//!
//! These tests use proptest to generate random directory layouts and verify
//! that the conversions hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::defaults::REPO_MARKER;
    use crate::path::{Prefix, TargetId, Workspace};
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn segment() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9_][a-zA-Z0-9_.-]{0,11}".prop_filter("dot segments are not directories", |s| {
            s != "." && s != ".."
        })
    }

    fn prefix() -> impl Strategy<Value = Prefix> {
        prop::collection::vec(segment(), 0..5)
            .prop_map(|segments| Prefix::parse(&format!("//{}", segments.join("/"))).unwrap())
    }

    fn name() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9_][a-zA-Z0-9_.+-]{0,15}"
    }

    proptest! {
        /// Property: prefix_to_path and path_to_prefix are inverse
        #[test]
        fn prefix_path_round_trip(p in prefix()) {
            let temp = TempDir::new().unwrap();
            std::fs::create_dir(temp.path().join(REPO_MARKER)).unwrap();
            let workspace = Workspace::discover_from(temp.path()).unwrap();

            let path = workspace.prefix_to_path(&p);
            prop_assert!(path.starts_with(workspace.root()));
            prop_assert_eq!(workspace.path_to_prefix(&path).unwrap(), p);
        }

        /// Property: a prefix survives display and re-parse
        #[test]
        fn prefix_display_round_trip(p in prefix()) {
            prop_assert_eq!(Prefix::parse(&p.to_string()).unwrap(), p);
        }

        /// Property: canonicalizing a canonical identifier changes nothing
        #[test]
        fn canonicalize_is_idempotent(p in prefix(), n in name(), within in prefix()) {
            let id = TargetId::new(p, &n).unwrap();
            let again = TargetId::canonicalize(&id.to_string(), &within).unwrap();
            prop_assert_eq!(&again, &id);
            let twice = TargetId::canonicalize(&again.to_string(), &within).unwrap();
            prop_assert_eq!(twice, id);
        }

        /// Property: a bare name always lands in the referencing directory
        #[test]
        fn bare_names_resolve_locally(n in name(), within in prefix()) {
            let id = TargetId::canonicalize(&n, &within).unwrap();
            prop_assert_eq!(id.prefix(), &within);
            prop_assert_eq!(id.name(), n.as_str());
        }

        /// Property: identifier ordering follows the prefix first
        #[test]
        fn ordering_is_prefix_major(a in prefix(), b in prefix(), n in name(), m in name()) {
            let x = TargetId::new(a.clone(), &n).unwrap();
            let y = TargetId::new(b.clone(), &m).unwrap();
            if a != b {
                prop_assert_eq!(x.cmp(&y), a.cmp(&b));
            }
        }
    }
}
