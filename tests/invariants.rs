//! Property tests for the universally-quantified invariants in spec §8.
//!
//! Generates small, syntactically valid Go source files (Go's grammar is
//! simple enough to generate reliably) and checks that extraction, matching,
//! and merging hold their invariants across many random shapes.

use std::path::Path;

use proptest::prelude::*;
use structural_merge::{diff_files, extract, merge_files, reconstruct};

/// A tiny Go function declaration with a random name and return value.
fn arb_function() -> impl Strategy<Value = String> {
    ("[a-z]{1,8}", 0i32..1000).prop_map(|(name, n)| format!("func {name}(){{\n\treturn {n}\n}}\n"))
}

/// A small Go source file: a package clause plus 0-6 distinct functions.
fn arb_go_source() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_function(), 0..6).prop_map(|fns| {
        let mut names_seen = std::collections::HashSet::new();
        let mut src = String::from("package m\n\n");
        for f in fns {
            // Keep declaration identity unique per §3 invariant 3: skip a
            // randomly generated duplicate name rather than dedup after the
            // fact, since the point is to exercise many distinct shapes.
            let name = f.split_whitespace().nth(1).unwrap();
            let name = &name[..name.find('(').unwrap()];
            if names_seen.insert(name.to_owned()) {
                src.push_str(&f);
                src.push('\n');
            }
        }
        src
    })
}

proptest! {
    #[test]
    fn byte_coverage_holds_for_generated_sources(src in arb_go_source()) {
        let list = extract(Path::new("f.go"), src.as_bytes()).expect("valid Go source should parse");
        prop_assert_eq!(list.covered_bytes(), src.as_bytes().to_vec());
    }

    #[test]
    fn contiguity_holds_for_generated_sources(src in arb_go_source()) {
        let list = extract(Path::new("f.go"), src.as_bytes()).expect("valid Go source should parse");
        if let (Some(first), Some(last)) = (list.entities.first(), list.entities.last()) {
            prop_assert_eq!(first.start_byte, 0);
            prop_assert_eq!(last.end_byte, src.len());
        }
        for w in list.entities.windows(2) {
            prop_assert_eq!(w[0].end_byte, w[1].start_byte);
        }
    }

    #[test]
    fn declaration_identity_keys_are_unique_for_generated_sources(src in arb_go_source()) {
        let list = extract(Path::new("f.go"), src.as_bytes()).expect("valid Go source should parse");
        let mut keys: Vec<String> = list
            .entities
            .iter()
            .filter(|e| e.kind == structural_merge::EntityKind::Declaration)
            .map(structural_merge::Entity::identity_key)
            .collect();
        let before = keys.len();
        keys.sort();
        keys.dedup();
        prop_assert_eq!(keys.len(), before);
    }

    #[test]
    fn round_trip_holds_for_generated_sources(src in arb_go_source()) {
        let list = extract(Path::new("f.go"), src.as_bytes()).expect("valid Go source should parse");
        let resolved: Vec<_> = list
            .entities
            .iter()
            .map(structural_merge::ResolvedEntity::from_entity)
            .collect();
        prop_assert_eq!(reconstruct(&resolved), src.as_bytes().to_vec());
    }

    #[test]
    fn diff_files_is_trivial_against_itself(src in arb_go_source()) {
        let diff = diff_files(Path::new("f.go"), src.as_bytes(), src.as_bytes())
            .expect("valid Go source should parse");
        prop_assert!(diff.changes.is_empty());
    }

    #[test]
    fn merge_is_idempotent_when_all_sides_agree(src in arb_go_source()) {
        let result = merge_files(Path::new("f.go"), src.as_bytes(), src.as_bytes(), src.as_bytes());
        prop_assert!(!result.has_conflicts);
        prop_assert_eq!(result.merged, src.as_bytes().to_vec());
    }
}
