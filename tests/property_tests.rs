//! Property-based tests for the unit harness
//!
//! These tests use proptest to verify invariants across many randomly
//! generated inputs, catching edge cases that hand-written tests might miss.

use std::fs;
use std::sync::Arc;

use harness_core::SizeClass;
use proptest::prelude::*;
use serde_json::json;
use unit_harness::tracker::{prune_zero_byte_files, size_of_directory};
use unit_harness::{Controller, FileInfoMap, Payload, RunSettings, unit_fn};

// =============================================================================
// Size class properties
// =============================================================================

proptest! {
    /// Property: size parsing ignores case and surrounding whitespace
    #[test]
    fn size_parse_is_case_insensitive(id in prop::sample::select(vec!["s", "m", "l"]), upper in any::<bool>(), pad in 0usize..3) {
        let raw = if upper { id.to_uppercase() } else { id.to_string() };
        let padded = format!("{}{raw}{}", " ".repeat(pad), " ".repeat(pad));
        let parsed: SizeClass = padded.parse().unwrap();
        prop_assert_eq!(parsed.as_str(), id);
    }

    /// Property: anything outside the three ids is rejected
    #[test]
    fn size_parse_rejects_unknown(value in "[a-z]{2,6}") {
        prop_assert!(value.parse::<SizeClass>().is_err());
    }
}

// =============================================================================
// Tracker properties
// =============================================================================

proptest! {
    /// Property: after pruning no zero-byte file remains, and the byte total is unchanged
    #[test]
    fn prune_removes_exactly_the_empty_files(sizes in prop::collection::vec(0usize..4, 0..12)) {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir_all(&nested).unwrap();

        for (index, size) in sizes.iter().enumerate() {
            let parent = if index % 2 == 0 { dir.path() } else { nested.as_path() };
            fs::write(parent.join(format!("f{index}")), vec![b'x'; *size]).unwrap();
        }

        let before = size_of_directory(dir.path());
        let removed = prune_zero_byte_files(dir.path());

        prop_assert_eq!(removed, sizes.iter().filter(|size| **size == 0).count());
        prop_assert_eq!(size_of_directory(dir.path()), before);
        prop_assert_eq!(before, sizes.iter().sum::<usize>() as u64);
        for entry in walkdir::WalkDir::new(dir.path()).into_iter().flatten() {
            if entry.file_type().is_file() {
                prop_assert!(entry.metadata().unwrap().len() > 0);
            }
        }
    }
}

// =============================================================================
// Id sequence properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Property: the id sequence is 1..=n for n draws, within one run
    #[test]
    fn id_sequence_is_contiguous(draws in 1usize..40) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("input.txt"), "").unwrap();
        let settings = RunSettings::new(dir.path().join("input.txt")).with_output_root(dir.path());
        settings.dirs().bootstrap(false).unwrap();

        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        let report = runtime.block_on(async {
            Controller::new(&settings, FileInfoMap::default())
                .unwrap()
                .run(
                    Arc::new(unit_fn(move |services, _payload, done| async move {
                        let ids: Vec<u64> = (0..draws).map(|_| services.next_id()).collect();
                        done.succeed(json!(ids));
                    })),
                    Payload::default(),
                )
                .await
        });

        let expected: Vec<u64> = (1..=draws as u64).collect();
        prop_assert_eq!(report.outcome.unwrap(), json!(expected));
    }
}
