use std::collections::HashSet;

use harness_core::artifacts::{self, ARTIFACTS};
use harness_core::size::{self, CLEANUP_RESERVE_MS, SIZES};
use harness_core::{StreamRole, roles};

#[test]
fn size_spellings_unique_and_resolvable() {
    let mut seen = HashSet::new();
    for info in SIZES {
        assert_eq!(
            size::from_str(info.canonical),
            Some(info.id),
            "size spelling not resolvable: {}",
            info.canonical
        );
        assert_eq!(size::info(info.id), info, "size registry out of order for {:?}", info.id);
        assert!(seen.insert(info.canonical), "duplicate size spelling {:?}", info.canonical);
    }
}

#[test]
fn size_budgets_exceed_cleanup_reserve_and_grow() {
    let mut previous = 0;
    for info in SIZES {
        assert!(
            info.nominal_budget_ms > CLEANUP_RESERVE_MS,
            "{:?} leaves no working time",
            info.id
        );
        assert!(info.nominal_budget_ms > previous, "sizes must be listed smallest first");
        previous = info.nominal_budget_ms;
    }
}

#[test]
fn artifact_names_unique_lowercase_and_reserved() {
    let mut seen = HashSet::new();
    for artifact in ARTIFACTS {
        assert_eq!(artifacts::info(artifact.id), artifact);
        assert_eq!(
            artifact.file_name,
            artifact.file_name.to_lowercase(),
            "artifact names are stored lowercase"
        );
        assert!(artifacts::is_reserved_name(artifact.file_name));
        assert!(seen.insert(artifact.file_name), "duplicate artifact {}", artifact.file_name);
    }
}

#[test]
fn role_directories_are_distinct() {
    assert_ne!(
        StreamRole::WorkInProgress.dir_name(),
        StreamRole::FinalOutput.dir_name()
    );
    assert_eq!(StreamRole::from_tag(roles::WIP_TAG), StreamRole::WorkInProgress);
}
