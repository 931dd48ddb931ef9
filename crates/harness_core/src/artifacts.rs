//! Define the artifacts the harness itself writes into the output directory.
//!
//! Artifact file names are reserved: a unit asking for a write stream with one of these names (in any case) is
//! refused, so it cannot clobber the harness's own bookkeeping.
//!
//! ## Examples
//! ```rust
//! use harness_core::artifacts::{self, ArtifactKind};
//!
//! assert_eq!(artifacts::file_name(ArtifactKind::Mail), "unitmail.json");
//! assert!(artifacts::is_reserved_name("UnitLog.JSON"));
//! assert!(!artifacts::is_reserved_name("report.json"));
//! ```

use std::path::{Component, Path};

/// Category of accumulated façade output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Log,
    Mail,
    Params,
}

/// Metadata for one artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactInfo {
    pub id: ArtifactKind,
    pub file_name: &'static str,
    pub description: &'static str,
}

/// Registry of every harness-owned artifact, in flush order.
pub const ARTIFACTS: &[ArtifactInfo] = &[
    ArtifactInfo {
        id: ArtifactKind::Log,
        file_name: "unitlog.json",
        description: "log entries recorded through the façade",
    },
    ArtifactInfo {
        id: ArtifactKind::Mail,
        file_name: "unitmail.json",
        description: "mail requests (never delivered)",
    },
    ArtifactInfo {
        id: ArtifactKind::Params,
        file_name: "unitparam.json",
        description: "output parameters declared for the next stage",
    },
];

pub fn info(id: ArtifactKind) -> &'static ArtifactInfo {
    match id {
        ArtifactKind::Log => &ARTIFACTS[0],
        ArtifactKind::Mail => &ARTIFACTS[1],
        ArtifactKind::Params => &ARTIFACTS[2],
    }
}

pub fn file_name(id: ArtifactKind) -> &'static str {
    info(id).file_name
}

/// Whether `name` collides, ignoring case, with a harness-owned artifact.
///
/// Only the final path component is compared, so `./unitlog.json` is reserved as well.
pub fn is_reserved_name(name: &str) -> bool {
    let Some(file_name) = Path::new(name).file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    ARTIFACTS
        .iter()
        .any(|artifact| artifact.file_name.eq_ignore_ascii_case(file_name))
}

/// Whether `name` is a single plain file name: no separators, no `.`/`..`, no root or prefix.
pub fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.ends_with(['/', '\\'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_names_see_through_paths() {
        assert!(is_reserved_name("./unitlog.json"));
        assert!(is_reserved_name("nested/UnitParam.json"));
        assert!(!is_reserved_name("unitlog.json.bak"));
    }

    #[test]
    fn test_plain_file_names() {
        assert!(is_plain_file_name("result.csv"));
        assert!(is_plain_file_name(".hidden"));
        assert!(!is_plain_file_name("./result.csv"));
        assert!(!is_plain_file_name("../escape.csv"));
        assert!(!is_plain_file_name("sub/result.csv"));
        assert!(!is_plain_file_name("/etc/passwd"));
        assert!(!is_plain_file_name("dir/"));
        assert!(!is_plain_file_name(".."));
        assert!(!is_plain_file_name(""));
    }

    #[test]
    fn test_reserved_names_ignore_case() {
        assert!(is_reserved_name("unitparam.json"));
        assert!(is_reserved_name("UNITPARAM.JSON"));
        assert!(is_reserved_name("UnitMail.Json"));
    }

    #[test]
    fn test_near_misses_are_not_reserved() {
        assert!(!is_reserved_name("unitlog.json.bak"));
        assert!(!is_reserved_name(" unitlog.json"));
        assert!(!is_reserved_name(""));
    }
}
