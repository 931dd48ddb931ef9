//! Define the logical role of a unit's write stream and the directory each role lands in.

/// Directory (beneath the output root) that receives final output.
pub const OUTPUT_DIR: &str = "output";

/// Directory (beneath the output root) that receives work-in-progress files.
pub const WORK_DIR: &str = "workFiles";

/// Tag a unit passes to request a work-in-progress stream.
pub const WIP_TAG: &str = "wip";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamRole {
    /// Intermediate file, written under [`WORK_DIR`].
    WorkInProgress,
    /// Deliverable, written under [`OUTPUT_DIR`].
    FinalOutput,
}

impl StreamRole {
    /// Resolve a role tag. Only `"wip"` selects the working directory; every other tag means final output.
    pub fn from_tag(tag: &str) -> Self {
        if tag == WIP_TAG {
            StreamRole::WorkInProgress
        } else {
            StreamRole::FinalOutput
        }
    }

    pub fn dir_name(self) -> &'static str {
        match self {
            StreamRole::WorkInProgress => WORK_DIR,
            StreamRole::FinalOutput => OUTPUT_DIR,
        }
    }
}
