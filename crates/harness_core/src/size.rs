//! Define the instance size classes and the time budget each one grants.
//!
//! A size class picks a nominal budget; the harness keeps [`CLEANUP_RESERVE_MS`] of it for finalization, so a unit
//! only ever sees `nominal - reserve` of working time.
//!
//! ## Examples
//! ```rust
//! use harness_core::size::{self, SizeClass};
//!
//! assert_eq!(size::from_str("M"), Some(SizeClass::Medium));
//! assert_eq!(SizeClass::Medium.effective_budget_ms(), 145_000);
//! ```

use std::fmt;
use std::str::FromStr;

/// Milliseconds held back from every nominal budget for cleanup work.
pub const CLEANUP_RESERVE_MS: u64 = 5_000;

/// Instance size a unit is run under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SizeClass {
    #[default]
    Small,
    Medium,
    Large,
}

/// Metadata for one size class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeInfo {
    pub id: SizeClass,
    /// Spelling accepted on the command line and shown in reports.
    pub canonical: &'static str,
    pub nominal_budget_ms: u64,
}

/// Registry of every size class, smallest first.
pub const SIZES: &[SizeInfo] = &[
    SizeInfo {
        id: SizeClass::Small,
        canonical: "s",
        nominal_budget_ms: 30_000,
    },
    SizeInfo {
        id: SizeClass::Medium,
        canonical: "m",
        nominal_budget_ms: 150_000,
    },
    SizeInfo {
        id: SizeClass::Large,
        canonical: "l",
        nominal_budget_ms: 300_000,
    },
];

/// Resolve a size spelling, ignoring ASCII case.
pub fn from_str(value: &str) -> Option<SizeClass> {
    SIZES
        .iter()
        .find(|info| info.canonical.eq_ignore_ascii_case(value.trim()))
        .map(|info| info.id)
}

/// Metadata for a size class.
pub fn info(id: SizeClass) -> &'static SizeInfo {
    match id {
        SizeClass::Small => &SIZES[0],
        SizeClass::Medium => &SIZES[1],
        SizeClass::Large => &SIZES[2],
    }
}

impl SizeClass {
    pub fn as_str(self) -> &'static str {
        info(self).canonical
    }

    pub fn nominal_budget_ms(self) -> u64 {
        info(self).nominal_budget_ms
    }

    /// Working time left to the unit once the cleanup reserve is taken out.
    pub fn effective_budget_ms(self) -> u64 {
        self.nominal_budget_ms().saturating_sub(CLEANUP_RESERVE_MS)
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A size spelling that is not in [`SIZES`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSizeError {
    pub value: String,
}

impl fmt::Display for ParseSizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let valid: Vec<&str> = SIZES.iter().map(|info| info.canonical).collect();
        write!(
            f,
            "'{}' is not a valid size, must be one of [{}]",
            self.value,
            valid.join(", ")
        )
    }
}

impl std::error::Error for ParseSizeError {}

impl FromStr for SizeClass {
    type Err = ParseSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        from_str(s).ok_or_else(|| ParseSizeError {
            value: s.to_lowercase(),
        })
    }
}
