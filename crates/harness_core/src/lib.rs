//! Provide the shared, pure vocabulary of the unit harness.
//!
//! Both the run controller and the CLI read their constants from here, so the budget a size class maps to, the
//! artifact names the harness reserves, and the directory a stream role lands in cannot drift apart.
//!
//! ## Notes
//!
//! - This is a vocabulary crate: **no IO**, no global state, and no dependencies.
//! - Registries are `const` tables with `from_str`/`as_str` lookups, mirroring how the harness reports them.

pub mod artifacts;
pub mod defaults;
pub mod roles;
pub mod size;

pub use artifacts::{ArtifactKind, is_plain_file_name, is_reserved_name};
pub use roles::StreamRole;
pub use size::{ParseSizeError, SizeClass};
