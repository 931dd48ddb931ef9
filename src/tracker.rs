//! Resource Tracker
//!
//! Bookkeeping for everything a run must reclaim however it ends: every stream the façade hands out is registered
//! here before the unit sees it, and finalization force-closes whatever is still open. The directory helpers
//! account for and clean up what the unit wrote.
//!
//! ## Notes
//!
//! - Closing is idempotent: a handle the unit already closed is skipped, never reported as an error.
//! - Directory walks tolerate entries disappearing mid-walk; they are skipped, not fatal.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use walkdir::WalkDir;

/// A handle the tracker can force-close.
pub trait TrackedHandle: Send + Sync {
    /// File name the handle was opened on (for diagnostics).
    fn name(&self) -> &str;

    /// Close the handle. Closing an already-closed handle must succeed.
    fn close(&self) -> io::Result<()>;

    fn is_closed(&self) -> bool;
}

/// Outcome of [`ResourceTracker::close_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CloseSummary {
    /// Handles that were still open and got closed here
    pub closed: usize,
    /// Handles the unit had already closed
    pub already_closed: usize,
    /// Handles whose final flush failed (they are closed regardless)
    pub failed: usize,
}

/// Registry of open handles for one run.
#[derive(Default)]
pub struct ResourceTracker {
    handles: Mutex<Vec<Arc<dyn TrackedHandle>>>,
}

impl ResourceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a handle for forced closure at finalization.
    pub fn register(&self, handle: Arc<dyn TrackedHandle>) {
        tracing::trace!(name = handle.name(), "tracking stream");
        self.handles.lock().push(handle);
    }

    pub fn len(&self) -> usize {
        self.handles.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.lock().is_empty()
    }

    /// Number of registered handles that are still open.
    pub fn open_count(&self) -> usize {
        self.handles.lock().iter().filter(|h| !h.is_closed()).count()
    }

    /// Close every registered handle. Never fails; flush errors are logged and counted.
    pub fn close_all(&self) -> CloseSummary {
        let handles = self.handles.lock().clone();
        let mut summary = CloseSummary::default();

        for handle in handles {
            if handle.is_closed() {
                summary.already_closed += 1;
                continue;
            }
            match handle.close() {
                Ok(()) => summary.closed += 1,
                Err(err) => {
                    tracing::warn!(name = handle.name(), error = %err, "stream did not flush cleanly on close");
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}

/// Total size in bytes of every non-directory entry beneath `path`, recursively.
///
/// A missing `path` counts as empty.
pub fn size_of_directory(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| skip_vanished(entry, "size"))
        .filter(|entry| !entry.file_type().is_dir())
        .filter_map(|entry| entry.metadata().ok())
        .map(|meta| meta.len())
        .sum()
}

/// Delete every zero-length file beneath `path`, recursively. Returns how many files were removed.
///
/// Directories and non-empty files are left alone.
pub fn prune_zero_byte_files(path: &Path) -> usize {
    let empty: Vec<_> = WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| skip_vanished(entry, "prune"))
        .filter(|entry| !entry.file_type().is_dir())
        .filter(|entry| entry.metadata().is_ok_and(|meta| meta.len() == 0))
        .map(|entry| entry.into_path())
        .collect();

    let mut removed = 0;
    for file in empty {
        match fs::remove_file(&file) {
            Ok(()) => removed += 1,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %file.display(), "file vanished before pruning");
            }
            Err(err) => {
                tracing::warn!(path = %file.display(), error = %err, "could not prune empty file");
            }
        }
    }
    removed
}

fn skip_vanished(entry: walkdir::Result<walkdir::DirEntry>, walk: &'static str) -> Option<walkdir::DirEntry> {
    match entry {
        Ok(entry) => Some(entry),
        Err(err) => {
            tracing::debug!(walk, error = %err, "no such file or directory, it may have been removed");
            None
        }
    }
}
