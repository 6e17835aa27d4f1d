use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::errors::SearchError;

static NEXT_WORKER_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque label for one search worker.
///
/// Identities are unique for the lifetime of the process and carry no
/// meaning beyond telling workers apart in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkerId(u64);

impl WorkerId {
    /// Allocates a fresh identity
    pub fn next() -> Self {
        Self(NEXT_WORKER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A file whose name matched a wanted name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameMatch {
    /// The worker that found the file
    pub worker: WorkerId,
    /// The name the worker was looking for
    pub wanted: OsString,
    /// Absolute path of the matching file
    pub path: PathBuf,
}

impl NameMatch {
    /// The output line for this match, `"<worker>: <wanted>: <path>\n"`.
    ///
    /// The name and path keep the bytes the OS handed out, so the printed
    /// path names the matched file even when it is not valid UTF-8.
    /// `Display` is lossy and meant for diagnostics only.
    pub fn to_line(&self) -> Vec<u8> {
        let worker = self.worker.to_string();
        let wanted = self.wanted.as_encoded_bytes();
        let path = self.path.as_os_str().as_encoded_bytes();

        let mut line = Vec::with_capacity(worker.len() + wanted.len() + path.len() + 5);
        line.extend_from_slice(worker.as_bytes());
        line.extend_from_slice(b": ");
        line.extend_from_slice(wanted);
        line.extend_from_slice(b": ");
        line.extend_from_slice(path);
        line.push(b'\n');
        line
    }
}

impl fmt::Display for NameMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}: {}",
            self.worker,
            self.wanted.to_string_lossy(),
            self.path.display()
        )
    }
}

/// What one worker did before it finished
#[derive(Debug)]
pub struct WorkerOutcome {
    pub worker: WorkerId,
    pub wanted: OsString,
    /// Matches emitted, including those before an error stopped the worker
    pub matches: usize,
    /// The error that ended the worker early, if any
    pub error: Option<SearchError>,
}

/// Totals for a completed search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSummary {
    /// Number of workers that were started
    pub workers_launched: usize,
    /// Number of names for which no worker could be started
    pub launch_failures: usize,
    /// Number of workers that stopped early on an error or panic
    pub failed_workers: usize,
    /// Total number of matches emitted by all workers
    pub total_matches: usize,
}

impl SearchSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome of one joined worker
    pub fn add_outcome(&mut self, outcome: &WorkerOutcome) {
        self.total_matches += outcome.matches;
        if outcome.error.is_some() {
            self.failed_workers += 1;
        }
    }

    /// Records a worker that panicked; its matches are already written
    /// but can no longer be counted
    pub fn add_panicked_worker(&mut self) {
        self.failed_workers += 1;
    }
}
