/// Scan configuration — an explicit value passed into every scan call.
///
/// Nothing here is process-wide: two scans may run side by side with
/// different worker counts or roots.
use crate::error::Result;
use crate::filter::PathFilter;
use std::path::{Path, PathBuf};

/// Default process-information root.
pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Default number of PIDs per work chunk.
///
/// Also the threshold below which a scan stays sequential: a process table
/// smaller than one chunk is not worth a pool.
pub const DEFAULT_CHUNK_SIZE: usize = 64;

#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Worker threads for the parallel path. Fewer than 2 means sequential.
    pub num_workers: usize,
    /// PIDs per chunk handed to one worker at a time. Always >= 1.
    pub chunk_size: usize,
    /// Directory holding one sub-directory per PID.
    pub proc_root: PathBuf,
    /// Filter applied to every resolved descriptor target.
    pub filter: PathFilter,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            num_workers: num_cpus::get(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            proc_root: PathBuf::from(DEFAULT_PROC_ROOT),
            filter: PathFilter::All,
        }
    }
}

impl ScanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers;
        self
    }

    /// Set the chunk size. Zero is clamped to one.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Set the process root. An empty path keeps the default.
    pub fn with_proc_root(mut self, root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        self.proc_root = if root.as_os_str().is_empty() {
            PathBuf::from(DEFAULT_PROC_ROOT)
        } else {
            root.to_path_buf()
        };
        self
    }

    pub fn with_filter(mut self, filter: PathFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Filter by literal path prefix. See [`PathFilter::prefix`].
    pub fn with_prefix(self, prefix: impl AsRef<Path>) -> Result<Self> {
        Ok(self.with_filter(PathFilter::prefix(prefix)?))
    }

    pub fn with_predicate<F>(self, f: F) -> Self
    where
        F: Fn(&Path) -> bool + Send + Sync + 'static,
    {
        self.with_filter(PathFilter::predicate(f))
    }

    /// `true` when a table of `pid_count` processes is scanned on the
    /// calling thread rather than through the pool.
    pub fn is_sequential_for(&self, pid_count: usize) -> bool {
        self.num_workers < 2 || pid_count < self.chunk_size
    }
}
