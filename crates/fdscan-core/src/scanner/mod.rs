/// Scanner module — orchestrates a scan of the process root.
///
/// A scan walks through [`ScanState`]: enumerate PIDs, decide between the
/// sequential and the pooled path, scan, merge, seal. Two entry styles:
///
/// - **Synchronous** ([`scan`], [`scan_with`]): runs on the calling thread
///   (plus pool workers) and returns a path → PIDs snapshot.
/// - **Background** ([`open`], [`lsof`], [`lsof_pid`]): runs on a named
///   scanner thread and returns a [`ScanHandle`] immediately. Every accessor
///   on the handle blocks until the result is sealed, so no reader ever sees
///   a partially built index.
///
/// Only a failure to list the process root is an error. Processes and
/// descriptors that vanish mid-scan are skipped.
pub mod gate;
pub mod pool;
pub mod progress;

pub use gate::ReadyGate;
pub use progress::{ScanState, ScanStats, ScanTracker};

use crate::config::ScanConfig;
use crate::error::{Result, ScanError};
use crate::filter::absolutize;
use crate::model::{FileRecord, OpenFileIndex, Pid, ProcessRecord};
use crate::platform::list_pids;
use pool::{scan_parallel, scan_sequential, ScanContext};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Which processes a scan covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanScope {
    /// Every numeric entry of the process root.
    AllProcesses,
    /// A single process, for callers who already know the PID.
    Process(Pid),
}

/// The sealed result of a scan. Never mutated after sealing.
#[derive(Debug)]
pub struct ScanOutcome {
    pub index: OpenFileIndex,
    /// Set only when the process root could not be listed (or the scanner
    /// thread died). The index is then empty.
    pub error: Option<ScanError>,
    pub stats: ScanStats,
    pub duration: Duration,
}

/// Run one scan on the calling thread and return the merged index.
pub fn run_scan(config: &ScanConfig, scope: ScanScope, tracker: &ScanTracker) -> Result<OpenFileIndex> {
    tracker.advance(ScanState::Enumerating);
    let root = absolutize(&config.proc_root).map_err(|source| ScanError::ReadDir {
        path: config.proc_root.clone(),
        source,
    })?;

    let pids = match scope {
        ScanScope::AllProcesses => list_pids(&root)?,
        ScanScope::Process(pid) => vec![pid],
    };

    tracker.advance(ScanState::Partitioning);
    let ctx = ScanContext {
        root: &root,
        filter: &config.filter,
        tracker,
    };

    let index = if config.is_sequential_for(pids.len()) {
        debug!("Scanning {} pids sequentially", pids.len());
        tracker.advance(ScanState::SequentialScan);
        let index = scan_sequential(ctx, &pids);
        // Nothing to merge with a single writer.
        tracker.advance(ScanState::Merging);
        index
    } else {
        debug!(
            "Scanning {} pids with {} workers",
            pids.len(),
            config.num_workers
        );
        tracker.advance(ScanState::ParallelScan);
        scan_parallel(ctx, &pids, config.num_workers, config.chunk_size)
    };
    Ok(index)
}

fn log_finished(index: &OpenFileIndex, stats: &ScanStats, duration: Duration) {
    info!(
        "Scan complete: {} files held by {} processes in {:?}",
        index.file_count(),
        index.process_count(),
        duration
    );
    debug!(
        "Scanned {} processes ({} skipped), {} descriptors ({} unresolved), {} matched, {} workers",
        stats.processes_scanned,
        stats.processes_skipped,
        stats.descriptors_resolved,
        stats.descriptors_unresolved,
        stats.paths_matched,
        stats.workers
    );
}

/// Scan every process with the default configuration and keep the paths
/// for which `predicate` returns `true`.
///
/// Blocks until the whole process table has been scanned. The PID lists
/// are ascending.
pub fn scan<F>(predicate: F) -> Result<HashMap<PathBuf, Vec<Pid>>>
where
    F: Fn(&Path) -> bool + Send + Sync + 'static,
{
    scan_with(&ScanConfig::default().with_predicate(predicate))
}

/// Synchronous scan of every process with an explicit configuration.
pub fn scan_with(config: &ScanConfig) -> Result<HashMap<PathBuf, Vec<Pid>>> {
    let tracker = ScanTracker::default();
    let start = Instant::now();
    let index = run_scan(config, ScanScope::AllProcesses, &tracker)?;
    tracker.advance(ScanState::Sealed);
    log_finished(&index, &tracker.snapshot(), start.elapsed());
    Ok(index.into_path_pids())
}

/// Start a background scan of every process under `config.proc_root`.
///
/// Returns as soon as the scanner thread is running. Fails only if that
/// thread cannot be spawned; scan errors are reported by
/// [`ScanHandle::error`].
pub fn open(config: ScanConfig) -> Result<ScanHandle> {
    start_scan(config, ScanScope::AllProcesses)
}

/// Start a background scan of a single process.
pub fn open_pid(config: ScanConfig, pid: Pid) -> Result<ScanHandle> {
    start_scan(config, ScanScope::Process(pid))
}

/// Background scan of `/proc` keeping paths under `prefix`.
///
/// An empty prefix keeps everything.
pub fn lsof(prefix: impl AsRef<Path>) -> Result<ScanHandle> {
    open(ScanConfig::default().with_prefix(prefix)?)
}

/// Background scan of one process in `/proc` keeping paths under `prefix`.
///
/// A PID that does not exist yields an empty index, not an error.
pub fn lsof_pid(pid: Pid, prefix: impl AsRef<Path>) -> Result<ScanHandle> {
    open_pid(ScanConfig::default().with_prefix(prefix)?, pid)
}

/// State shared between the scanner thread and its handle.
#[derive(Default)]
struct ScanShared {
    gate: ReadyGate<ScanOutcome>,
    tracker: ScanTracker,
}

impl ScanShared {
    fn finish(&self, result: Result<OpenFileIndex>, duration: Duration) {
        let stats = self.tracker.snapshot();
        let (index, error) = match result {
            Ok(index) => {
                log_finished(&index, &stats, duration);
                (index, None)
            }
            Err(e) => {
                error!("Scan failed: {e}");
                (OpenFileIndex::new(), Some(e))
            }
        };
        self.gate.seal(ScanOutcome {
            index,
            error,
            stats,
            duration,
        });
        self.tracker.advance(ScanState::Sealed);
    }
}

/// Seals an empty, failed outcome if the scanner thread unwinds before
/// sealing, so waiting readers are released.
struct SealOnUnwind<'a>(&'a ScanShared);

impl Drop for SealOnUnwind<'_> {
    fn drop(&mut self) {
        if !self.0.gate.is_sealed() {
            self.0.finish(Err(ScanError::Panicked), Duration::ZERO);
        }
    }
}

fn start_scan(config: ScanConfig, scope: ScanScope) -> Result<ScanHandle> {
    let shared = Arc::new(ScanShared::default());
    let thread_shared = Arc::clone(&shared);

    let thread = thread::Builder::new()
        .name("fdscan-scanner".into())
        .spawn(move || {
            let _guard = SealOnUnwind(&thread_shared);
            info!(
                "Starting scan of {} ({:?}, filter {:?})",
                config.proc_root.display(),
                scope,
                config.filter
            );
            let start = Instant::now();
            let result = run_scan(&config, scope, &thread_shared.tracker);
            thread_shared.finish(result, start.elapsed());
        })
        .map_err(ScanError::Spawn)?;

    Ok(ScanHandle {
        shared,
        thread: Some(thread),
    })
}

/// Handle to a running or completed background scan.
///
/// Every data accessor waits for the scan to be sealed first. The handle is
/// `Sync`: several threads may wait on it at once.
pub struct ScanHandle {
    shared: Arc<ScanShared>,
    thread: Option<thread::JoinHandle<()>>,
}

impl ScanHandle {
    /// Current lifecycle state. Never blocks.
    ///
    /// `Sealed` exactly when the result is readable.
    pub fn state(&self) -> ScanState {
        if self.shared.gate.is_sealed() {
            return ScanState::Sealed;
        }
        self.shared.tracker.state()
    }

    /// `true` once the result is sealed. Never blocks.
    pub fn is_complete(&self) -> bool {
        self.shared.gate.is_sealed()
    }

    /// Block until the scan is sealed.
    pub fn wait(&self) -> &ScanOutcome {
        self.shared.gate.wait()
    }

    /// Block for at most `timeout`. The scan keeps running either way.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<&ScanOutcome> {
        self.shared.gate.wait_timeout(timeout)
    }

    /// The sealed index.
    pub fn index(&self) -> &OpenFileIndex {
        &self.wait().index
    }

    /// Full path → file record map.
    pub fn file_map(&self) -> &HashMap<PathBuf, FileRecord> {
        self.index().file_map()
    }

    /// Full pid → process record map.
    pub fn pid_map(&self) -> &HashMap<Pid, ProcessRecord> {
        self.index().pid_map()
    }

    /// File records one at a time. Each call starts a fresh iteration.
    pub fn files(&self) -> impl Iterator<Item = &FileRecord> + '_ {
        self.file_map().values()
    }

    /// Process records one at a time. Each call starts a fresh iteration.
    pub fn processes(&self) -> impl Iterator<Item = &ProcessRecord> + '_ {
        self.pid_map().values()
    }

    /// The fatal error, if the process root could not be listed.
    pub fn error(&self) -> Option<&ScanError> {
        self.wait().error.as_ref()
    }

    pub fn stats(&self) -> ScanStats {
        self.wait().stats
    }

    /// Release the handle: join the scanner thread and drop the index.
    pub fn close(mut self) -> Result<()> {
        match self.thread.take() {
            Some(thread) => thread.join().map_err(|_| ScanError::Panicked),
            None => Ok(()),
        }
    }
}
