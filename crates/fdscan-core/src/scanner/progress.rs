/// Scan state and counters — lightweight, lock-free bookkeeping shared
/// between the scanner thread, its workers and the handle.
use serde::Serialize;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

/// Where a scan is in its lifecycle.
///
/// Transitions only move forward. `Sealed` is terminal and reached exactly
/// once, whether the scan succeeded or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[repr(u8)]
pub enum ScanState {
    Created = 0,
    /// Listing the process root.
    Enumerating = 1,
    /// Choosing between the sequential and the pooled path.
    Partitioning = 2,
    SequentialScan = 3,
    ParallelScan = 4,
    /// Workers joined; collapsing the shared index.
    Merging = 5,
    Sealed = 6,
}

impl ScanState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Created,
            1 => Self::Enumerating,
            2 => Self::Partitioning,
            3 => Self::SequentialScan,
            4 => Self::ParallelScan,
            5 => Self::Merging,
            _ => Self::Sealed,
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Enumerating => "enumerating",
            Self::Partitioning => "partitioning",
            Self::SequentialScan => "scanning (sequential)",
            Self::ParallelScan => "scanning (parallel)",
            Self::Merging => "merging",
            Self::Sealed => "sealed",
        }
    }
}

/// Final counters for a finished scan.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// Processes whose descriptor table was read.
    pub processes_scanned: u64,
    /// Processes skipped because their descriptor table was unreadable.
    pub processes_skipped: u64,
    /// Descriptors resolved to an absolute path.
    pub descriptors_resolved: u64,
    /// Descriptors that vanished or were not paths.
    pub descriptors_unresolved: u64,
    /// Resolved paths kept by the filter.
    pub paths_matched: u64,
    /// Resolved paths dropped by the filter.
    pub paths_rejected: u64,
    /// Workers used; 1 for a sequential scan.
    pub workers: u64,
}

/// Live counters updated by workers with relaxed atomics.
#[derive(Debug, Default)]
pub struct ScanTracker {
    state: AtomicU8,
    processes_scanned: AtomicU64,
    processes_skipped: AtomicU64,
    descriptors_resolved: AtomicU64,
    descriptors_unresolved: AtomicU64,
    paths_matched: AtomicU64,
    paths_rejected: AtomicU64,
    workers: AtomicU64,
}

impl ScanTracker {
    pub fn state(&self) -> ScanState {
        ScanState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Advance to `state`. Backward moves are ignored.
    pub fn advance(&self, state: ScanState) {
        self.state.fetch_max(state as u8, Ordering::AcqRel);
    }

    pub(crate) fn set_workers(&self, n: usize) {
        self.workers.store(n as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_process(&self, resolved: u64, unresolved: u64) {
        self.processes_scanned.fetch_add(1, Ordering::Relaxed);
        self.descriptors_resolved.fetch_add(resolved, Ordering::Relaxed);
        self.descriptors_unresolved
            .fetch_add(unresolved, Ordering::Relaxed);
    }

    pub(crate) fn record_skipped_process(&self) {
        self.processes_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_filtered(&self, matched: u64, rejected: u64) {
        self.paths_matched.fetch_add(matched, Ordering::Relaxed);
        self.paths_rejected.fetch_add(rejected, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ScanStats {
        ScanStats {
            processes_scanned: self.processes_scanned.load(Ordering::Relaxed),
            processes_skipped: self.processes_skipped.load(Ordering::Relaxed),
            descriptors_resolved: self.descriptors_resolved.load(Ordering::Relaxed),
            descriptors_unresolved: self.descriptors_unresolved.load(Ordering::Relaxed),
            paths_matched: self.paths_matched.load(Ordering::Relaxed),
            paths_rejected: self.paths_rejected.load(Ordering::Relaxed),
            workers: self.workers.load(Ordering::Relaxed),
        }
    }
}
