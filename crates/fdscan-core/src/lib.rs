/// fdscan Core — which processes hold which files open.
///
/// This crate contains the whole scanning engine with zero CLI dependencies.
/// It reads the kernel's per-process descriptor tables (`/proc/<pid>/fd/*`)
/// and builds a bidirectional index of open files.
///
/// # Modules
///
/// - [`platform`] — `/proc` directory enumeration and descriptor link resolution.
/// - [`filter`] — Prefix and predicate filters applied to resolved paths.
/// - [`config`] — Explicit scan configuration (workers, chunk size, root, filter).
/// - [`model`] — File/process records and the bidirectional index.
/// - [`scanner`] — Worker pool, readiness gate and the scan entry points.
/// - [`export`] — JSON and CSV export of a sealed index.
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod model;
pub mod platform;
pub mod scanner;

pub use config::ScanConfig;
pub use error::ScanError;
pub use filter::PathFilter;
pub use model::{FileRecord, OpenFileIndex, Pid, ProcessRecord};
pub use scanner::{
    lsof, lsof_pid, open, open_pid, scan, scan_with, ScanHandle, ScanOutcome, ScanScope, ScanState,
    ScanStats,
};
