/// Records stored in the open-file index.
///
/// Sets are ordered so that records compare and print deterministically
/// regardless of which worker inserted what first.
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// A process identifier as read from the process root.
///
/// May refer to a process that has already exited by the time it is used.
pub type Pid = u32;

/// One open file and every process holding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    /// Resolved absolute path of the file.
    pub path: PathBuf,
    /// Processes with at least one descriptor on this path.
    pub pids: BTreeSet<Pid>,
}

impl FileRecord {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            pids: BTreeSet::new(),
        }
    }
}

/// One process and every file it holds open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessRecord {
    pub pid: Pid,
    /// Resolved absolute paths of the open files.
    pub files: BTreeSet<PathBuf>,
}

impl ProcessRecord {
    pub fn new(pid: Pid) -> Self {
        Self {
            pid,
            files: BTreeSet::new(),
        }
    }
}
