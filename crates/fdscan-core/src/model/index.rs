/// Bidirectional open-file index: path → holders and pid → files.
///
/// The two maps are updated together on every insertion, so for any path
/// `p` and pid `q`, `q` is a holder of `p` exactly when `p` is one of `q`'s
/// files. There is no removal: an index only grows until it is sealed.
use super::record::{FileRecord, Pid, ProcessRecord};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenFileIndex {
    files: HashMap<PathBuf, FileRecord>,
    pids: HashMap<Pid, ProcessRecord>,
}

impl OpenFileIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `pid` holds `path` open.
    ///
    /// Creates either record on first sight and adds the cross-reference to
    /// both. Returns `true` if the pair was not already present.
    pub fn insert(&mut self, path: PathBuf, pid: Pid) -> bool {
        let process = self
            .pids
            .entry(pid)
            .or_insert_with(|| ProcessRecord::new(pid));
        let added = process.files.insert(path.clone());

        let file = self
            .files
            .entry(path)
            .or_insert_with_key(|p| FileRecord::new(p.clone()));
        file.pids.insert(pid);

        added
    }

    /// Map of path → file record.
    pub fn file_map(&self) -> &HashMap<PathBuf, FileRecord> {
        &self.files
    }

    /// Map of pid → process record.
    pub fn pid_map(&self) -> &HashMap<Pid, ProcessRecord> {
        &self.pids
    }

    pub fn file(&self, path: &Path) -> Option<&FileRecord> {
        self.files.get(path)
    }

    pub fn process(&self, pid: Pid) -> Option<&ProcessRecord> {
        self.pids.get(&pid)
    }

    pub fn contains(&self, path: &Path, pid: Pid) -> bool {
        self.files
            .get(path)
            .is_some_and(|record| record.pids.contains(&pid))
    }

    /// Number of distinct open files.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Number of processes holding at least one indexed file.
    pub fn process_count(&self) -> usize {
        self.pids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Flatten into path → holder PIDs (ascending).
    pub fn into_path_pids(self) -> HashMap<PathBuf, Vec<Pid>> {
        self.files
            .into_iter()
            .map(|(path, record)| (path, record.pids.into_iter().collect()))
            .collect()
    }

    /// Check the bidirectional invariant in both directions.
    pub fn is_consistent(&self) -> bool {
        let forward = self.files.iter().all(|(path, record)| {
            record.path == *path
                && !record.pids.is_empty()
                && record.pids.iter().all(|pid| {
                    self.pids
                        .get(pid)
                        .is_some_and(|process| process.files.contains(path))
                })
        });
        let backward = self.pids.iter().all(|(pid, process)| {
            process.pid == *pid
                && !process.files.is_empty()
                && process
                    .files
                    .iter()
                    .all(|path| self.contains(path, *pid))
        });
        forward && backward
    }
}

/// Destination for resolved (path, pid) pairs during a scan.
///
/// The sequential path has a single writer and inserts without locking.
/// The parallel path shares one mutex across all workers and takes it for
/// exactly one insertion at a time.
pub enum IndexSink<'a> {
    Exclusive(&'a mut OpenFileIndex),
    Shared(&'a Mutex<OpenFileIndex>),
}

impl IndexSink<'_> {
    #[inline]
    pub fn insert(&mut self, path: PathBuf, pid: Pid) -> bool {
        match self {
            Self::Exclusive(index) => index.insert(path, pid),
            Self::Shared(index) => index.lock().insert(path, pid),
        }
    }
}
