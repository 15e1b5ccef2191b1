/// Descriptor link resolution for a single process.
///
/// Every entry of `<root>/<pid>/fd` is a symlink whose target is the open
/// file. Processes exit asynchronously to the scan, so any individual read
/// may fail; failures skip the descriptor (or the whole process when the
/// directory itself is gone) and are never reported upward.
use crate::model::Pid;
use crate::platform::procfs::list_dir_names;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Resolved descriptor targets of one process.
#[derive(Debug, Default)]
pub struct FdLinks {
    /// Absolute targets, one per resolvable descriptor. A file opened
    /// twice appears twice.
    pub targets: Vec<PathBuf>,
    /// Descriptors whose link could not be read or was not a path
    /// (sockets, pipes, anonymous inodes).
    pub unresolved: u64,
}

/// Path of a process's descriptor directory under `root`.
pub fn fd_dir(root: &Path, pid: Pid) -> PathBuf {
    root.join(pid.to_string()).join("fd")
}

/// Resolve every descriptor link in `fd_dir`.
///
/// Returns `None` if the directory cannot be listed — the process exited or
/// its table is not readable by us.
pub fn read_fd_links(fd_dir: &Path) -> Option<FdLinks> {
    let names = match list_dir_names(fd_dir) {
        Ok(names) => names,
        Err(e) => {
            trace!("Skipping {}: {e}", fd_dir.display());
            return None;
        }
    };

    let mut links = FdLinks {
        targets: Vec::with_capacity(names.len()),
        unresolved: 0,
    };

    for name in names {
        match fs::read_link(fd_dir.join(&name)) {
            // Kernel-rendered targets are already canonical. Anything that
            // is not absolute (`socket:[123]`, `pipe:[45]`) is not a file.
            Ok(target) if target.is_absolute() => links.targets.push(target),
            Ok(_) => links.unresolved += 1,
            Err(e) => {
                trace!("Skipping fd {:?} in {}: {e}", name, fd_dir.display());
                links.unresolved += 1;
            }
        }
    }

    Some(links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::symlink;
    use tempfile::TempDir;

    #[test]
    fn test_fd_dir_layout() {
        assert_eq!(fd_dir(Path::new("/proc"), 42), PathBuf::from("/proc/42/fd"));
    }

    #[test]
    fn test_read_fd_links_resolves_and_skips() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("7").join("fd");
        fs::create_dir_all(&dir).unwrap();

        // Targets need not exist: only the link text is read.
        symlink("/tmp/a.log", dir.join("0")).unwrap();
        symlink("/var/lib/b.db", dir.join("1")).unwrap();
        symlink("socket:[1234]", dir.join("2")).unwrap();
        // A plain file is not a link and must be skipped, not fatal.
        fs::write(dir.join("3"), b"x").unwrap();

        let links = read_fd_links(&dir).unwrap();
        let mut targets = links.targets.clone();
        targets.sort();
        assert_eq!(
            targets,
            vec![PathBuf::from("/tmp/a.log"), PathBuf::from("/var/lib/b.db")]
        );
        assert_eq!(links.unresolved, 2);
    }

    #[test]
    fn test_read_fd_links_missing_process() {
        let tmp = TempDir::new().unwrap();
        assert!(read_fd_links(&fd_dir(tmp.path(), 999)).is_none());
    }
}
