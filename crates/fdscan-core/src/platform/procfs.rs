/// Directory enumeration for the process-information root.
///
/// Entries are listed by name only. `DirEntry::file_name` never stats the
/// entry, which matters under `/proc` where a stat can race a process exit.
use crate::error::{Result, ScanError};
use crate::model::Pid;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::Path;

/// List the entry names of `dir` without following or stat-ing them.
///
/// Any failure to open the directory or to read an entry is wrapped with
/// the directory path. Callers decide whether that is fatal.
pub fn list_dir_names(dir: &Path) -> Result<Vec<OsString>> {
    let wrap = |source| ScanError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(wrap)? {
        names.push(entry.map_err(wrap)?.file_name());
    }
    Ok(names)
}

/// List the numeric entries of the process root, i.e. the live PIDs.
///
/// Non-numeric entries (`self`, `net`, `sys`, ...) are ignored.
pub fn list_pids(root: &Path) -> Result<Vec<Pid>> {
    let pids = list_dir_names(root)?
        .iter()
        .filter_map(|name| parse_pid(name))
        .collect();
    Ok(pids)
}

fn parse_pid(name: &OsStr) -> Option<Pid> {
    let s = name.to_str()?;
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_pid() {
        assert_eq!(parse_pid(&OsString::from("1")), Some(1));
        assert_eq!(parse_pid(&OsString::from("4242")), Some(4242));
        assert_eq!(parse_pid(&OsString::from("self")), None);
        assert_eq!(parse_pid(&OsString::from("+12")), None);
        assert_eq!(parse_pid(&OsString::from("")), None);
        assert_eq!(parse_pid(&OsString::from("99999999999")), None);
    }

    #[test]
    fn test_list_pids_skips_non_numeric() {
        let tmp = TempDir::new().unwrap();
        for name in ["1", "20", "self", "net", "300"] {
            fs::create_dir(tmp.path().join(name)).unwrap();
        }
        fs::write(tmp.path().join("uptime"), b"0").unwrap();

        let mut pids = list_pids(tmp.path()).unwrap();
        pids.sort_unstable();
        assert_eq!(pids, vec![1, 20, 300]);
    }

    #[test]
    fn test_list_dir_names_missing_dir() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope");
        match list_dir_names(&missing) {
            Err(ScanError::ReadDir { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected ReadDir error, got {other:?}"),
        }
    }
}
