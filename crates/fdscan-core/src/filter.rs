/// Path filters applied to every resolved descriptor target.
///
/// A scan carries exactly one [`PathFilter`]: either no filtering, a literal
/// path prefix, or a caller-supplied predicate. Rejected paths are dropped
/// before they reach the index.
use crate::error::{Result, ScanError};
use std::fmt;
use std::os::unix::ffi::OsStrExt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Caller-supplied path predicate.
///
/// Invoked once per resolved descriptor, possibly from several worker
/// threads at once and in no particular order.
pub type PathPredicate = Arc<dyn Fn(&Path) -> bool + Send + Sync>;

#[derive(Clone, Default)]
pub enum PathFilter {
    /// Keep every path.
    #[default]
    All,
    /// Keep paths whose bytes start with this cleaned, absolute prefix.
    Prefix(PathBuf),
    /// Keep paths for which the predicate returns `true`.
    Predicate(PathPredicate),
}

impl PathFilter {
    /// Build a prefix filter.
    ///
    /// The prefix is cleaned lexically and made absolute against the current
    /// directory. An empty prefix, `.` or `/` matches everything and yields
    /// [`PathFilter::All`].
    pub fn prefix(prefix: impl AsRef<Path>) -> Result<Self> {
        let raw = prefix.as_ref();
        let cleaned = clean_path(raw);
        if cleaned == Path::new(".") || cleaned == Path::new("/") {
            return Ok(Self::All);
        }
        let absolute = absolutize(&cleaned).map_err(|source| ScanError::InvalidPrefix {
            prefix: raw.to_path_buf(),
            source,
        })?;
        if absolute == Path::new("/") {
            return Ok(Self::All);
        }
        Ok(Self::Prefix(absolute))
    }

    /// Wrap a closure as a predicate filter.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Path) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(f))
    }

    /// `true` if this filter keeps everything.
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Decide whether `path` is retained.
    #[inline]
    pub fn matches(&self, path: &Path) -> bool {
        match self {
            Self::All => true,
            Self::Prefix(prefix) => path
                .as_os_str()
                .as_bytes()
                .starts_with(prefix.as_os_str().as_bytes()),
            Self::Predicate(f) => f(path),
        }
    }
}

impl fmt::Debug for PathFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::Prefix(p) => f.debug_tuple("Prefix").field(p).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Lexically clean a path: drop `.` components, fold `..` into the
/// preceding component and collapse repeated separators.
///
/// `..` directly under the root is dropped. An empty result is `.`.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(comp),
            },
            _ => out.push(comp),
        }
    }
    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Make `path` absolute against the current directory, then clean it.
pub fn absolutize(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(clean_path(path));
    }
    let cwd = std::env::current_dir()?;
    Ok(clean_path(&cwd.join(path)))
}
