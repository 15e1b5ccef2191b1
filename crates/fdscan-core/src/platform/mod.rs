/// Platform-specific functionality — `/proc` enumeration and descriptor
/// link resolution.
///
/// Targets systems that expose one symlink per open descriptor under
/// `<root>/<pid>/fd/`.
pub mod fd;
pub mod procfs;

pub use fd::{fd_dir, read_fd_links, FdLinks};
pub use procfs::{list_dir_names, list_pids};
