//! fdscan — list which processes hold which files open.
//!
//! Thin binary entry point. All logic lives in the `fdscan-core` crate.
//! Prints every open file on the system, then the files held by the parent
//! process and by this process.

use anyhow::Context;
use fdscan_core::{lsof, lsof_pid, ScanHandle};

fn print_files(title: &str, handle: &ScanHandle) {
    println!(" ----- FILE LIST ({title})");
    let mut files: Vec<_> = handle.files().collect();
    files.sort_unstable_by(|a, b| a.path.cmp(&b.path));
    for file in files {
        println!("{}: {:?}", file.path.display(), file.pids);
    }
    println!(" -----");
}

fn main() -> anyhow::Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("fdscan starting");

    let all = lsof("").context("failed to start scan of /proc")?;
    if let Some(err) = all.error() {
        anyhow::bail!("scan of /proc failed: {err}");
    }
    print_files("all", &all);
    all.close()?;

    let parent = std::os::unix::process::parent_id();
    let handle = lsof_pid(parent, "").context("failed to start scan of parent process")?;
    print_files(&format!("pid {parent}"), &handle);
    handle.close()?;

    let own = std::process::id();
    let handle = lsof_pid(own, "").context("failed to start scan of own process")?;
    print_files(&format!("pid {own}"), &handle);
    handle.close()?;

    Ok(())
}
