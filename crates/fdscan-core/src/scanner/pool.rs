/// Work partitioning and the worker pool.
///
/// Small process tables are scanned on the calling thread with a lock-free
/// exclusive sink. Larger ones are cut into contiguous chunks and fed to a
/// fixed set of scoped worker threads through a bounded queue whose capacity
/// equals the worker count, so the producer blocks while every worker is
/// busy and every queue slot is taken.
///
/// # Merge discipline
///
/// Workers share one `Mutex<OpenFileIndex>` and take it per insertion, never
/// per chunk, so no worker holds it while reading `/proc`. Because the index
/// stores sets, insertion order never affects the final content: the same
/// snapshot yields the same index for any worker count.
use crate::filter::PathFilter;
use crate::model::{IndexSink, OpenFileIndex, Pid};
use crate::platform::{fd_dir, read_fd_links};
use crate::scanner::progress::{ScanState, ScanTracker};
use parking_lot::Mutex;
use std::path::Path;
use std::thread;
use tracing::{debug, trace, warn};

/// Everything a worker needs to scan one process. Shared by reference.
#[derive(Clone, Copy)]
pub struct ScanContext<'a> {
    pub root: &'a Path,
    pub filter: &'a PathFilter,
    pub tracker: &'a ScanTracker,
}

/// Scan one process's descriptor table into `sink`.
///
/// A missing or unreadable table is a skip, not an error.
pub fn scan_process(ctx: ScanContext<'_>, pid: Pid, sink: &mut IndexSink<'_>) {
    let Some(links) = read_fd_links(&fd_dir(ctx.root, pid)) else {
        trace!("pid {pid}: descriptor table unavailable");
        ctx.tracker.record_skipped_process();
        return;
    };

    ctx.tracker
        .record_process(links.targets.len() as u64, links.unresolved);

    let mut matched = 0u64;
    let mut rejected = 0u64;
    for target in links.targets {
        if ctx.filter.matches(&target) {
            sink.insert(target, pid);
            matched += 1;
        } else {
            rejected += 1;
        }
    }
    ctx.tracker.record_filtered(matched, rejected);
}

/// Scan every process of `chunk`, in order, to completion.
pub fn scan_chunk(ctx: ScanContext<'_>, chunk: &[Pid], sink: &mut IndexSink<'_>) {
    for &pid in chunk {
        scan_process(ctx, pid, sink);
    }
}

/// Scan on the calling thread. Single writer, no lock.
pub fn scan_sequential(ctx: ScanContext<'_>, pids: &[Pid]) -> OpenFileIndex {
    ctx.tracker.set_workers(1);
    let mut index = OpenFileIndex::new();
    scan_chunk(ctx, pids, &mut IndexSink::Exclusive(&mut index));
    index
}

/// Scan through a pool of `num_workers` threads, `chunk_size` PIDs per job.
///
/// Returns once every worker has drained the queue and finished its last
/// chunk. Workers that fail to spawn are logged and the pool continues with
/// the ones that did; with none at all the chunks run on the calling thread.
pub fn scan_parallel(
    ctx: ScanContext<'_>,
    pids: &[Pid],
    num_workers: usize,
    chunk_size: usize,
) -> OpenFileIndex {
    let chunk_size = chunk_size.max(1);
    let shared = Mutex::new(OpenFileIndex::new());
    let (job_tx, job_rx) = crossbeam_channel::bounded::<&[Pid]>(num_workers.max(1));

    thread::scope(|s| {
        let mut spawned = 0usize;
        for id in 0..num_workers {
            let job_rx = job_rx.clone();
            let shared = &shared;
            let spawn = thread::Builder::new()
                .name(format!("fdscan-worker-{id}"))
                .spawn_scoped(s, move || {
                    let mut sink = IndexSink::Shared(shared);
                    let mut chunks = 0usize;
                    for chunk in job_rx {
                        scan_chunk(ctx, chunk, &mut sink);
                        chunks += 1;
                    }
                    trace!("worker {id} done after {chunks} chunks");
                });
            match spawn {
                Ok(_) => spawned += 1,
                Err(e) => {
                    warn!("Failed to spawn worker {id}: {e}");
                    break;
                }
            }
        }
        // Workers hold the only receivers from here on.
        drop(job_rx);
        ctx.tracker.set_workers(spawned.max(1));

        if spawned == 0 {
            drop(job_tx);
            warn!("No scan workers available — scanning on the calling thread");
            scan_chunk(ctx, pids, &mut IndexSink::Shared(&shared));
            return;
        }

        debug!(
            "Dispatching {} pids in chunks of {chunk_size} to {spawned} workers",
            pids.len()
        );
        for chunk in pids.chunks(chunk_size) {
            // Fails only if every worker is gone; the scope re-raises its panic.
            if job_tx.send(chunk).is_err() {
                break;
            }
        }
        drop(job_tx);
        // Leaving the scope joins every worker.
    });

    ctx.tracker.advance(ScanState::Merging);
    shared.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::symlink;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Fake process root: pid `n` holds `/data/shared` and `/data/own-n`.
    fn fake_root(pids: &[Pid]) -> TempDir {
        let tmp = TempDir::new().unwrap();
        for &pid in pids {
            let dir = fd_dir(tmp.path(), pid);
            fs::create_dir_all(&dir).unwrap();
            symlink("/data/shared", dir.join("0")).unwrap();
            symlink(format!("/data/own-{pid}"), dir.join("1")).unwrap();
            symlink("pipe:[1]", dir.join("2")).unwrap();
        }
        tmp
    }

    #[test]
    fn test_scan_process_missing_pid() {
        let tmp = fake_root(&[1]);
        let tracker = ScanTracker::default();
        let filter = PathFilter::All;
        let ctx = ScanContext {
            root: tmp.path(),
            filter: &filter,
            tracker: &tracker,
        };

        let mut index = OpenFileIndex::new();
        scan_process(ctx, 4242, &mut IndexSink::Exclusive(&mut index));
        assert!(index.is_empty());
        assert_eq!(tracker.snapshot().processes_skipped, 1);
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let pids: Vec<Pid> = (1..=50).collect();
        let tmp = fake_root(&pids);
        let filter = PathFilter::All;

        let seq_tracker = ScanTracker::default();
        let sequential = scan_sequential(
            ScanContext {
                root: tmp.path(),
                filter: &filter,
                tracker: &seq_tracker,
            },
            &pids,
        );

        let par_tracker = ScanTracker::default();
        let parallel = scan_parallel(
            ScanContext {
                root: tmp.path(),
                filter: &filter,
                tracker: &par_tracker,
            },
            &pids,
            4,
            3,
        );

        assert_eq!(sequential, parallel);
        assert!(parallel.is_consistent());
        assert_eq!(parallel.file_count(), 51);
        assert_eq!(
            parallel.file(&PathBuf::from("/data/shared")).unwrap().pids.len(),
            50
        );

        let stats = par_tracker.snapshot();
        assert_eq!(stats.processes_scanned, 50);
        assert_eq!(stats.descriptors_resolved, 100);
        assert_eq!(stats.descriptors_unresolved, 50);
        assert_eq!(stats.workers, 4);
        assert_eq!(par_tracker.state(), ScanState::Merging);
    }

    #[test]
    fn test_each_pid_scanned_once() {
        let pids: Vec<Pid> = (1..=37).collect();
        let tmp = fake_root(&pids);
        let tracker = ScanTracker::default();
        let filter = PathFilter::All;

        scan_parallel(
            ScanContext {
                root: tmp.path(),
                filter: &filter,
                tracker: &tracker,
            },
            &pids,
            3,
            5,
        );
        assert_eq!(tracker.snapshot().processes_scanned, 37);
    }

    #[test]
    fn test_filter_applied_in_workers() {
        let pids: Vec<Pid> = (1..=20).collect();
        let tmp = fake_root(&pids);
        let tracker = ScanTracker::default();
        let filter = PathFilter::predicate(|p| p.ends_with("shared"));

        let index = scan_parallel(
            ScanContext {
                root: tmp.path(),
                filter: &filter,
                tracker: &tracker,
            },
            &pids,
            2,
            4,
        );
        assert_eq!(index.file_count(), 1);
        assert_eq!(index.process_count(), 20);
        let stats = tracker.snapshot();
        assert_eq!(stats.paths_matched, 20);
        assert_eq!(stats.paths_rejected, 20);
    }
}
