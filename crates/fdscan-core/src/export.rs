/// Export of a sealed index for other tools.
///
/// Records are written sorted (by path, then by PID) so that two exports of
/// the same index are byte-identical.
use crate::error::ExportError;
use crate::model::{FileRecord, OpenFileIndex, ProcessRecord};
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct JsonExport<'a> {
    files: Vec<&'a FileRecord>,
    processes: Vec<&'a ProcessRecord>,
}

fn sorted_files(index: &OpenFileIndex) -> Vec<&FileRecord> {
    let mut files: Vec<_> = index.file_map().values().collect();
    files.sort_unstable_by(|a, b| a.path.cmp(&b.path));
    files
}

/// Write `{ "files": [...], "processes": [...] }` as pretty JSON.
pub fn write_json<W: Write>(index: &OpenFileIndex, writer: W) -> Result<(), ExportError> {
    let mut processes: Vec<_> = index.pid_map().values().collect();
    processes.sort_unstable_by_key(|p| p.pid);

    let export = JsonExport {
        files: sorted_files(index),
        processes,
    };
    serde_json::to_writer_pretty(writer, &export)?;
    Ok(())
}

/// Write one `path,pid` row per (file, holder) pair, with a header.
pub fn write_csv<W: Write>(index: &OpenFileIndex, writer: W) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["path", "pid"])?;
    for file in sorted_files(index) {
        let path = file.path.to_string_lossy();
        for pid in &file.pids {
            wtr.write_record([&*path, pid.to_string().as_str()])?;
        }
    }
    wtr.flush()?;
    Ok(())
}
