/// Data model for the open-file index.
///
/// Re-exports the per-file and per-process records and the bidirectional
/// index that owns them.
pub mod index;
pub mod record;

pub use index::{IndexSink, OpenFileIndex};
pub use record::{FileRecord, Pid, ProcessRecord};
