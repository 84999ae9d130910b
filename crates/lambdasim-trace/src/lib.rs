//! Trace ingestion and report output for lambdasim.
//!
//! - [`TraceReader`] streams [`Record`](lambdasim_types::Record)s out of a
//!   delimited trace file, one row at a time.
//! - [`write_reuse_timeline`] and [`write_memory_snapshot`] serialize the
//!   two simulation artifacts.

mod error;
mod reader;
mod report;

pub use error::TraceError;
pub use reader::{TraceColumns, TraceReader};
pub use report::{
    REUSE_SEPARATOR, write_memory_snapshot, write_memory_snapshot_file, write_reuse_timeline,
    write_reuse_timeline_file,
};
