//! Report emitters for the reuse timeline and memory snapshot.
//!
//! Both formats are headerless and ordered by global worker index.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use lambdasim_types::{MemorySnapshot, ReuseTimeline};
use tracing::info;

use crate::error::TraceError;

/// Separator between counts on a reuse timeline row.
pub const REUSE_SEPARATOR: &str = ",  ";

/// Write one row per worker, each holding one count per bucket.
pub fn write_reuse_timeline<W: Write>(timeline: &ReuseTimeline, mut out: W) -> io::Result<()> {
    if timeline.buckets() == 0 {
        return Ok(());
    }
    for row in timeline.rows() {
        let Some((last, head)) = row.split_last() else {
            continue;
        };
        for count in head {
            write!(out, "{count}{REUSE_SEPARATOR}")?;
        }
        writeln!(out, "{last}")?;
    }
    out.flush()
}

/// Write one MiB total per worker, one per line.
pub fn write_memory_snapshot<W: Write>(snapshot: &MemorySnapshot, mut out: W) -> io::Result<()> {
    for mib in snapshot.values() {
        writeln!(out, "{mib}")?;
    }
    out.flush()
}

/// Create `path` and write the reuse timeline into it.
pub fn write_reuse_timeline_file(
    timeline: &ReuseTimeline,
    path: impl AsRef<Path>,
) -> Result<(), TraceError> {
    let path = path.as_ref();
    write_to(path, |out| write_reuse_timeline(timeline, out))?;
    info!(
        path = %path.display(),
        workers = timeline.workers(),
        buckets = timeline.buckets(),
        "wrote reuse timeline"
    );
    Ok(())
}

/// Create `path` and write the memory snapshot into it.
pub fn write_memory_snapshot_file(
    snapshot: &MemorySnapshot,
    path: impl AsRef<Path>,
) -> Result<(), TraceError> {
    let path = path.as_ref();
    write_to(path, |out| write_memory_snapshot(snapshot, out))?;
    info!(
        path = %path.display(),
        workers = snapshot.workers(),
        total_mib = snapshot.total(),
        "wrote memory snapshot"
    );
    Ok(())
}

fn write_to(
    path: &Path,
    emit: impl FnOnce(&mut BufWriter<File>) -> io::Result<()>,
) -> Result<(), TraceError> {
    let output = |source| TraceError::Output {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(output)?;
    let mut out = BufWriter::new(file);
    emit(&mut out).map_err(output)
}
