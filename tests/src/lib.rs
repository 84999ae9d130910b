//! Shared test harness for lambdasim integration tests.
//!
//! Provides helpers to write traces in the reference column layout, build
//! small seeded topologies, and replay a trace file end to end through
//! [`TraceReader`] → [`Simulator`] → report emitters.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use lambdasim_engine::{SimulationConfig, SimulationReport, Simulator};
use lambdasim_placement::RingConfig;
use lambdasim_trace::{
    TraceColumns, TraceReader, write_memory_snapshot_file, write_reuse_timeline_file,
};
use lambdasim_types::{BYTES_PER_MIB, ErasureLayout, Record};

/// Seed used by every helper that builds a simulator.
pub const SEED: u64 = 20_170_620;

/// Seeded config with a 1-hour-per-bucket timeline of `hours` buckets.
pub fn config(
    proxies: usize,
    workers: usize,
    data: usize,
    parity: usize,
    hours: usize,
) -> SimulationConfig {
    SimulationConfig {
        proxies,
        workers_per_proxy: workers,
        hours,
        layout: ErasureLayout::new(data, parity),
        ring: RingConfig::default(),
        memory_window_hours: 100,
        seed: Some(SEED),
    }
}

/// Record of `mib` mebibytes at `hour`.
pub fn mib_record(key: &str, mib: u64, hour: u64) -> Record {
    Record::new(key, mib * BYTES_PER_MIB, hour)
}

/// Render one row in the reference trace layout (15 columns; key at 6,
/// size at 9, timestamp at 11, hour at 12, quarter hour at 14).
pub fn reference_row(record: &Record) -> String {
    let mut row = String::new();
    let _ = write!(
        row,
        "GET,host,200,cli,0,repo,{key},0,0,{size}.0,0,{ts},{hour}.0,0,{quarter}.0",
        key = record.key,
        size = record.size,
        ts = if record.timestamp.is_empty() {
            "2017-06-20T00:00:00"
        } else {
            record.timestamp.as_str()
        },
        hour = record.timestamp_hour,
        quarter = record.timestamp_15min,
    );
    row
}

/// Write `records` as a trace file in the reference layout.
pub fn write_trace(dir: &Path, name: &str, records: &[Record]) -> PathBuf {
    let path = dir.join(name);
    let mut body = String::new();
    for record in records {
        body.push_str(&reference_row(record));
        body.push('\n');
    }
    std::fs::write(&path, body).expect("write trace");
    path
}

/// Deterministic skewed trace of `len` accesses over `keys` keys spanning
/// `hours` hours.
pub fn synthetic_trace(len: usize, keys: u32, hours: u64) -> Vec<Record> {
    let mut state: u32 = 0xC0FF_EE00;
    (0..len)
        .map(|i| {
            state = state.wrapping_mul(1103515245).wrapping_add(12345);
            let r = state >> 16;
            let key = (r % keys) * (r % keys) / keys.max(1);
            let size = u64::from(r % 128 + 1) * BYTES_PER_MIB;
            let hour = (i as u64 * hours) / len as u64;
            Record::new(format!("layer/{key:08x}"), size, hour)
        })
        .collect()
}

/// Replay a trace file with the given config.
pub fn replay_file(
    path: &Path,
    config: SimulationConfig,
    partitioned: bool,
) -> SimulationReport {
    let reader = TraceReader::open(path, TraceColumns::default(), b',').expect("open trace");
    let mut sim = Simulator::new(config).expect("valid config");
    if partitioned {
        sim.run_partitioned(reader, 8).expect("replay");
    } else {
        sim.run(reader).expect("replay");
    }
    sim.into_report()
}

/// Write both reports into `dir` and return their contents.
pub fn render_reports(dir: &Path, report: &SimulationReport) -> (String, String) {
    let reuse = dir.join("reuse.csv");
    let memory = dir.join("memory.csv");
    write_reuse_timeline_file(&report.reuse, &reuse).expect("write reuse");
    write_memory_snapshot_file(&report.memory, &memory).expect("write memory");
    (
        std::fs::read_to_string(reuse).expect("read reuse"),
        std::fs::read_to_string(memory).expect("read memory"),
    )
}
