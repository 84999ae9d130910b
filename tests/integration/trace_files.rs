//! Trace file → simulator → report files.

use lambdasim_engine::{EngineError, Simulator};
use lambdasim_integration_tests::{
    config, mib_record, render_reports, replay_file, synthetic_trace, write_trace,
};
use lambdasim_trace::{TraceColumns, TraceReader};
use lambdasim_types::Record;

#[test]
fn test_reports_have_one_line_per_worker() {
    let dir = tempfile::tempdir().unwrap();
    let trace = synthetic_trace(1_000, 100, 12);
    let path = write_trace(dir.path(), "trace.csv", &trace);

    let report = replay_file(&path, config(2, 8, 2, 1, 12), false);
    let (reuse, memory) = render_reports(dir.path(), &report);

    let rows: Vec<&str> = reuse.lines().collect();
    assert_eq!(rows.len(), 16);
    for row in &rows {
        assert_eq!(row.split(",  ").count(), 12);
    }
    let reuse_total: u64 = rows
        .iter()
        .flat_map(|row| row.split(",  ").map(|v| v.parse::<u64>().unwrap()))
        .sum();
    assert_eq!(reuse_total, 1_000 * 3);

    let mem: Vec<u64> = memory.lines().map(|l| l.parse().unwrap()).collect();
    assert_eq!(mem.len(), 16);
    assert_eq!(mem.iter().sum::<u64>(), report.memory.total());
}

#[test]
fn test_memory_report_respects_window() {
    let dir = tempfile::tempdir().unwrap();
    let trace = vec![
        mib_record("inside", 64, 99),
        mib_record("outside", 512, 100),
        mib_record("inside", 64, 150),
    ];
    let path = write_trace(dir.path(), "trace.csv", &trace);

    let report = replay_file(&path, config(1, 4, 2, 1, 200), false);
    assert_eq!(report.memory.total(), 3 * 64);
    assert_eq!(report.stats.misses, 2);
    assert_eq!(report.stats.hits, 1);
}

#[test]
fn test_reference_layout_round_trips_fields() {
    let dir = tempfile::tempdir().unwrap();
    let mut rec = Record::new("sha256:abc", 123_456_789, 7);
    rec.timestamp = "2017-06-20T07:15:00".to_string();
    let path = write_trace(dir.path(), "trace.csv", &[rec.clone()]);

    let parsed: Vec<Record> = TraceReader::open(&path, TraceColumns::default(), b',')
        .unwrap()
        .map(Result::unwrap)
        .collect();
    assert_eq!(parsed, vec![rec]);
}

#[test]
fn test_malformed_row_halts_replay() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_trace(dir.path(), "good.csv", &[mib_record("a", 1, 0)]);
    let mut body = std::fs::read_to_string(&good).unwrap();
    body.push_str("GET,host,200,cli,0,repo,b,0,0,not-a-size,0,ts,1.0,0,4.0\n");
    body.push_str(&std::fs::read_to_string(&good).unwrap());
    let path = dir.path().join("bad.csv");
    std::fs::write(&path, body).unwrap();

    let mut sim = Simulator::new(config(1, 4, 2, 1, 4)).unwrap();
    let reader = TraceReader::open(&path, TraceColumns::default(), b',').unwrap();
    let err = sim.run(reader).unwrap_err();

    assert!(matches!(err, EngineError::Source(_)));
    assert!(err.to_string().contains("line 2"), "{err}");
    assert_eq!(sim.stats().records, 1);
}
