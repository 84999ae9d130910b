//! Partitioned replay must agree with sequential replay.

use lambdasim_integration_tests::{config, replay_file, synthetic_trace, write_trace};

#[test]
fn test_partitioned_file_replay_matches_sequential() {
    let dir = tempfile::tempdir().unwrap();
    let trace = synthetic_trace(6_000, 800, 72);
    let path = write_trace(dir.path(), "trace.csv", &trace);

    let sequential = replay_file(&path, config(4, 16, 6, 3, 72), false);
    let partitioned = replay_file(&path, config(4, 16, 6, 3, 72), true);

    assert_eq!(sequential.stats, partitioned.stats);
    assert_eq!(sequential.reuse, partitioned.reuse);
    assert_eq!(sequential.memory, partitioned.memory);
    assert_eq!(sequential.stats.records, 6_000);
}

#[test]
fn test_partitioned_single_proxy() {
    let dir = tempfile::tempdir().unwrap();
    let trace = synthetic_trace(500, 60, 10);
    let path = write_trace(dir.path(), "trace.csv", &trace);

    let report = replay_file(&path, config(1, 8, 2, 1, 10), true);
    assert_eq!(report.stats.per_proxy_records, vec![500]);
    assert_eq!(report.reuse.total(), 500 * 3);
}
