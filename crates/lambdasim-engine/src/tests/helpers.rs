//! Shared test utilities for lambdasim-engine tests.

use std::convert::Infallible;

use lambdasim_placement::RingConfig;
use lambdasim_types::{BYTES_PER_MIB, ErasureLayout, Record};

use crate::simulator::{SimulationConfig, Simulator};

pub const TEST_SEED: u64 = 0x5EED;

/// Config with a fixed seed and a small timeline.
pub fn config(proxies: usize, workers: usize, data: usize, parity: usize) -> SimulationConfig {
    SimulationConfig {
        proxies,
        workers_per_proxy: workers,
        hours: 24,
        layout: ErasureLayout::new(data, parity),
        ring: RingConfig::default(),
        memory_window_hours: 12,
        seed: Some(TEST_SEED),
    }
}

/// Simulator built from [`config`].
pub fn simulator(proxies: usize, workers: usize, data: usize, parity: usize) -> Simulator {
    Simulator::new(config(proxies, workers, data, parity)).unwrap()
}

/// Record of `mib` mebibytes.
pub fn mib_record(key: &str, mib: u64, hour: u64) -> Record {
    Record::new(key, mib * BYTES_PER_MIB, hour)
}

/// Wrap records as an infallible source.
pub fn ok_records(records: Vec<Record>) -> impl Iterator<Item = Result<Record, Infallible>> {
    records.into_iter().map(Ok)
}

/// A deterministic synthetic trace: `len` accesses over `keys` keys with a
/// skewed popularity, spread across `hours` hours.
pub fn synthetic_trace(len: usize, keys: u32, hours: u64) -> Vec<Record> {
    let mut state: u32 = 0xDEAD_BEEF;
    (0..len)
        .map(|i| {
            state = state.wrapping_mul(1103515245).wrapping_add(12345);
            let r = state >> 16;
            // Squaring the draw skews towards low key ids.
            let key = (r % keys) * (r % keys) / keys.max(1);
            let size = u64::from(r % 64 + 1) * BYTES_PER_MIB;
            let hour = (i as u64 * hours) / len as u64;
            Record::new(format!("obj-{key}"), size, hour)
        })
        .collect()
}
