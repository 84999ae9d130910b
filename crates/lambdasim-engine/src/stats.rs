//! Run-level counters.

use crate::proxy::Access;

/// Counters gathered over a simulation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationStats {
    /// Records processed.
    pub records: u64,
    /// Records whose key was already placed.
    pub hits: u64,
    /// Records that placed a new key.
    pub misses: u64,
    /// Shard-level accesses (records × shards per key).
    pub shard_accesses: u64,
    /// Records routed to each proxy, by proxy index.
    pub per_proxy_records: Vec<u64>,
}

impl SimulationStats {
    /// Zeroed counters for `proxies` proxies.
    pub fn new(proxies: usize) -> Self {
        Self {
            per_proxy_records: vec![0; proxies],
            ..Self::default()
        }
    }

    /// Count one access on proxy `proxy` that touched `shards` shards.
    pub fn record(&mut self, proxy: usize, access: Access, shards: usize) {
        self.records += 1;
        match access {
            Access::Hit => self.hits += 1,
            Access::Miss => self.misses += 1,
        }
        self.shard_accesses += shards as u64;
        self.per_proxy_records[proxy] += 1;
    }

    /// Fold another set of counters into this one.
    pub fn merge(&mut self, other: &SimulationStats) {
        self.records += other.records;
        self.hits += other.hits;
        self.misses += other.misses;
        self.shard_accesses += other.shard_accesses;
        for (mine, theirs) in self
            .per_proxy_records
            .iter_mut()
            .zip(&other.per_proxy_records)
        {
            *mine += theirs;
        }
    }

    /// Fraction of records that were hits, or 0 for an empty run.
    pub fn hit_ratio(&self) -> f64 {
        if self.records == 0 {
            0.0
        } else {
            self.hits as f64 / self.records as f64
        }
    }
}
