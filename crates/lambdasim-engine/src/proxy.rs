//! A proxy: one routing node and the worker pool it owns.

use std::collections::HashMap;

use lambdasim_placement::{PlacementError, ShardPlacer};
use lambdasim_types::{BYTES_PER_MIB, ErasureLayout, ProxyId, Record};
use tracing::{debug, trace};

use crate::error::EngineError;
use crate::ledger::ProxyLedger;
use crate::worker::Worker;

/// Outcome of a single access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// The key was already placed; its shard holders were touched.
    Hit,
    /// First sight of the key; shards were placed on fresh workers.
    Miss,
}

/// A proxy and its fixed pool of workers.
///
/// `placements` is the authoritative record of which workers hold a key:
/// every index listed for a key has an [`Object`](lambdasim_types::Object)
/// for it in that worker.
#[derive(Debug)]
pub struct Proxy {
    id: ProxyId,
    index: usize,
    layout: ErasureLayout,
    memory_window_hours: u64,
    workers: Vec<Worker>,
    placements: HashMap<String, Vec<usize>>,
    placer: ShardPlacer,
}

impl Proxy {
    /// Create a proxy with `workers_per_proxy` empty workers.
    ///
    /// Fails if the layout needs more shards than there are workers, or has
    /// no data shards.
    pub fn new(
        id: ProxyId,
        index: usize,
        workers_per_proxy: usize,
        layout: ErasureLayout,
        memory_window_hours: u64,
        placer: ShardPlacer,
    ) -> Result<Self, EngineError> {
        if layout.data_shards == 0 {
            return Err(EngineError::InvalidConfig(
                "data_shards must be positive".into(),
            ));
        }
        if layout.total_shards() > workers_per_proxy {
            return Err(PlacementError::TooManyShards {
                shards: layout.total_shards(),
                pool: workers_per_proxy,
            }
            .into());
        }

        Ok(Self {
            id,
            index,
            layout,
            memory_window_hours,
            workers: vec![Worker::new(); workers_per_proxy],
            placements: HashMap::new(),
            placer,
        })
    }

    /// Apply one record to this proxy.
    ///
    /// On a hit, every shard holder gets its size refreshed, its frequency
    /// bumped, and one access counted. On a miss, fresh workers are chosen,
    /// each receives a new object, one access is counted, and (inside the
    /// observation window) the object's size in MiB is attributed to it.
    pub fn access(
        &mut self,
        record: &Record,
        ledger: &mut ProxyLedger<'_>,
    ) -> Result<Access, EngineError> {
        let bucket = usize::try_from(record.timestamp_hour)
            .ok()
            .filter(|&b| b < ledger.buckets())
            .ok_or_else(|| EngineError::BucketOutOfRange {
                key: record.key.clone(),
                hour: record.timestamp_hour,
                buckets: ledger.buckets(),
            })?;
        let shard_size = self.layout.shard_size(record.size);

        if let Some(indices) = self.placements.get(&record.key) {
            for &local in indices {
                if self.workers[local].touch(&record.key, shard_size).is_none() {
                    return Err(EngineError::MissingShard {
                        proxy: self.id.clone(),
                        key: record.key.clone(),
                        worker: local,
                    });
                }
                ledger.record_access(local, bucket);
            }
            trace!(proxy = %self.id, key = %record.key, workers = ?indices, "hit");
            return Ok(Access::Hit);
        }

        let indices = self
            .placer
            .select_shards(self.workers.len(), self.layout.total_shards())?;
        let in_window = record.timestamp_hour < self.memory_window_hours;
        let mib = record.size / BYTES_PER_MIB;

        for &local in &indices {
            self.workers[local].place(&record.key, shard_size);
            if in_window {
                ledger.attribute_memory(local, mib);
            }
            // The placing write counts as an access too.
            ledger.record_access(local, bucket);
        }
        debug!(proxy = %self.id, key = %record.key, workers = ?indices, "miss");
        self.placements.insert(record.key.clone(), indices);

        Ok(Access::Miss)
    }

    /// This proxy's identifier.
    pub fn id(&self) -> &ProxyId {
        &self.id
    }

    /// Position of this proxy in the simulator.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Global worker index of local worker `local`.
    pub fn global_index(&self, local: usize) -> usize {
        self.index * self.workers.len() + local
    }

    /// The worker pool.
    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    /// Worker indices holding `key`, if it has been placed here.
    pub fn placement(&self, key: &str) -> Option<&[usize]> {
        self.placements.get(key).map(Vec::as_slice)
    }

    /// Number of distinct keys placed on this proxy.
    pub fn key_count(&self) -> usize {
        self.placements.len()
    }

    /// Sum of bytes attributed across the pool.
    pub fn memory_used(&self) -> u64 {
        self.workers.iter().map(Worker::memory_used).sum()
    }
}
