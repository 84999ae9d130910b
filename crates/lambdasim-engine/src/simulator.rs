//! The trace replay loop.

use std::collections::HashMap;
use std::sync::mpsc;
use std::thread;

use lambdasim_placement::{HashRing, RingConfig, ShardPlacer, derive_seed, time_seed};
use lambdasim_types::{
    DEFAULT_MEMORY_WINDOW_HOURS, ErasureLayout, MemorySnapshot, ProxyId, Record, ReuseTimeline,
};
use tracing::{info, trace};

use crate::error::EngineError;
use crate::ledger::ProxyLedger;
use crate::proxy::{Access, Proxy};
use crate::stats::SimulationStats;

/// Configuration for a [`Simulator`].
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Number of proxies on the ring.
    pub proxies: usize,
    /// Workers in each proxy's pool.
    pub workers_per_proxy: usize,
    /// Width of the reuse timeline in hour buckets.
    pub hours: usize,
    /// Shard geometry for every key.
    pub layout: ErasureLayout,
    /// Ring tuning.
    pub ring: RingConfig,
    /// Only misses in hours `0..memory_window_hours` count towards the
    /// memory snapshot.
    pub memory_window_hours: u64,
    /// Base seed for shard placement. `None` seeds from the wall clock.
    pub seed: Option<u64>,
}

impl SimulationConfig {
    /// Total workers across all proxies.
    pub fn total_workers(&self) -> usize {
        self.proxies * self.workers_per_proxy
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            proxies: 2,
            workers_per_proxy: 32,
            hours: 1800,
            layout: ErasureLayout::default(),
            ring: RingConfig::default(),
            memory_window_hours: DEFAULT_MEMORY_WINDOW_HOURS,
            seed: None,
        }
    }
}

/// Final artifacts of a run.
#[derive(Debug, Clone)]
pub struct SimulationReport {
    /// Per-worker, per-hour access counts.
    pub reuse: ReuseTimeline,
    /// Per-worker memory attribution in MiB.
    pub memory: MemorySnapshot,
    /// Run counters.
    pub stats: SimulationStats,
    /// Base placement seed the run used.
    pub seed: u64,
}

/// Replays records across the proxy topology.
///
/// Owns the ring, every proxy, and both accumulators. Proxies are resolved
/// from the ring's identifiers through an explicit lookup table built once
/// at construction.
#[derive(Debug)]
pub struct Simulator {
    config: SimulationConfig,
    seed: u64,
    ring: HashRing,
    proxies: Vec<Proxy>,
    lookup: HashMap<ProxyId, usize>,
    reuse: ReuseTimeline,
    memory: MemorySnapshot,
    stats: SimulationStats,
}

impl Simulator {
    /// Build the topology. Every configuration error surfaces here, before
    /// any record is read.
    pub fn new(config: SimulationConfig) -> Result<Self, EngineError> {
        if config.workers_per_proxy == 0 {
            return Err(EngineError::InvalidConfig(
                "workers_per_proxy must be positive".into(),
            ));
        }
        if config.hours == 0 {
            return Err(EngineError::InvalidConfig("hours must be positive".into()));
        }

        let ids: Vec<ProxyId> = (0..config.proxies).map(ProxyId::from_index).collect();
        let ring = HashRing::build(ids.iter().cloned(), config.ring)?;
        let seed = config.seed.unwrap_or_else(time_seed);

        let proxies = ids
            .iter()
            .enumerate()
            .map(|(index, id)| {
                Proxy::new(
                    id.clone(),
                    index,
                    config.workers_per_proxy,
                    config.layout,
                    config.memory_window_hours,
                    ShardPlacer::seeded(derive_seed(seed, index as u64)),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        let lookup = ids
            .into_iter()
            .enumerate()
            .map(|(index, id)| (id, index))
            .collect();

        info!(
            proxies = config.proxies,
            workers_per_proxy = config.workers_per_proxy,
            hours = config.hours,
            data_shards = config.layout.data_shards,
            parity_shards = config.layout.parity_shards,
            seed,
            "simulator ready"
        );

        Ok(Self {
            reuse: ReuseTimeline::new(config.total_workers(), config.hours),
            memory: MemorySnapshot::new(config.total_workers()),
            stats: SimulationStats::new(config.proxies),
            config,
            seed,
            ring,
            proxies,
            lookup,
        })
    }

    /// Route one record and apply it to its proxy.
    pub fn access(&mut self, record: &Record) -> Result<Access, EngineError> {
        let id = self.ring.route(record.key.as_bytes());
        let index = *self
            .lookup
            .get(id)
            .ok_or_else(|| EngineError::UnknownProxy(id.clone()))?;
        trace!(key = %record.key, proxy = %id, hour = record.timestamp_hour, "routed");

        let mut ledger = ProxyLedger::for_proxy(
            &mut self.reuse,
            &mut self.memory,
            self.config.workers_per_proxy,
            index,
        );
        let access = self.proxies[index].access(record, &mut ledger)?;
        self.stats
            .record(index, access, self.config.layout.total_shards());
        Ok(access)
    }

    /// Replay `records` in order on the calling thread.
    ///
    /// Stops at the first error, whether it comes from the record source or
    /// from a record the timeline cannot hold.
    pub fn run<I, E>(&mut self, records: I) -> Result<&SimulationStats, EngineError>
    where
        I: IntoIterator<Item = Result<Record, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        for item in records {
            let record = item.map_err(EngineError::from_source)?;
            self.access(&record)?;
        }
        self.log_summary();
        Ok(&self.stats)
    }

    /// Replay `records` with one thread per proxy.
    ///
    /// The calling thread pulls records and routes each onto its proxy's
    /// bounded queue (`queue_depth` records). Every proxy thread drains its
    /// queue into its own slice of the accumulators, so per-proxy order is
    /// preserved and no locking is needed. Produces the same artifacts as
    /// [`Simulator::run`] for the same seed.
    pub fn run_partitioned<I, E>(
        &mut self,
        records: I,
        queue_depth: usize,
    ) -> Result<&SimulationStats, EngineError>
    where
        I: IntoIterator<Item = Result<Record, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let proxy_count = self.proxies.len();
        let shards = self.config.layout.total_shards();
        let workers_per_proxy = self.config.workers_per_proxy;
        let Self {
            ring,
            lookup,
            proxies,
            reuse,
            memory,
            ..
        } = &mut *self;
        let ledgers = ProxyLedger::split(reuse, memory, workers_per_proxy);

        let run_stats = thread::scope(|scope| {
            let mut queues = Vec::with_capacity(proxy_count);
            let mut handles = Vec::with_capacity(proxy_count);

            for (proxy, mut ledger) in proxies.iter_mut().zip(ledgers) {
                let (tx, rx) = mpsc::sync_channel::<Record>(queue_depth);
                queues.push(tx);
                handles.push(scope.spawn(move || -> Result<SimulationStats, EngineError> {
                    let mut local = SimulationStats::new(proxy_count);
                    for record in rx {
                        let access = proxy.access(&record, &mut ledger)?;
                        local.record(proxy.index(), access, shards);
                    }
                    Ok(local)
                }));
            }

            let mut failure = None;
            for item in records {
                let record = match item {
                    Ok(record) => record,
                    Err(err) => {
                        failure = Some(EngineError::from_source(err));
                        break;
                    }
                };
                let id = ring.route(record.key.as_bytes());
                let Some(&index) = lookup.get(id) else {
                    failure = Some(EngineError::UnknownProxy(id.clone()));
                    break;
                };
                trace!(key = %record.key, proxy = %id, "queued");
                if queues[index].send(record).is_err() {
                    // Receiver gone: that proxy failed and reports below.
                    break;
                }
            }
            drop(queues);

            let mut merged = SimulationStats::new(proxy_count);
            for handle in handles {
                match handle.join() {
                    Ok(Ok(local)) => merged.merge(&local),
                    Ok(Err(err)) => {
                        failure.get_or_insert(err);
                    }
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
            match failure {
                Some(err) => Err(err),
                None => Ok(merged),
            }
        })?;

        self.stats.merge(&run_stats);
        self.log_summary();
        Ok(&self.stats)
    }

    fn log_summary(&self) {
        info!(
            records = self.stats.records,
            hits = self.stats.hits,
            misses = self.stats.misses,
            shard_accesses = self.stats.shard_accesses,
            hit_ratio = format_args!("{:.4}", self.stats.hit_ratio()),
            per_proxy = ?self.stats.per_proxy_records,
            "replay finished"
        );
    }

    /// Base placement seed in use.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The configuration this simulator was built with.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The routing ring.
    pub fn ring(&self) -> &HashRing {
        &self.ring
    }

    /// All proxies, by index.
    pub fn proxies(&self) -> &[Proxy] {
        &self.proxies
    }

    /// Look up a proxy by identifier.
    pub fn proxy(&self, id: &ProxyId) -> Option<&Proxy> {
        self.lookup.get(id).map(|&index| &self.proxies[index])
    }

    /// The proxy a key routes to.
    pub fn proxy_for_key(&self, key: &str) -> Option<&Proxy> {
        self.proxy(self.ring.route(key.as_bytes()))
    }

    /// Reuse timeline accumulated so far.
    pub fn reuse(&self) -> &ReuseTimeline {
        &self.reuse
    }

    /// Memory snapshot accumulated so far.
    pub fn memory(&self) -> &MemorySnapshot {
        &self.memory
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    /// Consume the simulator and hand back its artifacts.
    pub fn into_report(self) -> SimulationReport {
        SimulationReport {
            reuse: self.reuse,
            memory: self.memory,
            stats: self.stats,
            seed: self.seed,
        }
    }
}
