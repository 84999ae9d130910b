//! A proxy's view of the global accumulators.

use lambdasim_types::{MemorySnapshot, ReuseTimeline};

/// Mutable access to the reuse timeline rows and memory slots owned by a
/// single proxy, addressed by local worker index.
///
/// Proxies own disjoint global ranges, so ledgers for different proxies
/// can be used from different threads at once.
#[derive(Debug)]
pub struct ProxyLedger<'a> {
    buckets: usize,
    reuse: &'a mut [u64],
    memory: &'a mut [u64],
}

impl<'a> ProxyLedger<'a> {
    /// Ledger for proxy `proxy`.
    pub fn for_proxy(
        reuse: &'a mut ReuseTimeline,
        memory: &'a mut MemorySnapshot,
        workers_per_proxy: usize,
        proxy: usize,
    ) -> Self {
        Self {
            buckets: reuse.buckets(),
            reuse: reuse.proxy_block_mut(workers_per_proxy, proxy),
            memory: memory.proxy_block_mut(workers_per_proxy, proxy),
        }
    }

    /// One ledger per proxy, in proxy index order.
    pub fn split(
        reuse: &'a mut ReuseTimeline,
        memory: &'a mut MemorySnapshot,
        workers_per_proxy: usize,
    ) -> Vec<Self> {
        let buckets = reuse.buckets();
        reuse
            .proxy_rows_mut(workers_per_proxy)
            .zip(memory.proxy_slots_mut(workers_per_proxy))
            .map(|(reuse, memory)| Self {
                buckets,
                reuse,
                memory,
            })
            .collect()
    }

    /// Width of the timeline.
    pub fn buckets(&self) -> usize {
        self.buckets
    }

    /// Count one access to local worker `worker` in `bucket`.
    pub fn record_access(&mut self, worker: usize, bucket: usize) {
        self.reuse[worker * self.buckets + bucket] += 1;
    }

    /// Attribute `mib` mebibytes to local worker `worker`.
    pub fn attribute_memory(&mut self, worker: usize, mib: u64) {
        self.memory[worker] += mib;
    }
}
