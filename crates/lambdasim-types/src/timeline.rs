//! Output accumulators: the reuse timeline and the memory snapshot.
//!
//! Both are indexed by global worker index
//! (`proxy_index * workers_per_proxy + local_index`). Each proxy owns a
//! contiguous, non-overlapping range of rows, which is what lets
//! [`ReuseTimeline::proxy_rows_mut`] and [`MemorySnapshot::proxy_slots_mut`]
//! hand out disjoint mutable slices to per-proxy workers.

/// Per-worker, per-bucket access counts.
///
/// Stored row-major in a single buffer: row `w` occupies
/// `cells[w * buckets..(w + 1) * buckets]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReuseTimeline {
    buckets: usize,
    cells: Vec<u64>,
}

impl ReuseTimeline {
    /// Create an all-zero timeline for `workers` rows of `buckets` columns.
    pub fn new(workers: usize, buckets: usize) -> Self {
        Self {
            buckets,
            cells: vec![0; workers * buckets],
        }
    }

    /// Number of worker rows.
    pub fn workers(&self) -> usize {
        if self.buckets == 0 {
            0
        } else {
            self.cells.len() / self.buckets
        }
    }

    /// Number of time buckets per row.
    pub fn buckets(&self) -> usize {
        self.buckets
    }

    /// Count for `worker` at `bucket`, or `None` when out of range.
    pub fn get(&self, worker: usize, bucket: usize) -> Option<u64> {
        if bucket >= self.buckets {
            return None;
        }
        self.cells.get(worker * self.buckets + bucket).copied()
    }

    /// The full row of counts for one worker.
    pub fn row(&self, worker: usize) -> &[u64] {
        let start = worker * self.buckets;
        &self.cells[start..start + self.buckets]
    }

    /// Iterate over rows in global worker order.
    pub fn rows(&self) -> impl Iterator<Item = &[u64]> {
        self.cells.chunks(self.buckets.max(1))
    }

    /// Sum of one worker's row.
    pub fn row_total(&self, worker: usize) -> u64 {
        self.row(worker).iter().sum()
    }

    /// Sum of every cell.
    pub fn total(&self) -> u64 {
        self.cells.iter().sum()
    }

    /// Increment the count for `worker` at `bucket`.
    ///
    /// Panics if either index is out of range.
    pub fn increment(&mut self, worker: usize, bucket: usize) {
        assert!(bucket < self.buckets, "bucket {bucket} out of range");
        self.cells[worker * self.buckets + bucket] += 1;
    }

    /// Split the timeline into one mutable block per proxy.
    ///
    /// Each block holds `workers_per_proxy` consecutive rows.
    pub fn proxy_rows_mut(
        &mut self,
        workers_per_proxy: usize,
    ) -> impl Iterator<Item = &mut [u64]> {
        self.cells.chunks_mut((workers_per_proxy * self.buckets).max(1))
    }

    /// The mutable block of rows owned by proxy `proxy`.
    pub fn proxy_block_mut(&mut self, workers_per_proxy: usize, proxy: usize) -> &mut [u64] {
        let width = workers_per_proxy * self.buckets;
        &mut self.cells[proxy * width..(proxy + 1) * width]
    }
}

/// Per-worker memory attribution in whole mebibytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemorySnapshot {
    mib: Vec<u64>,
}

impl MemorySnapshot {
    /// Create an all-zero snapshot for `workers` workers.
    pub fn new(workers: usize) -> Self {
        Self {
            mib: vec![0; workers],
        }
    }

    /// Number of workers tracked.
    pub fn workers(&self) -> usize {
        self.mib.len()
    }

    /// MiB attributed to `worker`, or `None` when out of range.
    pub fn get(&self, worker: usize) -> Option<u64> {
        self.mib.get(worker).copied()
    }

    /// All values in global worker order.
    pub fn values(&self) -> &[u64] {
        &self.mib
    }

    /// Sum over all workers.
    pub fn total(&self) -> u64 {
        self.mib.iter().sum()
    }

    /// Add `mib` to `worker`'s total.
    pub fn add(&mut self, worker: usize, mib: u64) {
        self.mib[worker] += mib;
    }

    /// Split the snapshot into one mutable block of `workers_per_proxy`
    /// slots per proxy.
    pub fn proxy_slots_mut(
        &mut self,
        workers_per_proxy: usize,
    ) -> impl Iterator<Item = &mut [u64]> {
        self.mib.chunks_mut(workers_per_proxy.max(1))
    }

    /// The mutable slots owned by proxy `proxy`.
    pub fn proxy_block_mut(&mut self, workers_per_proxy: usize, proxy: usize) -> &mut [u64] {
        &mut self.mib[proxy * workers_per_proxy..(proxy + 1) * workers_per_proxy]
    }
}
