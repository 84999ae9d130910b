//! Random shard placement within a proxy's worker pool.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use xxhash_rust::xxh64::xxh64;

use crate::error::PlacementError;

/// Chooses which workers receive a new key's shards.
///
/// Placement is uniform sampling without replacement: equivalent to
/// shuffling the worker indices and keeping the first `shard_count`. It has
/// no memory of earlier placements and does not look at worker load.
///
/// The generator is injected so tests can fix the seed; production seeds
/// it once per run from [`time_seed`].
#[derive(Debug, Clone)]
pub struct ShardPlacer<R = StdRng> {
    rng: R,
}

impl ShardPlacer<StdRng> {
    /// A placer with a fixed seed, for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> ShardPlacer<R> {
    /// Wrap an existing generator.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Pick `shard_count` distinct worker indices in `0..pool_size`.
    ///
    /// The returned order is the order shards are assigned (data shards
    /// first, then parity).
    pub fn select_shards(
        &mut self,
        pool_size: usize,
        shard_count: usize,
    ) -> Result<Vec<usize>, PlacementError> {
        if shard_count > pool_size {
            return Err(PlacementError::TooManyShards {
                shards: shard_count,
                pool: pool_size,
            });
        }
        Ok(rand::seq::index::sample(&mut self.rng, pool_size, shard_count).into_vec())
    }
}

/// Seed derived from the wall clock (nanoseconds since the Unix epoch).
pub fn time_seed() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    nanos as u64
}

/// Derive an independent seed for stream `stream` from a run's base seed.
///
/// Used to give every proxy its own placement generator, so the outcome
/// does not depend on how proxies interleave.
pub fn derive_seed(base: u64, stream: u64) -> u64 {
    xxh64(&stream.to_le_bytes(), base)
}
