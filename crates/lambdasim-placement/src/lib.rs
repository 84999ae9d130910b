//! Proxy routing and shard placement for lambdasim.
//!
//! - [`HashRing`] maps keys to proxies with consistent hashing. Keys hash
//!   into a fixed number of partitions; partitions are spread over the
//!   members' virtual nodes with a per-member load bound, so no proxy owns
//!   more than `load × average` partitions.
//! - [`ShardPlacer`] picks which workers inside a proxy receive a new
//!   key's data and parity shards.
//!
//! Every hash is XXH64 with seed 0 over raw bytes, so routing is stable
//! across runs and platforms.

mod error;
mod placer;
mod ring;

pub use error::PlacementError;
pub use placer::{ShardPlacer, derive_seed, time_seed};
pub use ring::{HashRing, RingConfig};
