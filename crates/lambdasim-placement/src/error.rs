//! Error types for routing and placement.

use lambdasim_types::ProxyId;

/// Errors raised while building the ring or placing shards.
///
/// All of these are configuration errors: the simulation cannot start.
#[derive(Debug, thiserror::Error)]
pub enum PlacementError {
    /// The ring was built without any members.
    #[error("hash ring has no members")]
    EmptyRing,

    /// The same proxy identifier was supplied twice.
    #[error("duplicate ring member: {0}")]
    DuplicateMember(ProxyId),

    /// The ring configuration cannot produce a valid layout.
    #[error("invalid ring config: {0}")]
    InvalidConfig(String),

    /// No member had room for a partition under the load bound.
    #[error("no member has room for partition {partition} (load bound {load_bound})")]
    NoRoom {
        /// The partition being assigned.
        partition: usize,
        /// Maximum partitions a single member may own.
        load_bound: usize,
    },

    /// More shards were requested than there are workers to hold them.
    #[error("cannot place {shards} shards on a pool of {pool} workers")]
    TooManyShards {
        /// Shards requested (data + parity).
        shards: usize,
        /// Workers available in the pool.
        pool: usize,
    },
}
