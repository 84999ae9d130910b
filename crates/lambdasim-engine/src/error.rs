//! Error types for the engine.

use lambdasim_types::ProxyId;

/// Errors that stop a simulation.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Ring construction or shard placement failed.
    #[error("placement error: {0}")]
    Placement(#[from] lambdasim_placement::PlacementError),

    /// The simulation configuration is unusable.
    #[error("invalid simulation config: {0}")]
    InvalidConfig(String),

    /// A record's hour falls outside the reuse timeline.
    #[error("record for key {key} has hour {hour}, timeline only has {buckets} buckets")]
    BucketOutOfRange {
        /// Key of the offending record.
        key: String,
        /// Hour bucket carried by the record.
        hour: u64,
        /// Width of the timeline.
        buckets: usize,
    },

    /// The ring routed to an identifier with no proxy behind it.
    #[error("ring routed to unknown proxy {0}")]
    UnknownProxy(ProxyId),

    /// A placed key has no object on one of its workers.
    #[error("proxy {proxy}: key {key} is placed on worker {worker} but the worker does not hold it")]
    MissingShard {
        /// Proxy holding the placement.
        proxy: ProxyId,
        /// The key.
        key: String,
        /// Local worker index.
        worker: usize,
    },

    /// The record source failed (e.g. a malformed trace row).
    #[error("record source error: {0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl EngineError {
    /// Wrap an error raised by the record source.
    pub fn from_source(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Source(Box::new(err))
    }
}
