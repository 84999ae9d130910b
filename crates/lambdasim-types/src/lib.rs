//! Shared types for lambdasim.
//!
//! This crate defines the data model used across the workspace:
//! trace input ([`Record`]), cached state ([`Object`]), identifiers
//! ([`ProxyId`]), erasure-coding geometry ([`ErasureLayout`]), and the two
//! output accumulators ([`ReuseTimeline`], [`MemorySnapshot`]).

use std::fmt;

use serde::{Deserialize, Serialize};

mod timeline;

pub use timeline::{MemorySnapshot, ReuseTimeline};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Bytes per mebibyte; memory snapshots are reported in whole MiB.
pub const BYTES_PER_MIB: u64 = 1_048_576;

/// Default observation window for memory attribution, in hour buckets.
///
/// Only placements whose record falls in hours `0..100` count towards
/// the memory snapshot.
pub const DEFAULT_MEMORY_WINDOW_HOURS: u64 = 100;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Identifier of a proxy (front-end routing node).
///
/// The ring hashes the identifier's bytes, so two proxies with the same
/// name are indistinguishable to routing.
#[derive(Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ProxyId(String);

impl ProxyId {
    /// Create an identifier from an arbitrary name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The conventional identifier for the proxy at `index`: its decimal index.
    pub fn from_index(index: usize) -> Self {
        Self(index.to_string())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<[u8]> for ProxyId {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for ProxyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ProxyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProxyId({})", self.0)
    }
}

// ---------------------------------------------------------------------------
// Trace input and cached state
// ---------------------------------------------------------------------------

/// One access from the replayed trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Object key.
    pub key: String,
    /// Object size in bytes.
    pub size: u64,
    /// Raw timestamp string as it appears in the trace.
    pub timestamp: String,
    /// Hour bucket of the access; indexes the reuse timeline.
    pub timestamp_hour: u64,
    /// 15-minute bucket of the access.
    pub timestamp_15min: u64,
}

impl Record {
    /// Build a record with an empty raw timestamp and a 15-minute bucket
    /// derived from the hour.
    pub fn new(key: impl Into<String>, size: u64, timestamp_hour: u64) -> Self {
        Self {
            key: key.into(),
            size,
            timestamp: String::new(),
            timestamp_hour,
            timestamp_15min: timestamp_hour * 4,
        }
    }
}

/// One shard copy of a key held by a worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Object {
    /// Object key.
    pub key: String,
    /// Shard size in bytes (`record size / data shards` of the latest access).
    pub size: u64,
    /// Number of hits since placement. The placing access is not counted.
    pub frequency: u64,
}

// ---------------------------------------------------------------------------
// Erasure geometry
// ---------------------------------------------------------------------------

/// Reed-Solomon style shard geometry: `data_shards + parity_shards` shards
/// per key, each holding `1 / data_shards` of the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErasureLayout {
    /// Number of data shards (k).
    pub data_shards: usize,
    /// Number of parity shards (m).
    pub parity_shards: usize,
}

impl ErasureLayout {
    /// Create a layout with `data_shards` data and `parity_shards` parity shards.
    pub fn new(data_shards: usize, parity_shards: usize) -> Self {
        Self {
            data_shards,
            parity_shards,
        }
    }

    /// Total shards placed per key (k + m).
    pub fn total_shards(&self) -> usize {
        self.data_shards + self.parity_shards
    }

    /// Bytes held by each shard of an object of `object_size` bytes.
    ///
    /// Integer division; the layout must have at least one data shard.
    pub fn shard_size(&self, object_size: u64) -> u64 {
        object_size / self.data_shards as u64
    }
}

impl Default for ErasureLayout {
    fn default() -> Self {
        Self::new(10, 2)
    }
}
