//! A single cache worker (lambda).

use std::collections::HashMap;

use lambdasim_types::Object;

/// A cache worker: the shard copies it holds and the bytes attributed to it.
///
/// Objects are never removed; the map only grows.
#[derive(Debug, Clone, Default)]
pub struct Worker {
    objects: HashMap<String, Object>,
    memory_used: u64,
}

impl Worker {
    /// Create an empty worker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new shard of `key` and attribute its bytes to this worker.
    pub fn place(&mut self, key: &str, shard_size: u64) {
        self.objects.insert(
            key.to_string(),
            Object {
                key: key.to_string(),
                size: shard_size,
                frequency: 0,
            },
        );
        self.memory_used += shard_size;
    }

    /// Record a hit on `key`: refresh its size and bump its frequency.
    ///
    /// Memory attribution is left unchanged. Returns `None` if the worker
    /// does not hold the key.
    pub fn touch(&mut self, key: &str, shard_size: u64) -> Option<&Object> {
        let object = self.objects.get_mut(key)?;
        object.size = shard_size;
        object.frequency += 1;
        Some(object)
    }

    /// Look up the shard held for `key`.
    pub fn object(&self, key: &str) -> Option<&Object> {
        self.objects.get(key)
    }

    /// Whether this worker holds a shard of `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.objects.contains_key(key)
    }

    /// Iterate over held objects in arbitrary order.
    pub fn objects(&self) -> impl Iterator<Item = &Object> {
        self.objects.values()
    }

    /// Number of shards held.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the worker holds nothing.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Total bytes attributed at placement time.
    pub fn memory_used(&self) -> u64 {
        self.memory_used
    }
}
