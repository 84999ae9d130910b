//! Bounded-load consistent hashing ring.

use std::collections::{BTreeMap, HashSet};

use lambdasim_types::ProxyId;
use tracing::debug;
use xxhash_rust::xxh64::xxh64;

use crate::error::PlacementError;

/// Tuning knobs for [`HashRing`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingConfig {
    /// Number of partitions keys are hashed into.
    pub partition_count: usize,
    /// Virtual nodes per member.
    pub replication_factor: usize,
    /// Load bound factor: a member accepts partitions until it owns
    /// `ceil(floor(partition_count / members) × load)` of them.
    pub load: f64,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            partition_count: 271,
            replication_factor: 20,
            load: 1.25,
        }
    }
}

/// Consistent hashing ring mapping keys to proxies.
///
/// Membership is fixed at build time. Each member is hashed onto the ring
/// at `replication_factor` virtual positions. Each partition is hashed too,
/// then walks clockwise until it finds a member still under the load bound.
/// A key routes to the owner of partition `xxh64(key) % partition_count`.
#[derive(Debug, Clone)]
pub struct HashRing {
    config: RingConfig,
    /// Members in the order they were supplied.
    members: Vec<ProxyId>,
    /// Virtual node positions: ring position -> member index.
    vnodes: BTreeMap<u64, usize>,
    /// Partition -> member index.
    partitions: Vec<usize>,
    /// Maximum partitions per member.
    load_bound: usize,
}

impl HashRing {
    /// Build a ring over `members`.
    ///
    /// Fails if there are no members, a member is repeated, the config is
    /// degenerate, or the load bound leaves some partition without a home.
    pub fn build(
        members: impl IntoIterator<Item = ProxyId>,
        config: RingConfig,
    ) -> Result<Self, PlacementError> {
        validate(&config)?;

        let members: Vec<ProxyId> = members.into_iter().collect();
        if members.is_empty() {
            return Err(PlacementError::EmptyRing);
        }
        let mut seen = HashSet::with_capacity(members.len());
        for member in &members {
            if !seen.insert(member) {
                return Err(PlacementError::DuplicateMember(member.clone()));
            }
        }

        let mut vnodes = BTreeMap::new();
        for (index, member) in members.iter().enumerate() {
            for replica in 0..config.replication_factor {
                vnodes.insert(vnode_position(member, replica), index);
            }
        }

        let load_bound = load_bound(&config, members.len());
        let partitions = distribute(&vnodes, &config, members.len(), load_bound)?;

        debug!(
            members = members.len(),
            vnodes = vnodes.len(),
            partitions = partitions.len(),
            load_bound,
            "built hash ring"
        );

        Ok(Self {
            config,
            members,
            vnodes,
            partitions,
            load_bound,
        })
    }

    /// Route a key to the proxy that owns it.
    pub fn route(&self, key: &[u8]) -> &ProxyId {
        &self.members[self.partitions[self.partition_of(key)]]
    }

    /// Partition a key hashes into.
    pub fn partition_of(&self, key: &[u8]) -> usize {
        (xxh64(key, 0) % self.config.partition_count as u64) as usize
    }

    /// Owner of a partition, or `None` when out of range.
    pub fn partition_owner(&self, partition: usize) -> Option<&ProxyId> {
        self.partitions.get(partition).map(|&m| &self.members[m])
    }

    /// Number of partitions each member owns.
    pub fn partition_loads(&self) -> BTreeMap<ProxyId, usize> {
        let mut loads: BTreeMap<ProxyId, usize> =
            self.members.iter().map(|m| (m.clone(), 0)).collect();
        for &owner in &self.partitions {
            if let Some(count) = loads.get_mut(&self.members[owner]) {
                *count += 1;
            }
        }
        loads
    }

    /// Maximum partitions a single member may own.
    pub fn load_bound(&self) -> usize {
        self.load_bound
    }

    /// `floor(partitions / members) × load`, before rounding up into
    /// [`HashRing::load_bound`].
    pub fn average_load(&self) -> f64 {
        average_load(&self.config, self.members.len())
    }

    /// Members in build order.
    pub fn members(&self) -> &[ProxyId] {
        &self.members
    }

    /// Number of members.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Number of partitions.
    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    /// Number of distinct virtual node positions.
    pub fn vnode_count(&self) -> usize {
        self.vnodes.len()
    }

    /// The configuration the ring was built with.
    pub fn config(&self) -> &RingConfig {
        &self.config
    }
}

fn validate(config: &RingConfig) -> Result<(), PlacementError> {
    if config.partition_count == 0 {
        return Err(PlacementError::InvalidConfig(
            "partition_count must be positive".into(),
        ));
    }
    if config.replication_factor == 0 {
        return Err(PlacementError::InvalidConfig(
            "replication_factor must be positive".into(),
        ));
    }
    if !config.load.is_finite() || config.load <= 0.0 {
        return Err(PlacementError::InvalidConfig(format!(
            "load must be a positive finite number, got {}",
            config.load
        )));
    }
    Ok(())
}

fn average_load(config: &RingConfig, member_count: usize) -> f64 {
    (config.partition_count / member_count) as f64 * config.load
}

/// `ceil(floor(partitions / members) × load)`.
fn load_bound(config: &RingConfig, member_count: usize) -> usize {
    average_load(config, member_count).ceil() as usize
}

/// Assign every partition to a member, walking clockwise from the
/// partition's hash and skipping members that are already at the bound.
fn distribute(
    vnodes: &BTreeMap<u64, usize>,
    config: &RingConfig,
    member_count: usize,
    load_bound: usize,
) -> Result<Vec<usize>, PlacementError> {
    let positions: Vec<usize> = vnodes.values().copied().collect();
    let hashes: Vec<u64> = vnodes.keys().copied().collect();
    let mut loads = vec![0usize; member_count];
    let mut partitions = Vec::with_capacity(config.partition_count);

    for partition in 0..config.partition_count {
        let hash = xxh64(&(partition as u64).to_le_bytes(), 0);
        let mut idx = hashes.partition_point(|&h| h < hash);
        if idx >= hashes.len() {
            idx = 0;
        }

        let mut owner = None;
        for _ in 0..positions.len() {
            let member = positions[idx];
            if loads[member] < load_bound {
                owner = Some(member);
                break;
            }
            idx = (idx + 1) % positions.len();
        }

        let Some(member) = owner else {
            return Err(PlacementError::NoRoom {
                partition,
                load_bound,
            });
        };
        loads[member] += 1;
        partitions.push(member);
    }

    Ok(partitions)
}

/// Ring position of a virtual node: `xxh64(member ++ decimal(replica))`.
fn vnode_position(member: &ProxyId, replica: usize) -> u64 {
    let label = format!("{member}{replica}");
    xxh64(label.as_bytes(), 0)
}
