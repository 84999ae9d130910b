//! TOML configuration for the simulator.
//!
//! Every field is optional; unset values fall back to the reference setup
//! (2 proxies × 32 lambdas, RS(10, 2), 1800 hours).

use std::path::{Path, PathBuf};

use anyhow::bail;
use lambdasim_engine::SimulationConfig;
use lambdasim_placement::RingConfig;
use lambdasim_trace::TraceColumns;
use lambdasim_types::{DEFAULT_MEMORY_WINDOW_HOURS, ErasureLayout};
use serde::Deserialize;

/// Top-level configuration, parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Trace input.
    pub trace: TraceSection,
    /// Report destinations.
    pub output: OutputSection,
    /// Proxy and worker counts.
    pub topology: TopologySection,
    /// Erasure coding parameters.
    pub erasure: ErasureSection,
    /// Consistent hashing ring tuning.
    pub ring: RingSection,
    /// Replay behaviour.
    pub simulation: SimulationSection,
    /// Logging configuration.
    pub log: LogSection,
}

/// `[trace]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TraceSection {
    /// Path of the trace file.
    pub input: PathBuf,
    /// Field delimiter; a single ASCII character.
    pub delimiter: String,
    /// Zero-based column of the object key.
    pub key_column: Option<usize>,
    /// Zero-based column of the object size.
    pub size_column: Option<usize>,
    /// Zero-based column of the raw timestamp.
    pub timestamp_column: Option<usize>,
    /// Zero-based column of the hour bucket.
    pub hour_column: Option<usize>,
    /// Zero-based column of the 15-minute bucket.
    pub quarter_hour_column: Option<usize>,
}

impl Default for TraceSection {
    fn default() -> Self {
        Self {
            input: PathBuf::from("input.csv"),
            delimiter: ",".to_string(),
            key_column: None,
            size_column: None,
            timestamp_column: None,
            hour_column: None,
            quarter_hour_column: None,
        }
    }
}

/// `[output]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Reuse timeline destination.
    pub reuse: PathBuf,
    /// Memory snapshot destination.
    pub memory: PathBuf,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            reuse: PathBuf::from("output.csv"),
            memory: PathBuf::from("output2.csv"),
        }
    }
}

/// `[topology]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TopologySection {
    /// Number of proxies.
    pub proxies: Option<usize>,
    /// Lambdas per proxy.
    pub workers_per_proxy: Option<usize>,
}

/// `[erasure]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ErasureSection {
    /// Number of data shards.
    pub data_shards: Option<usize>,
    /// Number of parity shards.
    pub parity_shards: Option<usize>,
}

/// `[ring]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RingSection {
    /// Number of partitions keys hash into.
    pub partition_count: Option<usize>,
    /// Virtual nodes per proxy.
    pub replication_factor: Option<usize>,
    /// Load bound factor.
    pub load: Option<f64>,
}

/// `[simulation]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SimulationSection {
    /// Timeline width in hours.
    pub hours: Option<usize>,
    /// Hours (from 0) during which misses count towards memory.
    pub memory_window_hours: Option<u64>,
    /// Placement seed. Unset seeds from the wall clock.
    pub seed: Option<u64>,
    /// Replay with one thread per proxy.
    pub partitioned: bool,
    /// Per-proxy queue depth for partitioned replay.
    pub queue_depth: Option<usize>,
}

/// `[log]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Log level filter (e.g. `"info"`, `"debug"`, `"warn"`).
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl CliConfig {
    /// Load config from a TOML file, or use defaults if no path given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)?;
                let config: CliConfig = toml::from_str(&content)?;
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse config from a TOML string (used in tests).
    #[cfg(test)]
    pub fn from_toml(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Effective number of proxies.
    pub fn proxies(&self) -> usize {
        self.topology.proxies.unwrap_or(2)
    }

    /// Effective lambdas per proxy.
    pub fn workers_per_proxy(&self) -> usize {
        self.topology.workers_per_proxy.unwrap_or(32)
    }

    /// Effective data shard count.
    pub fn data_shards(&self) -> usize {
        self.erasure.data_shards.unwrap_or(10)
    }

    /// Effective parity shard count.
    pub fn parity_shards(&self) -> usize {
        self.erasure.parity_shards.unwrap_or(2)
    }

    /// Effective timeline width.
    pub fn hours(&self) -> usize {
        self.simulation.hours.unwrap_or(1800)
    }

    /// Effective memory observation window.
    pub fn memory_window_hours(&self) -> u64 {
        self.simulation
            .memory_window_hours
            .unwrap_or(DEFAULT_MEMORY_WINDOW_HOURS)
    }

    /// Effective per-proxy queue depth for partitioned replay.
    ///
    /// Defaults to 1024.
    pub fn queue_depth(&self) -> usize {
        self.simulation.queue_depth.unwrap_or(1024)
    }

    /// Trace delimiter as a byte.
    pub fn delimiter(&self) -> anyhow::Result<u8> {
        match self.trace.delimiter.as_bytes() {
            [b] if b.is_ascii() => Ok(*b),
            _ => bail!(
                "trace delimiter must be a single ASCII character, got {:?}",
                self.trace.delimiter
            ),
        }
    }

    /// Column layout of the trace.
    pub fn columns(&self) -> TraceColumns {
        let defaults = TraceColumns::default();
        TraceColumns {
            key: self.trace.key_column.unwrap_or(defaults.key),
            size: self.trace.size_column.unwrap_or(defaults.size),
            timestamp: self.trace.timestamp_column.unwrap_or(defaults.timestamp),
            hour: self.trace.hour_column.unwrap_or(defaults.hour),
            quarter_hour: self
                .trace
                .quarter_hour_column
                .unwrap_or(defaults.quarter_hour),
        }
    }

    /// Ring tuning.
    pub fn ring_config(&self) -> RingConfig {
        let defaults = RingConfig::default();
        RingConfig {
            partition_count: self.ring.partition_count.unwrap_or(defaults.partition_count),
            replication_factor: self
                .ring
                .replication_factor
                .unwrap_or(defaults.replication_factor),
            load: self.ring.load.unwrap_or(defaults.load),
        }
    }

    /// Engine configuration.
    pub fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig {
            proxies: self.proxies(),
            workers_per_proxy: self.workers_per_proxy(),
            hours: self.hours(),
            layout: ErasureLayout::new(self.data_shards(), self.parity_shards()),
            ring: self.ring_config(),
            memory_window_hours: self.memory_window_hours(),
            seed: self.simulation.seed,
        }
    }
}
