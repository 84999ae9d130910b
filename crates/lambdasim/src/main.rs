//! `lambdasim`: replay an access trace across a proxy/lambda topology.
//!
//! Routes every trace record to a proxy through the consistent hashing
//! ring, places or touches its erasure-coded shards, and writes the
//! per-lambda reuse timeline and memory snapshot.
//!
//! # Usage
//!
//! ```text
//! lambdasim                                   # defaults: input.csv -> output.csv, output2.csv
//! lambdasim -i trace.csv -s 4 -l 64           # 4 proxies, 64 lambdas each
//! lambdasim -d 4 -p 2 --hours 720             # RS(4, 2) over 30 days
//! lambdasim -c sim.toml --seed 42             # config file, reproducible placement
//! lambdasim --partitioned                     # one replay thread per proxy
//! ```

mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use lambdasim_engine::Simulator;
use lambdasim_trace::{TraceReader, write_memory_snapshot_file, write_reuse_timeline_file};
use tracing::info;

use config::CliConfig;

// -----------------------------------------------------------------------
// CLI definition
// -----------------------------------------------------------------------

#[derive(Debug, Parser)]
#[command(
    name = "lambdasim",
    version,
    about = "Trace-driven placement simulator for proxy/lambda caches"
)]
struct Cli {
    /// Path to TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the input trace.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Path to the reuse timeline output.
    #[arg(long)]
    reuse_output: Option<PathBuf>,

    /// Path to the memory snapshot output.
    #[arg(long)]
    mem_output: Option<PathBuf>,

    /// Number of proxy servers.
    #[arg(short = 's', long)]
    proxies: Option<usize>,

    /// Number of lambdas per proxy.
    #[arg(short = 'l', long)]
    lambdas: Option<usize>,

    /// Duration of the trace in hours (reuse timeline width).
    #[arg(long)]
    hours: Option<usize>,

    /// Number of data shards for RS erasure coding.
    #[arg(short = 'd', long)]
    data_shards: Option<usize>,

    /// Number of parity shards for RS erasure coding.
    #[arg(short = 'p', long)]
    parity_shards: Option<usize>,

    /// Seed for shard placement. Defaults to a clock-derived seed.
    #[arg(long, env = "LAMBDASIM_SEED")]
    seed: Option<u64>,

    /// Replay with one thread per proxy.
    #[arg(long)]
    partitioned: bool,
}

impl Cli {
    /// CLI args override config file values.
    fn apply(self, config: &mut CliConfig) {
        if let Some(input) = self.input {
            config.trace.input = input;
        }
        if let Some(path) = self.reuse_output {
            config.output.reuse = path;
        }
        if let Some(path) = self.mem_output {
            config.output.memory = path;
        }
        if let Some(n) = self.proxies {
            config.topology.proxies = Some(n);
        }
        if let Some(n) = self.lambdas {
            config.topology.workers_per_proxy = Some(n);
        }
        if let Some(n) = self.hours {
            config.simulation.hours = Some(n);
        }
        if let Some(n) = self.data_shards {
            config.erasure.data_shards = Some(n);
        }
        if let Some(n) = self.parity_shards {
            config.erasure.parity_shards = Some(n);
        }
        if let Some(seed) = self.seed {
            config.simulation.seed = Some(seed);
        }
        if self.partitioned {
            config.simulation.partitioned = true;
        }
    }
}

// -----------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = CliConfig::load(cli.config.as_deref()).context("failed to load config")?;
    cli.apply(&mut config);

    setup_tracing(&config.log.level);
    run(&config)
}

/// Initialize the `tracing` subscriber with the given level filter.
///
/// Respects `RUST_LOG` env var if set, otherwise uses the config value.
fn setup_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Build the topology, replay the trace, and write both reports.
fn run(config: &CliConfig) -> Result<()> {
    info!(
        input = %config.trace.input.display(),
        reuse_output = %config.output.reuse.display(),
        mem_output = %config.output.memory.display(),
        partitioned = config.simulation.partitioned,
        "starting replay"
    );

    let mut sim = Simulator::new(config.simulation_config())
        .context("invalid simulation configuration")?;
    for (proxy, partitions) in sim.ring().partition_loads() {
        info!(%proxy, partitions, bound = sim.ring().load_bound(), "ring partition load");
    }

    let trace = TraceReader::open(&config.trace.input, config.columns(), config.delimiter()?)
        .context("failed to open trace")?;

    if config.simulation.partitioned {
        sim.run_partitioned(trace, config.queue_depth())
            .context("replay failed")?;
    } else {
        sim.run(trace).context("replay failed")?;
    }

    let report = sim.into_report();
    write_reuse_timeline_file(&report.reuse, &config.output.reuse)
        .context("failed to write reuse timeline")?;
    write_memory_snapshot_file(&report.memory, &config.output.memory)
        .context("failed to write memory snapshot")?;

    info!(seed = report.seed, records = report.stats.records, "done");
    Ok(())
}
