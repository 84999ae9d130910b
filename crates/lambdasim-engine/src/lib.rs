//! Trace replay engine.
//!
//! The [`Simulator`] owns the ring, every [`Proxy`], and the two output
//! accumulators. Each record is routed to one proxy, which either places
//! the key's shards on fresh workers (miss) or touches the existing shard
//! holders (hit), recording the access in its [`ProxyLedger`].
//!
//! Runs are either strictly sequential ([`Simulator::run`]) or partitioned
//! by proxy across threads ([`Simulator::run_partitioned`]); with the same
//! seed both produce identical artifacts.

pub mod error;
pub mod ledger;
pub mod proxy;
pub mod simulator;
pub mod stats;
pub mod worker;

pub use error::EngineError;
pub use ledger::ProxyLedger;
pub use proxy::{Access, Proxy};
pub use simulator::{SimulationConfig, SimulationReport, Simulator};
pub use stats::SimulationStats;
pub use worker::Worker;

#[cfg(test)]
mod tests;
