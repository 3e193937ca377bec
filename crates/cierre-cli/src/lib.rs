//! Cierre command-line front end
//!
//! Wires configuration, logging, the schedule cache and report rendering
//! around `cierre-core`.

pub mod cli;
pub mod config;
pub mod logging;
pub mod report;
pub mod scenario;
pub mod schedule_cache;

pub use cli::{Cli, CliRunner, Commands, EstimateArgs};
pub use config::{CierreConfig, ConfigSource, OutputFormat};
pub use schedule_cache::{CacheStats, FileScheduleSource, ScheduleCache, ScheduleSource};
