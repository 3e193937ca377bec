//! Structured logging setup
//!
//! Logs go to stderr so report output on stdout stays clean. `RUST_LOG`
//! overrides the configured filter.

use crate::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

const VERBOSE_FILTER: &str = "info,cierre=debug";

/// Build the filter used by [`init_logging`]
pub fn build_filter(config: &LoggingConfig, verbose: bool) -> anyhow::Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let directives = if verbose {
        VERBOSE_FILTER
    } else {
        config.filter.as_str()
    };
    EnvFilter::try_new(directives)
        .map_err(|e| anyhow::anyhow!("invalid log filter '{directives}': {e}"))
}

/// Install the global subscriber, plain text or JSON lines
pub fn init_logging(config: &LoggingConfig, verbose: bool) -> anyhow::Result<()> {
    let filter = build_filter(config, verbose)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))
}
