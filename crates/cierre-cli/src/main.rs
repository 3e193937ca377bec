use cierre_cli::logging::init_logging;
use cierre_cli::{CierreConfig, Cli, CliRunner, ConfigSource};
use clap::Parser;
use tracing::{debug, info, warn};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = CierreConfig::load(cli.config.as_deref())?;
    init_logging(&config.logging, cli.verbose)?;

    match &config.source {
        ConfigSource::File(path) => info!(path = %path.display(), "Configuration loaded"),
        ConfigSource::Defaults => warn!("No configuration file found, using defaults"),
    }
    debug!(?config, "Effective configuration");

    let runner = CliRunner::new(config);
    let output = runner.execute(&cli)?;
    println!("{output}");

    let stats = runner.cache().stats();
    debug!(
        hits = stats.cache_hits,
        misses = stats.cache_misses,
        loads = stats.total_loads,
        "Schedule cache statistics"
    );
    Ok(())
}
