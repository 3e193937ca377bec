//! Command-line interface for the closing-cost estimator

use crate::config::{CierreConfig, OutputFormat};
use crate::report::Report;
use crate::scenario::{ScenarioArgs, collect_scenarios};
use crate::schedule_cache::{FileScheduleSource, ScheduleCache, ScheduleSource};
use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use cierre_core::{CalculationEngine, CierreError, FeeSchedule, Pricing};
use std::fmt::Write;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "cierre")]
#[command(about = "Closing-cost estimates for residential purchases in Mexico")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to $CIERRE_CONFIG_PATH or ./cierre.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Fee schedule JSON, overriding the configured path
    #[arg(long, global = true)]
    pub schedule: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Estimate closing costs for one or more purchases
    Estimate(EstimateArgs),
    /// Load and validate the fee schedule
    Validate,
    /// List the states the fee schedule prices
    States,
}

#[derive(Args, Debug, Default)]
pub struct EstimateArgs {
    #[command(flatten)]
    pub scenario: ScenarioArgs,

    /// JSON file holding a scenario or an array of scenarios (repeatable)
    #[arg(long = "scenario-file", value_name = "FILE")]
    pub scenario_files: Vec<PathBuf>,

    /// Output format, overriding the configured one
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Date printed on the report (YYYY-MM-DD), today by default
    #[arg(long)]
    pub prepared_date: Option<NaiveDate>,
}

/// Runs commands against one schedule cache
pub struct CliRunner {
    config: CierreConfig,
    cache: ScheduleCache,
}

impl CliRunner {
    pub fn new(config: CierreConfig) -> Self {
        let cache = ScheduleCache::new(config.schedule.cache_ttl_minutes);
        Self { config, cache }
    }

    pub fn cache(&self) -> &ScheduleCache {
        &self.cache
    }

    /// Execute `cli` and return what should be printed
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<String> {
        let source = FileScheduleSource::new(
            cli.schedule.clone().unwrap_or_else(|| self.config.schedule.path.clone()),
        );
        match &cli.command {
            Commands::Estimate(args) => self.estimate(&source, args),
            Commands::Validate => self.validate(&source),
            Commands::States => self.states(&source),
        }
    }

    pub fn estimate(
        &self,
        source: &dyn ScheduleSource,
        args: &EstimateArgs,
    ) -> anyhow::Result<String> {
        let schedule = self.cache.get_or_load(source)?;
        let scenarios = collect_scenarios(&args.scenario_files, &args.scenario)?;
        let engine = CalculationEngine::new(&schedule);
        let prepared = args.prepared_date.unwrap_or_else(|| Utc::now().date_naive());
        let format = args.format.unwrap_or(self.config.report.format);

        let mut results = Vec::with_capacity(scenarios.len());
        for scenario in &scenarios {
            let result = engine
                .calculate(scenario)
                .map_err(describe_error)
                .with_context(|| format!("cannot estimate purchase in '{}'", scenario.state))?;
            info!(
                state = %scenario.state,
                line_items = result.line_items.len(),
                total_min = %result.total_min,
                total_max = %result.total_max,
                "Estimate computed"
            );
            results.push(result);
        }

        let reports = scenarios.iter().zip(&results).map(|(scenario, result)| Report {
            title: &self.config.report.title,
            currency: &self.config.report.currency,
            prepared,
            schedule: &schedule,
            scenario,
            result,
        });

        let rendered = match format {
            OutputFormat::Text => {
                reports.map(|r| r.render_text()).collect::<Vec<_>>().join("\n\n")
            }
            OutputFormat::Json => {
                let mut values = reports.map(|r| r.to_json_value()).collect::<Result<Vec<_>, _>>()?;
                let document = if values.len() == 1 {
                    values.remove(0)
                } else {
                    serde_json::Value::Array(values)
                };
                serde_json::to_string_pretty(&document)?
            }
        };

        match &args.output {
            Some(path) => {
                std::fs::write(path, &rendered)
                    .with_context(|| format!("cannot write report to '{}'", path.display()))?;
                Ok(format!("Wrote {} estimate(s) to {}", results.len(), path.display()))
            }
            None => Ok(rendered),
        }
    }

    pub fn validate(&self, source: &dyn ScheduleSource) -> anyhow::Result<String> {
        let schedule = self
            .cache
            .refresh(source)
            .inspect_err(|e| warn!(source = %source.key(), error = ?e, "Fee schedule rejected"))?;
        Ok(summarize_schedule(&schedule))
    }

    pub fn states(&self, source: &dyn ScheduleSource) -> anyhow::Result<String> {
        let schedule = self.cache.get_or_load(source)?;
        Ok(schedule.states().collect::<Vec<_>>().join("\n"))
    }
}

fn describe_error(error: CierreError) -> anyhow::Error {
    let category = error.category();
    let severity = error.severity();
    anyhow::Error::new(error).context(format!("{category} error ({severity})"))
}

fn summarize_schedule(schedule: &FeeSchedule) -> String {
    let metadata = schedule.metadata();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Fee schedule OK: version {}, {} fees, {} states",
        metadata.version.as_deref().unwrap_or("unversioned"),
        schedule.definitions().len(),
        schedule.states().count(),
    );
    if let Some(last_updated) = metadata.last_updated.as_deref() {
        let _ = writeln!(out, "Last updated: {last_updated}");
    }
    for definition in schedule.definitions() {
        let pricing = match &definition.pricing {
            Pricing::Schedule(_) => "inline",
            Pricing::PerState => "per state",
            Pricing::UserEntered => "add-on",
        };
        let kind = definition.kind.as_str();
        let _ = writeln!(out, "  {:<24} {:<14} {}", definition.id, kind, pricing);
    }
    out.trim_end().to_string()
}
