use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Where the active configuration came from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    #[default]
    Defaults,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConfig {
    #[serde(default = "default_schedule_path")]
    pub path: PathBuf,
    #[serde(default = "default_cache_ttl_minutes")]
    pub cache_ttl_minutes: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self { path: default_schedule_path(), cache_ttl_minutes: default_cache_ttl_minutes() }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { title: default_title(), currency: default_currency(), format: OutputFormat::Text }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: default_log_filter(), json: false }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct CierreConfig {
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(skip)]
    pub source: ConfigSource,
}

impl CierreConfig {
    /// Loads `explicit_path`, else `CIERRE_CONFIG_PATH`, else `cierre.toml`.
    ///
    /// A missing file yields the defaults; a file that exists but does not
    /// parse is an error.
    pub fn load(explicit_path: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = match explicit_path {
            Some(path) => path.to_path_buf(),
            None => std::env::var("CIERRE_CONFIG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("cierre.toml")),
        };

        match fs::read_to_string(&config_path) {
            Ok(config_str) => {
                let mut config = Self::from_toml_str(&config_str).map_err(|e| {
                    anyhow::anyhow!("invalid configuration in '{}': {e}", config_path.display())
                })?;
                config.source = ConfigSource::File(config_path);
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && explicit_path.is_none() => {
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "cannot read configuration file '{}': {e}",
                config_path.display()
            )),
        }
    }

    pub fn from_toml_str(config_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(config_str)
    }
}

fn default_schedule_path() -> PathBuf {
    PathBuf::from("data/fee_schedule.json")
}

fn default_cache_ttl_minutes() -> u64 {
    60
}

fn default_title() -> String {
    "Cierre Sensei".to_string()
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_log_filter() -> String {
    "warn,cierre=info".to_string()
}
