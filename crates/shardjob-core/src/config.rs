//! shardjob.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::types::HandlerKind;

pub const DEFAULT_LOG_FILTER: &str = "info,shardjobd=debug,shardjob=debug";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ShardjobConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub log_filter: Option<String>,
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
    /// Per-family overrides, keyed by handler kind name (`simple`, `script`, ...).
    #[serde(default)]
    pub handlers: BTreeMap<String, HandlerConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            data_dir: default_data_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Serialize create/update/remove for the same logical name in-process.
    #[serde(default = "default_true")]
    pub serialize_by_name: bool,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            serialize_by_name: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandlerConfig {
    /// Failure log template; `{job}` is replaced with the job name.
    pub error_message_format: Option<String>,
}

fn default_port() -> u16 {
    8480
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("/var/lib/shardjob")
}

fn default_true() -> bool {
    true
}

impl ShardjobConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ShardjobConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject handler sections that name no known job family.
    pub fn validate(&self) -> anyhow::Result<()> {
        for key in self.handlers.keys() {
            key.parse::<HandlerKind>()?;
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    /// Failure template for a handler family, falling back to a generic one.
    pub fn error_message_format(&self, kind: HandlerKind) -> String {
        self.handlers
            .get(kind.as_str())
            .and_then(|h| h.error_message_format.clone())
            .unwrap_or_else(|| format!("{kind} job handler failed for [{{job}}]"))
    }
}
