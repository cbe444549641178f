//! Savings engine configuration
//!
//! ## Configuration Resolution
//!
//! 1. An explicit path (`--config`), else the `PENNYWISE_CONFIG` env var
//! 2. Embedded defaults when no path is given or the file does not exist

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::comparison::DEFAULT_FREQUENCY_THRESHOLD;
use super::projection::DEFAULT_ANNUAL_RATE;
use crate::error::{Error, Result};
use crate::models::TransactionSource;

/// Embedded default config
const DEFAULT_CONFIG: &str = include_str!("../../../../config/pennywise.toml");

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "PENNYWISE_CONFIG";

/// Tunables for the savings engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineConfig {
    pub annual_return_rate: f64,
    /// Provenance trusted for comparison prices; `None` trusts everything
    pub comparison_source: Option<TransactionSource>,
    pub frequency_threshold: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            annual_return_rate: DEFAULT_ANNUAL_RATE,
            comparison_source: Some(TransactionSource::Sync),
            frequency_threshold: DEFAULT_FREQUENCY_THRESHOLD,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    savings: Option<RawSavings>,
}

#[derive(Debug, Deserialize)]
struct RawSavings {
    annual_return_rate: Option<f64>,
    comparison_source: Option<String>,
    frequency_threshold: Option<i64>,
}

impl EngineConfig {
    /// Parse TOML content, filling gaps with defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)?;
        let mut config = Self::default();

        if let Some(savings) = raw.savings {
            if let Some(rate) = savings.annual_return_rate {
                config.annual_return_rate = rate;
            }
            if let Some(source) = savings.comparison_source {
                config.comparison_source = parse_source_filter(&source)?;
            }
            if let Some(threshold) = savings.frequency_threshold {
                config.frequency_threshold = threshold;
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, then `PENNYWISE_CONFIG`, then the embedded defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        let content = match path {
            Some(path) if path.exists() => {
                debug!(path = %path.display(), "Loading engine config");
                fs::read_to_string(&path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?
            }
            Some(path) => {
                warn!(path = %path.display(), "Config file not found, using defaults");
                DEFAULT_CONFIG.to_string()
            }
            None => DEFAULT_CONFIG.to_string(),
        };

        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.annual_return_rate.is_finite() || self.annual_return_rate < 0.0 {
            return Err(Error::Config(format!(
                "annual_return_rate must be a non-negative number, got {}",
                self.annual_return_rate
            )));
        }
        if self.frequency_threshold < 1 {
            return Err(Error::Config(format!(
                "frequency_threshold must be at least 1, got {}",
                self.frequency_threshold
            )));
        }
        Ok(())
    }
}

/// Parse a provenance filter; "all" means no filter
pub fn parse_source_filter(value: &str) -> Result<Option<TransactionSource>> {
    if value.trim().eq_ignore_ascii_case("all") {
        return Ok(None);
    }
    value
        .parse::<TransactionSource>()
        .map(Some)
        .map_err(Error::InvalidInput)
}
