//! Serializable backtest configuration (TOML).
//!
//! ```toml
//! [data]
//! path = "data/000300.csv"
//! start = "2005-09-01"
//!
//! [performance]
//! risk_free_rate = 0.03
//!
//! [strategy]
//! fill = "long"
//! [strategy.indicator]
//! type = "dma"
//! [strategy.signal]
//! type = "crossover"
//! series = { fast = "dif", slow = "difma" }
//! ```

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use factorlab_core::components::{FactoryError, Strategy, StrategyPreset};
use factorlab_core::fingerprint::StrategyConfig;
use factorlab_core::performance::{self, Annualization, PerformanceConfig};

use crate::data_loader::LoadOptions;

/// Errors from reading or validating a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid performance settings: {0}")]
    Performance(#[from] performance::ConfigError),
    #[error("invalid strategy: {0}")]
    Strategy(#[from] FactoryError),
    #[error("data window start {start} is after end {end}")]
    InvertedWindow { start: NaiveDate, end: NaiveDate },
}

/// `[data]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataSection {
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
    #[serde(default)]
    pub derive_pct_chg: bool,
}

/// `[performance]` section. Every key is optional.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PerformanceSection {
    pub risk_free_rate: f64,
    pub trading_days_per_year: f64,
    pub bar_minutes: f64,
    pub settle_open_trade: bool,
}

impl PerformanceSection {
    /// Validated engine config.
    pub fn to_config(&self) -> Result<PerformanceConfig, ConfigError> {
        let annualization = Annualization {
            trading_days_per_year: self.trading_days_per_year,
            bar_minutes: self.bar_minutes,
        };
        Ok(PerformanceConfig::new(self.risk_free_rate, annualization)?
            .with_settle_open_trade(self.settle_open_trade))
    }
}

impl Default for PerformanceSection {
    fn default() -> Self {
        let daily = Annualization::daily();
        Self {
            risk_free_rate: performance::config::DEFAULT_RISK_FREE_RATE,
            trading_days_per_year: daily.trading_days_per_year,
            bar_minutes: daily.bar_minutes,
            settle_open_trade: false,
        }
    }
}

/// Complete description of one backtest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestConfig {
    pub data: DataSection,
    #[serde(default)]
    pub performance: PerformanceSection,
    pub strategy: StrategyConfig,
}

impl BacktestConfig {
    /// Load and validate a config file. A relative `data.path` is resolved
    /// against the config file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&content)?;
        if config.data.path.is_relative() {
            if let Some(dir) = path.parent() {
                config.data.path = dir.join(&config.data.path);
            }
        }
        Ok(config)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// A preset strategy over `data_path` with default performance settings.
    pub fn from_preset(preset: StrategyPreset, data_path: impl Into<PathBuf>) -> Self {
        Self {
            data: DataSection {
                path: data_path.into(),
                symbol: None,
                start: None,
                end: None,
                derive_pct_chg: false,
            },
            performance: PerformanceSection::default(),
            strategy: preset.to_config(),
        }
    }

    /// Reject anything that would fail later: bad annualization, unknown
    /// components, a rule reading factors its indicator does not produce.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let (Some(start), Some(end)) = (self.data.start, self.data.end) {
            if start > end {
                return Err(ConfigError::InvertedWindow { start, end });
            }
        }
        self.performance_config()?;
        Strategy::from_config(&self.strategy)?;
        Ok(())
    }

    pub fn performance_config(&self) -> Result<PerformanceConfig, ConfigError> {
        self.performance.to_config()
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            symbol: self.data.symbol.clone(),
            start: self.data.start,
            end: self.data.end,
            derive_pct_chg: self.data.derive_pct_chg,
        }
    }
}
