//! Run fingerprinting — deterministic identification of a backtest.
//!
//! - `ComponentConfig`: one component (indicator or signal rule) + parameters.
//! - `StrategyConfig`: indicator + signal rule + leading fill policy.
//! - `ConfigHash`: BLAKE3 over the canonical JSON of strategy + performance config.
//! - `DatasetHash`: BLAKE3 over the bar data.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::BarSeries;
use crate::performance::PerformanceConfig;
use crate::resolver::FillPolicy;

/// Configuration of a single component.
///
/// `params` holds numeric knobs; `series` binds a rule's roles (for example
/// `fast`, `slow`) to factor names. Both use `BTreeMap` so serialization,
/// and therefore hashing, has a fixed key order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComponentConfig {
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(default)]
    pub params: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub series: BTreeMap<String, String>,
}

impl ComponentConfig {
    pub fn new(component_type: impl Into<String>) -> Self {
        Self {
            component_type: component_type.into(),
            params: BTreeMap::new(),
            series: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: f64) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    pub fn with_series(mut self, role: impl Into<String>, factor: impl Into<String>) -> Self {
        self.series.insert(role.into(), factor.into());
        self
    }
}

/// Complete strategy: what to compute, how to decide, and what to hold
/// before the first decision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrategyConfig {
    #[serde(default)]
    pub fill: FillPolicy,
    pub indicator: ComponentConfig,
    pub signal: ComponentConfig,
}

impl StrategyConfig {
    /// Exact identity of a run's configuration.
    pub fn config_hash(&self, performance: &PerformanceConfig) -> ConfigHash {
        #[derive(Serialize)]
        struct Canonical<'a> {
            strategy: &'a StrategyConfig,
            performance: &'a PerformanceConfig,
        }
        let canonical = Canonical {
            strategy: self,
            performance,
        };
        // Only f64/String/BTreeMap fields: serialization cannot fail, but a
        // failure still hashes to a stable value rather than panicking.
        let json = serde_json::to_vec(&canonical).unwrap_or_default();
        ConfigHash::from_bytes(&json)
    }
}

/// Hex-encoded BLAKE3 hash of a run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigHash(pub String);

impl ConfigHash {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes).to_hex().to_string())
    }
}

impl fmt::Display for ConfigHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hex-encoded BLAKE3 hash of a bar series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetHash(pub String);

impl DatasetHash {
    /// Hashes symbol, timestamps, and every column value bit-for-bit.
    pub fn of(series: &BarSeries) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(series.symbol().as_bytes());
        for bar in series.bars() {
            hasher.update(&bar.timestamp.and_utc().timestamp().to_le_bytes());
            for value in [
                bar.open, bar.high, bar.low, Some(bar.close), bar.volume, bar.amount,
                bar.turnover, Some(bar.pct_chg),
            ] {
                let bits = value.map_or(u64::MAX, f64::to_bits);
                hasher.update(&bits.to_le_bytes());
            }
        }
        Self(hasher.finalize().to_hex().to_string())
    }
}

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::performance::test_support::series_from_pct;

    fn sample_config() -> StrategyConfig {
        StrategyConfig {
            fill: FillPolicy::Long,
            indicator: ComponentConfig::new("dma")
                .with_param("n1", 10.0)
                .with_param("n2", 50.0)
                .with_param("m", 10.0),
            signal: ComponentConfig::new("crossover")
                .with_series("fast", "dif")
                .with_series("slow", "difma"),
        }
    }

    #[test]
    fn hashing_is_deterministic() {
        let config = sample_config();
        let perf = PerformanceConfig::default();
        assert_eq!(config.config_hash(&perf), config.config_hash(&perf));
        assert_eq!(config.config_hash(&perf).0.len(), 64);
    }

    #[test]
    fn hash_changes_with_params_fill_and_performance() {
        let base = sample_config();
        let perf = PerformanceConfig::default();

        let mut params = sample_config();
        params.indicator.params.insert("n1".into(), 5.0);
        assert_ne!(base.config_hash(&perf), params.config_hash(&perf));

        let mut fill = sample_config();
        fill.fill = FillPolicy::Flat;
        assert_ne!(base.config_hash(&perf), fill.config_hash(&perf));

        let settled = perf.with_settle_open_trade(true);
        assert_ne!(base.config_hash(&perf), base.config_hash(&settled));
    }

    #[test]
    fn strategy_config_serialization_roundtrip() {
        let config = sample_config();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"type\":\"dma\""));
        let deser: StrategyConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deser);
    }

    #[test]
    fn params_and_series_default_to_empty() {
        let deser: ComponentConfig = serde_json::from_str(r#"{"type":"obv"}"#).unwrap();
        assert_eq!(deser, ComponentConfig::new("obv"));
    }

    #[test]
    fn dataset_hash_tracks_values() {
        let a = series_from_pct(&[1.0, 2.0, 3.0]);
        let b = series_from_pct(&[1.0, 2.0, 3.5]);
        assert_eq!(DatasetHash::of(&a), DatasetHash::of(&a));
        assert_ne!(DatasetHash::of(&a), DatasetHash::of(&b));
    }
}
