//! Performance configuration: risk-free rate, annualization, open-trade
//! policy. Validated at construction.

use serde::{Deserialize, Serialize};

pub const DEFAULT_RISK_FREE_RATE: f64 = 0.03;
pub const DEFAULT_TRADING_DAYS_PER_YEAR: f64 = 250.0;
pub const MINUTES_PER_DAY: f64 = 1440.0;

/// Malformed configuration. Rejected before any computation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("periods_per_year must be positive and finite, got {0}")]
    NonPositivePeriodsPerYear(f64),
    #[error("risk_free_rate must be finite, got {0}")]
    NonFiniteRiskFreeRate(f64),
    #[error("bar_minutes must be positive and finite, got {0}")]
    InvalidBarMinutes(f64),
}

/// Bar granularity used to derive `periods_per_year`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Annualization {
    pub trading_days_per_year: f64,
    pub bar_minutes: f64,
}

impl Default for Annualization {
    fn default() -> Self {
        Self::daily()
    }
}

impl Annualization {
    /// Daily bars, 250 trading days.
    pub fn daily() -> Self {
        Self {
            trading_days_per_year: DEFAULT_TRADING_DAYS_PER_YEAR,
            bar_minutes: MINUTES_PER_DAY,
        }
    }

    pub fn intraday(bar_minutes: f64) -> Self {
        Self {
            bar_minutes,
            ..Self::daily()
        }
    }

    /// `trading_days_per_year * 1440 / bar_minutes`.
    pub fn periods_per_year(&self) -> Result<f64, ConfigError> {
        if !(self.bar_minutes.is_finite() && self.bar_minutes > 0.0) {
            return Err(ConfigError::InvalidBarMinutes(self.bar_minutes));
        }
        let ppy = self.trading_days_per_year * MINUTES_PER_DAY / self.bar_minutes;
        if !(ppy.is_finite() && ppy > 0.0) {
            return Err(ConfigError::NonPositivePeriodsPerYear(ppy));
        }
        Ok(ppy)
    }
}

/// Knobs consumed by the performance engine.
///
/// Fields are private so a constructed value is always valid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerformanceConfig {
    risk_free_rate: f64,
    periods_per_year: f64,
    settle_open_trade: bool,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            periods_per_year: DEFAULT_TRADING_DAYS_PER_YEAR,
            settle_open_trade: false,
        }
    }
}

impl PerformanceConfig {
    pub fn new(risk_free_rate: f64, annualization: Annualization) -> Result<Self, ConfigError> {
        Self::with_periods_per_year(risk_free_rate, annualization.periods_per_year()?)
    }

    pub fn with_periods_per_year(
        risk_free_rate: f64,
        periods_per_year: f64,
    ) -> Result<Self, ConfigError> {
        if !risk_free_rate.is_finite() {
            return Err(ConfigError::NonFiniteRiskFreeRate(risk_free_rate));
        }
        if !(periods_per_year.is_finite() && periods_per_year > 0.0) {
            return Err(ConfigError::NonPositivePeriodsPerYear(periods_per_year));
        }
        Ok(Self {
            risk_free_rate,
            periods_per_year,
            settle_open_trade: false,
        })
    }

    /// Settle a run still open at the last bar into the side counters.
    pub fn with_settle_open_trade(mut self, settle: bool) -> Self {
        self.settle_open_trade = settle;
        self
    }

    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    pub fn periods_per_year(&self) -> f64 {
        self.periods_per_year
    }

    pub fn settle_open_trade(&self) -> bool {
        self.settle_open_trade
    }

    /// Risk-free rate per bar.
    pub fn per_bar_risk_free(&self) -> f64 {
        self.risk_free_rate / self.periods_per_year
    }
}
