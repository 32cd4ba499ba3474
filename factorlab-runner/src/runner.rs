//! Backtest runner — wires together composition, resolver and the
//! performance engine.
//!
//! Two entry points:
//! - `run_backtest()`: pre-loaded bars + strategy + performance config. No I/O.
//! - `run_from_config()`: loads the bars a `BacktestConfig` names, then runs.

use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use factorlab_core::components::{FactorSet, FactoryError, Strategy};
use factorlab_core::domain::{BarSeries, SeriesError, Side, Signal};
use factorlab_core::fingerprint::{ConfigHash, DatasetHash, StrategyConfig};
use factorlab_core::performance::{evaluate, Evaluation, PerformanceConfig, PerformanceError};

use crate::config::{BacktestConfig, ConfigError};
use crate::data_loader::{load_bars, LoadError};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("composition error: {0}")]
    Composition(#[from] FactoryError),
    #[error("series error: {0}")]
    Series(#[from] SeriesError),
    #[error("performance error: {0}")]
    Performance(#[from] PerformanceError),
    #[error("invalid parameter grid: {0}")]
    Grid(String),
    #[error("choice period {choice_period} needs more than {needed} bars, got {bars}")]
    ChoicePeriod {
        choice_period: usize,
        needed: usize,
        bars: usize,
    },
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single backtest run.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestResult {
    pub schema_version: u32,
    pub symbol: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub bar_count: usize,
    pub indicator: String,
    pub strategy: StrategyConfig,
    pub config_hash: ConfigHash,
    pub dataset_hash: DatasetHash,
    /// Bars whose signal was a decision (Long, Short or Flat).
    pub signal_count: usize,
    /// Indicator lookback: bars before the first complete factor value.
    pub warmup_bars: usize,
    #[serde(flatten)]
    pub evaluation: Evaluation,
    #[serde(skip)]
    pub factors: FactorSet,
    #[serde(skip)]
    pub signals: Vec<Signal>,
}

impl BacktestResult {
    pub fn summary(&self) -> &factorlab_core::performance::Summary {
        &self.evaluation.summary
    }
}

/// Run a backtest over pre-loaded bars.
pub fn run_backtest(
    bars: &BarSeries,
    strategy_config: &StrategyConfig,
    performance: &PerformanceConfig,
) -> Result<BacktestResult, RunError> {
    let strategy = Strategy::from_config(strategy_config)?;
    let run = strategy.positions(bars)?;
    let evaluation = evaluate(bars, &run.positions, performance)?;

    let summary = &evaluation.summary;
    for side in [Side::Long, Side::Short] {
        if evaluation.ledger.side(side).trades == 0 {
            warn!(%side, "no settled trades on this side; its ratios are undefined");
        }
    }
    let signal_count = run.signals.iter().filter(|s| s.is_decision()).count();
    info!(
        symbol = bars.symbol(),
        indicator = strategy.indicator.name(),
        bars = bars.len(),
        trades = summary.trade_count(),
        cumulative_return = summary.cumulative_return,
        max_drawdown = summary.max_drawdown,
        "backtest complete"
    );

    Ok(BacktestResult {
        schema_version: SCHEMA_VERSION,
        symbol: bars.symbol().to_string(),
        start: bars.first_timestamp(),
        end: bars.last_timestamp(),
        bar_count: bars.len(),
        indicator: strategy.indicator.name().to_string(),
        strategy: strategy_config.clone(),
        config_hash: strategy_config.config_hash(performance),
        dataset_hash: DatasetHash::of(bars),
        signal_count,
        warmup_bars: strategy.indicator.lookback(),
        evaluation,
        factors: run.factors,
        signals: run.signals,
    })
}

/// Load the configured data and run. Returns the bars alongside the result
/// so callers can export the overlay against dates.
pub fn run_from_config(config: &BacktestConfig) -> Result<(BarSeries, BacktestResult), RunError> {
    let bars = load_bars(&config.data.path, &config.load_options())?;
    let performance = config.performance_config()?;
    let result = run_backtest(&bars, &config.strategy, &performance)?;
    Ok((bars, result))
}
