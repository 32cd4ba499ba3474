//! FactorLab Runner — backtest orchestration on top of `factorlab-core`.
//!
//! This crate provides:
//! - TOML run configuration
//! - CSV bar loading and synthetic bars
//! - Single-backtest runner with run fingerprints
//! - Parameter sweeps ranked by a fitness metric
//! - Rolling (walk-forward) parameter selection
//! - CSV / JSON / plain-text export

pub mod config;
pub mod data_loader;
pub mod export;
pub mod fitness;
pub mod rolling;
pub mod runner;
pub mod sweep;

pub use config::{BacktestConfig, ConfigError, DataSection, PerformanceSection};
pub use data_loader::{load_bars, read_bars, synthetic_bars, LoadError, LoadOptions};
pub use export::{save_artifacts, save_rolling, save_sweep};
pub use fitness::FitnessMetric;
pub use rolling::{rolling_best, RollingCandidate, RollingSelection};
pub use runner::{run_backtest, run_from_config, BacktestResult, RunError, SCHEMA_VERSION};
pub use sweep::{sweep, ParamGrid, ParamSweep, SweepEntry, SweepResults};
