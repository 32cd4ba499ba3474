//! FactorLab CLI — run, sweep and rolling-selection commands.
//!
//! Commands:
//! - `run` — backtest one strategy from a TOML config or a named preset
//! - `sweep` — rank a preset over a grid of indicator parameters
//! - `rolling` — walk-forward parameter selection over a grid
//! - `presets` — list the built-in strategies
//!
//! Reports go to stdout, logs to stderr (`RUST_LOG`, default `info`).

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use factorlab_core::components::StrategyPreset;
use factorlab_core::domain::BarSeries;
use factorlab_core::performance::PerformanceConfig;
use factorlab_runner::config::PerformanceSection;
use factorlab_runner::export::{backtest_scorecard, rolling_scorecard};
use factorlab_runner::{
    load_bars, rolling_best, run_backtest, run_from_config, save_artifacts, save_rolling,
    save_sweep, synthetic_bars, BacktestConfig, FitnessMetric, LoadOptions, ParamGrid, ParamSweep,
};

#[derive(Parser)]
#[command(
    name = "factorlab",
    version,
    about = "FactorLab — indicator-driven factor timing backtests"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backtest one strategy from a TOML config file or a named preset.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Named preset (see `factorlab presets`).
        #[arg(long, value_parser = parse_preset)]
        preset: Option<StrategyPreset>,

        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        performance: PerformanceArgs,

        /// Directory for summary.json, overlay.csv, trades.csv and scorecard.txt.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Rank a preset over a grid of indicator parameters.
    Sweep {
        #[arg(long, value_parser = parse_preset)]
        preset: StrategyPreset,

        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        performance: PerformanceArgs,

        /// Parameter axis `name=v1,v2,...`; repeat for a cartesian grid.
        #[arg(long = "param", required = true)]
        params: Vec<String>,

        /// Ranking metric: annual_return, cumulative_return, sharpe, return_over_drawdown.
        #[arg(long, default_value_t = FitnessMetric::AnnualReturn)]
        metric: FitnessMetric,

        /// Rows to print.
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Evaluate grid points on one thread.
        #[arg(long, default_value_t = false)]
        serial: bool,

        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Walk-forward selection: pick the best candidate per window.
    Rolling {
        #[arg(long, value_parser = parse_preset)]
        preset: StrategyPreset,

        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        performance: PerformanceArgs,

        /// Candidate axis `name=v1,v2,...`; the preset's own parameters are
        /// always candidate 0.
        #[arg(long = "param")]
        params: Vec<String>,

        /// Window length in bars.
        #[arg(long, default_value_t = 125)]
        choice_period: usize,

        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// List the built-in strategy presets.
    Presets,
}

#[derive(Args)]
struct DataArgs {
    /// Bar CSV file.
    #[arg(long)]
    data: Option<PathBuf>,

    /// Use N synthetic bars instead of a file.
    #[arg(long, conflicts_with = "data")]
    synthetic: Option<usize>,

    /// Seed for synthetic bars.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Symbol; defaults to the file stem.
    #[arg(long)]
    symbol: Option<String>,

    /// First date kept (YYYY-MM-DD, inclusive).
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last date kept (YYYY-MM-DD, inclusive).
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Derive pct_chg from close when the file has no pct_chg column.
    #[arg(long, default_value_t = false)]
    derive_pct_chg: bool,
}

#[derive(Args)]
struct PerformanceArgs {
    /// Annual risk-free rate.
    #[arg(long)]
    risk_free_rate: Option<f64>,

    /// Trading days per year.
    #[arg(long)]
    trading_days: Option<f64>,

    /// Bar length in minutes (1440 = daily).
    #[arg(long)]
    bar_minutes: Option<f64>,

    /// Count a run still open at the last bar as a settled trade.
    #[arg(long, default_value_t = false)]
    settle_open_trade: bool,
}

impl PerformanceArgs {
    fn apply(&self, mut section: PerformanceSection) -> PerformanceSection {
        if let Some(rate) = self.risk_free_rate {
            section.risk_free_rate = rate;
        }
        if let Some(days) = self.trading_days {
            section.trading_days_per_year = days;
        }
        if let Some(minutes) = self.bar_minutes {
            section.bar_minutes = minutes;
        }
        section.settle_open_trade |= self.settle_open_trade;
        section
    }

    fn config(&self) -> Result<PerformanceConfig> {
        self.apply(PerformanceSection::default())
            .to_config()
            .context("invalid performance settings")
    }
}

fn parse_preset(name: &str) -> Result<StrategyPreset, String> {
    StrategyPreset::from_name(name).ok_or_else(|| {
        let known: Vec<_> = StrategyPreset::all().iter().map(|p| p.name()).collect();
        format!("unknown preset '{name}' (expected one of {})", known.join(", "))
    })
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            preset,
            data,
            performance,
            output_dir,
        } => run_cmd(config, preset, &data, &performance, output_dir),
        Commands::Sweep {
            preset,
            data,
            performance,
            params,
            metric,
            top,
            serial,
            output_dir,
        } => sweep_cmd(preset, &data, &performance, &params, metric, top, serial, output_dir),
        Commands::Rolling {
            preset,
            data,
            performance,
            params,
            choice_period,
            output_dir,
        } => rolling_cmd(preset, &data, &performance, &params, choice_period, output_dir),
        Commands::Presets => {
            list_presets();
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_data(args: &DataArgs) -> Result<BarSeries> {
    if let Some(n) = args.synthetic {
        let symbol = args.symbol.as_deref().unwrap_or("SYNTH");
        return Ok(synthetic_bars(symbol, n, args.seed)?);
    }
    let Some(path) = &args.data else {
        bail!("one of --data or --synthetic is required");
    };
    let opts = LoadOptions {
        symbol: args.symbol.clone(),
        start: args.start,
        end: args.end,
        derive_pct_chg: args.derive_pct_chg,
    };
    load_bars(path, &opts).with_context(|| format!("failed to load {}", path.display()))
}

fn run_cmd(
    config_path: Option<PathBuf>,
    preset: Option<StrategyPreset>,
    data: &DataArgs,
    performance: &PerformanceArgs,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let (bars, result) = match (config_path, preset) {
        (Some(_), Some(_)) => bail!("--config and --preset are mutually exclusive"),
        (None, None) => bail!("one of --config or --preset is required"),
        (Some(path), None) => {
            if data.data.is_some() || data.synthetic.is_some() {
                bail!("--config names its own data; drop --data/--synthetic");
            }
            if data.symbol.is_some() || data.start.is_some() || data.end.is_some() {
                warn!("--symbol/--start/--end are ignored with --config; set them in [data]");
            }
            let mut config = BacktestConfig::from_file(&path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            config.performance = performance.apply(config.performance);
            run_from_config(&config)?
        }
        (None, Some(preset)) => {
            let bars = load_data(data)?;
            let result = run_backtest(&bars, &preset.to_config(), &performance.config()?)?;
            (bars, result)
        }
    };

    print!("{}", backtest_scorecard(&result));
    if let Some(dir) = output_dir {
        let run_dir = save_artifacts(&result, &bars, &dir)?;
        println!("\nArtifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn sweep_cmd(
    preset: StrategyPreset,
    data: &DataArgs,
    performance: &PerformanceArgs,
    params: &[String],
    metric: FitnessMetric,
    top: usize,
    serial: bool,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let grid = ParamGrid::from_specs(params)?;
    let bars = load_data(data)?;
    let results = ParamSweep::new(performance.config()?, metric)
        .with_parallelism(!serial)
        .run(&bars, &preset.to_config(), &grid)?;

    println!(
        "{} on {}: {} grid points ranked by {metric}",
        preset,
        bars.symbol(),
        results.len()
    );
    println!(
        "{:>4}  {:<32} {:>10} {:>10} {:>9} {:>8} {:>7}",
        "rank", "params", "cum_ret", "ann_ret", "max_dd", "sharpe", "trades"
    );
    for (rank, entry) in results.entries.iter().take(top).enumerate() {
        let params = entry
            .params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(" ");
        let s = &entry.summary;
        println!(
            "{:>4}  {:<32} {:>9.2}% {:>10} {:>8.2}% {:>8} {:>7}",
            rank + 1,
            params,
            s.cumulative_return * 100.0,
            s.annual_return
                .value()
                .map_or_else(|| "-".to_string(), |v| format!("{:.2}%", v * 100.0)),
            s.max_drawdown * 100.0,
            s.sharpe
                .value()
                .map_or_else(|| "-".to_string(), |v| format!("{v:.3}")),
            s.trade_count()
        );
    }

    if let Some(dir) = output_dir {
        let saved = save_sweep(&results, bars.symbol(), &dir)?;
        println!("\nSweep saved to: {}", saved.display());
    }
    Ok(())
}

fn rolling_cmd(
    preset: StrategyPreset,
    data: &DataArgs,
    performance: &PerformanceArgs,
    params: &[String],
    choice_period: usize,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let grid = ParamGrid::from_specs(params)?;
    let bars = load_data(data)?;
    let selection = rolling_best(
        &bars,
        &preset.to_config(),
        &grid,
        &performance.config()?,
        choice_period,
    )?;

    print!("{}", rolling_scorecard(&bars, &selection));
    if let Some(dir) = output_dir {
        let saved = save_rolling(&selection, &bars, &dir)?;
        println!("\nArtifacts saved to: {}", saved.display());
    }
    Ok(())
}

fn list_presets() {
    for preset in StrategyPreset::all() {
        let config = preset.to_config();
        println!(
            "{:<10} {:<12} {:<14} fill={:<5} {}",
            preset.name(),
            config.indicator.component_type,
            config.signal.component_type,
            config.fill,
            preset.describe()
        );
    }
}
