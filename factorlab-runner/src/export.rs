//! Reporting and export — CSV, JSON and plain-text artifacts.
//!
//! - **Overlay CSV**: one row per bar with the performance columns and every
//!   factor the indicator produced.
//! - **Trades CSV**: the settled trade tape plus the open run, if any.
//! - **JSON**: the serialized `BacktestResult` / sweep / rolling selection.
//! - **Scorecard**: aligned plain text for terminals.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Timelike};

use factorlab_core::components::FactorSet;
use factorlab_core::domain::{BarSeries, Trade};
use factorlab_core::performance::{Overlay, Statistic, Summary, TradeLedger};

use crate::rolling::RollingSelection;
use crate::runner::BacktestResult;
use crate::sweep::SweepResults;

// ─── CSV export ─────────────────────────────────────────────────────

/// Dates without a time of day print as `YYYY-MM-DD`.
pub fn format_timestamp(ts: NaiveDateTime) -> String {
    if ts.num_seconds_from_midnight() == 0 {
        ts.format("%Y-%m-%d").to_string()
    } else {
        ts.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// NaN prints as an empty cell.
fn cell(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Per-bar overlay followed by factor columns in name order.
pub fn export_overlay_csv(bars: &BarSeries, overlay: &Overlay, factors: &FactorSet) -> Result<String> {
    bars.check_aligned(overlay.len())?;
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header: Vec<&str> = vec![
        "date",
        "close",
        "pct_chg",
        "position",
        "held_return",
        "held_win",
        "cumulative_return",
        "drawdown",
        "excess_return",
    ];
    header.extend(factors.names());
    wtr.write_record(&header)?;

    for (i, bar) in bars.bars().iter().enumerate() {
        let mut row = vec![
            format_timestamp(bar.timestamp),
            bar.close.to_string(),
            bar.pct_chg.to_string(),
            overlay.position[i].as_i8().to_string(),
            overlay.held_return[i].to_string(),
            u8::from(overlay.held_win[i]).to_string(),
            overlay.cumulative_return[i].to_string(),
            overlay.drawdown[i].to_string(),
            overlay.excess_return[i].to_string(),
        ];
        row.extend(
            factors
                .iter()
                .map(|(_, values)| values.get(i).copied().map(cell).unwrap_or_default()),
        );
        wtr.write_record(&row)?;
    }
    finish(wtr)
}

fn trade_row(bars: &BarSeries, trade: &Trade, status: &str) -> Vec<String> {
    let date = |idx: usize| {
        bars.bars()
            .get(idx)
            .map(|b| format_timestamp(b.timestamp))
            .unwrap_or_default()
    };
    vec![
        trade.side.to_string(),
        trade.entry_index.to_string(),
        date(trade.entry_index),
        trade.exit_index.to_string(),
        date(trade.exit_index),
        trade.bars_held.to_string(),
        trade.winning_bars.to_string(),
        format!("{:.6}", trade.compounded_return),
        status.to_string(),
    ]
}

/// Trade tape. `exit_date` is the bar the position changed on and is empty
/// for a run that is still open at the end of the data.
pub fn export_trades_csv(bars: &BarSeries, ledger: &TradeLedger) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "side",
        "entry_bar",
        "entry_date",
        "exit_bar",
        "exit_date",
        "bars_held",
        "winning_bars",
        "return",
        "status",
    ])?;
    for trade in &ledger.trades {
        wtr.write_record(trade_row(bars, trade, "settled"))?;
    }
    if let Some(open) = &ledger.open_trade {
        wtr.write_record(trade_row(bars, open, "open"))?;
    }
    finish(wtr)
}

/// Ranked sweep table: rank, one column per swept parameter, then the
/// headline statistics.
pub fn export_sweep_csv(results: &SweepResults) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    let param_names: Vec<&str> = results
        .entries
        .first()
        .map(|e| e.params.keys().map(String::as_str).collect())
        .unwrap_or_default();

    let mut header = vec!["rank"];
    header.extend(&param_names);
    header.extend([
        "cumulative_return",
        "annual_return",
        "max_drawdown",
        "sharpe",
        "return_over_drawdown",
        "trades",
        "config_hash",
    ]);
    wtr.write_record(&header)?;

    for (rank, entry) in results.entries.iter().enumerate() {
        let s = &entry.summary;
        let mut row = vec![(rank + 1).to_string()];
        row.extend(
            param_names
                .iter()
                .map(|name| entry.params.get(*name).copied().map(cell).unwrap_or_default()),
        );
        row.extend([
            s.cumulative_return.to_string(),
            stat_cell(&s.annual_return),
            s.max_drawdown.to_string(),
            stat_cell(&s.sharpe),
            stat_cell(&s.return_over_drawdown),
            s.trade_count().to_string(),
            entry.config_hash.to_string(),
        ]);
        wtr.write_record(&row)?;
    }
    finish(wtr)
}

fn stat_cell(stat: &Statistic) -> String {
    stat.value().map(cell).unwrap_or_default()
}

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

// ─── Scorecard ──────────────────────────────────────────────────────

fn percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

fn stat_percent(stat: &Statistic) -> String {
    match stat.value() {
        Some(v) => percent(v),
        None => stat.to_string(),
    }
}

fn stat_plain(stat: &Statistic) -> String {
    format!("{stat:.3}")
}

/// Plain-text scorecard: `header` lines first, then the summary.
pub fn render_scorecard(header: &[(&str, String)], summary: &Summary) -> String {
    let mut rows: Vec<(String, String)> = header
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();
    rows.push((String::new(), String::new()));

    let s = summary;
    rows.extend([
        ("Cumulative return".into(), percent(s.cumulative_return)),
        ("Annual return".into(), stat_percent(&s.annual_return)),
        ("Max drawdown".into(), percent(s.max_drawdown)),
        ("Annual volatility".into(), stat_percent(&s.annual_volatility)),
        ("Sharpe".into(), stat_plain(&s.sharpe)),
        ("Return / drawdown".into(), stat_plain(&s.return_over_drawdown)),
        ("Bars in market".into(), format!("{} of {}", s.bars_in_market, s.bar_count)),
        ("Bar win rate".into(), stat_percent(&s.bar_win_rate)),
        ("Best trade".into(), stat_percent(&s.best_trade)),
        ("Worst trade".into(), stat_percent(&s.worst_trade)),
        ("Profit / loss ratio".into(), stat_plain(&s.profit_loss_ratio)),
    ]);
    for (label, side) in [("Long", &s.long), ("Short", &s.short)] {
        rows.push((
            format!("{label} trades"),
            format!(
                "{} (win rate {}, avg hold {:.1} bars)",
                side.trades,
                stat_percent(&side.win_rate),
                side.avg_holding_period,
            ),
        ));
    }
    let open = match &s.open_trade {
        Some(t) => format!(
            "{} since bar {}, {} bars, {}",
            t.side,
            t.entry_index,
            t.bars_held,
            percent(t.compounded_return)
        ),
        None => "none".into(),
    };
    rows.push(("Open trade".into(), open));

    let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    let mut out = String::with_capacity(1024);
    for (key, value) in rows {
        if key.is_empty() {
            out.push('\n');
        } else {
            let _ = writeln!(out, "{key:<width$}  {value}");
        }
    }
    out
}

pub fn backtest_scorecard(result: &BacktestResult) -> String {
    let header = [
        ("Symbol", result.symbol.clone()),
        (
            "Period",
            format!(
                "{} .. {} ({} bars)",
                format_timestamp(result.start),
                format_timestamp(result.end),
                result.bar_count
            ),
        ),
        (
            "Strategy",
            format!(
                "{} / {} (fill {})",
                result.indicator,
                result.strategy.signal.component_type,
                result.strategy.fill
            ),
        ),
        ("Warmup bars", result.warmup_bars.to_string()),
        ("Signals", result.signal_count.to_string()),
        ("Config hash", result.config_hash.to_string()),
        ("Dataset hash", result.dataset_hash.to_string()),
    ];
    render_scorecard(&header, result.summary())
}

pub fn rolling_scorecard(bars: &BarSeries, selection: &RollingSelection) -> String {
    let counts = selection.choice_counts();
    let mut header = vec![
        ("Symbol", bars.symbol().to_string()),
        (
            "Period",
            format!(
                "{} .. {} ({} bars)",
                format_timestamp(bars.first_timestamp()),
                format_timestamp(bars.last_timestamp()),
                bars.len()
            ),
        ),
        ("Choice period", selection.choice_period.to_string()),
    ];
    for (candidate, count) in selection.candidates.iter().zip(&counts) {
        let label = if candidate.params.is_empty() {
            "default".to_string()
        } else {
            candidate
                .params
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(" ")
        };
        header.push(("Chosen", format!("{count:>5}  {label}")));
    }
    render_scorecard(&header, &selection.evaluation.summary)
}

// ─── Artifact bundle ────────────────────────────────────────────────

fn create_run_dir(output_dir: &Path, name: &str) -> Result<PathBuf> {
    let run_dir = output_dir.join(name);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;
    Ok(run_dir)
}

fn write(path: PathBuf, contents: &str) -> Result<()> {
    std::fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))
}

/// Save a single run under `{symbol}_{indicator}_{hash prefix}/`:
/// `summary.json`, `overlay.csv`, `trades.csv` and `scorecard.txt`.
pub fn save_artifacts(result: &BacktestResult, bars: &BarSeries, output_dir: &Path) -> Result<PathBuf> {
    let hash = &result.config_hash.0;
    let name = format!(
        "{}_{}_{}",
        result.symbol,
        result.indicator,
        &hash[..hash.len().min(12)]
    );
    let run_dir = create_run_dir(output_dir, &name)?;

    write(run_dir.join("summary.json"), &export_json(result)?)?;
    write(
        run_dir.join("overlay.csv"),
        &export_overlay_csv(bars, &result.evaluation.overlay, &result.factors)?,
    )?;
    write(
        run_dir.join("trades.csv"),
        &export_trades_csv(bars, &result.evaluation.ledger)?,
    )?;
    write(run_dir.join("scorecard.txt"), &backtest_scorecard(result))?;
    Ok(run_dir)
}

/// Save a sweep as `sweep.csv` + `sweep.json` under `{symbol}_sweep/`.
pub fn save_sweep(results: &SweepResults, symbol: &str, output_dir: &Path) -> Result<PathBuf> {
    let run_dir = create_run_dir(output_dir, &format!("{symbol}_sweep"))?;
    write(run_dir.join("sweep.csv"), &export_sweep_csv(results)?)?;
    let json = serde_json::to_string_pretty(results).context("failed to serialize sweep results")?;
    write(run_dir.join("sweep.json"), &json)?;
    Ok(run_dir)
}

/// Save a rolling selection under `{symbol}_rolling_{choice_period}/`. The
/// overlay gains a `chosen` column holding the candidate index.
pub fn save_rolling(
    selection: &RollingSelection,
    bars: &BarSeries,
    output_dir: &Path,
) -> Result<PathBuf> {
    let name = format!("{}_rolling_{}", bars.symbol(), selection.choice_period);
    let run_dir = create_run_dir(output_dir, &name)?;

    let chosen = selection
        .chosen
        .iter()
        .map(|c| c.map_or(f64::NAN, |idx| idx as f64))
        .collect();
    let factors = FactorSet::new().with("chosen", chosen);
    write(
        run_dir.join("overlay.csv"),
        &export_overlay_csv(bars, &selection.evaluation.overlay, &factors)?,
    )?;
    write(
        run_dir.join("trades.csv"),
        &export_trades_csv(bars, &selection.evaluation.ledger)?,
    )?;
    let json = serde_json::to_string_pretty(selection)
        .context("failed to serialize rolling selection")?;
    write(run_dir.join("rolling.json"), &json)?;
    write(run_dir.join("scorecard.txt"), &rolling_scorecard(bars, selection))?;
    Ok(run_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_loader::synthetic_bars;
    use crate::runner::run_backtest;
    use factorlab_core::components::StrategyPreset;
    use factorlab_core::domain::Position;
    use factorlab_core::performance::{evaluate, PerformanceConfig};

    fn dma_run(n: usize) -> (BarSeries, BacktestResult) {
        let bars = synthetic_bars("EXP", n, 9).unwrap();
        let result = run_backtest(
            &bars,
            &StrategyPreset::Dma.to_config(),
            &PerformanceConfig::default(),
        )
        .unwrap();
        (bars, result)
    }

    #[test]
    fn timestamps_drop_midnight() {
        let day = chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(format_timestamp(day.and_hms_opt(0, 0, 0).unwrap()), "2024-03-01");
        assert_eq!(
            format_timestamp(day.and_hms_opt(9, 35, 0).unwrap()),
            "2024-03-01 09:35:00"
        );
    }

    #[test]
    fn overlay_has_factor_columns_and_one_row_per_bar() {
        let (bars, result) = dma_run(80);
        let csv = export_overlay_csv(&bars, &result.evaluation.overlay, &result.factors).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "date,close,pct_chg,position,held_return,held_win,cumulative_return,drawdown,excess_return,dif,difma"
        );
        assert_eq!(lines.count(), 80);
    }

    #[test]
    fn trades_csv_lists_settled_then_open() {
        let bars = crate::test_support::series_from_pct(&[1.0, 2.0, -1.0, 3.0]);
        let positions = [Position::Long, Position::Short, Position::Short, Position::Long];
        let eval = evaluate(&bars, &positions, &PerformanceConfig::default()).unwrap();
        let csv = export_trades_csv(&bars, &eval.ledger).unwrap();
        let rows: Vec<&str> = csv.lines().collect();
        assert_eq!(rows.len(), 1 + eval.ledger.trades.len() + 1);
        assert!(rows[0].starts_with("side,entry_bar"));
        assert!(rows.last().unwrap().ends_with(",open"));
        assert!(rows.last().unwrap().starts_with("long,3,"));
    }

    #[test]
    fn scorecard_shows_undefined_reason() {
        let bars = crate::test_support::series_from_pct(&[1.0, -1.0, 2.0]);
        let eval = evaluate(&bars, &[Position::Flat; 3], &PerformanceConfig::default()).unwrap();
        let text = render_scorecard(&[("Symbol", "T".into())], &eval.summary);
        assert!(text.contains("Return / drawdown"));
        assert!(text.contains("undefined ("));
        assert!(text.contains("Open trade"));
        assert!(text.contains("Best trade"));
        assert!(text.contains("undefined (no trades)"));
    }

    #[test]
    fn overflowed_annual_return_is_named_in_scorecard() {
        let bars = crate::test_support::series_from_pct(&[5.0; 5]);
        let config = PerformanceConfig::new(
            0.0,
            factorlab_core::performance::Annualization::intraday(1.0),
        )
        .unwrap();
        let eval = evaluate(&bars, &[Position::Long; 5], &config).unwrap();
        let text = render_scorecard(&[], &eval.summary);
        assert!(text.contains("undefined (not finite)"));
        assert!(!text.contains("inf"));
    }

    #[test]
    fn json_carries_schema_and_hashes() {
        let (_, result) = dma_run(60);
        let json = export_json(&result).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["schema_version"], 1);
        assert_eq!(value["config_hash"], result.config_hash.0.as_str());
        assert_eq!(value["strategy"]["indicator"]["type"], "dma");
    }

    #[test]
    fn save_artifacts_writes_bundle() {
        let (bars, result) = dma_run(100);
        let dir = tempfile::tempdir().unwrap();
        let run_dir = save_artifacts(&result, &bars, dir.path()).unwrap();
        for file in ["summary.json", "overlay.csv", "trades.csv", "scorecard.txt"] {
            assert!(run_dir.join(file).is_file(), "{file} missing");
        }
        let again = save_artifacts(&result, &bars, dir.path()).unwrap();
        assert_eq!(run_dir, again);
    }
}
