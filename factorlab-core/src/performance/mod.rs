//! Performance engine — the per-bar overlay and the summary scorecard for a
//! resolved position series.
//!
//! ```text
//! bars + position ──▶ compute_overlay ──▶ segment_trades ──▶ summarize
//! ```

pub mod config;
pub mod overlay;
pub mod segmentation;
pub mod statistic;
pub mod summary;

pub use config::{Annualization, ConfigError, PerformanceConfig};
pub use overlay::{compute_overlay, Overlay};
pub use segmentation::{segment_trades, SideStats, TradeLedger};
pub use statistic::{Degenerate, Statistic};
pub use summary::{summarize, SideSummary, Summary};

use serde::{Deserialize, Serialize};

use crate::domain::{BarSeries, Position, SeriesError};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PerformanceError {
    #[error("position series does not match bars: {0}")]
    Series(#[from] SeriesError),
}

/// Overlay, ledger and summary of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub overlay: Overlay,
    pub ledger: TradeLedger,
    pub summary: Summary,
}

/// Run the whole engine over one position series.
pub fn evaluate(
    bars: &BarSeries,
    position: &[Position],
    config: &PerformanceConfig,
) -> Result<Evaluation, PerformanceError> {
    let overlay = compute_overlay(bars, position, config)?;
    let ledger = segment_trades(
        &overlay.position,
        &overlay.held_return,
        config.settle_open_trade(),
    );
    let summary = summarize(&overlay, &ledger, config);
    tracing::debug!(
        bars = summary.bar_count,
        trades = summary.trade_count(),
        cumulative_return = summary.cumulative_return,
        "performance evaluated"
    );
    Ok(Evaluation {
        overlay,
        ledger,
        summary,
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::domain::{Bar, BarSeries};
    use chrono::NaiveDate;

    /// Daily series with the given percent returns and a close that follows
    /// them from 100.
    pub fn series_from_pct(pct: &[f64]) -> BarSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let mut close = 100.0;
        let bars = pct
            .iter()
            .enumerate()
            .map(|(i, p)| {
                close *= 1.0 + p / 100.0;
                Bar::new(start + chrono::Duration::days(i as i64), close, *p)
            })
            .collect();
        BarSeries::new("TEST", bars).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::series_from_pct;
    use super::*;
    use Position::{Flat, Long, Short};

    #[test]
    fn mixed_run_scenario() {
        let bars = series_from_pct(&[1.0, 2.0, -1.0, 1.0, 2.0]);
        let pos = [Long, Long, Short, Short, Long];
        let ev = evaluate(&bars, &pos, &PerformanceConfig::default()).unwrap();

        let expected = [0.01, 0.02, 0.01, -0.01, 0.02];
        for (got, want) in ev.overlay.held_return.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12);
        }
        let cum = 1.01 * 1.02 * 1.01 * 0.99 * 1.02 - 1.0;
        assert!((ev.summary.cumulative_return - cum).abs() < 1e-12);
        assert_eq!(ev.summary.long.trades, 1);
        assert_eq!(ev.summary.long.winning_bars, 2);
        assert_eq!(ev.summary.short.trades, 1);
        assert_eq!(ev.summary.short.bars_held, 2);
        assert_eq!(ev.summary.short.winning_bars, 1);
        assert_eq!(ev.summary.bars_in_market, 5);
        assert_eq!(ev.summary.winning_bars, 4);
        assert_eq!(ev.summary.bar_win_rate, Statistic::Defined(0.8));
        assert!(ev.summary.open_trade.is_some());
    }

    #[test]
    fn all_flat_reports_undefined_ratios() {
        let bars = series_from_pct(&[1.0, -3.0, 2.0, 0.5, -0.5, 4.0, -2.0, 1.0, 1.0, -1.0]);
        let pos = [Flat; 10];
        let ev = evaluate(&bars, &pos, &PerformanceConfig::default()).unwrap();
        let s = &ev.summary;
        assert_eq!(s.max_drawdown, 0.0);
        assert_eq!(s.annual_return, Statistic::Defined(0.0));
        assert_eq!(s.best_trade, Statistic::Undefined(Degenerate::NoTrades));
        assert_eq!(
            s.return_over_drawdown,
            Statistic::Undefined(Degenerate::ZeroDrawdown)
        );
        assert_eq!(s.sharpe, Statistic::Undefined(Degenerate::ZeroVolatility));
        assert_eq!(s.long.win_rate, Statistic::Undefined(Degenerate::NoTrades));
        assert_eq!(
            s.bar_win_rate,
            Statistic::Undefined(Degenerate::NoBarsInMarket)
        );
    }

    #[test]
    fn single_bar_volatility_is_undefined() {
        let bars = series_from_pct(&[1.0]);
        let ev = evaluate(&bars, &[Long], &PerformanceConfig::default()).unwrap();
        assert_eq!(
            ev.summary.annual_volatility,
            Statistic::Undefined(Degenerate::InsufficientBars)
        );
        assert_eq!(
            ev.summary.sharpe,
            Statistic::Undefined(Degenerate::InsufficientBars)
        );
    }

    #[test]
    fn sharpe_is_annual_return_over_volatility() {
        let bars = series_from_pct(&[1.0, -0.5, 0.8, 0.3, -0.2]);
        let ev = evaluate(&bars, &[Long; 5], &PerformanceConfig::default()).unwrap();
        let s = &ev.summary;
        let vol = s.annual_volatility.value().unwrap();
        let annual = s.annual_return.value().unwrap();
        assert!((s.sharpe.value().unwrap() - annual / vol).abs() < 1e-12);
        assert!(s.return_over_drawdown.is_defined());
    }

    #[test]
    fn overflowing_annualization_survives_json() {
        // five +5% one-minute bars compound past f64 range over a year
        let bars = series_from_pct(&[5.0; 5]);
        let config = PerformanceConfig::new(0.0, Annualization::intraday(1.0)).unwrap();
        let ev = evaluate(&bars, &[Long; 5], &config).unwrap();
        let s = &ev.summary;
        assert_eq!(s.annual_return, Statistic::Undefined(Degenerate::NonFinite));
        assert_eq!(s.sharpe, Statistic::Undefined(Degenerate::NonFinite));
        assert_eq!(
            s.return_over_drawdown,
            Statistic::Undefined(Degenerate::NonFinite)
        );
        assert!(s.cumulative_return.is_finite());

        let json = serde_json::to_string(s).unwrap();
        assert!(!json.contains("null"), "{json}");
        let back: Summary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.annual_return, s.annual_return);
        assert_eq!(back.sharpe, s.sharpe);
        assert_eq!(back.bar_count, 5);
        assert!((back.cumulative_return - s.cumulative_return).abs() < 1e-12);
    }

    #[test]
    fn trade_extremes_come_from_settled_trades() {
        let bars = series_from_pct(&[1.0, 2.0, -1.0, -1.0, 3.0, 1.0, 1.0]);
        let pos = [Long, Long, Flat, Short, Short, Long, Long];
        let ev = evaluate(&bars, &pos, &PerformanceConfig::default()).unwrap();
        let s = &ev.summary;
        // settled: long 1.01·1.02 - 1, short 1.01·0.97 - 1; the final long is open
        let long_ret = 1.01 * 1.02 - 1.0;
        let short_ret = 1.01 * 0.97 - 1.0;
        assert!((s.best_trade.value().unwrap() - long_ret).abs() < 1e-12);
        assert!((s.worst_trade.value().unwrap() - short_ret).abs() < 1e-12);
        let ratio = s.profit_loss_ratio.value().unwrap();
        assert!((ratio - long_ret / short_ret.abs()).abs() < 1e-9);
    }
}
