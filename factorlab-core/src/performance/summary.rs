//! Summary scorecard computed once from an overlay and its trade ledger.

use serde::{Deserialize, Serialize};

use crate::domain::Trade;

use super::config::PerformanceConfig;
use super::overlay::Overlay;
use super::segmentation::{SideStats, TradeLedger};
use super::statistic::{Degenerate, Statistic};

/// Settled-trade statistics for one side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SideSummary {
    pub trades: usize,
    pub winning_trades: usize,
    pub bars_held: usize,
    pub winning_bars: usize,
    pub win_rate: Statistic,
    pub avg_holding_period: Statistic,
}

impl From<&SideStats> for SideSummary {
    fn from(stats: &SideStats) -> Self {
        Self {
            trades: stats.trades,
            winning_trades: stats.winning_trades,
            bars_held: stats.bars_held,
            winning_bars: stats.winning_bars,
            win_rate: stats.win_rate(),
            avg_holding_period: stats.avg_holding_period(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub bar_count: usize,
    pub periods_per_year: f64,
    pub cumulative_return: f64,
    /// Undefined when compounding over a short span overflows.
    pub annual_return: Statistic,
    pub max_drawdown: f64,
    pub annual_volatility: Statistic,
    pub sharpe: Statistic,
    /// Annual return over max drawdown.
    pub return_over_drawdown: Statistic,
    pub long: SideSummary,
    pub short: SideSummary,
    /// Bars with nonzero position, including any open run.
    pub bars_in_market: usize,
    pub winning_bars: usize,
    pub bar_win_rate: Statistic,
    /// Largest settled-trade return.
    pub best_trade: Statistic,
    /// Smallest settled-trade return.
    pub worst_trade: Statistic,
    /// Mean winning-trade return over the magnitude of the mean losing one.
    pub profit_loss_ratio: Statistic,
    pub open_trade: Option<Trade>,
}

impl Summary {
    pub fn trade_count(&self) -> usize {
        self.long.trades + self.short.trades
    }
}

/// Build the scorecard.
///
/// Never fails: ratios with structurally zero denominators come back as
/// `Statistic::Undefined` and every other field is still filled in.
pub fn summarize(overlay: &Overlay, ledger: &TradeLedger, config: &PerformanceConfig) -> Summary {
    let bar_count = overlay.len();
    let ppy = config.periods_per_year();
    let cumulative_return = overlay.final_return();
    let max_drawdown = overlay.max_drawdown();
    let annual_return = Statistic::finite(annualize(cumulative_return, bar_count, ppy));

    let annual_volatility = match sample_std(&overlay.excess_return) {
        Some(std) => Statistic::Defined(std * ppy.sqrt()),
        None => Statistic::Undefined(Degenerate::InsufficientBars),
    };
    let sharpe = annual_return.and_then(|ret| {
        annual_volatility.and_then(|vol| Statistic::ratio(ret, vol, Degenerate::ZeroVolatility))
    });
    let return_over_drawdown = annual_return
        .and_then(|ret| Statistic::ratio(ret, max_drawdown, Degenerate::ZeroDrawdown));

    let bars_in_market = overlay.position.iter().filter(|p| p.is_held()).count();
    let winning_bars = overlay.held_win.iter().filter(|w| **w).count();

    Summary {
        bar_count,
        periods_per_year: ppy,
        cumulative_return,
        annual_return,
        max_drawdown,
        annual_volatility,
        sharpe,
        return_over_drawdown,
        long: SideSummary::from(&ledger.long),
        short: SideSummary::from(&ledger.short),
        bars_in_market,
        winning_bars,
        bar_win_rate: Statistic::count_ratio(
            winning_bars,
            bars_in_market,
            Degenerate::NoBarsInMarket,
        ),
        best_trade: extreme_trade(&ledger.trades, f64::max),
        worst_trade: extreme_trade(&ledger.trades, f64::min),
        profit_loss_ratio: profit_loss_ratio(&ledger.trades),
        open_trade: ledger.open_trade.clone(),
    }
}

/// `(1 + cum)^(ppy / n) - 1`. Terminal equity at or below zero is a total
/// loss.
pub fn annualize(cumulative_return: f64, bar_count: usize, periods_per_year: f64) -> f64 {
    if bar_count == 0 {
        return 0.0;
    }
    let terminal = 1.0 + cumulative_return;
    if terminal <= 0.0 {
        return -1.0;
    }
    terminal.powf(periods_per_year / bar_count as f64) - 1.0
}

fn extreme_trade(trades: &[Trade], pick: fn(f64, f64) -> f64) -> Statistic {
    trades
        .iter()
        .map(|t| t.compounded_return)
        .reduce(pick)
        .map_or(Statistic::Undefined(Degenerate::NoTrades), Statistic::finite)
}

fn profit_loss_ratio(trades: &[Trade]) -> Statistic {
    if trades.is_empty() {
        return Statistic::Undefined(Degenerate::NoTrades);
    }
    let mean = |keep: fn(f64) -> bool| {
        let picked: Vec<f64> = trades
            .iter()
            .map(|t| t.compounded_return)
            .filter(|r| keep(*r))
            .collect();
        (!picked.is_empty()).then(|| picked.iter().sum::<f64>() / picked.len() as f64)
    };
    let Some(avg_win) = mean(|r| r > 0.0) else {
        return Statistic::Undefined(Degenerate::NoWinningTrades);
    };
    let Some(avg_loss) = mean(|r| r < 0.0) else {
        return Statistic::Undefined(Degenerate::NoLosingTrades);
    };
    Statistic::ratio(avg_win, avg_loss.abs(), Degenerate::NoLosingTrades)
}

/// Sample standard deviation (ddof = 1). `None` below two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(var.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annualize_daily_year_is_identity() {
        assert!((annualize(0.1, 250, 250.0) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn annualize_half_year_squares() {
        assert!((annualize(0.1, 125, 250.0) - (1.1_f64.powi(2) - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn annualize_wipeout() {
        assert_eq!(annualize(-1.0, 10, 250.0), -1.0);
        assert_eq!(annualize(-1.3, 10, 250.0), -1.0);
    }

    fn trade(compounded_return: f64) -> Trade {
        Trade {
            side: crate::domain::Side::Long,
            entry_index: 0,
            exit_index: 1,
            bars_held: 1,
            winning_bars: usize::from(compounded_return > 0.0),
            compounded_return,
        }
    }

    #[test]
    fn best_and_worst_trade() {
        let trades = [trade(0.05), trade(-0.02), trade(0.12), trade(-0.07)];
        assert_eq!(extreme_trade(&trades, f64::max), Statistic::Defined(0.12));
        assert_eq!(extreme_trade(&trades, f64::min), Statistic::Defined(-0.07));
        assert_eq!(
            extreme_trade(&[], f64::max),
            Statistic::Undefined(Degenerate::NoTrades)
        );
    }

    #[test]
    fn profit_loss_ratio_averages_each_side() {
        let trades = [trade(0.04), trade(-0.02), trade(0.08), trade(-0.04), trade(0.0)];
        // mean win 0.06, mean loss 0.03
        let ratio = profit_loss_ratio(&trades).value().unwrap();
        assert!((ratio - 2.0).abs() < 1e-12);
    }

    #[test]
    fn profit_loss_ratio_needs_both_sides() {
        assert_eq!(
            profit_loss_ratio(&[]),
            Statistic::Undefined(Degenerate::NoTrades)
        );
        assert_eq!(
            profit_loss_ratio(&[trade(0.1), trade(0.0)]),
            Statistic::Undefined(Degenerate::NoLosingTrades)
        );
        assert_eq!(
            profit_loss_ratio(&[trade(-0.1)]),
            Statistic::Undefined(Degenerate::NoWinningTrades)
        );
    }

    #[test]
    fn annualize_overflow_is_infinite() {
        // 5 one-minute bars compounded over a year of minutes
        let ppy = 250.0 * 240.0;
        assert!(annualize(1.05_f64.powi(5) - 1.0, 5, ppy).is_infinite());
        assert_eq!(
            Statistic::finite(annualize(1.05_f64.powi(5) - 1.0, 5, ppy)),
            Statistic::Undefined(Degenerate::NonFinite)
        );
    }

    #[test]
    fn sample_std_uses_ddof_one() {
        let std = sample_std(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!((std - (5.0_f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!(sample_std(&[1.0]), None);
    }
}
