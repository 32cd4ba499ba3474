//! Trade segmentation — one ordered pass over the position series.
//!
//! A run starts at the first bar of a new position value and is settled
//! when the position changes away from it. Bar 0 primes the first run and
//! never settles anything. Flat runs are tracked but never settled into
//! the side counters.

use serde::{Deserialize, Serialize};

use crate::domain::{Position, Side, Trade};

use super::statistic::{Degenerate, Statistic};

/// Per-side settled-trade counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideStats {
    pub trades: usize,
    pub winning_trades: usize,
    pub bars_held: usize,
    pub winning_bars: usize,
}

impl SideStats {
    fn record(&mut self, trade: &Trade) {
        self.trades += 1;
        if trade.is_winner() {
            self.winning_trades += 1;
        }
        self.bars_held += trade.bars_held;
        self.winning_bars += trade.winning_bars;
    }

    pub fn win_rate(&self) -> Statistic {
        Statistic::count_ratio(self.winning_trades, self.trades, Degenerate::NoTrades)
    }

    pub fn avg_holding_period(&self) -> Statistic {
        Statistic::count_ratio(self.bars_held, self.trades, Degenerate::NoTrades)
    }
}

/// Everything the segmentation walk produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeLedger {
    pub long: SideStats,
    pub short: SideStats,
    /// Settled trades in entry order.
    pub trades: Vec<Trade>,
    /// Held run still open at the last bar, when not settled.
    pub open_trade: Option<Trade>,
}

impl TradeLedger {
    pub fn side(&self, side: Side) -> &SideStats {
        match side {
            Side::Long => &self.long,
            Side::Short => &self.short,
        }
    }

    pub fn settled_count(&self) -> usize {
        self.long.trades + self.short.trades
    }

    fn settle(&mut self, trade: Trade) {
        match trade.side {
            Side::Long => self.long.record(&trade),
            Side::Short => self.short.record(&trade),
        }
        self.trades.push(trade);
    }
}

/// Accumulator for the run currently being walked.
#[derive(Debug, Clone, Copy)]
struct TradeInProgress {
    position: Position,
    entry_index: usize,
    compounded: f64,
    bars_held: usize,
    winning_bars: usize,
}

impl TradeInProgress {
    fn open(position: Position, index: usize, held_return: f64) -> Self {
        let held = position.is_held();
        Self {
            position,
            entry_index: index,
            compounded: held_return,
            bars_held: usize::from(held),
            winning_bars: usize::from(held && held_return > 0.0),
        }
    }

    fn extend(&mut self, held_return: f64) {
        if !self.position.is_held() {
            return;
        }
        self.bars_held += 1;
        if held_return > 0.0 {
            self.winning_bars += 1;
        }
        if held_return != 0.0 {
            self.compounded = (1.0 + self.compounded) * (1.0 + held_return) - 1.0;
        }
    }

    /// Close the run at `exit_index` (exclusive). Flat runs yield nothing.
    fn close(self, exit_index: usize) -> Option<Trade> {
        let side = self.position.side()?;
        Some(Trade {
            side,
            entry_index: self.entry_index,
            exit_index,
            bars_held: self.bars_held,
            winning_bars: self.winning_bars,
            compounded_return: self.compounded,
        })
    }
}

/// Walk `position` with its aligned `held_return` and build the ledger.
///
/// With `settle_open_trade == false` a held run still open at the last bar
/// is reported as `open_trade` and left out of the side counters.
pub fn segment_trades(
    position: &[Position],
    held_return: &[f64],
    settle_open_trade: bool,
) -> TradeLedger {
    let mut ledger = TradeLedger::default();
    let mut current: Option<TradeInProgress> = None;

    for (index, (pos, r)) in position.iter().zip(held_return).enumerate() {
        current = Some(match current {
            Some(mut run) if run.position == *pos => {
                run.extend(*r);
                run
            }
            Some(run) => {
                if let Some(trade) = run.close(index) {
                    ledger.settle(trade);
                }
                TradeInProgress::open(*pos, index, *r)
            }
            None => TradeInProgress::open(*pos, index, *r),
        });
    }

    if let Some(trade) = current.and_then(|run| run.close(position.len())) {
        if settle_open_trade {
            ledger.settle(trade);
        } else {
            ledger.open_trade = Some(trade);
        }
    }
    ledger
}
