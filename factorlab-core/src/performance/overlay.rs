//! Per-bar performance overlay: held return, compounding, drawdown, excess
//! return.

use serde::{Deserialize, Serialize};

use crate::domain::{BarSeries, Position};

use super::config::PerformanceConfig;
use super::PerformanceError;

/// Columns appended to the bar series by the performance engine.
///
/// Every vector has the length of the bar series it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub position: Vec<Position>,
    pub held_return: Vec<f64>,
    pub held_win: Vec<bool>,
    pub cumulative_return: Vec<f64>,
    pub running_peak: Vec<f64>,
    pub drawdown: Vec<f64>,
    pub excess_return: Vec<f64>,
}

impl Overlay {
    pub fn len(&self) -> usize {
        self.position.len()
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }

    /// Final compounded return, 0 for an empty overlay.
    pub fn final_return(&self) -> f64 {
        self.cumulative_return.last().copied().unwrap_or(0.0)
    }

    pub fn max_drawdown(&self) -> f64 {
        self.drawdown.iter().copied().fold(0.0, f64::max)
    }
}

/// Compute the overlay for `position` held over `bars`.
///
/// Fails only when `position` is not index-aligned with `bars`.
pub fn compute_overlay(
    bars: &BarSeries,
    position: &[Position],
    config: &PerformanceConfig,
) -> Result<Overlay, PerformanceError> {
    bars.check_aligned(position.len())?;

    let held_return: Vec<f64> = bars
        .bars()
        .iter()
        .zip(position)
        .map(|(bar, pos)| bar.return_fraction() * pos.exposure())
        .collect();
    let held_win = held_return.iter().map(|r| *r > 0.0).collect();
    let cumulative_return = compound(&held_return);
    let running_peak = running_max(&cumulative_return);
    let drawdown = cumulative_return
        .iter()
        .zip(&running_peak)
        .map(|(cum, peak)| drawdown_from_peak(*cum, *peak))
        .collect();
    let rf = config.per_bar_risk_free();
    let excess_return = held_return.iter().map(|r| r - rf).collect();

    Ok(Overlay {
        position: position.to_vec(),
        held_return,
        held_win,
        cumulative_return,
        running_peak,
        drawdown,
        excess_return,
    })
}

/// `cum[t] = prod(1 + r[..=t]) - 1`, as an incremental fold.
pub fn compound(returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .scan(1.0_f64, |equity, r| {
            *equity *= 1.0 + r;
            Some(*equity - 1.0)
        })
        .collect()
}

fn running_max(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(f64::NEG_INFINITY, |peak, v| {
            *peak = peak.max(*v);
            Some(*peak)
        })
        .collect()
}

/// Retracement normalized by peak equity. Peak equity at or below zero
/// means the account was wiped out; that counts as a full drawdown.
fn drawdown_from_peak(cumulative: f64, peak: f64) -> f64 {
    let peak_equity = 1.0 + peak;
    if peak_equity <= 0.0 {
        return 1.0;
    }
    ((peak - cumulative) / peak_equity).max(0.0)
}
