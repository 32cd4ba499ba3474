//! Signal rules — map factor series to discrete per-bar decisions.
//!
//! Rules see only factor values at the current and previous bar. They never
//! see positions or returns. A missing or NaN input is always
//! `Signal::NoSignal`, never an error.

pub mod below_cross;
pub mod cr_reversal;
pub mod crossover;
pub mod gated_cross;
pub mod level_cross;
pub mod mass_reversal;
pub mod spread_band;
pub mod threshold;

pub use below_cross::BelowCross;
pub use cr_reversal::CrReversal;
pub use crossover::Crossover;
pub use gated_cross::GatedCross;
pub use level_cross::LevelCross;
pub use mass_reversal::MassReversal;
pub use spread_band::SpreadBand;
pub use threshold::Threshold;

use crate::domain::Signal;

use super::indicator::FactorSet;

/// Trait for signal rules.
///
/// # Look-ahead guard
/// `evaluate` at `bar_index` may read factor values at `bar_index` and
/// `bar_index - 1` only.
pub trait SignalRule: Send + Sync {
    /// Human-readable name (e.g., "crossover").
    fn name(&self) -> &str;

    /// Factor series names this rule reads.
    fn required_factors(&self) -> Vec<&str>;

    /// Decision at `bar_index`.
    fn evaluate(&self, factors: &FactorSet, bar_index: usize) -> Signal;

    /// Decisions for every bar of a series of length `len`.
    fn generate(&self, factors: &FactorSet, len: usize) -> Vec<Signal> {
        (0..len).map(|i| self.evaluate(factors, i)).collect()
    }
}

/// Previous and current valid values of `name`, or `None` on bar 0, a
/// missing series, or a NaN on either bar.
pub(crate) fn prev_and_current(factors: &FactorSet, name: &str, bar_index: usize) -> Option<(f64, f64)> {
    if bar_index == 0 {
        return None;
    }
    Some((
        factors.valid(name, bar_index - 1)?,
        factors.valid(name, bar_index)?,
    ))
}

#[cfg(test)]
pub(crate) fn factors(pairs: &[(&str, &[f64])]) -> FactorSet {
    pairs
        .iter()
        .fold(FactorSet::new(), |fs, (name, values)| fs.with(*name, values.to_vec()))
}
