//! CR reversal rules, checked in order:
//!
//! 1. `cr < oversold` is long.
//! 2. `cr > overbought` and falling is short.
//! 3. `cr` drops below the lowest envelope average after sitting above the
//!    highest one on the previous bar: short.
//! 4. `cr` rises above the highest envelope average after sitting below the
//!    lowest one on the previous bar: long.

use crate::components::indicator::FactorSet;
use crate::domain::Signal;

use super::SignalRule;

#[derive(Debug, Clone)]
pub struct CrReversal {
    series: String,
    envelope: Vec<String>,
    oversold: f64,
    overbought: f64,
}

impl CrReversal {
    pub fn new(
        series: impl Into<String>,
        envelope: Vec<String>,
        oversold: f64,
        overbought: f64,
    ) -> Self {
        assert!(!envelope.is_empty(), "CR envelope needs at least one series");
        Self {
            series: series.into(),
            envelope,
            oversold,
            overbought,
        }
    }

    /// Lowest and highest valid envelope value at `bar_index`.
    fn bounds(&self, factors: &FactorSet, bar_index: usize) -> Option<(f64, f64)> {
        self.envelope
            .iter()
            .filter_map(|name| factors.valid(name, bar_index))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

impl SignalRule for CrReversal {
    fn name(&self) -> &str {
        "cr_reversal"
    }

    fn required_factors(&self) -> Vec<&str> {
        std::iter::once(self.series.as_str())
            .chain(self.envelope.iter().map(String::as_str))
            .collect()
    }

    fn evaluate(&self, factors: &FactorSet, bar_index: usize) -> Signal {
        if bar_index == 0 {
            return Signal::NoSignal;
        }
        let Some(cr) = factors.valid(&self.series, bar_index) else {
            return Signal::NoSignal;
        };
        if cr < self.oversold {
            return Signal::Long;
        }
        let prev = factors.valid(&self.series, bar_index - 1);
        if cr > self.overbought && prev.is_some_and(|p| cr < p) {
            return Signal::Short;
        }
        let (Some(prev), Some((lo, hi)), Some((prev_lo, prev_hi))) = (
            prev,
            self.bounds(factors, bar_index),
            self.bounds(factors, bar_index - 1),
        ) else {
            return Signal::NoSignal;
        };
        if cr < lo && prev > prev_hi {
            Signal::Short
        } else if cr > hi && prev < prev_lo {
            Signal::Long
        } else {
            Signal::NoSignal
        }
    }
}
