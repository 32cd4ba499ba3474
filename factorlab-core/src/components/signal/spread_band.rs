//! Band on the spread `fast - slow`: long at or above `long_min`, short at
//! or below `short_max`, flat in between.

use crate::components::indicator::FactorSet;
use crate::domain::Signal;

use super::SignalRule;

#[derive(Debug, Clone)]
pub struct SpreadBand {
    fast: String,
    slow: String,
    long_min: f64,
    short_max: f64,
}

impl SpreadBand {
    pub fn new(fast: impl Into<String>, slow: impl Into<String>, long_min: f64, short_max: f64) -> Self {
        assert!(short_max < long_min, "short_max must be below long_min");
        Self {
            fast: fast.into(),
            slow: slow.into(),
            long_min,
            short_max,
        }
    }
}

impl SignalRule for SpreadBand {
    fn name(&self) -> &str {
        "spread_band"
    }

    fn required_factors(&self) -> Vec<&str> {
        vec![&self.fast, &self.slow]
    }

    fn evaluate(&self, factors: &FactorSet, bar_index: usize) -> Signal {
        let (Some(fast), Some(slow)) = (
            factors.valid(&self.fast, bar_index),
            factors.valid(&self.slow, bar_index),
        ) else {
            return Signal::NoSignal;
        };
        let spread = fast - slow;
        if spread >= self.long_min {
            Signal::Long
        } else if spread <= self.short_max {
            Signal::Short
        } else {
            Signal::Flat
        }
    }
}
