//! Crossover of two factor series.
//!
//! Strict mode fires only when the lines genuinely swap sides:
//! long on `fast > slow` after `prev_fast < prev_slow`, short on the mirror.
//! Inclusive mode treats touching as crossing, long on `fast >= slow` after
//! `prev_fast < prev_slow`, short on `fast < slow` after
//! `prev_fast >= prev_slow`.

use crate::components::indicator::FactorSet;
use crate::domain::Signal;

use super::{prev_and_current, SignalRule};

#[derive(Debug, Clone)]
pub struct Crossover {
    fast: String,
    slow: String,
    inclusive: bool,
}

impl Crossover {
    pub fn new(fast: impl Into<String>, slow: impl Into<String>, inclusive: bool) -> Self {
        Self {
            fast: fast.into(),
            slow: slow.into(),
            inclusive,
        }
    }
}

impl SignalRule for Crossover {
    fn name(&self) -> &str {
        "crossover"
    }

    fn required_factors(&self) -> Vec<&str> {
        vec![&self.fast, &self.slow]
    }

    fn evaluate(&self, factors: &FactorSet, bar_index: usize) -> Signal {
        let (Some((fast_prev, fast)), Some((slow_prev, slow))) = (
            prev_and_current(factors, &self.fast, bar_index),
            prev_and_current(factors, &self.slow, bar_index),
        ) else {
            return Signal::NoSignal;
        };

        if self.inclusive {
            if fast_prev < slow_prev && fast >= slow {
                return Signal::Long;
            }
            if fast_prev >= slow_prev && fast < slow {
                return Signal::Short;
            }
        } else {
            if fast > slow && fast_prev < slow_prev {
                return Signal::Long;
            }
            if fast < slow && fast_prev > slow_prev {
                return Signal::Short;
            }
        }
        Signal::NoSignal
    }
}
