//! Histogram zero-cross gated by the sign of both lines (MACD family).
//!
//! Long when `line`, `slow` and `hist` are all positive and `hist` was
//! negative on the previous bar; short on the mirror image.

use crate::components::indicator::FactorSet;
use crate::domain::Signal;

use super::{prev_and_current, SignalRule};

#[derive(Debug, Clone)]
pub struct GatedCross {
    line: String,
    slow: String,
    hist: String,
}

impl GatedCross {
    pub fn new(line: impl Into<String>, slow: impl Into<String>, hist: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            slow: slow.into(),
            hist: hist.into(),
        }
    }
}

impl SignalRule for GatedCross {
    fn name(&self) -> &str {
        "gated_cross"
    }

    fn required_factors(&self) -> Vec<&str> {
        vec![&self.line, &self.slow, &self.hist]
    }

    fn evaluate(&self, factors: &FactorSet, bar_index: usize) -> Signal {
        let (Some(line), Some(slow), Some((hist_prev, hist))) = (
            factors.valid(&self.line, bar_index),
            factors.valid(&self.slow, bar_index),
            prev_and_current(factors, &self.hist, bar_index),
        ) else {
            return Signal::NoSignal;
        };
        if line > 0.0 && slow > 0.0 && hist > 0.0 && hist_prev < 0.0 {
            Signal::Long
        } else if line < 0.0 && slow < 0.0 && hist < 0.0 && hist_prev > 0.0 {
            Signal::Short
        } else {
            Signal::NoSignal
        }
    }
}
