//! Mass-index reversal bulge: a drop below `trigger` after the previous bar
//! sat above `upper` is short; a drop below `trigger` from below `upper` is
//! long.

use crate::components::indicator::FactorSet;
use crate::domain::Signal;

use super::{prev_and_current, SignalRule};

#[derive(Debug, Clone)]
pub struct MassReversal {
    series: String,
    upper: f64,
    trigger: f64,
}

impl MassReversal {
    pub fn new(series: impl Into<String>, upper: f64, trigger: f64) -> Self {
        Self {
            series: series.into(),
            upper,
            trigger,
        }
    }
}

impl SignalRule for MassReversal {
    fn name(&self) -> &str {
        "mass_reversal"
    }

    fn required_factors(&self) -> Vec<&str> {
        vec![&self.series]
    }

    fn evaluate(&self, factors: &FactorSet, bar_index: usize) -> Signal {
        let Some((prev, cur)) = prev_and_current(factors, &self.series, bar_index) else {
            return Signal::NoSignal;
        };
        if cur >= self.trigger {
            Signal::NoSignal
        } else if prev > self.upper {
            Signal::Short
        } else if prev < self.upper {
            Signal::Long
        } else {
            Signal::NoSignal
        }
    }
}
