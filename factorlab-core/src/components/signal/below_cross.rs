//! Contrarian regime rule: long while `fast < slow`, flat while
//! `fast > slow`.

use crate::components::indicator::FactorSet;
use crate::domain::Signal;

use super::SignalRule;

#[derive(Debug, Clone)]
pub struct BelowCross {
    fast: String,
    slow: String,
}

impl BelowCross {
    pub fn new(fast: impl Into<String>, slow: impl Into<String>) -> Self {
        Self {
            fast: fast.into(),
            slow: slow.into(),
        }
    }
}

impl SignalRule for BelowCross {
    fn name(&self) -> &str {
        "below_cross"
    }

    fn required_factors(&self) -> Vec<&str> {
        vec![&self.fast, &self.slow]
    }

    fn evaluate(&self, factors: &FactorSet, bar_index: usize) -> Signal {
        match (
            factors.valid(&self.fast, bar_index),
            factors.valid(&self.slow, bar_index),
        ) {
            (Some(fast), Some(slow)) if fast < slow => Signal::Long,
            (Some(fast), Some(slow)) if fast > slow => Signal::Flat,
            _ => Signal::NoSignal,
        }
    }
}
