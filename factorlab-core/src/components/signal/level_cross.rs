//! A single series crossing fixed levels: up through `long_level` is long,
//! down through `short_level` is short.

use crate::components::indicator::FactorSet;
use crate::domain::Signal;

use super::{prev_and_current, SignalRule};

#[derive(Debug, Clone)]
pub struct LevelCross {
    series: String,
    long_level: f64,
    short_level: f64,
}

impl LevelCross {
    pub fn new(series: impl Into<String>, long_level: f64, short_level: f64) -> Self {
        Self {
            series: series.into(),
            long_level,
            short_level,
        }
    }

    /// Zero-line cross.
    pub fn zero(series: impl Into<String>) -> Self {
        Self::new(series, 0.0, 0.0)
    }
}

impl SignalRule for LevelCross {
    fn name(&self) -> &str {
        "level_cross"
    }

    fn required_factors(&self) -> Vec<&str> {
        vec![&self.series]
    }

    fn evaluate(&self, factors: &FactorSet, bar_index: usize) -> Signal {
        let Some((prev, cur)) = prev_and_current(factors, &self.series, bar_index) else {
            return Signal::NoSignal;
        };
        if prev < self.long_level && cur > self.long_level {
            Signal::Long
        } else if prev > self.short_level && cur < self.short_level {
            Signal::Short
        } else {
            Signal::NoSignal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::signal::factors;
    use Signal::*;

    #[test]
    fn zero_cross() {
        let fs = factors(&[("emv", &[-1.0, 0.5, 0.7, -0.2, 0.0, 0.3])]);
        let rule = LevelCross::zero("emv");
        assert_eq!(
            rule.generate(&fs, 6),
            vec![NoSignal, Long, NoSignal, Short, NoSignal, NoSignal]
        );
    }

    #[test]
    fn separate_levels() {
        let fs = factors(&[("uos", &[40.0, 50.0, 70.0, 60.0, 62.0])]);
        let rule = LevelCross::new("uos", 45.0, 65.0);
        assert_eq!(
            rule.generate(&fs, 5),
            vec![NoSignal, Long, NoSignal, Short, NoSignal]
        );
    }
}
