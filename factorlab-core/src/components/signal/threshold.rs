//! Long-only level rule: above `upper` asks for long, below `lower` asks
//! to stand aside. Reads the current bar only.

use crate::components::indicator::FactorSet;
use crate::domain::Signal;

use super::SignalRule;

#[derive(Debug, Clone)]
pub struct Threshold {
    series: String,
    upper: f64,
    lower: f64,
}

impl Threshold {
    /// `lower <= upper` is checked by the factory.
    pub fn new(series: impl Into<String>, upper: f64, lower: f64) -> Self {
        Self {
            series: series.into(),
            upper,
            lower,
        }
    }
}

impl SignalRule for Threshold {
    fn name(&self) -> &str {
        "threshold"
    }

    fn required_factors(&self) -> Vec<&str> {
        vec![&self.series]
    }

    fn evaluate(&self, factors: &FactorSet, bar_index: usize) -> Signal {
        match factors.valid(&self.series, bar_index) {
            Some(v) if v > self.upper => Signal::Long,
            Some(v) if v < self.lower => Signal::Flat,
            _ => Signal::NoSignal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::signal::factors;
    use Signal::*;

    #[test]
    fn band_between_levels_holds() {
        let fs = factors(&[("beta", &[f64::NAN, 1.2, 0.9, 1.0, 0.7, 0.8, 1.01])]);
        let rule = Threshold::new("beta", 1.0, 0.8);
        assert_eq!(
            rule.generate(&fs, 7),
            vec![NoSignal, Long, NoSignal, NoSignal, Flat, NoSignal, Long]
        );
    }

    #[test]
    fn symmetric_z_levels() {
        let fs = factors(&[("stdbeta", &[0.71, -0.69, -0.71, 0.0])]);
        let rule = Threshold::new("stdbeta", 0.7, -0.7);
        assert_eq!(rule.generate(&fs, 4), vec![Long, NoSignal, Flat, NoSignal]);
    }

    #[test]
    fn never_goes_short() {
        let fs = factors(&[("x", &[-100.0, 100.0, -1e9])]);
        let rule = Threshold::new("x", 0.0, 0.0);
        assert!(!rule.generate(&fs, 3).contains(&Short));
    }
}
