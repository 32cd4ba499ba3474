//! MASS — mass index of the high-low range. Expanding start on every
//! window.

use crate::components::indicator::{FactorSet, Indicator};
use crate::domain::{BarSeries, Column, SeriesError};

use super::rolling::{rolling_mean, rolling_sum, safe_div, zip_with};

#[derive(Debug, Clone)]
pub struct Mass {
    n1: usize,
    n2: usize,
    m: usize,
    name: String,
}

impl Mass {
    pub fn new(n1: usize, n2: usize, m: usize) -> Self {
        assert!(n1 >= 1 && n2 >= 1 && m >= 1, "MASS periods must be >= 1");
        Self {
            n1,
            n2,
            m,
            name: format!("mass_{n1}_{n2}_{m}"),
        }
    }
}

impl Indicator for Mass {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn required_columns(&self) -> &'static [Column] {
        &[Column::High, Column::Low]
    }

    fn outputs(&self) -> &'static [&'static str] {
        &["mass", "mamass"]
    }

    fn compute(&self, bars: &BarSeries) -> Result<FactorSet, SeriesError> {
        let high = bars.column(Column::High)?;
        let low = bars.column(Column::Low)?;
        let range = zip_with(&high, &low, |h, l| h - l);
        let single = rolling_mean(&range, self.n1, 1);
        let double = rolling_mean(&single, self.n1, 1);
        let mass = rolling_sum(&safe_div(&single, &double), self.n2, 1);
        let mamass = rolling_mean(&mass, self.m, 1);
        Ok(FactorSet::new().with("mass", mass).with("mamass", mamass))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_series, DEFAULT_EPSILON};

    #[test]
    fn constant_range_counts_bars() {
        // range is 3 on every bar after the first, so the ratio settles at 1
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let fs = Mass::new(9, 25, 6).compute(&make_series(&closes)).unwrap();
        assert_approx(fs.get("mass", 59).unwrap(), 25.0, DEFAULT_EPSILON);
        assert_approx(fs.get("mamass", 59).unwrap(), 25.0, DEFAULT_EPSILON);
    }

    #[test]
    fn defined_from_first_bar() {
        let fs = Mass::new(9, 25, 6).compute(&make_series(&[10.0, 11.0])).unwrap();
        assert_approx(fs.get("mass", 0).unwrap(), 1.0, DEFAULT_EPSILON);
    }
}
