//! JS — acceleration line: `100·(C - REF(C,n)) / (n·REF(C,n))` with three
//! moving averages.

use crate::components::indicator::{FactorSet, Indicator};
use crate::domain::{BarSeries, Column, SeriesError};

use super::rolling::{safe_div, shift, sma, zip_with};

#[derive(Debug, Clone)]
pub struct Js {
    n: usize,
    windows: [usize; 3],
    name: String,
}

impl Js {
    pub fn new(n: usize, m1: usize, m2: usize, m3: usize) -> Self {
        assert!(
            n >= 1 && m1 >= 1 && m2 >= 1 && m3 >= 1,
            "JS periods must be >= 1"
        );
        Self {
            n,
            windows: [m1, m2, m3],
            name: format!("js_{n}_{m1}_{m2}_{m3}"),
        }
    }
}

impl Indicator for Js {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.n + self.windows.iter().max().copied().unwrap_or(1) - 1
    }

    fn required_columns(&self) -> &'static [Column] {
        &[]
    }

    fn outputs(&self) -> &'static [&'static str] {
        &["js", "majs1", "majs2", "majs3"]
    }

    fn compute(&self, bars: &BarSeries) -> Result<FactorSet, SeriesError> {
        let close = bars.closes();
        let reference = shift(&close, self.n);
        let n = self.n as f64;
        let js = safe_div(
            &zip_with(&close, &reference, |c, r| 100.0 * (c - r)),
            &reference.iter().map(|r| n * r).collect::<Vec<_>>(),
        );
        let mut fs = FactorSet::new();
        for (name, &w) in ["majs1", "majs2", "majs3"].iter().zip(&self.windows) {
            fs.insert(*name, sma(&js, w));
        }
        fs.insert("js", js);
        Ok(fs)
    }
}
