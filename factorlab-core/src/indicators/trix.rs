//! TRIX — rate of change of a triple recursive EMA, with its moving
//! average.

use crate::components::indicator::{FactorSet, Indicator};
use crate::domain::{BarSeries, Column, SeriesError};

use super::rolling::{recursive_ema, safe_div, shift, sma, zip_with};

#[derive(Debug, Clone)]
pub struct Trix {
    n: usize,
    m: usize,
    name: String,
}

impl Trix {
    pub fn new(n: usize, m: usize) -> Self {
        assert!(n >= 1 && m >= 1, "TRIX periods must be >= 1");
        Self {
            n,
            m,
            name: format!("trix_{n}_{m}"),
        }
    }
}

impl Indicator for Trix {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.m
    }

    fn required_columns(&self) -> &'static [Column] {
        &[]
    }

    fn outputs(&self) -> &'static [&'static str] {
        &["trix", "trma"]
    }

    fn compute(&self, bars: &BarSeries) -> Result<FactorSet, SeriesError> {
        let close = bars.closes();
        let triple = recursive_ema(
            &recursive_ema(&recursive_ema(&close, self.n), self.n),
            self.n,
        );
        let prev = shift(&triple, 1);
        let trix = safe_div(&zip_with(&triple, &prev, |t, p| (t - p) * 100.0), &prev);
        let trma = sma(&trix, self.m);
        Ok(FactorSet::new().with("trix", trix).with("trma", trma))
    }
}
