//! DMA — difference of moving averages.
//!
//! `DIF = MA(C,n1) - MA(C,n2)`, `DIFMA = MA(DIF,m)`. All averages use an
//! expanding start, so every output is defined from the first bar.

use crate::components::indicator::{FactorSet, Indicator};
use crate::domain::{BarSeries, Column, SeriesError};

use super::rolling::{rolling_mean, zip_with};

#[derive(Debug, Clone)]
pub struct Dma {
    n1: usize,
    n2: usize,
    m: usize,
    name: String,
}

impl Dma {
    pub fn new(n1: usize, n2: usize, m: usize) -> Self {
        assert!(n1 >= 1 && n2 >= 1 && m >= 1, "DMA periods must be >= 1");
        Self {
            n1,
            n2,
            m,
            name: format!("dma_{n1}_{n2}_{m}"),
        }
    }
}

impl Indicator for Dma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn required_columns(&self) -> &'static [Column] {
        &[]
    }

    fn outputs(&self) -> &'static [&'static str] {
        &["dif", "difma"]
    }

    fn compute(&self, bars: &BarSeries) -> Result<FactorSet, SeriesError> {
        let close = bars.closes();
        let dif = zip_with(
            &rolling_mean(&close, self.n1, 1),
            &rolling_mean(&close, self.n2, 1),
            |a, b| a - b,
        );
        let difma = rolling_mean(&dif, self.m, 1);
        Ok(FactorSet::new().with("dif", dif).with("difma", difma))
    }
}
