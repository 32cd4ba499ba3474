//! OBV — on-balance volume, seeded with the first bar's volume.

use crate::components::indicator::{FactorSet, Indicator};
use crate::domain::{BarSeries, Column, SeriesError};

use super::rolling::sma;

#[derive(Debug, Clone)]
pub struct Obv {
    m: usize,
    name: String,
}

impl Obv {
    pub fn new(m: usize) -> Self {
        assert!(m >= 1, "OBV period must be >= 1");
        Self {
            m,
            name: format!("obv_{m}"),
        }
    }
}

impl Indicator for Obv {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.m - 1
    }

    fn required_columns(&self) -> &'static [Column] {
        &[Column::Volume]
    }

    fn outputs(&self) -> &'static [&'static str] {
        &["obv", "maobv"]
    }

    fn compute(&self, bars: &BarSeries) -> Result<FactorSet, SeriesError> {
        let volume = bars.column(Column::Volume)?;
        let close = bars.closes();
        let mut obv = Vec::with_capacity(close.len());
        let mut running = volume[0];
        obv.push(running);
        for i in 1..close.len() {
            if close[i] > close[i - 1] {
                running += volume[i];
            } else if close[i] < close[i - 1] {
                running -= volume[i];
            }
            obv.push(running);
        }
        let maobv = sma(&obv, self.m);
        Ok(FactorSet::new().with("obv", obv).with("maobv", maobv))
    }
}
