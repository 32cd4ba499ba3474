//! VMACD — MACD computed on volume.

use crate::components::indicator::{FactorSet, Indicator};
use crate::domain::{BarSeries, Column, SeriesError};

use super::rolling::{recursive_ema, zip_with};

#[derive(Debug, Clone)]
pub struct Vmacd {
    fast: usize,
    slow: usize,
    signal: usize,
    name: String,
}

impl Vmacd {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(
            fast >= 1 && slow >= 1 && signal >= 1,
            "VMACD periods must be >= 1"
        );
        Self {
            fast,
            slow,
            signal,
            name: format!("vmacd_{fast}_{slow}_{signal}"),
        }
    }
}

impl Indicator for Vmacd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn required_columns(&self) -> &'static [Column] {
        &[Column::Volume]
    }

    fn outputs(&self) -> &'static [&'static str] {
        &["dif", "dea", "osc"]
    }

    fn compute(&self, bars: &BarSeries) -> Result<FactorSet, SeriesError> {
        let volume = bars.column(Column::Volume)?;
        let dif = zip_with(
            &recursive_ema(&volume, self.fast),
            &recursive_ema(&volume, self.slow),
            |f, s| f - s,
        );
        let dea = recursive_ema(&dif, self.signal);
        let osc = zip_with(&dif, &dea, |d, e| d - e);
        Ok(FactorSet::new()
            .with("dif", dif)
            .with("dea", dea)
            .with("osc", osc))
    }
}
