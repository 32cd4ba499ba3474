//! VPT — volume-price trend over a rolling window.

use crate::components::indicator::{FactorSet, Indicator};
use crate::domain::{BarSeries, Column, SeriesError};

use super::rolling::{rolling_sum, shift, sma};

#[derive(Debug, Clone)]
pub struct Vpt {
    n: usize,
    m: usize,
    name: String,
}

impl Vpt {
    pub fn new(n: usize, m: usize) -> Self {
        assert!(n >= 1 && m >= 1, "VPT periods must be >= 1");
        Self {
            n,
            m,
            name: format!("vpt_{n}_{m}"),
        }
    }
}

impl Indicator for Vpt {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.n + self.m - 1
    }

    fn required_columns(&self) -> &'static [Column] {
        &[Column::Volume]
    }

    fn outputs(&self) -> &'static [&'static str] {
        &["vpt", "mavpt"]
    }

    fn compute(&self, bars: &BarSeries) -> Result<FactorSet, SeriesError> {
        let volume = bars.column(Column::Volume)?;
        let close = bars.closes();
        let prev = shift(&close, 1);
        let flow: Vec<f64> = (0..bars.len())
            .map(|i| {
                if prev[i] == 0.0 {
                    f64::NAN
                } else {
                    volume[i] * (close[i] - prev[i]) / prev[i]
                }
            })
            .collect();
        let vpt = rolling_sum(&flow, self.n, self.n);
        let mavpt = sma(&vpt, self.m);
        Ok(FactorSet::new().with("vpt", vpt).with("mavpt", mavpt))
    }
}
