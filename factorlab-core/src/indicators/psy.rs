//! PSY — psychological line: share of up-closes over the last `n`
//! comparisons, in percent.

use crate::components::indicator::{FactorSet, Indicator};
use crate::domain::{BarSeries, Column, SeriesError};

use super::rolling::{rolling_sum, sma};

#[derive(Debug, Clone)]
pub struct Psy {
    n: usize,
    m: usize,
    name: String,
}

impl Psy {
    pub fn new(n: usize, m: usize) -> Self {
        assert!(n >= 1 && m >= 1, "PSY periods must be >= 1");
        Self {
            n,
            m,
            name: format!("psy_{n}_{m}"),
        }
    }
}

impl Indicator for Psy {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.n + self.m - 1
    }

    fn required_columns(&self) -> &'static [Column] {
        &[]
    }

    fn outputs(&self) -> &'static [&'static str] {
        &["psy", "psyma"]
    }

    fn compute(&self, bars: &BarSeries) -> Result<FactorSet, SeriesError> {
        let close = bars.closes();
        let up: Vec<f64> = (0..close.len())
            .map(|i| match i {
                0 => f64::NAN,
                _ if close[i] > close[i - 1] => 1.0,
                _ => 0.0,
            })
            .collect();
        let scale = 100.0 / self.n as f64;
        let psy: Vec<f64> = rolling_sum(&up, self.n, self.n)
            .iter()
            .map(|v| v * scale)
            .collect();
        let psyma = sma(&psy, self.m);
        Ok(FactorSet::new().with("psy", psy).with("psyma", psyma))
    }
}
