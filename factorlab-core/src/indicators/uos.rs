//! UOS — ultimate oscillator over three windows, with a recursive EMA.
//!
//! True high and true low extend the bar to the previous close:
//! `TH = MAX(H, REF(C,1))`, `TL = MIN(L, REF(C,1))`.

use crate::components::indicator::{FactorSet, Indicator};
use crate::domain::{BarSeries, Column, SeriesError};

use super::rolling::{recursive_ema, rolling_sum, safe_div, shift, zip_with};

#[derive(Debug, Clone)]
pub struct Uos {
    windows: [usize; 3],
    m: usize,
    name: String,
}

impl Uos {
    pub fn new(n1: usize, n2: usize, n3: usize, m: usize) -> Self {
        assert!(
            n1 >= 1 && n2 >= 1 && n3 >= 1 && m >= 1,
            "UOS periods must be >= 1"
        );
        Self {
            windows: [n1, n2, n3],
            m,
            name: format!("uos_{n1}_{n2}_{n3}_{m}"),
        }
    }
}

impl Indicator for Uos {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.windows.iter().max().copied().unwrap_or(1) - 1
    }

    fn required_columns(&self) -> &'static [Column] {
        &[Column::High, Column::Low]
    }

    fn outputs(&self) -> &'static [&'static str] {
        &["uos", "mauos"]
    }

    fn compute(&self, bars: &BarSeries) -> Result<FactorSet, SeriesError> {
        let high = bars.column(Column::High)?;
        let low = bars.column(Column::Low)?;
        let close = bars.closes();
        let prev_close = shift(&close, 1);
        let true_high = zip_with(&high, &prev_close, f64::max);
        let true_low = zip_with(&low, &prev_close, f64::min);
        let buying = zip_with(&close, &true_low, |c, l| c - l);
        let range = zip_with(&true_high, &true_low, |h, l| h - l);

        let [n1, n2, n3] = self.windows.map(|w| w as f64);
        let acc: Vec<Vec<f64>> = self
            .windows
            .iter()
            .map(|&w| safe_div(&rolling_sum(&buying, w, w), &rolling_sum(&range, w, w)))
            .collect();
        let denom = n1 * n2 + n1 * n3 + n2 * n3;
        let uos: Vec<f64> = (0..bars.len())
            .map(|i| {
                (acc[0][i] * n2 * n3 + acc[1][i] * n1 * n3 + acc[2][i] * n1 * n2) * 100.0 / denom
            })
            .collect();
        let mauos = recursive_ema(&uos, self.m);
        Ok(FactorSet::new().with("uos", uos).with("mauos", mauos))
    }
}
