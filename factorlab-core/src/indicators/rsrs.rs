//! RSRS — resistance/support relative strength.
//!
//! `beta` is the least-squares slope of high on low over the last `n` bars,
//! rounded to two decimals. `stdbeta` standardizes `beta` against the mean
//! and sample deviation of the last `m` betas; the window only counts bars
//! where a slope exists, so the first z-score appears one bar after the
//! first slope.

use crate::components::indicator::{FactorSet, Indicator};
use crate::domain::{BarSeries, Column, SeriesError};

use super::rolling::{rolling_mean, rolling_std};

#[derive(Debug, Clone)]
pub struct Rsrs {
    n: usize,
    m: usize,
    name: String,
}

impl Rsrs {
    pub fn new(n: usize, m: usize) -> Self {
        assert!(n >= 2, "RSRS regression window must be >= 2");
        assert!(m >= 1, "RSRS z-score window must be >= 1");
        Self {
            n,
            m,
            name: format!("rsrs_{n}_{m}"),
        }
    }
}

impl Indicator for Rsrs {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.n
    }

    fn required_columns(&self) -> &'static [Column] {
        &[Column::High, Column::Low]
    }

    fn outputs(&self) -> &'static [&'static str] {
        &["beta", "stdbeta"]
    }

    fn compute(&self, bars: &BarSeries) -> Result<FactorSet, SeriesError> {
        let high = bars.column(Column::High)?;
        let low = bars.column(Column::Low)?;
        let len = bars.len();

        let mut beta = vec![f64::NAN; len];
        for i in (self.n - 1)..len {
            let window = (i + 1 - self.n)..=i;
            if let Some(slope) = ols_slope(&low[window.clone()], &high[window]) {
                beta[i] = (slope * 100.0).round() / 100.0;
            }
        }

        let mut stdbeta = vec![f64::NAN; len];
        if len >= self.n {
            let tail = &beta[self.n - 1..];
            let mu = rolling_mean(tail, self.m, 1);
            let sigma = rolling_std(tail, self.m, 1);
            for (j, ((b, mean), sd)) in tail.iter().zip(&mu).zip(&sigma).enumerate() {
                if *sd > 0.0 {
                    stdbeta[self.n - 1 + j] = (b - mean) / sd;
                }
            }
        }

        Ok(FactorSet::new().with("beta", beta).with("stdbeta", stdbeta))
    }
}

/// Slope of `y = a + b·x`, `None` when an input is NaN or `x` is constant.
fn ols_slope(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.iter().chain(y).any(|v| v.is_nan()) {
        return None;
    }
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;
    let (cov, var) = x
        .iter()
        .zip(y)
        .fold((0.0, 0.0), |(cov, var), (xi, yi)| {
            let dx = xi - mean_x;
            (cov + dx * (yi - mean_y), var + dx * dx)
        });
    (var > 0.0).then(|| cov / var)
}
