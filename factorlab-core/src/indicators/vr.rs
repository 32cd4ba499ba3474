//! VR — volume ratio of up-bar volume to down-bar volume, flat-bar volume
//! split evenly between the two.

use crate::components::indicator::{FactorSet, Indicator};
use crate::domain::{BarSeries, Column, SeriesError};

use super::rolling::{rolling_sum, sma};

#[derive(Debug, Clone)]
pub struct Vr {
    n: usize,
    m: usize,
    name: String,
}

impl Vr {
    pub fn new(n: usize, m: usize) -> Self {
        assert!(n >= 1 && m >= 1, "VR periods must be >= 1");
        Self {
            n,
            m,
            name: format!("vr_{n}_{m}"),
        }
    }
}

impl Indicator for Vr {
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
        &["vr", "mavr"]
    }

    fn compute(&self, bars: &BarSeries) -> Result<FactorSet, SeriesError> {
        let volume = bars.column(Column::Volume)?;
        let close = bars.closes();
        let len = close.len();
        let mut rising = vec![f64::NAN; len];
        let mut falling = vec![f64::NAN; len];
        let mut unchanged = vec![f64::NAN; len];
        for i in 1..len {
            let (r, f, u) = if close[i] > close[i - 1] {
                (volume[i], 0.0, 0.0)
            } else if close[i] < close[i - 1] {
                (0.0, volume[i], 0.0)
            } else {
                (0.0, 0.0, volume[i])
            };
            rising[i] = r;
            falling[i] = f;
            unchanged[i] = u;
        }
        let av = rolling_sum(&rising, self.n, self.n);
        let bv = rolling_sum(&falling, self.n, self.n);
        let cv = rolling_sum(&unchanged, self.n, self.n);
        let vr: Vec<f64> = (0..len)
            .map(|i| {
                let denom = bv[i] + cv[i] / 2.0;
                if denom == 0.0 {
                    f64::NAN
                } else {
                    (av[i] + cv[i] / 2.0) / denom
                }
            })
            .collect();
        let mavr = sma(&vr, self.m);
        Ok(FactorSet::new().with("vr", vr).with("mavr", mavr))
    }
}
