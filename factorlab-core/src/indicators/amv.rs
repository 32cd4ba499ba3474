//! AMV — volume-weighted cost moving averages.
//!
//! `AMV0 = V·(O+C)/2`, `AMVk = SUM(AMV0,mk) / SUM(V,mk)` for four windows.

use crate::components::indicator::{FactorSet, Indicator};
use crate::domain::{BarSeries, Column, SeriesError};

use super::rolling::{rolling_sum, safe_div};

#[derive(Debug, Clone)]
pub struct Amv {
    windows: [usize; 4],
    name: String,
}

impl Amv {
    pub fn new(m1: usize, m2: usize, m3: usize, m4: usize) -> Self {
        let windows = [m1, m2, m3, m4];
        assert!(windows.iter().all(|w| *w >= 1), "AMV windows must be >= 1");
        Self {
            windows,
            name: format!("amv_{m1}_{m2}_{m3}_{m4}"),
        }
    }
}

impl Indicator for Amv {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.windows.iter().max().copied().unwrap_or(1) - 1
    }

    fn required_columns(&self) -> &'static [Column] {
        &[Column::Open, Column::Volume]
    }

    fn outputs(&self) -> &'static [&'static str] {
        &["amv1", "amv2", "amv3", "amv4"]
    }

    fn compute(&self, bars: &BarSeries) -> Result<FactorSet, SeriesError> {
        let open = bars.column(Column::Open)?;
        let volume = bars.column(Column::Volume)?;
        let close = bars.closes();
        let amv0: Vec<f64> = volume
            .iter()
            .zip(open.iter().zip(&close))
            .map(|(v, (o, c))| v * (o + c) / 2.0)
            .collect();

        let mut fs = FactorSet::new();
        for (name, &w) in self.outputs().iter().zip(&self.windows) {
            fs.insert(
                *name,
                safe_div(&rolling_sum(&amv0, w, w), &rolling_sum(&volume, w, w)),
            );
        }
        Ok(fs)
    }
}
