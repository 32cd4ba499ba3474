//! DMI — directional movement index (PDI, MDI, ADX, ADXR).
//!
//! Directional movement is attributed to whichever of the up-move and
//! down-move is larger (ties go to the up-move), summed over `n` bars and
//! scaled by the summed true range. `smooth > 1` applies an extra moving
//! average to PDI and MDI before the ADX stage.

use crate::components::indicator::{FactorSet, Indicator};
use crate::domain::{BarSeries, Column, SeriesError};

use super::rolling::{rolling_sum, safe_div, shift, sma, zip_with};

#[derive(Debug, Clone)]
pub struct Dmi {
    n: usize,
    m: usize,
    smooth: usize,
    name: String,
}

impl Dmi {
    pub fn new(n: usize, m: usize, smooth: usize) -> Self {
        assert!(n >= 1 && m >= 1 && smooth >= 1, "DMI periods must be >= 1");
        Self {
            n,
            m,
            smooth,
            name: format!("dmi_{n}_{m}_{smooth}"),
        }
    }
}

impl Indicator for Dmi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.n + (self.smooth - 1) + (self.m - 1) + self.m
    }

    fn required_columns(&self) -> &'static [Column] {
        &[Column::High, Column::Low]
    }

    fn outputs(&self) -> &'static [&'static str] {
        &["pdi", "mdi", "adx", "adxr"]
    }

    fn compute(&self, bars: &BarSeries) -> Result<FactorSet, SeriesError> {
        let high = bars.column(Column::High)?;
        let low = bars.column(Column::Low)?;
        let close = bars.closes();
        let prev_high = shift(&high, 1);
        let prev_low = shift(&low, 1);
        let prev_close = shift(&close, 1);

        let n = bars.len();
        let mut plus_dm = vec![f64::NAN; n];
        let mut minus_dm = vec![f64::NAN; n];
        let mut true_range = vec![f64::NAN; n];
        for i in 0..n {
            let up = (high[i] - prev_high[i]).max(0.0);
            let down = (prev_low[i] - low[i]).max(0.0);
            if !prev_high[i].is_nan() && !prev_low[i].is_nan() {
                plus_dm[i] = if up >= down { up } else { 0.0 };
                minus_dm[i] = if up < down { down } else { 0.0 };
            }
            // NaN legs are skipped, so bar 0 falls back to high - low.
            true_range[i] = (high[i] - low[i])
                .max((high[i] - prev_close[i]).abs())
                .max((low[i] - prev_close[i]).abs());
        }

        let tr_sum = rolling_sum(&true_range, self.n, self.n);
        let scale = |dm: &[f64]| -> Vec<f64> {
            let pct: Vec<f64> = rolling_sum(dm, self.n, self.n)
                .iter()
                .map(|v| v * 100.0)
                .collect();
            let di = safe_div(&pct, &tr_sum);
            if self.smooth > 1 {
                sma(&di, self.smooth)
            } else {
                di
            }
        };
        let pdi = scale(&plus_dm);
        let mdi = scale(&minus_dm);

        let dx = safe_div(
            &zip_with(&pdi, &mdi, |p, m| (p - m).abs() * 100.0),
            &zip_with(&pdi, &mdi, |p, m| p + m),
        );
        let adx = sma(&dx, self.m);
        let adxr = zip_with(&adx, &shift(&adx, self.m), |a, b| (a + b) / 2.0);

        Ok(FactorSet::new()
            .with("pdi", pdi)
            .with("mdi", mdi)
            .with("adx", adx)
            .with("adxr", adxr))
    }
}
