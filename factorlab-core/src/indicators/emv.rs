//! EMV — ease of movement.
//!
//! ```text
//! VOLUME = MA(V,n) / V
//! MID    = 100 · (H+L - REF(H+L,1)) / (H+L)
//! EMV    = MA(MID · VOLUME · (H-L) / MA(H-L,n), n)
//! MAEMV  = MA(EMV, m)
//! ```

use crate::components::indicator::{FactorSet, Indicator};
use crate::domain::{BarSeries, Column, SeriesError};

use super::rolling::{safe_div, shift, sma, zip_with};

#[derive(Debug, Clone)]
pub struct Emv {
    n: usize,
    m: usize,
    name: String,
}

impl Emv {
    pub fn new(n: usize, m: usize) -> Self {
        assert!(n >= 1 && m >= 1, "EMV periods must be >= 1");
        Self {
            n,
            m,
            name: format!("emv_{n}_{m}"),
        }
    }
}

impl Indicator for Emv {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        (self.n - 1).max(1) + (self.n - 1) + (self.m - 1)
    }

    fn required_columns(&self) -> &'static [Column] {
        &[Column::High, Column::Low, Column::Volume]
    }

    fn outputs(&self) -> &'static [&'static str] {
        &["emv", "maemv"]
    }

    fn compute(&self, bars: &BarSeries) -> Result<FactorSet, SeriesError> {
        let high = bars.column(Column::High)?;
        let low = bars.column(Column::Low)?;
        let volume = bars.column(Column::Volume)?;

        let volume_ratio = safe_div(&sma(&volume, self.n), &volume);
        let hl = zip_with(&high, &low, |h, l| h + l);
        let mid = safe_div(
            &zip_with(&hl, &shift(&hl, 1), |cur, prev| 100.0 * (cur - prev)),
            &hl,
        );
        let range = zip_with(&high, &low, |h, l| h - l);
        let range_ratio = safe_div(&range, &sma(&range, self.n));
        let raw: Vec<f64> = (0..bars.len())
            .map(|i| mid[i] * volume_ratio[i] * range_ratio[i])
            .collect();
        let emv = sma(&raw, self.n);
        let maemv = sma(&emv, self.m);
        Ok(FactorSet::new().with("emv", emv).with("maemv", maemv))
    }
}
