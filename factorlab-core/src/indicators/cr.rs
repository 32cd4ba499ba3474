//! CR — energy index against the previous bar's midpoint, with four moving
//! averages forming an envelope.

use crate::components::indicator::{FactorSet, Indicator};
use crate::domain::{BarSeries, Column, SeriesError};

use super::rolling::{rolling_sum, safe_div, shift, sma, zip_with};

#[derive(Debug, Clone)]
pub struct Cr {
    n: usize,
    windows: [usize; 4],
    name: String,
}

impl Cr {
    pub fn new(n: usize, windows: [usize; 4]) -> Self {
        assert!(
            n >= 1 && windows.iter().all(|w| *w >= 1),
            "CR periods must be >= 1"
        );
        let [m1, m2, m3, m4] = windows;
        Self {
            n,
            windows,
            name: format!("cr_{n}_{m1}_{m2}_{m3}_{m4}"),
        }
    }
}

impl Indicator for Cr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.n + self.windows.iter().max().copied().unwrap_or(1) - 2
    }

    fn required_columns(&self) -> &'static [Column] {
        &[Column::High, Column::Low]
    }

    fn outputs(&self) -> &'static [&'static str] {
        &["cr", "ma1", "ma2", "ma3", "ma4"]
    }

    fn compute(&self, bars: &BarSeries) -> Result<FactorSet, SeriesError> {
        let high = bars.column(Column::High)?;
        let low = bars.column(Column::Low)?;
        let mid = zip_with(&high, &low, |h, l| (h + l) / 2.0);
        let prev_mid = shift(&mid, 1);
        // f64::max maps a NaN leg to 0, so bar 0 contributes nothing.
        let strength = zip_with(&high, &prev_mid, |h, m| (h - m).max(0.0));
        let weakness = zip_with(&prev_mid, &low, |m, l| (m - l).max(0.0));
        let cr: Vec<f64> = safe_div(
            &rolling_sum(&strength, self.n, self.n),
            &rolling_sum(&weakness, self.n, self.n),
        )
        .iter()
        .map(|v| v * 100.0)
        .collect();

        let mut fs = FactorSet::new();
        for (name, &w) in ["ma1", "ma2", "ma3", "ma4"].iter().zip(&self.windows) {
            fs.insert(*name, sma(&cr, w));
        }
        fs.insert("cr", cr);
        Ok(fs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_series, DEFAULT_EPSILON};

    #[test]
    fn cr_balanced_is_100() {
        // alternating up/down bars produce symmetric strength and weakness
        let closes: Vec<f64> = (0..20)
            .map(|i| if i % 2 == 0 { 100.0 } else { 102.0 })
            .collect();
        let fs = Cr::new(4, [2, 2, 3, 3]).compute(&make_series(&closes)).unwrap();
        assert_approx(fs.get("cr", 10).unwrap(), 100.0, DEFAULT_EPSILON);
        assert_approx(fs.get("ma4", 12).unwrap(), 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn cr_zigzag_uptrend() {
        // 100, 103, 102, 105, 104, ...: each up/down pair adds 6 of strength
        // against 2 of weakness
        let closes: Vec<f64> = (0..30)
            .map(|i| 100.0 + i as f64 + 2.0 * (i % 2) as f64)
            .collect();
        let fs = Cr::new(4, [2, 3, 4, 5]).compute(&make_series(&closes)).unwrap();
        assert_approx(fs.get("cr", 20).unwrap(), 300.0, DEFAULT_EPSILON);
    }
}
