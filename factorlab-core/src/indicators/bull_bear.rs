//! Bull/bear kernel — rolling volatility of returns per unit of turnover,
//! with a fast and a slow expanding-start average.

use crate::components::indicator::{FactorSet, Indicator};
use crate::domain::{BarSeries, Column, SeriesError};

use super::rolling::{rolling_mean, rolling_std, safe_div, sma};

#[derive(Debug, Clone)]
pub struct BullBear {
    window: usize,
    fast: usize,
    slow: usize,
    name: String,
}

impl BullBear {
    pub fn new(window: usize, fast: usize, slow: usize) -> Self {
        assert!(
            window >= 2 && fast >= 1 && slow >= 1,
            "bull/bear window must be >= 2 and averages >= 1"
        );
        Self {
            window,
            fast,
            slow,
            name: format!("bull_bear_{window}_{fast}_{slow}"),
        }
    }
}

impl Indicator for BullBear {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window - 1
    }

    fn required_columns(&self) -> &'static [Column] {
        &[Column::Turnover]
    }

    fn outputs(&self) -> &'static [&'static str] {
        &["kernel", "kernel_fast", "kernel_slow"]
    }

    fn compute(&self, bars: &BarSeries) -> Result<FactorSet, SeriesError> {
        let turnover = bars.column(Column::Turnover)?;
        let volatility = rolling_std(&bars.pct_chg(), self.window, self.window);
        let kernel = safe_div(&volatility, &sma(&turnover, self.window));
        let kernel_fast = rolling_mean(&kernel, self.fast, 1);
        let kernel_slow = rolling_mean(&kernel, self.slow, 1);
        Ok(FactorSet::new()
            .with("kernel", kernel)
            .with("kernel_fast", kernel_fast)
            .with("kernel_slow", kernel_slow))
    }
}
