//! VMA — moving averages of the bar's typical price `(H+O+L+C)/4`.

use crate::components::indicator::{FactorSet, Indicator};
use crate::domain::{BarSeries, Column, SeriesError};

use super::rolling::sma;

#[derive(Debug, Clone)]
pub struct Vma {
    windows: [usize; 5],
    name: String,
}

impl Vma {
    pub fn new(windows: [usize; 5]) -> Self {
        assert!(windows.iter().all(|w| *w >= 1), "VMA windows must be >= 1");
        let joined = windows.map(|w| w.to_string()).join("_");
        Self {
            windows,
            name: format!("vma_{joined}"),
        }
    }
}

impl Indicator for Vma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.windows.iter().max().copied().unwrap_or(1) - 1
    }

    fn required_columns(&self) -> &'static [Column] {
        &[Column::Open, Column::High, Column::Low]
    }

    fn outputs(&self) -> &'static [&'static str] {
        &["vma1", "vma2", "vma3", "vma4", "vma5"]
    }

    fn compute(&self, bars: &BarSeries) -> Result<FactorSet, SeriesError> {
        let open = bars.column(Column::Open)?;
        let high = bars.column(Column::High)?;
        let low = bars.column(Column::Low)?;
        let close = bars.closes();
        let typical: Vec<f64> = (0..bars.len())
            .map(|i| (high[i] + open[i] + low[i] + close[i]) / 4.0)
            .collect();

        let mut fs = FactorSet::new();
        for (name, &w) in self.outputs().iter().zip(&self.windows) {
            fs.insert(*name, sma(&typical, w));
        }
        Ok(fs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_series, DEFAULT_EPSILON};

    #[test]
    fn vma_of_typical_price() {
        // bar 1: o=10 c=12 h=13 l=9 -> 11; bar 2: o=12 c=14 h=15 l=11 -> 13
        let bars = make_series(&[10.0, 12.0, 14.0]);
        let fs = Vma::new([1, 2, 2, 3, 3]).compute(&bars).unwrap();
        assert_approx(fs.get("vma1", 1).unwrap(), 11.0, DEFAULT_EPSILON);
        assert_approx(fs.get("vma2", 2).unwrap(), 12.0, DEFAULT_EPSILON);
        assert!(fs.get("vma5", 1).unwrap().is_nan());
    }

    #[test]
    fn vma_needs_ohl() {
        let bars = make_series(&[1.0, 2.0]);
        let stripped = crate::domain::BarSeries::new(
            "X",
            bars.bars()
                .iter()
                .cloned()
                .map(|mut b| {
                    b.high = None;
                    b
                })
                .collect(),
        )
        .unwrap();
        let err = Vma::new([6, 12, 30, 72, 144]).compute(&stripped).unwrap_err();
        assert_eq!(err, SeriesError::MissingColumn(Column::High));
    }
}
