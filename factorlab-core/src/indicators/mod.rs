//! Concrete indicator implementations.
//!
//! Every indicator implements `Indicator` from `components::indicator` and
//! returns its outputs as a `FactorSet`. They are built from the
//! pandas-style primitives in `rolling`.

pub mod amv;
pub mod bull_bear;
pub mod cr;
pub mod dma;
pub mod dmi;
pub mod emv;
pub mod js;
pub mod mass;
pub mod obv;
pub mod psy;
pub mod rolling;
pub mod rsrs;
pub mod trix;
pub mod uos;
pub mod vma;
pub mod vmacd;
pub mod vpt;
pub mod vr;

pub use amv::Amv;
pub use bull_bear::BullBear;
pub use cr::Cr;
pub use dma::Dma;
pub use dmi::Dmi;
pub use emv::Emv;
pub use js::Js;
pub use mass::Mass;
pub use obv::Obv;
pub use psy::Psy;
pub use rsrs::Rsrs;
pub use trix::Trix;
pub use uos::Uos;
pub use vma::Vma;
pub use vmacd::Vmacd;
pub use vpt::Vpt;
pub use vr::Vr;

/// Create a daily series from close prices for testing.
///
/// open = prev_close (or close for the first bar), high = max(open,close) + 1,
/// low = min(open,close) - 1, volume = 1000, turnover = 1.0, and pct_chg
/// derived from consecutive closes.
#[cfg(test)]
pub fn make_series(closes: &[f64]) -> crate::domain::BarSeries {
    make_series_with_volume(closes, &vec![1000.0; closes.len()])
}

#[cfg(test)]
pub fn make_series_with_volume(closes: &[f64], volumes: &[f64]) -> crate::domain::BarSeries {
    use crate::domain::{Bar, BarSeries};
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let bars = closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&close, &volume))| {
            let open = if i == 0 { close } else { closes[i - 1] };
            let pct_chg = if i == 0 {
                0.0
            } else {
                (close / closes[i - 1] - 1.0) * 100.0
            };
            Bar {
                timestamp: base + chrono::Duration::days(i as i64),
                open: Some(open),
                high: Some(open.max(close) + 1.0),
                low: Some(open.min(close) - 1.0),
                close,
                volume: Some(volume),
                amount: Some(close * volume),
                turnover: Some(1.0),
                pct_chg,
            }
        })
        .collect();
    BarSeries::new("TEST", bars).unwrap()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
