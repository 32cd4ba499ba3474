//! Bar — one trading-period record.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single bar for one instrument.
///
/// `close` and `pct_chg` are always present. The remaining columns are
/// optional because data sources differ in what they deliver; an indicator
/// that needs one of them asks the series for it and gets a
/// `SeriesError::MissingColumn` when it is absent.
///
/// `pct_chg` is the realized return of the bar in **percent** and is the
/// return the performance engine uses, independent of `close`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: Option<f64>,
    pub amount: Option<f64>,
    pub turnover: Option<f64>,
    pub pct_chg: f64,
}

impl Bar {
    /// Bar with only the mandatory columns set.
    pub fn new(timestamp: NaiveDateTime, close: f64, pct_chg: f64) -> Self {
        Self {
            timestamp,
            open: None,
            high: None,
            low: None,
            close,
            volume: None,
            amount: None,
            turnover: None,
            pct_chg,
        }
    }

    /// Value of `column` on this bar, `None` when the column is not carried.
    pub fn value(&self, column: Column) -> Option<f64> {
        match column {
            Column::Open => self.open,
            Column::High => self.high,
            Column::Low => self.low,
            Column::Close => Some(self.close),
            Column::Volume => self.volume,
            Column::Amount => self.amount,
            Column::Turnover => self.turnover,
            Column::PctChg => Some(self.pct_chg),
        }
    }

    /// Realized return of the bar as a fraction (`pct_chg / 100`).
    pub fn return_fraction(&self) -> f64 {
        self.pct_chg / 100.0
    }
}

/// Numeric bar columns an indicator may read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Open,
    High,
    Low,
    Close,
    Volume,
    Amount,
    Turnover,
    PctChg,
}

impl Column {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::High => "high",
            Self::Low => "low",
            Self::Close => "close",
            Self::Volume => "volume",
            Self::Amount => "amount",
            Self::Turnover => "turnover",
            Self::PctChg => "pct_chg",
        }
    }

    pub fn all() -> &'static [Column] {
        &[
            Self::Open,
            Self::High,
            Self::Low,
            Self::Close,
            Self::Volume,
            Self::Amount,
            Self::Turnover,
            Self::PctChg,
        ]
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
