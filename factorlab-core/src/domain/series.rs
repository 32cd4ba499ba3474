//! Bar series — the validated, time-ordered input to every computation.

use chrono::NaiveDateTime;
use serde::Serialize;

use super::bar::{Bar, Column};

/// Input errors. Raised before any computation starts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeriesError {
    #[error("bar series is empty")]
    Empty,
    #[error("timestamps not strictly increasing at index {index}: {previous} then {current}")]
    NonMonotonic {
        index: usize,
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },
    #[error("required column '{0}' is missing")]
    MissingColumn(Column),
    #[error("non-finite pct_chg at index {index}")]
    NonFiniteReturn { index: usize },
    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// An immutable, non-empty sequence of bars with strictly increasing
/// timestamps.
///
/// Every derived series (factors, signals, positions, overlay columns) is
/// index-aligned with this one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Validate and wrap `bars`.
    ///
    /// Rejects an empty input, any timestamp that does not strictly follow
    /// its predecessor, and any non-finite `pct_chg`.
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, SeriesError> {
        if bars.is_empty() {
            return Err(SeriesError::Empty);
        }
        for (index, pair) in bars.windows(2).enumerate() {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(SeriesError::NonMonotonic {
                    index: index + 1,
                    previous: pair[0].timestamp,
                    current: pair[1].timestamp,
                });
            }
        }
        if let Some(index) = bars.iter().position(|b| !b.pct_chg.is_finite()) {
            return Err(SeriesError::NonFiniteReturn { index });
        }
        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false for a constructed series; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_timestamp(&self) -> NaiveDateTime {
        self.bars[0].timestamp
    }

    pub fn last_timestamp(&self) -> NaiveDateTime {
        self.bars[self.bars.len() - 1].timestamp
    }

    pub fn timestamps(&self) -> Vec<NaiveDateTime> {
        self.bars.iter().map(|b| b.timestamp).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Per-bar returns in percent.
    pub fn pct_chg(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.pct_chg).collect()
    }

    /// True when every bar carries `column`.
    pub fn has_column(&self, column: Column) -> bool {
        self.bars.iter().all(|b| b.value(column).is_some())
    }

    /// Extract one column as a dense `f64` series.
    ///
    /// A column is either carried by every bar or missing; a partially
    /// populated column is reported as missing.
    pub fn column(&self, column: Column) -> Result<Vec<f64>, SeriesError> {
        self.bars
            .iter()
            .map(|b| b.value(column).ok_or(SeriesError::MissingColumn(column)))
            .collect()
    }

    /// Check that every column in `columns` is available.
    pub fn require(&self, columns: &[Column]) -> Result<(), SeriesError> {
        match columns.iter().find(|c| !self.has_column(**c)) {
            Some(missing) => Err(SeriesError::MissingColumn(*missing)),
            None => Ok(()),
        }
    }

    /// Check that a derived series is index-aligned with this one.
    pub fn check_aligned(&self, actual: usize) -> Result<(), SeriesError> {
        if actual != self.bars.len() {
            return Err(SeriesError::LengthMismatch {
                expected: self.bars.len(),
                actual,
            });
        }
        Ok(())
    }

    /// The first `len` bars as a new series.
    pub fn truncated(&self, len: usize) -> Result<Self, SeriesError> {
        Self::new(
            self.symbol.clone(),
            self.bars[..len.min(self.bars.len())].to_vec(),
        )
    }
}
