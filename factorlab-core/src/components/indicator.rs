//! Indicator trait and the named factor-series container it produces.
//!
//! Indicators are pure functions: bar series in, one or more index-aligned
//! factor series out. They are computed once per run, before any signal
//! rule looks at them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{BarSeries, Column, SeriesError};

/// Trait for indicators.
///
/// Every output series has the length of the input. Warm-up entries and any
/// value that cannot be computed are `f64::NAN`.
///
/// # Look-ahead contamination guard
/// No factor value at bar t may depend on data from bar t+1 or later.
/// Every indicator must pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "dma_10_50_10").
    fn name(&self) -> &str;

    /// Number of bars before every output is valid.
    fn lookback(&self) -> usize;

    /// Bar columns read besides `close`.
    fn required_columns(&self) -> &'static [Column];

    /// Names of the factor series `compute` returns.
    fn outputs(&self) -> &'static [&'static str];

    /// Compute every output over the full bar series.
    fn compute(&self, bars: &BarSeries) -> Result<FactorSet, SeriesError>;
}

/// Named, index-aligned factor series.
///
/// `BTreeMap` keeps iteration (and export column) order deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactorSet {
    series: BTreeMap<String, Vec<f64>>,
}

impl FactorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a named factor series.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.series.insert(name.into(), values);
    }

    /// Builder form of `insert`.
    pub fn with(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.insert(name, values);
        self
    }

    /// Value at `bar_index`. `None` when the name or index is unknown;
    /// `Some(NaN)` during warm-up.
    pub fn get(&self, name: &str, bar_index: usize) -> Option<f64> {
        self.series
            .get(name)
            .and_then(|v| v.get(bar_index).copied())
    }

    /// Value at `bar_index` if it exists and is not NaN.
    pub fn valid(&self, name: &str, bar_index: usize) -> Option<f64> {
        self.get(name, bar_index).filter(|v| !v.is_nan())
    }

    pub fn get_series(&self, name: &str) -> Option<&[f64]> {
        self.series.get(name).map(|v| v.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.series.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.series.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of factor series stored.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
