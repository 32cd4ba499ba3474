//! Fitness function — configurable metric selector for ranking runs.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use factorlab_core::performance::Summary;

/// Which summary figure to optimize/sort by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessMetric {
    #[default]
    AnnualReturn,
    CumulativeReturn,
    Sharpe,
    ReturnOverDrawdown,
}

impl FitnessMetric {
    pub const ALL: [FitnessMetric; 4] = [
        Self::AnnualReturn,
        Self::CumulativeReturn,
        Self::Sharpe,
        Self::ReturnOverDrawdown,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::AnnualReturn => "annual_return",
            Self::CumulativeReturn => "cumulative_return",
            Self::Sharpe => "sharpe",
            Self::ReturnOverDrawdown => "return_over_drawdown",
        }
    }

    /// Extract the metric; `None` when the statistic is undefined.
    pub fn extract(&self, summary: &Summary) -> Option<f64> {
        let value = match self {
            Self::AnnualReturn => summary.annual_return.value(),
            Self::CumulativeReturn => Some(summary.cumulative_return),
            Self::Sharpe => summary.sharpe.value(),
            Self::ReturnOverDrawdown => summary.return_over_drawdown.value(),
        };
        value.filter(|v| !v.is_nan())
    }

    /// Best first. Undefined values rank after every defined one and tie
    /// with each other.
    pub fn rank(&self, a: &Summary, b: &Summary) -> Ordering {
        compare_desc(self.extract(a), self.extract(b))
    }
}

/// Descending order with `None` last.
pub(crate) fn compare_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl fmt::Display for FitnessMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FitnessMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.name() == s)
            .ok_or_else(|| {
                let known: Vec<_> = Self::ALL.iter().map(|m| m.name()).collect();
                format!("unknown metric '{s}' (expected one of {})", known.join(", "))
            })
    }
}
