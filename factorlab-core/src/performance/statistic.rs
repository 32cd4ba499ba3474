//! Statistic — a summary figure that is either defined or explicitly
//! undefined with a reason.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Denominators below this magnitude are treated as zero.
pub const ZERO_EPSILON: f64 = 1e-15;

/// Why a ratio has no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Degenerate {
    /// No settled trades on this side.
    NoTrades,
    /// No bar held a nonzero position.
    NoBarsInMarket,
    /// Max drawdown is zero.
    ZeroDrawdown,
    /// Excess-return volatility is zero.
    ZeroVolatility,
    /// Fewer than two bars; sample deviation is not defined.
    InsufficientBars,
    /// No settled trade closed with a gain.
    NoWinningTrades,
    /// No settled trade closed with a loss.
    NoLosingTrades,
    /// The figure overflowed to infinity or NaN.
    NonFinite,
}

impl Degenerate {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::NoTrades => "no trades",
            Self::NoBarsInMarket => "no bars in market",
            Self::ZeroDrawdown => "zero drawdown",
            Self::ZeroVolatility => "zero volatility",
            Self::InsufficientBars => "insufficient bars",
            Self::NoWinningTrades => "no winning trades",
            Self::NoLosingTrades => "no losing trades",
            Self::NonFinite => "not finite",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Statistic {
    Defined(f64),
    Undefined(Degenerate),
}

impl Statistic {
    /// `Defined(value)` for finite values, `Undefined(NonFinite)` otherwise.
    pub fn finite(value: f64) -> Self {
        if value.is_finite() {
            Self::Defined(value)
        } else {
            Self::Undefined(Degenerate::NonFinite)
        }
    }

    /// `numerator / denominator`, or `Undefined(reason)` when the
    /// denominator is zero or not finite. A quotient that overflows is
    /// `Undefined(NonFinite)`.
    pub fn ratio(numerator: f64, denominator: f64, reason: Degenerate) -> Self {
        if !denominator.is_finite() || denominator.abs() < ZERO_EPSILON {
            Self::Undefined(reason)
        } else {
            Self::finite(numerator / denominator)
        }
    }

    /// Count ratio; undefined when `denominator == 0`.
    pub fn count_ratio(numerator: usize, denominator: usize, reason: Degenerate) -> Self {
        if denominator == 0 {
            Self::Undefined(reason)
        } else {
            Self::Defined(numerator as f64 / denominator as f64)
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Defined(v) => Some(*v),
            Self::Undefined(_) => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Self::Defined(_))
    }

    /// Apply `f` to a defined value; undefined passes through.
    pub fn and_then(self, f: impl FnOnce(f64) -> Statistic) -> Statistic {
        match self {
            Self::Defined(v) => f(v),
            undefined => undefined,
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Defined(v) => match f.precision() {
                Some(p) => write!(f, "{v:.p$}"),
                None => write!(f, "{v}"),
            },
            Self::Undefined(reason) => write!(f, "undefined ({})", reason.describe()),
        }
    }
}
