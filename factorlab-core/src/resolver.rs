//! Position resolver — sparse signals to a dense, one-bar-lagged position
//! series.
//!
//! The position held during bar `t` is the last decision visible at the
//! close of bar `t-1`. Bars before the first decision take the fill value.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{Position, Signal};

/// Position used for the leading bars that precede any decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillPolicy {
    #[default]
    Long,
    Flat,
}

impl FillPolicy {
    pub fn position(self) -> Position {
        match self {
            Self::Long => Position::Long,
            Self::Flat => Position::Flat,
        }
    }
}

impl fmt::Display for FillPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => f.pad("long"),
            Self::Flat => f.pad("flat"),
        }
    }
}

/// Forward-fill, shift by one bar, fill the undefined prefix.
///
/// Single O(n) pass. `position[t]` depends only on `signals[..t]`.
pub fn resolve(signals: &[Signal], fill: Position) -> Vec<Position> {
    let mut positions = Vec::with_capacity(signals.len());
    let mut last_decision: Option<Position> = None;
    for signal in signals {
        positions.push(last_decision.unwrap_or(fill));
        if let Some(target) = signal.target() {
            last_decision = Some(target);
        }
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use Signal::*;

    #[test]
    fn forward_fills_and_lags_one_bar() {
        let signals = [NoSignal, Long, NoSignal, NoSignal, Short, NoSignal];
        let positions = resolve(&signals, Position::Flat);
        assert_eq!(
            positions,
            vec![
                Position::Flat,
                Position::Flat,
                Position::Long,
                Position::Long,
                Position::Long,
                Position::Short,
            ]
        );
    }

    #[test]
    fn all_no_signal_is_constant_fill() {
        let positions = resolve(&[NoSignal; 4], Position::Long);
        assert_eq!(positions, vec![Position::Long; 4]);
    }

    #[test]
    fn decision_on_bar_zero_applies_from_bar_one() {
        let positions = resolve(&[Short, NoSignal], Position::Long);
        assert_eq!(positions, vec![Position::Long, Position::Short]);
    }

    #[test]
    fn flat_decision_drops_exposure() {
        let positions = resolve(&[Long, Flat, NoSignal], Position::Long);
        assert_eq!(
            positions,
            vec![Position::Long, Position::Long, Position::Flat]
        );
    }

    #[test]
    fn last_signal_never_used() {
        let a = resolve(&[Long, NoSignal, Short], Position::Flat);
        let b = resolve(&[Long, NoSignal, Long], Position::Flat);
        assert_eq!(a, b);
    }

    #[test]
    fn empty_input() {
        assert!(resolve(&[], Position::Long).is_empty());
    }

    #[test]
    fn fill_policy_maps_to_position() {
        assert_eq!(FillPolicy::default().position(), Position::Long);
        assert_eq!(FillPolicy::Flat.position(), Position::Flat);
    }
}
