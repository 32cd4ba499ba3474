//! Signal — the discrete decision a rule emits at one bar.

use serde::{Deserialize, Serialize};

use super::position::Position;

/// Per-bar decision emitted by a signal rule.
///
/// Sparse by nature: most bars carry `NoSignal`. `Flat` is an explicit
/// decision to drop exposure and forward-fills like `Long` and `Short`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Long,
    Short,
    Flat,
    #[default]
    NoSignal,
}

impl Signal {
    /// The position this decision asks for, `None` for `NoSignal`.
    pub fn target(self) -> Option<Position> {
        match self {
            Self::Long => Some(Position::Long),
            Self::Short => Some(Position::Short),
            Self::Flat => Some(Position::Flat),
            Self::NoSignal => None,
        }
    }

    pub fn is_decision(self) -> bool {
        self != Self::NoSignal
    }
}
