//! Position — dense long / flat / short exposure held during a bar.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::trade::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Long,
    Flat,
    Short,
}

impl Position {
    /// Signed unit exposure: +1, 0 or -1.
    pub fn exposure(self) -> f64 {
        match self {
            Self::Long => 1.0,
            Self::Flat => 0.0,
            Self::Short => -1.0,
        }
    }

    pub fn is_held(self) -> bool {
        self != Self::Flat
    }

    /// Trade side for a held position.
    pub fn side(self) -> Option<Side> {
        match self {
            Self::Long => Some(Side::Long),
            Self::Short => Some(Side::Short),
            Self::Flat => None,
        }
    }

    /// Integer form used in exports (`1`, `0`, `-1`).
    pub fn as_i8(self) -> i8 {
        match self {
            Self::Long => 1,
            Self::Flat => 0,
            Self::Short => -1,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i8())
    }
}
