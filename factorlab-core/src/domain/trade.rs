//! Trade — a maximal run of bars with constant nonzero position.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Long,
    Short,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => f.write_str("long"),
            Self::Short => f.write_str("short"),
        }
    }
}

/// One holding run.
///
/// `entry_index` is the first bar held. `exit_index` is the bar at which the
/// position changed away (exclusive end), so `bars_held == exit_index -
/// entry_index`. For a run still open at the end of the data `exit_index` is
/// the series length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub side: Side,
    pub entry_index: usize,
    pub exit_index: usize,
    pub bars_held: usize,
    pub winning_bars: usize,
    /// Compounded held return over the run.
    #[serde(rename = "return")]
    pub compounded_return: f64,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.compounded_return > 0.0
    }
}
