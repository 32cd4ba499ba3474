//! Domain types for FactorLab

pub mod bar;
pub mod position;
pub mod series;
pub mod signal;
pub mod trade;

pub use bar::{Bar, Column};
pub use position::Position;
pub use series::{BarSeries, SeriesError};
pub use signal::Signal;
pub use trade::{Side, Trade};

/// Symbol type alias
pub type Symbol = String;
