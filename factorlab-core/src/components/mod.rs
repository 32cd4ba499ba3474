//! Component traits — indicator + signal rule composition.
//!
//! A strategy is an `Indicator` producing factor series and a `SignalRule`
//! reading them. The factory builds both from `ComponentConfig`; the
//! composition layer wires them to the position resolver.

pub mod composition;
pub mod factory;
pub mod indicator;
pub mod signal;

pub use composition::{Strategy, StrategyPreset, StrategyRun};
pub use factory::{create_indicator, create_signal_rule, FactoryError};
pub use indicator::{FactorSet, Indicator};
pub use signal::SignalRule;
