//! FactorLab Core — bar series, indicators, signal rules, position
//! resolution and the performance engine.
//!
//! Data flows one way:
//! - Bar series (validated, time-ordered input)
//! - Indicator functions producing aligned factor series
//! - Signal rules mapping factors to sparse Long/Short/Flat decisions
//! - Position resolver (forward-fill, one-bar lag, fill policy)
//! - Performance engine (overlay, trade segmentation, summary)

pub mod components;
pub mod domain;
pub mod fingerprint;
pub mod indicators;
pub mod performance;
pub mod resolver;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: core types can cross threads for parallel sweeps.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::BarSeries>();
        require_sync::<domain::BarSeries>();
        require_send::<domain::Signal>();
        require_sync::<domain::Signal>();
        require_send::<domain::Position>();
        require_sync::<domain::Position>();
        require_send::<domain::Trade>();
        require_sync::<domain::Trade>();

        // Component types
        require_send::<components::FactorSet>();
        require_sync::<components::FactorSet>();
        require_send::<components::Strategy>();
        require_sync::<components::Strategy>();
        require_send::<components::StrategyRun>();
        require_sync::<components::StrategyRun>();

        // Fingerprint types
        require_send::<fingerprint::StrategyConfig>();
        require_sync::<fingerprint::StrategyConfig>();
        require_send::<fingerprint::ConfigHash>();
        require_sync::<fingerprint::ConfigHash>();

        // Performance types
        require_send::<performance::PerformanceConfig>();
        require_sync::<performance::PerformanceConfig>();
        require_send::<performance::Evaluation>();
        require_sync::<performance::Evaluation>();
        require_send::<performance::Statistic>();
        require_sync::<performance::Statistic>();
    }

    /// Architecture contract: a signal rule sees factor values only.
    ///
    /// `evaluate()` takes the factor set and a bar index, with no position or
    /// return parameter, so a rule cannot react to its own performance.
    #[test]
    fn signal_rule_trait_has_no_position_parameter() {
        fn _check_trait_object_builds(
            rule: &dyn components::SignalRule,
            factors: &components::FactorSet,
        ) -> domain::Signal {
            rule.evaluate(factors, 0)
        }
    }

    /// Architecture contract: the performance engine takes any dense position
    /// series, independent of which indicator produced it.
    #[test]
    fn performance_engine_is_indicator_agnostic() {
        fn _check(
            bars: &domain::BarSeries,
            position: &[domain::Position],
            config: &performance::PerformanceConfig,
        ) -> Result<performance::Evaluation, performance::PerformanceError> {
            performance::evaluate(bars, position, config)
        }
    }
}
