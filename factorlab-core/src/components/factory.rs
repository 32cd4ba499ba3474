//! Factory system — converts `ComponentConfig` into runtime trait objects.
//!
//! Two factory functions, `create_indicator` and `create_signal_rule`.
//! Parameters are validated here so that constructors never see a zero
//! window.

use crate::fingerprint::ComponentConfig;
use crate::indicators::{
    Amv, BullBear, Cr, Dma, Dmi, Emv, Js, Mass, Obv, Psy, Rsrs, Trix, Uos, Vma, Vmacd, Vpt, Vr,
};

use super::indicator::Indicator;
use super::signal::{
    BelowCross, CrReversal, Crossover, GatedCross, LevelCross, MassReversal, SignalRule,
    SpreadBand, Threshold,
};

// ─── Error type ──────────────────────────────────────────────────────

/// Errors that can occur during component construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FactoryError {
    #[error("Unknown indicator type: {0}")]
    UnknownIndicator(String),
    #[error("Unknown signal rule type: {0}")]
    UnknownSignal(String),
    #[error("Invalid parameter {name}={value} for {component}")]
    InvalidParam {
        component: String,
        name: String,
        value: f64,
    },
    #[error("Signal rule {rule} needs a factor bound to role '{role}'")]
    MissingSeries { rule: String, role: String },
    #[error("Signal rule {rule} reads '{factor}', which indicator {indicator} does not produce")]
    UnknownFactor {
        rule: String,
        factor: String,
        indicator: String,
    },
}

// ─── Helpers ─────────────────────────────────────────────────────────

/// Extract a named f64 parameter from a `ComponentConfig`, falling back to `default`.
fn param(config: &ComponentConfig, name: &str, default: f64) -> f64 {
    config.params.get(name).copied().unwrap_or(default)
}

/// Longest window a config may ask for.
const MAX_PERIOD: usize = u32::MAX as usize;

/// Extract a window length: a whole number in `min..=MAX_PERIOD`.
fn period_at_least(
    config: &ComponentConfig,
    name: &str,
    default: usize,
    min: usize,
) -> Result<usize, FactoryError> {
    let value = param(config, name, default as f64);
    if !value.is_finite()
        || value.fract() != 0.0
        || value < min as f64
        || value > MAX_PERIOD as f64
    {
        return Err(invalid(config, name, value));
    }
    Ok(value as usize)
}

fn period(config: &ComponentConfig, name: &str, default: usize) -> Result<usize, FactoryError> {
    period_at_least(config, name, default, 1)
}

fn level(config: &ComponentConfig, name: &str, default: f64) -> Result<f64, FactoryError> {
    let value = param(config, name, default);
    if value.is_finite() {
        Ok(value)
    } else {
        Err(invalid(config, name, value))
    }
}

fn invalid(config: &ComponentConfig, name: &str, value: f64) -> FactoryError {
    FactoryError::InvalidParam {
        component: config.component_type.clone(),
        name: name.to_string(),
        value,
    }
}

/// Factor bound to `role`, or `default` when the config leaves it unset.
fn series_or(config: &ComponentConfig, role: &str, default: &str) -> String {
    config
        .series
        .get(role)
        .cloned()
        .unwrap_or_else(|| default.to_string())
}

/// Factor bound to `role`; the rule has no sensible default.
fn series_required(config: &ComponentConfig, role: &str) -> Result<String, FactoryError> {
    config
        .series
        .get(role)
        .cloned()
        .ok_or_else(|| FactoryError::MissingSeries {
            rule: config.component_type.clone(),
            role: role.to_string(),
        })
}

// ─── Indicator factory ───────────────────────────────────────────────

/// Create an indicator from a `ComponentConfig`.
pub fn create_indicator(config: &ComponentConfig) -> Result<Box<dyn Indicator>, FactoryError> {
    match config.component_type.as_str() {
        "dma" => Ok(Box::new(Dma::new(
            period(config, "n1", 10)?,
            period(config, "n2", 50)?,
            period(config, "m", 10)?,
        ))),
        "amv" => Ok(Box::new(Amv::new(
            period(config, "m1", 5)?,
            period(config, "m2", 10)?,
            period(config, "m3", 20)?,
            period(config, "m4", 250)?,
        ))),
        "vma" => Ok(Box::new(Vma::new([
            period(config, "m1", 6)?,
            period(config, "m2", 12)?,
            period(config, "m3", 30)?,
            period(config, "m4", 72)?,
            period(config, "m5", 144)?,
        ]))),
        "dmi" => Ok(Box::new(Dmi::new(
            period(config, "n", 14)?,
            period(config, "m", 6)?,
            period(config, "smooth", 1)?,
        ))),
        "emv" => Ok(Box::new(Emv::new(
            period(config, "n", 14)?,
            period(config, "m", 9)?,
        ))),
        "js" => Ok(Box::new(Js::new(
            period(config, "n", 5)?,
            period(config, "m1", 5)?,
            period(config, "m2", 10)?,
            period(config, "m3", 20)?,
        ))),
        "trix" => Ok(Box::new(Trix::new(
            period(config, "n", 12)?,
            period(config, "m", 9)?,
        ))),
        "uos" => Ok(Box::new(Uos::new(
            period(config, "n1", 7)?,
            period(config, "n2", 14)?,
            period(config, "n3", 28)?,
            period(config, "m", 6)?,
        ))),
        "vmacd" => Ok(Box::new(Vmacd::new(
            period(config, "n1", 12)?,
            period(config, "n2", 26)?,
            period(config, "m", 9)?,
        ))),
        "cr" => Ok(Box::new(Cr::new(
            period(config, "n", 26)?,
            [
                period(config, "m1", 10)?,
                period(config, "m2", 20)?,
                period(config, "m3", 40)?,
                period(config, "m4", 62)?,
            ],
        ))),
        "mass" => Ok(Box::new(Mass::new(
            period(config, "n1", 9)?,
            period(config, "n2", 25)?,
            period(config, "m", 6)?,
        ))),
        "vpt" => Ok(Box::new(Vpt::new(
            period(config, "n", 51)?,
            period(config, "m", 6)?,
        ))),
        "psy" => Ok(Box::new(Psy::new(
            period(config, "n", 12)?,
            period(config, "m", 6)?,
        ))),
        "vr" => Ok(Box::new(Vr::new(
            period(config, "n", 26)?,
            period(config, "m", 6)?,
        ))),
        "obv" => Ok(Box::new(Obv::new(period(config, "m", 30)?))),
        "rsrs" => Ok(Box::new(Rsrs::new(
            period_at_least(config, "n", 18, 2)?,
            period(config, "m", 60)?,
        ))),
        "bull_bear" => Ok(Box::new(BullBear::new(
            period_at_least(config, "window", 250, 2)?,
            period(config, "fast", 20)?,
            period(config, "slow", 60)?,
        ))),
        other => Err(FactoryError::UnknownIndicator(other.to_string())),
    }
}

// ─── Signal rule factory ─────────────────────────────────────────────

/// Create a signal rule from a `ComponentConfig`.
pub fn create_signal_rule(config: &ComponentConfig) -> Result<Box<dyn SignalRule>, FactoryError> {
    match config.component_type.as_str() {
        "crossover" => Ok(Box::new(Crossover::new(
            series_required(config, "fast")?,
            series_required(config, "slow")?,
            param(config, "inclusive", 0.0) != 0.0,
        ))),
        "level_cross" => {
            let long_level = level(config, "long_level", 0.0)?;
            let short_level = level(config, "short_level", long_level)?;
            Ok(Box::new(LevelCross::new(
                series_required(config, "series")?,
                long_level,
                short_level,
            )))
        }
        "spread_band" => {
            let long_min = level(config, "long_min", 2.0)?;
            let short_max = level(config, "short_max", -10.0)?;
            if short_max >= long_min {
                return Err(invalid(config, "short_max", short_max));
            }
            Ok(Box::new(SpreadBand::new(
                series_required(config, "fast")?,
                series_required(config, "slow")?,
                long_min,
                short_max,
            )))
        }
        "gated_cross" => Ok(Box::new(GatedCross::new(
            series_or(config, "line", "dif"),
            series_or(config, "slow", "dea"),
            series_or(config, "hist", "osc"),
        ))),
        "cr_reversal" => {
            let envelope: Vec<String> = series_or(config, "envelope", "ma1,ma2,ma3,ma4")
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(String::from)
                .collect();
            if envelope.is_empty() {
                return Err(FactoryError::MissingSeries {
                    rule: config.component_type.clone(),
                    role: "envelope".into(),
                });
            }
            Ok(Box::new(CrReversal::new(
                series_or(config, "series", "cr"),
                envelope,
                level(config, "oversold", 40.0)?,
                level(config, "overbought", 400.0)?,
            )))
        }
        "mass_reversal" => Ok(Box::new(MassReversal::new(
            series_or(config, "series", "mass"),
            level(config, "upper", 27.0)?,
            level(config, "trigger", 26.5)?,
        ))),
        "below_cross" => Ok(Box::new(BelowCross::new(
            series_or(config, "fast", "kernel_fast"),
            series_or(config, "slow", "kernel_slow"),
        ))),
        "threshold" => {
            let upper = level(config, "upper", 1.0)?;
            let lower = level(config, "lower", 0.8)?;
            if lower > upper {
                return Err(invalid(config, "lower", lower));
            }
            Ok(Box::new(Threshold::new(
                series_or(config, "series", "beta"),
                upper,
                lower,
            )))
        }
        other => Err(FactoryError::UnknownSignal(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_every_indicator_with_defaults() {
        let types = [
            "dma", "amv", "vma", "dmi", "emv", "js", "trix", "uos", "vmacd", "cr", "mass", "vpt",
            "psy", "vr", "obv", "rsrs", "bull_bear",
        ];
        for t in types {
            let ind = create_indicator(&ComponentConfig::new(t)).unwrap();
            assert!(!ind.outputs().is_empty(), "{t} has no outputs");
        }
    }

    #[test]
    fn indicator_params_are_applied() {
        let config = ComponentConfig::new("dma")
            .with_param("n1", 5.0)
            .with_param("n2", 20.0)
            .with_param("m", 3.0);
        let ind = create_indicator(&config).unwrap();
        assert_eq!(ind.name(), "dma_5_20_3");
    }

    #[test]
    fn unknown_indicator_errors() {
        let err = create_indicator(&ComponentConfig::new("nonexistent")).err().unwrap();
        assert_eq!(err, FactoryError::UnknownIndicator("nonexistent".into()));
    }

    #[test]
    fn zero_or_fractional_period_is_rejected() {
        for bad in [0.0, 2.5, -3.0, f64::NAN] {
            let config = ComponentConfig::new("obv").with_param("m", bad);
            assert!(matches!(
                create_indicator(&config),
                Err(FactoryError::InvalidParam { .. })
            ));
        }
        let config = ComponentConfig::new("bull_bear").with_param("window", 1.0);
        assert!(create_indicator(&config).is_err());
        let config = ComponentConfig::new("rsrs").with_param("n", 1.0);
        assert!(create_indicator(&config).is_err());
    }

    #[test]
    fn oversized_period_is_rejected() {
        // 2^64 is a whole, finite f64 that no window can hold
        let huge = 1.8446744073709552e19;
        for (t, name) in [("psy", "n"), ("dmi", "m"), ("cr", "m4"), ("vr", "n"), ("rsrs", "m")] {
            let config = ComponentConfig::new(t).with_param(name, huge);
            assert_eq!(
                create_indicator(&config).err(),
                Some(FactoryError::InvalidParam {
                    component: t.into(),
                    name: name.into(),
                    value: huge,
                }),
                "{t}.{name}"
            );
        }
        let config = ComponentConfig::new("psy").with_param("n", u32::MAX as f64 + 1.0);
        assert!(create_indicator(&config).is_err());
    }

    #[test]
    fn creates_every_rule() {
        let crossover = ComponentConfig::new("crossover")
            .with_series("fast", "dif")
            .with_series("slow", "difma");
        assert_eq!(
            create_signal_rule(&crossover).unwrap().required_factors(),
            vec!["dif", "difma"]
        );
        let level = ComponentConfig::new("level_cross").with_series("series", "emv");
        assert_eq!(create_signal_rule(&level).unwrap().name(), "level_cross");
        let band = ComponentConfig::new("spread_band")
            .with_series("fast", "pdi")
            .with_series("slow", "mdi");
        assert_eq!(create_signal_rule(&band).unwrap().name(), "spread_band");
        for t in [
            "gated_cross",
            "cr_reversal",
            "mass_reversal",
            "below_cross",
            "threshold",
        ] {
            assert_eq!(create_signal_rule(&ComponentConfig::new(t)).unwrap().name(), t);
        }
    }

    #[test]
    fn cr_envelope_is_comma_separated() {
        let config = ComponentConfig::new("cr_reversal").with_series("envelope", "ma1, ma3");
        let rule = create_signal_rule(&config).unwrap();
        assert_eq!(rule.required_factors(), vec!["cr", "ma1", "ma3"]);
    }

    #[test]
    fn missing_role_errors() {
        let err = create_signal_rule(&ComponentConfig::new("crossover")).err().unwrap();
        assert_eq!(
            err,
            FactoryError::MissingSeries {
                rule: "crossover".into(),
                role: "fast".into()
            }
        );
    }

    #[test]
    fn inverted_band_is_rejected() {
        let config = ComponentConfig::new("spread_band")
            .with_series("fast", "pdi")
            .with_series("slow", "mdi")
            .with_param("long_min", -5.0)
            .with_param("short_max", 5.0);
        assert!(matches!(
            create_signal_rule(&config),
            Err(FactoryError::InvalidParam { .. })
        ));
    }

    #[test]
    fn threshold_levels_must_be_ordered() {
        let config = ComponentConfig::new("threshold")
            .with_series("series", "stdbeta")
            .with_param("upper", -0.7)
            .with_param("lower", 0.7);
        assert!(matches!(
            create_signal_rule(&config),
            Err(FactoryError::InvalidParam { ref name, .. }) if name == "lower"
        ));
        let config = ComponentConfig::new("threshold").with_series("series", "stdbeta");
        assert_eq!(create_signal_rule(&config).unwrap().required_factors(), vec!["stdbeta"]);
    }

    #[test]
    fn unknown_rule_errors() {
        assert!(matches!(
            create_signal_rule(&ComponentConfig::new("magic")),
            Err(FactoryError::UnknownSignal(_))
        ));
    }
}
