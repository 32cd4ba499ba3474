//! Strategy composition — assembles indicator + signal rule from config.
//!
//! - `Strategy`: the assembled runtime components.
//! - `Strategy::positions`: bars to factors, factors to signals, signals to positions.
//! - `StrategyPreset`: named indicator/rule pairings.

use std::fmt;

use tracing::debug;

use crate::domain::{BarSeries, Position, SeriesError, Signal};
use crate::fingerprint::{ComponentConfig, StrategyConfig};
use crate::resolver::{resolve, FillPolicy};

use super::factory::{create_indicator, create_signal_rule, FactoryError};
use super::indicator::{FactorSet, Indicator};
use super::signal::SignalRule;

// ─── Strategy ───────────────────────────────────────────────────────

/// A fully assembled strategy.
pub struct Strategy {
    pub indicator: Box<dyn Indicator>,
    pub rule: Box<dyn SignalRule>,
    pub fill: FillPolicy,
    pub config: StrategyConfig,
}

/// Everything a strategy derives from one bar series.
#[derive(Debug, Clone)]
pub struct StrategyRun {
    pub factors: FactorSet,
    pub signals: Vec<Signal>,
    pub positions: Vec<Position>,
}

impl Strategy {
    /// Build both components and check that every factor the rule reads is
    /// one the indicator produces.
    pub fn from_config(config: &StrategyConfig) -> Result<Self, FactoryError> {
        let indicator = create_indicator(&config.indicator)?;
        let rule = create_signal_rule(&config.signal)?;

        let outputs = indicator.outputs();
        if let Some(missing) = rule
            .required_factors()
            .into_iter()
            .find(|factor| !outputs.iter().any(|out| out == factor))
        {
            return Err(FactoryError::UnknownFactor {
                rule: rule.name().to_string(),
                factor: missing.to_string(),
                indicator: indicator.name().to_string(),
            });
        }

        Ok(Self {
            indicator,
            rule,
            fill: config.fill,
            config: config.clone(),
        })
    }

    pub fn positions(&self, bars: &BarSeries) -> Result<StrategyRun, SeriesError> {
        let factors = self.indicator.compute(bars)?;
        for (_, values) in factors.iter() {
            bars.check_aligned(values.len())?;
        }
        let signals = self.rule.generate(&factors, bars.len());
        let positions = resolve(&signals, self.fill.position());
        debug!(
            indicator = self.indicator.name(),
            rule = self.rule.name(),
            decisions = signals.iter().filter(|s| s.is_decision()).count(),
            "resolved positions"
        );
        Ok(StrategyRun {
            factors,
            signals,
            positions,
        })
    }
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Strategy")
            .field("indicator", &self.indicator.name())
            .field("rule", &self.rule.name())
            .field("fill", &self.fill)
            .finish()
    }
}

// ─── StrategyPreset ─────────────────────────────────────────────────

/// Named strategy presets, one per indicator family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyPreset {
    Dma,
    Amv,
    Vma,
    Dmi,
    DmiBand,
    Emv,
    Js,
    Trix,
    Uos,
    Vmacd,
    Cr,
    Mass,
    Vpt,
    Rsrs,
    RsrsStd,
    BullBear,
}

fn crossover(fast: &str, slow: &str) -> ComponentConfig {
    ComponentConfig::new("crossover")
        .with_series("fast", fast)
        .with_series("slow", slow)
}

fn zero_cross(series: &str) -> ComponentConfig {
    ComponentConfig::new("level_cross").with_series("series", series)
}

fn threshold(series: &str, upper: f64, lower: f64) -> ComponentConfig {
    ComponentConfig::new("threshold")
        .with_series("series", series)
        .with_param("upper", upper)
        .with_param("lower", lower)
}

impl StrategyPreset {
    pub fn name(self) -> &'static str {
        match self {
            Self::Dma => "dma",
            Self::Amv => "amv",
            Self::Vma => "vma",
            Self::Dmi => "dmi",
            Self::DmiBand => "dmi_band",
            Self::Emv => "emv",
            Self::Js => "js",
            Self::Trix => "trix",
            Self::Uos => "uos",
            Self::Vmacd => "vmacd",
            Self::Cr => "cr",
            Self::Mass => "mass",
            Self::Vpt => "vpt",
            Self::Rsrs => "rsrs",
            Self::RsrsStd => "rsrs_std",
            Self::BullBear => "bull_bear",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|p| p.name() == name)
    }

    /// One-line summary for listings.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Dma => "DIF crosses its moving average",
            Self::Amv => "short cost average crosses the long one",
            Self::Vma => "fastest variable MA crosses the slowest",
            Self::Dmi => "+DI crosses -DI (touch counts)",
            Self::DmiBand => "+DI/-DI spread band, long/short/flat",
            Self::Emv => "ease of movement crosses zero",
            Self::Js => "acceleration line crosses its average",
            Self::Trix => "TRIX crosses its average",
            Self::Uos => "ultimate oscillator crosses 45 up or 65 down",
            Self::Vmacd => "volume MACD histogram cross gated by line signs",
            Self::Cr => "CR oversold/overbought and envelope breaks",
            Self::Mass => "mass index reversal bulge",
            Self::Vpt => "volume price trend crosses zero",
            Self::Rsrs => "high/low slope above 1 buys, below 0.8 exits",
            Self::RsrsStd => "standardized high/low slope above 0.7 buys, below -0.7 exits",
            Self::BullBear => "long while volatility/turnover kernel is falling",
        }
    }

    pub fn to_config(self) -> StrategyConfig {
        let (indicator, signal, fill) = match self {
            Self::Dma => (
                ComponentConfig::new("dma"),
                crossover("dif", "difma"),
                FillPolicy::Long,
            ),
            Self::Amv => (
                ComponentConfig::new("amv"),
                crossover("amv1", "amv4"),
                FillPolicy::Long,
            ),
            Self::Vma => (
                ComponentConfig::new("vma"),
                crossover("vma1", "vma5"),
                FillPolicy::Long,
            ),
            Self::Dmi => (
                ComponentConfig::new("dmi"),
                crossover("pdi", "mdi").with_param("inclusive", 1.0),
                FillPolicy::Long,
            ),
            Self::DmiBand => (
                ComponentConfig::new("dmi").with_param("smooth", 3.0),
                ComponentConfig::new("spread_band")
                    .with_series("fast", "pdi")
                    .with_series("slow", "mdi")
                    .with_param("long_min", 2.0)
                    .with_param("short_max", -10.0),
                FillPolicy::Long,
            ),
            Self::Emv => (
                ComponentConfig::new("emv"),
                zero_cross("emv"),
                FillPolicy::Long,
            ),
            Self::Js => (
                ComponentConfig::new("js"),
                crossover("js", "majs1"),
                FillPolicy::Long,
            ),
            Self::Trix => (
                ComponentConfig::new("trix"),
                crossover("trix", "trma"),
                FillPolicy::Long,
            ),
            Self::Uos => (
                ComponentConfig::new("uos"),
                zero_cross("uos")
                    .with_param("long_level", 45.0)
                    .with_param("short_level", 65.0),
                FillPolicy::Long,
            ),
            Self::Vmacd => (
                ComponentConfig::new("vmacd"),
                ComponentConfig::new("gated_cross"),
                FillPolicy::Long,
            ),
            Self::Cr => (
                ComponentConfig::new("cr"),
                ComponentConfig::new("cr_reversal"),
                FillPolicy::Long,
            ),
            Self::Mass => (
                ComponentConfig::new("mass"),
                ComponentConfig::new("mass_reversal"),
                FillPolicy::Long,
            ),
            Self::Vpt => (
                ComponentConfig::new("vpt"),
                zero_cross("vpt"),
                FillPolicy::Long,
            ),
            Self::Rsrs => (
                ComponentConfig::new("rsrs"),
                threshold("beta", 1.0, 0.8),
                FillPolicy::Flat,
            ),
            Self::RsrsStd => (
                ComponentConfig::new("rsrs"),
                threshold("stdbeta", 0.7, -0.7),
                FillPolicy::Flat,
            ),
            Self::BullBear => (
                ComponentConfig::new("bull_bear"),
                ComponentConfig::new("below_cross"),
                FillPolicy::Flat,
            ),
        };
        StrategyConfig {
            fill,
            indicator,
            signal,
        }
    }

    pub fn all() -> &'static [StrategyPreset] {
        &[
            Self::Dma,
            Self::Amv,
            Self::Vma,
            Self::Dmi,
            Self::DmiBand,
            Self::Emv,
            Self::Js,
            Self::Trix,
            Self::Uos,
            Self::Vmacd,
            Self::Cr,
            Self::Mass,
            Self::Vpt,
            Self::Rsrs,
            Self::RsrsStd,
            Self::BullBear,
        ]
    }
}

impl fmt::Display for StrategyPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
