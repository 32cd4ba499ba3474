//! Parameter sweep over a grid of indicator parameters.
//!
//! Every grid point is an independent run over the same bars, so runs are
//! evaluated in parallel with rayon and re-sorted afterwards: serial and
//! parallel sweeps return identical, identically ordered results.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use factorlab_core::domain::BarSeries;
use factorlab_core::fingerprint::{ConfigHash, StrategyConfig};
use factorlab_core::performance::{PerformanceConfig, Summary};

use crate::fitness::FitnessMetric;
use crate::runner::{run_backtest, RunError};

/// Named parameter axes; the grid is their cartesian product.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamGrid {
    axes: BTreeMap<String, Vec<f64>>,
}

impl ParamGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) an axis.
    pub fn with_axis(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.axes.insert(name.into(), values);
        self
    }

    /// Parse `name=v1,v2,...` as used on the command line.
    pub fn parse_axis(spec: &str) -> Result<(String, Vec<f64>), RunError> {
        let (name, values) = spec
            .split_once('=')
            .ok_or_else(|| RunError::Grid(format!("expected name=v1,v2,... in '{spec}'")))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(RunError::Grid(format!("missing parameter name in '{spec}'")));
        }
        let values = values
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| {
                v.parse::<f64>()
                    .map_err(|_| RunError::Grid(format!("'{v}' is not a number in '{spec}'")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if values.is_empty() {
            return Err(RunError::Grid(format!("no values for '{name}'")));
        }
        Ok((name.to_string(), values))
    }

    /// Build a grid from several `name=v1,v2` specs.
    pub fn from_specs<S: AsRef<str>>(specs: &[S]) -> Result<Self, RunError> {
        specs.iter().try_fold(Self::new(), |grid, spec| {
            let (name, values) = Self::parse_axis(spec.as_ref())?;
            Ok(grid.with_axis(name, values))
        })
    }

    pub fn axes(&self) -> &BTreeMap<String, Vec<f64>> {
        &self.axes
    }

    /// Total number of grid points.
    pub fn size(&self) -> usize {
        if self.axes.is_empty() {
            0
        } else {
            self.axes.values().map(Vec::len).product()
        }
    }

    /// All grid points, the last axis (by name) varying fastest.
    pub fn points(&self) -> Vec<BTreeMap<String, f64>> {
        if self.axes.is_empty() {
            return Vec::new();
        }
        self.axes.iter().fold(vec![BTreeMap::new()], |acc, (name, values)| {
            acc.iter()
                .flat_map(|point| {
                    values.iter().map(move |v| {
                        let mut next = point.clone();
                        next.insert(name.clone(), *v);
                        next
                    })
                })
                .collect()
        })
    }

    /// `base` with each grid point applied to its indicator parameters.
    pub fn configs(&self, base: &StrategyConfig) -> Vec<(BTreeMap<String, f64>, StrategyConfig)> {
        self.points()
            .into_iter()
            .map(|point| {
                let mut config = base.clone();
                config.indicator.params.extend(point.clone());
                (point, config)
            })
            .collect()
    }
}

/// One evaluated grid point.
#[derive(Debug, Clone, Serialize)]
pub struct SweepEntry {
    /// Position in grid order.
    pub grid_index: usize,
    pub params: BTreeMap<String, f64>,
    pub config_hash: ConfigHash,
    pub summary: Summary,
}

/// Sweep results ranked best first.
#[derive(Debug, Clone, Serialize)]
pub struct SweepResults {
    pub metric: FitnessMetric,
    pub entries: Vec<SweepEntry>,
}

impl SweepResults {
    pub fn best(&self) -> Option<&SweepEntry> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parameter sweep executor.
#[derive(Debug, Clone)]
pub struct ParamSweep {
    performance: PerformanceConfig,
    metric: FitnessMetric,
    parallel: bool,
}

impl ParamSweep {
    pub fn new(performance: PerformanceConfig, metric: FitnessMetric) -> Self {
        Self {
            performance,
            metric,
            parallel: true,
        }
    }

    /// Enables or disables parallel execution.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run every grid point against `bars` and rank by the fitness metric.
    /// Ties, including undefined metrics, keep grid order.
    pub fn run(
        &self,
        bars: &BarSeries,
        base: &StrategyConfig,
        grid: &ParamGrid,
    ) -> Result<SweepResults, RunError> {
        if grid.size() == 0 {
            return Err(RunError::Grid("grid has no points".into()));
        }
        let configs = grid.configs(base);
        let run_one = |(grid_index, (params, config)): (usize, &(BTreeMap<String, f64>, StrategyConfig))| {
            run_backtest(bars, config, &self.performance).map(|result| SweepEntry {
                grid_index,
                params: params.clone(),
                config_hash: result.config_hash,
                summary: result.evaluation.summary,
            })
        };

        let mut entries: Vec<SweepEntry> = if self.parallel {
            configs
                .par_iter()
                .enumerate()
                .map(run_one)
                .collect::<Result<Vec<_>, _>>()?
        } else {
            configs
                .iter()
                .enumerate()
                .map(run_one)
                .collect::<Result<Vec<_>, _>>()?
        };

        entries.sort_by(|a, b| {
            self.metric
                .rank(&a.summary, &b.summary)
                .then(a.grid_index.cmp(&b.grid_index))
        });
        info!(points = entries.len(), metric = %self.metric, "sweep complete");
        Ok(SweepResults {
            metric: self.metric,
            entries,
        })
    }
}

/// Parallel sweep ranked by `metric`.
pub fn sweep(
    bars: &BarSeries,
    base: &StrategyConfig,
    grid: &ParamGrid,
    performance: &PerformanceConfig,
    metric: FitnessMetric,
) -> Result<SweepResults, RunError> {
    ParamSweep::new(*performance, metric).run(bars, base, grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_loader::synthetic_bars;
    use factorlab_core::components::StrategyPreset;

    #[test]
    fn parse_axis_spec() {
        let (name, values) = ParamGrid::parse_axis("n1 = 5, 10,20").unwrap();
        assert_eq!(name, "n1");
        assert_eq!(values, vec![5.0, 10.0, 20.0]);
        assert!(ParamGrid::parse_axis("n1").is_err());
        assert!(ParamGrid::parse_axis("n1=").is_err());
        assert!(ParamGrid::parse_axis("n1=a,b").is_err());
        assert!(ParamGrid::parse_axis("=1").is_err());
    }

    #[test]
    fn cartesian_points_in_name_order() {
        let grid = ParamGrid::from_specs(&["n2=50,60", "n1=5,10,15"]).unwrap();
        assert_eq!(grid.size(), 6);
        let points = grid.points();
        assert_eq!(points.len(), 6);
        assert_eq!(points[0]["n1"], 5.0);
        assert_eq!(points[0]["n2"], 50.0);
        assert_eq!(points[1]["n1"], 5.0);
        assert_eq!(points[1]["n2"], 60.0);
        assert_eq!(points[5]["n1"], 15.0);
    }

    #[test]
    fn empty_grid_has_no_points() {
        assert_eq!(ParamGrid::new().size(), 0);
        assert!(ParamGrid::new().points().is_empty());
    }

    #[test]
    fn configs_override_only_named_params() {
        let base = StrategyPreset::Dma.to_config();
        let grid = ParamGrid::new().with_axis("n1", vec![3.0, 4.0]);
        let configs = grid.configs(&base);
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[1].1.indicator.params["n1"], 4.0);
        assert!(!configs[1].1.indicator.params.contains_key("n2"));
        assert_eq!(configs[1].1.signal, base.signal);
    }

    #[test]
    fn serial_and_parallel_agree() {
        let bars = synthetic_bars("SWP", 300, 11).unwrap();
        let base = StrategyPreset::Dma.to_config();
        let grid = ParamGrid::from_specs(&["n1=5,10", "n2=30,50"]).unwrap();
        let sweep = ParamSweep::new(PerformanceConfig::default(), FitnessMetric::AnnualReturn);
        let parallel = sweep.run(&bars, &base, &grid).unwrap();
        let serial = sweep
            .clone()
            .with_parallelism(false)
            .run(&bars, &base, &grid)
            .unwrap();
        let order = |r: &SweepResults| r.entries.iter().map(|e| e.grid_index).collect::<Vec<_>>();
        assert_eq!(order(&parallel), order(&serial));
        assert_eq!(parallel.len(), 4);

        let returns: Vec<f64> = parallel
            .entries
            .iter()
            .filter_map(|e| e.summary.annual_return.value())
            .collect();
        assert_eq!(returns.len(), 4);
        assert!(returns.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn invalid_point_fails_the_sweep() {
        let bars = synthetic_bars("SWP", 100, 1).unwrap();
        let grid = ParamGrid::new().with_axis("n1", vec![5.0, 0.0]);
        let sweep = ParamSweep::new(PerformanceConfig::default(), FitnessMetric::Sharpe);
        assert!(matches!(
            sweep.run(&bars, &StrategyPreset::Dma.to_config(), &grid),
            Err(RunError::Composition(_))
        ));
    }
}
