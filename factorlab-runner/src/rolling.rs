//! Rolling parameter selection — walk-forward choice among candidate
//! parameter sets.
//!
//! Every candidate (the base config plus each grid point) is resolved to a
//! position series once. A window of `choice_period` bars then slides over
//! the data; at its last bar the candidate with the best
//! `window_return / window_max_drawdown` is chosen and its position on the
//! *next* bar is used. Bars before the first choice keep the base
//! candidate's positions. The stitched series goes through the ordinary
//! performance engine.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use factorlab_core::components::Strategy;
use factorlab_core::domain::{BarSeries, Position};
use factorlab_core::fingerprint::{ConfigHash, StrategyConfig};
use factorlab_core::performance::{evaluate, Evaluation, PerformanceConfig};

use crate::fitness::compare_desc;
use crate::runner::RunError;
use crate::sweep::ParamGrid;

/// One selectable parameter set. Index 0 is always the base config.
#[derive(Debug, Clone, Serialize)]
pub struct RollingCandidate {
    pub params: BTreeMap<String, f64>,
    pub config_hash: ConfigHash,
}

#[derive(Debug, Clone, Serialize)]
pub struct RollingSelection {
    pub choice_period: usize,
    pub candidates: Vec<RollingCandidate>,
    /// Candidate chosen at the close of each bar, `None` where no full
    /// window has been seen yet.
    pub chosen: Vec<Option<usize>>,
    pub positions: Vec<Position>,
    pub evaluation: Evaluation,
}

impl RollingSelection {
    /// How often each candidate was chosen.
    pub fn choice_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.candidates.len()];
        for idx in self.chosen.iter().flatten() {
            counts[*idx] += 1;
        }
        counts
    }

    /// Parameters in force after the last choice.
    pub fn last_choice(&self) -> Option<&RollingCandidate> {
        self.chosen
            .iter()
            .rev()
            .find_map(|c| *c)
            .and_then(|idx| self.candidates.get(idx))
    }
}

/// Walk-forward selection over `base` and every point of `grid`.
pub fn rolling_best(
    bars: &BarSeries,
    base: &StrategyConfig,
    grid: &ParamGrid,
    performance: &PerformanceConfig,
    choice_period: usize,
) -> Result<RollingSelection, RunError> {
    let needed = choice_period + 1;
    if choice_period == 0 || bars.len() <= needed {
        return Err(RunError::ChoicePeriod {
            choice_period,
            needed,
            bars: bars.len(),
        });
    }

    let mut configs = vec![(BTreeMap::new(), base.clone())];
    configs.extend(grid.configs(base));

    let candidate_positions = configs
        .par_iter()
        .map(|(_, config)| -> Result<Vec<Position>, RunError> {
            let strategy = Strategy::from_config(config)?;
            Ok(strategy.positions(bars)?.positions)
        })
        .collect::<Result<Vec<_>, _>>()?;
    debug!(candidates = configs.len(), choice_period, "candidates resolved");

    let returns: Vec<f64> = bars.bars().iter().map(|b| b.return_fraction()).collect();
    let (positions, chosen) = select(&candidate_positions, &returns, choice_period);
    let evaluation = evaluate(bars, &positions, performance)?;

    let candidates = configs
        .into_iter()
        .map(|(params, config)| RollingCandidate {
            config_hash: config.config_hash(performance),
            params,
        })
        .collect();
    let selection = RollingSelection {
        choice_period,
        candidates,
        chosen,
        positions,
        evaluation,
    };
    info!(
        symbol = bars.symbol(),
        candidates = selection.candidates.len(),
        choice_period,
        cumulative_return = selection.evaluation.summary.cumulative_return,
        "rolling selection complete"
    );
    Ok(selection)
}

/// Stitch positions from per-candidate series. `returns` are per-bar
/// fractions; every series has the same length and there is at least one
/// candidate.
fn select(
    candidates: &[Vec<Position>],
    returns: &[f64],
    choice_period: usize,
) -> (Vec<Position>, Vec<Option<usize>>) {
    let len = returns.len();
    let mut positions = candidates[0].clone();
    let mut chosen = vec![None; len];

    let equity: Vec<Vec<f64>> = candidates
        .iter()
        .map(|pos| {
            let mut nv = 1.0;
            returns
                .iter()
                .zip(pos)
                .map(|(r, p)| {
                    nv *= 1.0 + r * p.exposure();
                    nv
                })
                .collect()
        })
        .collect();

    for start in 0..len.saturating_sub(choice_period + 1) {
        let end = start + choice_period;
        let best = equity
            .iter()
            .map(|nv| window_score(&nv[start..end]))
            .enumerate()
            .min_by(|(_, a), (_, b)| compare_desc(*a, *b))
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        chosen[end - 1] = Some(best);
        positions[end] = candidates[best][end];
    }
    (positions, chosen)
}

/// Window return over window max drawdown, `None` when undefined (0/0).
/// A drawdown-free gain scores infinite.
fn window_score(nv: &[f64]) -> Option<f64> {
    let (first, last) = (nv.first()?, nv.last()?);
    let ret = last / first - 1.0;
    let mut peak = f64::NEG_INFINITY;
    let max_dd = nv.iter().fold(0.0_f64, |dd, v| {
        peak = peak.max(*v);
        dd.max(1.0 - v / peak)
    });
    let score = ret / max_dd;
    (!score.is_nan()).then_some(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_loader::synthetic_bars;
    use factorlab_core::components::StrategyPreset;
    use Position::{Long, Short};

    #[test]
    fn window_score_cases() {
        assert_eq!(window_score(&[1.0, 1.1, 1.2]), Some(f64::INFINITY));
        assert_eq!(window_score(&[1.0, 1.0]), None);
        let s = window_score(&[1.0, 1.2, 0.9, 1.08]).unwrap();
        // ret 0.08, dd 0.25
        assert!((s - 0.32).abs() < 1e-12);
    }

    #[test]
    fn picks_the_better_window_and_uses_next_bar() {
        let returns = [0.1, -0.1, 0.1, -0.1, 0.1, 0.1];
        let long = vec![Long; 6];
        let short = vec![Short; 6];
        let (positions, chosen) = select(&[long, short], &returns, 2);
        assert_eq!(chosen, vec![None, Some(1), Some(0), Some(1), None, None]);
        assert_eq!(positions, vec![Long, Long, Short, Long, Short, Long]);
    }

    #[test]
    fn ties_go_to_the_first_candidate() {
        let returns = [0.01, 0.02, -0.01, 0.0, 0.03];
        let same = vec![Long; 5];
        let (_, chosen) = select(&[same.clone(), same], &returns, 2);
        assert!(chosen.iter().flatten().all(|c| *c == 0));
    }

    #[test]
    fn short_series_is_rejected() {
        let bars = synthetic_bars("RB", 20, 1).unwrap();
        let err = rolling_best(
            &bars,
            &StrategyPreset::Dma.to_config(),
            &ParamGrid::new(),
            &PerformanceConfig::default(),
            19,
        )
        .unwrap_err();
        assert!(matches!(err, RunError::ChoicePeriod { bars: 20, .. }));
    }

    #[test]
    fn stitched_series_on_synthetic_data() {
        let bars = synthetic_bars("RB", 300, 4).unwrap();
        let base = StrategyPreset::Dma.to_config();
        let grid = ParamGrid::new().with_axis("n1", vec![5.0, 20.0]);
        let selection =
            rolling_best(&bars, &base, &grid, &PerformanceConfig::default(), 60).unwrap();

        assert_eq!(selection.candidates.len(), 3);
        assert!(selection.candidates[0].params.is_empty());
        assert_eq!(selection.positions.len(), 300);
        assert_eq!(selection.chosen.len(), 300);
        assert!(selection.chosen[..59].iter().all(Option::is_none));
        assert!(selection.chosen[59].is_some());
        assert_eq!(selection.choice_counts().iter().sum::<usize>(), 300 - 61);

        let default = Strategy::from_config(&base)
            .unwrap()
            .positions(&bars)
            .unwrap()
            .positions;
        assert_eq!(selection.positions[..60], default[..60]);
        assert_eq!(selection.evaluation.overlay.position, selection.positions);
        assert!(selection.last_choice().is_some());
    }
}
