//! Property tests for parameter grids, sweep ranking and date parsing.

use std::collections::BTreeSet;

use proptest::prelude::*;

use factorlab_core::components::StrategyPreset;
use factorlab_core::performance::PerformanceConfig;
use factorlab_runner::data_loader::parse_timestamp;
use factorlab_runner::{synthetic_bars, FitnessMetric, ParamGrid, ParamSweep};

fn axis_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::btree_set(1u32..60, 1..4)
        .prop_map(|set| set.into_iter().map(f64::from).collect())
}

proptest! {
    // ── 1. Grid shape ──

    #[test]
    fn points_are_the_full_cartesian_product(
        a in axis_strategy(),
        b in axis_strategy(),
        c in axis_strategy(),
    ) {
        let grid = ParamGrid::new()
            .with_axis("n1", a.clone())
            .with_axis("n2", b.clone())
            .with_axis("m", c.clone());
        let points = grid.points();
        prop_assert_eq!(grid.size(), a.len() * b.len() * c.len());
        prop_assert_eq!(points.len(), grid.size());

        let unique: BTreeSet<Vec<u64>> = points
            .iter()
            .map(|p| p.values().map(|v| v.to_bits()).collect())
            .collect();
        prop_assert_eq!(unique.len(), points.len());
        for p in &points {
            prop_assert_eq!(p.len(), 3);
            prop_assert!(a.contains(&p["n1"]));
            prop_assert!(b.contains(&p["n2"]));
            prop_assert!(c.contains(&p["m"]));
        }
    }

    #[test]
    fn parse_axis_accepts_what_it_prints(values in axis_strategy()) {
        let spec = format!(
            "n1={}",
            values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(",")
        );
        let (name, parsed) = ParamGrid::parse_axis(&spec).unwrap();
        prop_assert_eq!(name, "n1");
        prop_assert_eq!(parsed, values);
    }

    // ── 2. Date parsing never panics ──

    #[test]
    fn parse_timestamp_total(raw in "\\PC{0,24}") {
        let _ = parse_timestamp(&raw);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    // ── 3. Sweep ranking ──

    #[test]
    fn sweep_ranks_every_point_once(seed in 0u64..1000, fast in axis_strategy()) {
        let bars = synthetic_bars("PROP", 160, seed).unwrap();
        let grid = ParamGrid::new().with_axis("n1", fast);
        let results = ParamSweep::new(PerformanceConfig::default(), FitnessMetric::Sharpe)
            .run(&bars, &StrategyPreset::Dma.to_config(), &grid)
            .unwrap();

        let mut seen: Vec<usize> = results.entries.iter().map(|e| e.grid_index).collect();
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..grid.size()).collect::<Vec<_>>());

        for pair in results.entries.windows(2) {
            prop_assert_ne!(
                FitnessMetric::Sharpe.rank(&pair[0].summary, &pair[1].summary),
                std::cmp::Ordering::Greater
            );
        }
    }
}
