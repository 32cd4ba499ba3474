//! Worked scenarios for the performance engine.

use chrono::NaiveDate;
use factorlab_core::domain::{Bar, BarSeries, Position, Side};
use factorlab_core::performance::{
    evaluate, Annualization, ConfigError, Degenerate, PerformanceConfig, Statistic,
};

use Position::{Flat, Long, Short};

fn series(pct: &[f64]) -> BarSeries {
    let start = NaiveDate::from_ymd_opt(2021, 3, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let mut close = 100.0;
    let bars = pct
        .iter()
        .enumerate()
        .map(|(i, p)| {
            close *= 1.0 + p / 100.0;
            Bar::new(start + chrono::Duration::days(i as i64), close, *p)
        })
        .collect();
    BarSeries::new("SCN", bars).unwrap()
}

fn approx(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-12,
        "actual={actual}, expected={expected}"
    );
}

#[test]
fn long_short_long_run() {
    let bars = series(&[1.0, 2.0, -1.0, 1.0, 2.0]);
    let position = [Long, Long, Short, Short, Long];
    let eval = evaluate(&bars, &position, &PerformanceConfig::default()).unwrap();

    let expected_held = [0.01, 0.02, 0.01, -0.01, 0.02];
    for (actual, expected) in eval.overlay.held_return.iter().zip(expected_held) {
        approx(*actual, expected);
    }
    approx(
        eval.summary.cumulative_return,
        1.01 * 1.02 * 1.01 * 0.99 * 1.02 - 1.0,
    );
    assert!((eval.summary.cumulative_return - 0.0507).abs() < 1e-4);

    let long = eval.summary.long;
    assert_eq!((long.trades, long.winning_trades), (1, 1));
    assert_eq!((long.bars_held, long.winning_bars), (2, 2));

    let short = eval.summary.short;
    assert_eq!(short.trades, 1);
    assert_eq!(short.winning_trades, 0, "(1.01)(0.99) - 1 < 0");
    assert_eq!((short.bars_held, short.winning_bars), (2, 1));

    let open = eval.summary.open_trade.expect("final long run is open");
    assert_eq!(open.side, Side::Long);
    assert_eq!((open.entry_index, open.exit_index, open.bars_held), (4, 5, 1));

    assert_eq!(eval.summary.bars_in_market, 5);
    assert_eq!(eval.summary.winning_bars, 4);
    assert_eq!(eval.summary.bar_win_rate, Statistic::Defined(0.8));
    assert_eq!(eval.ledger.trades.len(), 2);
}

#[test]
fn settle_flag_closes_the_open_run() {
    let bars = series(&[1.0, 2.0, -1.0, 1.0, 2.0]);
    let position = [Long, Long, Short, Short, Long];
    let config = PerformanceConfig::default().with_settle_open_trade(true);
    let eval = evaluate(&bars, &position, &config).unwrap();

    assert!(eval.summary.open_trade.is_none());
    assert_eq!(eval.summary.long.trades, 2);
    assert_eq!(eval.summary.long.bars_held, 3);
    assert_eq!(eval.summary.long.win_rate, Statistic::Defined(1.0));
    assert_eq!(eval.summary.long.avg_holding_period, Statistic::Defined(1.5));
    // curves do not depend on the settlement policy
    let unsettled = evaluate(&bars, &position, &PerformanceConfig::default()).unwrap();
    assert_eq!(eval.overlay, unsettled.overlay);
}

#[test]
fn all_flat_reports_undefined_ratios() {
    let bars = series(&[1.5, -2.0, 0.3, 4.0, -1.0, 0.0, 2.2, -0.7, 1.1, -3.0]);
    let position = [Flat; 10];
    let eval = evaluate(&bars, &position, &PerformanceConfig::default()).unwrap();
    let s = &eval.summary;

    assert_eq!(s.max_drawdown, 0.0);
    assert_eq!(s.annual_return, Statistic::Defined(0.0));
    assert_eq!(
        s.return_over_drawdown,
        Statistic::Undefined(Degenerate::ZeroDrawdown)
    );
    assert_eq!(s.sharpe, Statistic::Undefined(Degenerate::ZeroVolatility));
    assert_eq!(s.long.win_rate, Statistic::Undefined(Degenerate::NoTrades));
    assert_eq!(s.short.win_rate, Statistic::Undefined(Degenerate::NoTrades));
    assert_eq!(s.bar_win_rate, Statistic::Undefined(Degenerate::NoBarsInMarket));
    assert_eq!(s.trade_count(), 0);
}

#[test]
fn monotonic_rise_has_sharpe_but_no_calmar() {
    let bars = series(&[1.0, 0.5, 2.0, 0.25, 1.0, 0.75]);
    let eval = evaluate(&bars, &[Long; 6], &PerformanceConfig::default()).unwrap();
    assert_eq!(eval.summary.max_drawdown, 0.0);
    assert!(eval.summary.sharpe.is_defined());
    assert_eq!(
        eval.summary.return_over_drawdown,
        Statistic::Undefined(Degenerate::ZeroDrawdown)
    );
}

#[test]
fn short_side_profits_from_falls() {
    let bars = series(&[0.0, -2.0, -3.0, 1.0]);
    let eval = evaluate(&bars, &[Flat, Short, Short, Flat], &PerformanceConfig::default()).unwrap();
    let s = &eval.summary;
    assert_eq!(s.short.trades, 1);
    assert_eq!(s.short.winning_trades, 1);
    assert_eq!(s.short.winning_bars, 2);
    approx(eval.ledger.trades[0].compounded_return, 1.02 * 1.03 - 1.0);
    assert_eq!(s.long.trades, 0);
    assert!(s.open_trade.is_none());
}

#[test]
fn drawdown_is_measured_from_the_peak() {
    let bars = series(&[10.0, -10.0, 5.0]);
    let eval = evaluate(&bars, &[Long; 3], &PerformanceConfig::default()).unwrap();
    // peak 0.10, trough 1.1 * 0.9 - 1 = -0.01
    approx(eval.overlay.drawdown[1], (0.10 + 0.01) / 1.10);
    approx(eval.summary.max_drawdown, 0.11 / 1.10);
}

#[test]
fn misaligned_position_is_rejected() {
    let bars = series(&[1.0, 2.0, 3.0]);
    assert!(evaluate(&bars, &[Long, Long], &PerformanceConfig::default()).is_err());
}

#[test]
fn intraday_annualization_scales_periods() {
    let config = PerformanceConfig::new(0.03, Annualization::intraday(5.0)).unwrap();
    approx(config.periods_per_year(), 250.0 * 1440.0 / 5.0);
    assert!(matches!(
        PerformanceConfig::new(0.03, Annualization::intraday(0.0)),
        Err(ConfigError::InvalidBarMinutes(_))
    ));
    assert!(matches!(
        PerformanceConfig::with_periods_per_year(0.03, -1.0),
        Err(ConfigError::NonPositivePeriodsPerYear(_))
    ));
}
