//! Rolling-window primitives over `&[f64]` with `NaN` as "no value".
//!
//! Windows are trailing and index-aligned: the window at `i` covers
//! `values[i + 1 - window ..= i]`, truncated at the start of the series.
//! A window produces a value only when it holds at least `min_periods`
//! non-NaN entries; `min_periods == window` reproduces a strict moving
//! window, `min_periods == 1` an expanding start.

/// Rolling sum of the valid entries in each window.
pub fn rolling_sum(values: &[f64], window: usize, min_periods: usize) -> Vec<f64> {
    sliding(values, window, min_periods, |sum, _| sum)
}

/// Rolling arithmetic mean of the valid entries in each window.
pub fn rolling_mean(values: &[f64], window: usize, min_periods: usize) -> Vec<f64> {
    sliding(values, window, min_periods, |sum, count| sum / count as f64)
}

/// Strict simple moving average (`min_periods == window`).
pub fn sma(values: &[f64], window: usize) -> Vec<f64> {
    rolling_mean(values, window, window)
}

pub fn rolling_max(values: &[f64], window: usize, min_periods: usize) -> Vec<f64> {
    scan_window(values, window, min_periods, |w| {
        w.iter().copied().filter(|v| !v.is_nan()).fold(f64::NEG_INFINITY, f64::max)
    })
}

pub fn rolling_min(values: &[f64], window: usize, min_periods: usize) -> Vec<f64> {
    scan_window(values, window, min_periods, |w| {
        w.iter().copied().filter(|v| !v.is_nan()).fold(f64::INFINITY, f64::min)
    })
}

/// Rolling sample standard deviation (ddof = 1). Needs two valid entries
/// regardless of `min_periods`.
pub fn rolling_std(values: &[f64], window: usize, min_periods: usize) -> Vec<f64> {
    scan_window(values, window, min_periods.max(2), |w| {
        let valid: Vec<f64> = w.iter().copied().filter(|v| !v.is_nan()).collect();
        let n = valid.len() as f64;
        let mean = valid.iter().sum::<f64>() / n;
        let var = valid.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        var.sqrt()
    })
}

/// Lag by `k` bars; the first `k` entries become NaN.
pub fn shift(values: &[f64], k: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if k < n {
        out[k..].copy_from_slice(&values[..n - k]);
    }
    out
}

/// Recursive EMA `Y = (2X + (N-1)Y') / (N+1)`, seeded with the first valid
/// input. A NaN input after the seed carries the previous value forward.
pub fn recursive_ema(values: &[f64], n: usize) -> Vec<f64> {
    let alpha = 2.0 / (n as f64 + 1.0);
    recursive(values, |x, prev| alpha * x + (1.0 - alpha) * prev)
}

/// Weighted recursive average `Y = (M·X + (N-M)·Y') / N`, seeded with the
/// first valid input.
pub fn recursive_sma(values: &[f64], n: usize, m: usize) -> Vec<f64> {
    let (n, m) = (n as f64, m as f64);
    recursive(values, |x, prev| (m * x + (n - m) * prev) / n)
}

/// Elementwise combination of two aligned series.
pub fn zip_with(a: &[f64], b: &[f64], f: impl Fn(f64, f64) -> f64) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| f(*x, *y)).collect()
}

/// `a / b`, NaN where `b` is zero.
pub fn safe_div(a: &[f64], b: &[f64]) -> Vec<f64> {
    zip_with(a, b, |x, y| if y == 0.0 { f64::NAN } else { x / y })
}

// ─── Internals ───────────────────────────────────────────────────────

/// Sliding sum + valid count, O(n).
fn sliding(
    values: &[f64],
    window: usize,
    min_periods: usize,
    finish: impl Fn(f64, usize) -> f64,
) -> Vec<f64> {
    assert!(window >= 1, "window must be >= 1");
    let min_periods = min_periods.clamp(1, window);
    let mut out = vec![f64::NAN; values.len()];
    let mut sum = 0.0;
    let mut count = 0usize;

    for (i, &entering) in values.iter().enumerate() {
        if !entering.is_nan() {
            sum += entering;
            count += 1;
        }
        if i >= window {
            let leaving = values[i - window];
            if !leaving.is_nan() {
                sum -= leaving;
                count -= 1;
            }
        }
        if count >= min_periods {
            out[i] = finish(sum, count);
        }
        if count == 0 {
            sum = 0.0;
        }
    }
    out
}

fn scan_window(
    values: &[f64],
    window: usize,
    min_periods: usize,
    reduce: impl Fn(&[f64]) -> f64,
) -> Vec<f64> {
    assert!(window >= 1, "window must be >= 1");
    let min_periods = min_periods.clamp(1, window.max(2));
    (0..values.len())
        .map(|i| {
            let w = &values[(i + 1).saturating_sub(window)..=i];
            let valid = w.iter().filter(|v| !v.is_nan()).count();
            if valid >= min_periods {
                reduce(w)
            } else {
                f64::NAN
            }
        })
        .collect()
}

fn recursive(values: &[f64], step: impl Fn(f64, f64) -> f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;
    for &x in values {
        let y = match (prev, x.is_nan()) {
            (None, true) => f64::NAN,
            (None, false) => x,
            (Some(p), true) => p,
            (Some(p), false) => step(x, p),
        };
        if !y.is_nan() {
            prev = Some(y);
        }
        out.push(y);
    }
    out
}
