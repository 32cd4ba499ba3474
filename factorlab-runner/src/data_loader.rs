//! Bar loading for the runner.
//!
//! Reads a headered CSV into a validated `BarSeries`. Recognized columns
//! (case-insensitive): `date|trade_date|datetime`, `open`, `high`, `low`,
//! `close`, `volume|vol`, `amount`, `turnover`, `pct_chg`. Unknown columns
//! are ignored. Rows keep file order and must be strictly increasing.
//!
//! Synthetic data is a developer-only mode for demos and tests.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use thiserror::Error;
use tracing::{debug, warn};

use factorlab_core::domain::{Bar, BarSeries, SeriesError};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("required column '{0}' not found in header")]
    MissingColumn(&'static str),

    #[error("row {row}: unparseable date '{value}'")]
    BadDate { row: usize, value: String },

    #[error("row {row}: column '{column}' has non-numeric value '{value}'")]
    BadNumber {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("no pct_chg column (set derive_pct_chg to compute it from close)")]
    MissingPctChg,

    #[error("date window {start:?}..={end:?} selects no rows")]
    EmptyWindow {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },

    #[error("invalid series: {0}")]
    Series(#[from] SeriesError),
}

/// Options controlling how bars are loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadOptions {
    /// Series symbol; defaults to the file stem.
    pub symbol: Option<String>,
    /// First date kept (inclusive).
    pub start: Option<NaiveDate>,
    /// Last date kept (inclusive).
    pub end: Option<NaiveDate>,
    /// Compute `pct_chg` from consecutive closes when the column is absent.
    pub derive_pct_chg: bool,
}

impl LoadOptions {
    fn keeps(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }
}

/// Load bars from a CSV file.
pub fn load_bars(path: &Path, opts: &LoadOptions) -> Result<BarSeries, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let symbol = opts.symbol.clone().unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "UNKNOWN".to_string())
    });
    let series = read_bars(file, &symbol, opts)?;
    debug!(
        path = %path.display(),
        bars = series.len(),
        first = %series.first_timestamp(),
        last = %series.last_timestamp(),
        "loaded bars"
    );
    Ok(series)
}

// ─── CSV parsing ─────────────────────────────────────────────────────

/// Header positions of the recognized columns.
#[derive(Debug, Default)]
struct ColumnMap {
    date: Option<usize>,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    close: Option<usize>,
    volume: Option<usize>,
    amount: Option<usize>,
    turnover: Option<usize>,
    pct_chg: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let mut map = Self::default();
        for (idx, name) in headers.iter().enumerate() {
            let slot = match name.trim().to_ascii_lowercase().as_str() {
                "date" | "trade_date" | "datetime" => &mut map.date,
                "open" => &mut map.open,
                "high" => &mut map.high,
                "low" => &mut map.low,
                "close" => &mut map.close,
                "volume" | "vol" => &mut map.volume,
                "amount" => &mut map.amount,
                "turnover" => &mut map.turnover,
                "pct_chg" => &mut map.pct_chg,
                _ => continue,
            };
            // first occurrence wins
            slot.get_or_insert(idx);
        }
        map
    }
}

/// Parse bars from any CSV reader.
pub fn read_bars<R: io::Read>(
    reader: R,
    symbol: &str,
    opts: &LoadOptions,
) -> Result<BarSeries, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let columns = ColumnMap::from_headers(csv_reader.headers()?);
    let date_col = columns.date.ok_or(LoadError::MissingColumn("date"))?;
    let close_col = columns.close.ok_or(LoadError::MissingColumn("close"))?;
    if columns.pct_chg.is_none() && !opts.derive_pct_chg {
        return Err(LoadError::MissingPctChg);
    }

    let mut bars = Vec::new();
    for (i, record) in csv_reader.records().enumerate() {
        let record = record?;
        // header is line 1
        let row = i + 2;
        let raw_date = record.get(date_col).unwrap_or_default();
        let timestamp = parse_timestamp(raw_date).ok_or_else(|| LoadError::BadDate {
            row,
            value: raw_date.to_string(),
        })?;
        let close = required(&record, close_col, "close", row)?;
        let pct_chg = match columns.pct_chg {
            Some(col) => required(&record, col, "pct_chg", row)?,
            // filled in by derive_pct_chg below
            None => 0.0,
        };
        bars.push(Bar {
            timestamp,
            open: optional(&record, columns.open, "open", row)?,
            high: optional(&record, columns.high, "high", row)?,
            low: optional(&record, columns.low, "low", row)?,
            close,
            volume: optional(&record, columns.volume, "volume", row)?,
            amount: optional(&record, columns.amount, "amount", row)?,
            turnover: optional(&record, columns.turnover, "turnover", row)?,
            pct_chg,
        });
    }

    if columns.pct_chg.is_none() {
        warn!(symbol, "pct_chg column absent; deriving it from close");
        derive_pct_chg(&mut bars);
    }

    let total = bars.len();
    bars.retain(|bar| opts.keeps(bar.timestamp.date()));
    if bars.is_empty() && total > 0 {
        return Err(LoadError::EmptyWindow {
            start: opts.start,
            end: opts.end,
        });
    }
    if bars.len() < total {
        debug!(kept = bars.len(), total, "applied date window");
    }
    Ok(BarSeries::new(symbol, bars)?)
}

/// Empty cells read as missing; anything else must parse as a number.
fn optional(
    record: &csv::StringRecord,
    col: Option<usize>,
    column: &'static str,
    row: usize,
) -> Result<Option<f64>, LoadError> {
    let Some(raw) = col.and_then(|c| record.get(c)) else {
        return Ok(None);
    };
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|_| LoadError::BadNumber {
            row,
            column,
            value: raw.to_string(),
        })
}

/// A cell that must hold a number; blank is a `BadNumber` with an empty value.
fn required(
    record: &csv::StringRecord,
    col: usize,
    column: &'static str,
    row: usize,
) -> Result<f64, LoadError> {
    optional(record, Some(col), column, row)?.ok_or_else(|| LoadError::BadNumber {
        row,
        column,
        value: String::new(),
    })
}

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y%m%d"];

/// `YYYY-MM-DD`, `YYYYMMDD` or `YYYY-MM-DD HH:MM[:SS]`. Dates map to midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Percent change of close; the first bar has no predecessor and gets 0.
fn derive_pct_chg(bars: &mut [Bar]) {
    let mut prev_close: Option<f64> = None;
    for bar in bars.iter_mut() {
        bar.pct_chg = match prev_close {
            Some(prev) if prev != 0.0 => (bar.close / prev - 1.0) * 100.0,
            _ => 0.0,
        };
        prev_close = Some(bar.close);
    }
}

// ─── Synthetic data ──────────────────────────────────────────────────

/// Deterministic weekday random walk with every column populated.
///
/// Same `(symbol, n, seed)` always yields the same series.
pub fn synthetic_bars(symbol: &str, n: usize, seed: u64) -> Result<BarSeries, LoadError> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut hasher = blake3::Hasher::new();
    hasher.update(symbol.as_bytes());
    hasher.update(&seed.to_le_bytes());
    let mut rng = StdRng::from_seed(*hasher.finalize().as_bytes());

    let mut bars = Vec::with_capacity(n);
    let mut price = 100.0_f64;
    let mut current = NaiveDate::from_ymd_opt(2010, 1, 4).unwrap_or_default();

    while bars.len() < n {
        let weekday = current.weekday();
        if weekday == chrono::Weekday::Sat || weekday == chrono::Weekday::Sun {
            current += chrono::Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.03..0.0305);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64) as f64;

        bars.push(Bar {
            timestamp: current.and_hms_opt(0, 0, 0).unwrap_or_default(),
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close,
            volume: Some(volume),
            amount: Some(volume * (open + close) / 2.0),
            turnover: Some(rng.gen_range(0.2..3.0)),
            pct_chg: daily_return * 100.0,
        });

        price = close;
        current += chrono::Duration::days(1);
    }

    Ok(BarSeries::new(symbol, bars)?)
}
