//! CSV price export data adapter.
//!
//! One `<SYMBOL>.csv` file per symbol. Provider exports come in several
//! shapes, all normalized here so the domain only ever sees
//! `InstrumentSeries`:
//! - the price column is `Adj Close` when present, otherwise `Close`,
//!   otherwise the only non-date column;
//! - tuple headers such as `('Close', 'AVUV')` are flattened to `close`;
//! - extra header rows ahead of the data (ticker or blank date rows) are
//!   skipped;
//! - blank, `NaN` and `null` cells are gaps, not errors.

use crate::domain::error::DuelError;
use crate::domain::period::Period;
use crate::domain::series::InstrumentSeries;
use crate::ports::data_port::MarketDataPort;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

const ADJUSTED_CLOSE_HEADERS: [&str; 3] = ["adj close", "adj_close", "adjclose"];
const CLOSE_HEADERS: [&str; 1] = ["close"];
const DATE_HEADERS: [&str; 2] = ["date", "datetime"];
const MISSING_CELLS: [&str; 6] = ["", "nan", "null", "none", "na", "#n/a"];

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    /// `None` when there is no file for `symbol`.
    fn read_symbol(&self, symbol: &str) -> Result<Option<BTreeMap<NaiveDate, f64>>, DuelError> {
        let path = self.csv_path(symbol);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DuelError::DataFetch {
                    reason: format!("failed to read {}: {}", path.display(), e),
                });
            }
        };
        parse_price_csv(symbol, &content).map(Some)
    }
}

impl MarketDataPort for CsvAdapter {
    fn fetch_daily_prices(
        &self,
        symbols: &[String],
        period: Period,
    ) -> Result<HashMap<String, InstrumentSeries>, DuelError> {
        let mut observed: Vec<(String, BTreeMap<NaiveDate, f64>)> = Vec::new();

        for symbol in symbols {
            match self.read_symbol(symbol)? {
                Some(rows) if !rows.is_empty() => {
                    tracing::debug!(symbol = %symbol, rows = rows.len(), "loaded price file");
                    observed.push((symbol.clone(), rows));
                }
                Some(_) => tracing::warn!(symbol = %symbol, "price file has no observations"),
                None => tracing::warn!(
                    symbol = %symbol,
                    path = %self.csv_path(symbol).display(),
                    "no price file"
                ),
            }
        }

        // Windows are measured back from the newest observation on hand.
        let as_of = observed
            .iter()
            .filter_map(|(_, rows)| rows.keys().next_back().copied())
            .max();
        let start = as_of.and_then(|date| period.start_date(date));

        let mut series = HashMap::with_capacity(observed.len());
        for (symbol, rows) in observed {
            let points = rows
                .into_iter()
                .filter(|(date, _)| start.is_none_or(|s| *date >= s));
            let parsed = InstrumentSeries::from_pairs(symbol.clone(), points)?;
            series.insert(symbol, parsed);
        }

        Ok(series)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, DuelError> {
        let rows = match self.read_symbol(symbol)? {
            Some(rows) => rows,
            None => return Ok(None),
        };
        match (rows.keys().next(), rows.keys().next_back()) {
            (Some(&first), Some(&last)) => Ok(Some((first, last, rows.len()))),
            _ => Ok(None),
        }
    }
}

/// Parses one provider export into date-ordered prices. Later rows win on
/// duplicate dates.
pub fn parse_price_csv(symbol: &str, content: &str) -> Result<BTreeMap<NaiveDate, f64>, DuelError> {
    let fetch_error = |reason: String| DuelError::DataFetch {
        reason: format!("{}: {}", symbol, reason),
    };

    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| fetch_error(format!("CSV header error: {}", e)))?
        .iter()
        .map(normalize_header)
        .collect();

    let date_col = headers
        .iter()
        .position(|h| DATE_HEADERS.contains(&h.as_str()))
        .unwrap_or(0);
    let price_col = select_price_column(&headers, date_col)
        .ok_or_else(|| fetch_error(format!("no price column in header {:?}", headers)))?;

    let mut rows = BTreeMap::new();
    let mut in_data = false;

    for (i, result) in rdr.records().enumerate() {
        let line = i + 2;
        let record = result.map_err(|e| fetch_error(format!("CSV parse error: {}", e)))?;

        let date_cell = record.get(date_col).unwrap_or("");
        let Some(date) = parse_date_cell(date_cell) else {
            if in_data {
                return Err(fetch_error(format!(
                    "invalid date '{}' on line {}",
                    date_cell, line
                )));
            }
            tracing::debug!(symbol, line, "skipping header row");
            continue;
        };
        in_data = true;

        let cell = record.get(price_col).unwrap_or("");
        if is_missing(cell) {
            continue;
        }
        let price: f64 = cell
            .parse()
            .map_err(|e| fetch_error(format!("invalid price '{}' on line {}: {}", cell, line, e)))?;
        rows.insert(date, price);
    }

    Ok(rows)
}

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim();
    let flattened = match trimmed.strip_prefix('(').and_then(|h| h.strip_suffix(')')) {
        Some(inner) => inner.split(',').next().unwrap_or(""),
        None => trimmed,
    };
    flattened
        .trim()
        .trim_matches(|c| c == '\'' || c == '"')
        .trim()
        .to_lowercase()
}

fn select_price_column(headers: &[String], date_col: usize) -> Option<usize> {
    let find = |names: &[&str]| headers.iter().position(|h| names.contains(&h.as_str()));

    find(&ADJUSTED_CLOSE_HEADERS)
        .or_else(|| find(&CLOSE_HEADERS))
        .or_else(|| match headers.len() {
            2 => Some(1 - date_col.min(1)),
            _ => None,
        })
}

fn parse_date_cell(cell: &str) -> Option<NaiveDate> {
    let day = cell.get(..10).unwrap_or(cell);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn is_missing(cell: &str) -> bool {
    MISSING_CELLS.contains(&cell.to_lowercase().as_str())
}
