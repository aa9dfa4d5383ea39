//! Aligns raw price series onto one shared date axis.
//!
//! Dates are the union of every required series' observations. Each series is
//! forward-filled along that axis, then the axis is trimmed so it starts no
//! earlier than the day every series has a value and no earlier than the first
//! observation of the latest-listing instrument.

use crate::domain::error::DuelError;
use crate::domain::series::InstrumentSeries;
use crate::domain::universe::Universe;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Equal-length value columns over a strictly ascending date axis. Every cell
/// holds an observed or forward-filled value.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedDataset {
    dates: Vec<NaiveDate>,
    columns: BTreeMap<String, Vec<f64>>,
    fx_symbol: String,
}

impl AlignedDataset {
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn prices(&self, symbol: &str) -> Option<&[f64]> {
        self.columns.get(symbol).map(Vec::as_slice)
    }

    pub fn fx_symbol(&self) -> &str {
        &self.fx_symbol
    }

    pub fn fx_rates(&self) -> &[f64] {
        self.prices(&self.fx_symbol).unwrap_or(&[])
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn last_value(&self, symbol: &str) -> Option<f64> {
        self.prices(symbol).and_then(|p| p.last().copied())
    }
}

/// Sorted union of every series' observation dates.
pub fn build_date_axis(series: &[&InstrumentSeries]) -> Vec<NaiveDate> {
    let unique_dates: BTreeSet<NaiveDate> = series
        .iter()
        .flat_map(|s| s.prices().iter().map(|p| p.date))
        .collect();
    unique_dates.into_iter().collect()
}

/// Values of `series` on each date of `axis`, carrying the last observation
/// forward. Dates before the first observation stay `None`.
pub fn forward_fill(series: &InstrumentSeries, axis: &[NaiveDate]) -> Vec<Option<f64>> {
    let points = series.prices();
    let mut next = 0;
    let mut last: Option<f64> = None;

    axis.iter()
        .map(|date| {
            while next < points.len() && points[next].date <= *date {
                last = Some(points[next].price);
                next += 1;
            }
            last
        })
        .collect()
}

pub fn align(
    raw: &HashMap<String, InstrumentSeries>,
    universe: &Universe,
) -> Result<AlignedDataset, DuelError> {
    let symbols = universe.symbols();

    let mut required = Vec::with_capacity(symbols.len());
    for symbol in &symbols {
        match raw.get(symbol) {
            Some(series) if !series.is_empty() => required.push(series),
            _ => {
                tracing::warn!(symbol = %symbol, "no observations for required symbol");
                return Err(DuelError::InsufficientData {
                    symbol: symbol.clone(),
                });
            }
        }
    }

    let axis = build_date_axis(&required);
    let filled: Vec<Vec<Option<f64>>> = required.iter().map(|s| forward_fill(s, &axis)).collect();

    let all_present = |i: usize| filled.iter().all(|column| column[i].is_some());

    // Forward-filled columns never lose a value once they gain one, so the
    // first fully populated index bounds every later date too.
    let first_complete = (0..axis.len()).find(|&i| all_present(i));

    let late_listing = universe
        .instruments()
        .filter_map(|symbol| raw.get(symbol).and_then(InstrumentSeries::first_date))
        .max();

    let start = match (first_complete.map(|i| axis[i]), late_listing) {
        (Some(complete), Some(listed)) => complete.max(listed),
        (Some(complete), None) => complete,
        (None, _) => return Err(DuelError::EmptyAlignedRange),
    };

    let keep: Vec<usize> = (0..axis.len())
        .filter(|&i| axis[i] >= start && all_present(i))
        .collect();

    if keep.is_empty() {
        return Err(DuelError::EmptyAlignedRange);
    }

    let dates: Vec<NaiveDate> = keep.iter().map(|&i| axis[i]).collect();
    let columns: BTreeMap<String, Vec<f64>> = symbols
        .iter()
        .zip(&filled)
        .map(|(symbol, column)| {
            let values = keep.iter().filter_map(|&i| column[i]).collect();
            (symbol.clone(), values)
        })
        .collect();

    tracing::debug!(
        candidates = axis.len(),
        kept = dates.len(),
        start = %dates[0],
        end = %dates[dates.len() - 1],
        "aligned series"
    );

    Ok(AlignedDataset {
        dates,
        columns,
        fx_symbol: universe.fx.clone(),
    })
}
