#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use std::collections::HashMap;
use valueduel::domain::allocation::AllocationPolicy;
use valueduel::domain::config::ComparisonConfig;
use valueduel::domain::error::DuelError;
use valueduel::domain::period::Period;
use valueduel::domain::series::InstrumentSeries;
use valueduel::domain::tax::TaxDragModel;
use valueduel::domain::universe::Universe;
use valueduel::ports::data_port::MarketDataPort;

pub struct MockDataPort {
    pub data: HashMap<String, InstrumentSeries>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_series(mut self, series: InstrumentSeries) -> Self {
        self.data.insert(series.symbol().to_string(), series);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl MarketDataPort for MockDataPort {
    fn fetch_daily_prices(
        &self,
        symbols: &[String],
        _period: Period,
    ) -> Result<HashMap<String, InstrumentSeries>, DuelError> {
        let mut out = HashMap::new();
        for symbol in symbols {
            if let Some(reason) = self.errors.get(symbol) {
                return Err(DuelError::DataFetch {
                    reason: reason.clone(),
                });
            }
            if let Some(series) = self.data.get(symbol) {
                out.insert(symbol.clone(), series.clone());
            }
        }
        Ok(out)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, DuelError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(DuelError::DataFetch {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(symbol).and_then(InstrumentSeries::date_range))
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Consecutive calendar days from 2024-01-01.
pub fn make_series(symbol: &str, prices: &[f64]) -> InstrumentSeries {
    let start = date(2024, 1, 1);
    InstrumentSeries::from_pairs(
        symbol,
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| (start + Duration::days(i as i64), p)),
    )
    .unwrap()
}

pub fn make_dated_series(symbol: &str, points: &[(NaiveDate, f64)]) -> InstrumentSeries {
    InstrumentSeries::from_pairs(symbol, points.iter().copied()).unwrap()
}

/// Primary `P`, constituents `A`/`B`, FX `FX`.
pub fn test_universe() -> Universe {
    Universe::new("P", vec!["A".into(), "B".into()], "FX").unwrap()
}

pub fn raw_map(list: Vec<InstrumentSeries>) -> HashMap<String, InstrumentSeries> {
    list.into_iter()
        .map(|s| (s.symbol().to_string(), s))
        .collect()
}

pub fn sample_config(ratio: &str, principal: f64) -> ComparisonConfig {
    let universe = test_universe();
    ComparisonConfig {
        policy: AllocationPolicy::from_ratio(&universe.constituents, ratio).unwrap(),
        tax_model: TaxDragModel::new(),
        universe,
        period: Period::Max,
        principal,
        tax_enabled: false,
    }
}

/// The two-day scenario: every instrument gains 10%.
pub fn ten_percent_port(fx: f64) -> MockDataPort {
    MockDataPort::new()
        .with_series(make_series("P", &[100.0, 110.0]))
        .with_series(make_series("A", &[50.0, 55.0]))
        .with_series(make_series("B", &[200.0, 220.0]))
        .with_series(make_series("FX", &[fx, fx]))
}
