//! Static tax-drag estimate on distributions.
//!
//! Each symbol carries an annualized yield-loss rate (a fraction, `0.0054` is
//! 0.54%/yr). Symbols without a rate, such as an instrument domiciled outside
//! the taxed jurisdiction, have no drag.

use crate::domain::error::DuelError;
use std::collections::BTreeMap;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Default annual drag for the first and second constituent.
pub const DEFAULT_DRAG_RATES: [f64; 2] = [0.0054, 0.0096];

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaxDragModel {
    rates: BTreeMap<String, f64>,
}

impl TaxDragModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate(mut self, symbol: impl Into<String>, annual_rate: f64) -> Result<Self, DuelError> {
        let symbol = symbol.into();
        if !annual_rate.is_finite() || annual_rate < 0.0 {
            return Err(DuelError::InvalidTaxRate {
                symbol,
                rate: annual_rate,
            });
        }
        self.rates.insert(symbol, annual_rate);
        Ok(self)
    }

    /// The default constants applied to `constituents` in order.
    pub fn for_constituents(constituents: &[String]) -> Self {
        let rates = constituents
            .iter()
            .zip(DEFAULT_DRAG_RATES)
            .map(|(s, r)| (s.clone(), r))
            .collect();
        Self { rates }
    }

    pub fn rate_for(&self, symbol: &str) -> f64 {
        self.rates.get(symbol).copied().unwrap_or(0.0)
    }

    pub fn rates(&self) -> impl Iterator<Item = (&str, f64)> {
        self.rates.iter().map(|(s, r)| (s.as_str(), *r))
    }
}
