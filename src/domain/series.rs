//! Daily price series for one instrument or exchange rate.

use crate::domain::error::DuelError;
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// One symbol's daily history. Dates strictly increase and every price is
/// positive and finite; both are checked on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentSeries {
    symbol: String,
    prices: Vec<PricePoint>,
}

/// Quote-currency to target-currency rate, stored like any other series.
pub type FxSeries = InstrumentSeries;

impl InstrumentSeries {
    pub fn new(symbol: impl Into<String>, prices: Vec<PricePoint>) -> Result<Self, DuelError> {
        let symbol = symbol.into();

        for point in &prices {
            if !point.price.is_finite() || point.price <= 0.0 {
                return Err(DuelError::MalformedSeries {
                    symbol,
                    reason: format!(
                        "price {} on {} is not a positive finite number",
                        point.price, point.date
                    ),
                });
            }
        }

        for pair in prices.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(DuelError::MalformedSeries {
                    symbol,
                    reason: format!(
                        "dates not strictly increasing ({} followed by {})",
                        pair[0].date, pair[1].date
                    ),
                });
            }
        }

        Ok(Self { symbol, prices })
    }

    pub fn from_pairs<I>(symbol: impl Into<String>, pairs: I) -> Result<Self, DuelError>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let prices = pairs
            .into_iter()
            .map(|(date, price)| PricePoint { date, price })
            .collect();
        Self::new(symbol, prices)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn prices(&self) -> &[PricePoint] {
        &self.prices
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.prices.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.prices.last().map(|p| p.date)
    }

    /// (first date, last date, observation count), or `None` when empty.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate, usize)> {
        match (self.first_date(), self.last_date()) {
            (Some(first), Some(last)) => Some((first, last, self.len())),
            _ => None,
        }
    }
}
