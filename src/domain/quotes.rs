//! Latest-price snapshot shown alongside a comparison.

use crate::domain::align::AlignedDataset;
use crate::domain::allocation::AllocationPolicy;
use crate::domain::error::DuelError;
use crate::domain::universe::Universe;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub label: String,
    /// Quote currency.
    pub base_price: f64,
    /// `base_price` at the latest FX rate.
    pub target_price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LatestQuotes {
    pub date: NaiveDate,
    pub fx_rate: f64,
    pub primary: Quote,
    /// Weighted blend of the constituents' last prices.
    pub combination: Quote,
}

pub fn latest_quotes(
    aligned: &AlignedDataset,
    universe: &Universe,
    policy: &AllocationPolicy,
) -> Result<LatestQuotes, DuelError> {
    let date = aligned.last_date().ok_or(DuelError::EmptyAlignedRange)?;
    let last = |symbol: &str| {
        aligned
            .last_value(symbol)
            .ok_or_else(|| DuelError::InsufficientData {
                symbol: symbol.to_string(),
            })
    };

    let fx_rate = last(universe.fx.as_str())?;
    let primary_price = last(universe.primary.as_str())?;

    let mut blend = 0.0;
    for (symbol, weight) in policy.weights() {
        blend += weight * last(symbol.as_str())?;
    }

    Ok(LatestQuotes {
        date,
        fx_rate,
        primary: Quote {
            label: universe.primary.clone(),
            base_price: primary_price,
            target_price: primary_price * fx_rate,
        },
        combination: Quote {
            label: format!("{} ({})", universe.combination_label(), policy.label()),
            base_price: blend,
            target_price: blend * fx_rate,
        },
    })
}
