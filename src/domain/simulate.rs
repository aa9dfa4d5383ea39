//! NAV simulation for the single-instrument and combination strategies.

use crate::domain::align::AlignedDataset;
use crate::domain::allocation::AllocationPolicy;
use crate::domain::error::DuelError;
use crate::domain::tax::{TaxDragModel, TRADING_DAYS_PER_YEAR};
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavCurve {
    pub label: String,
    pub points: Vec<NavPoint>,
}

impl NavCurve {
    pub fn new(label: impl Into<String>, dates: &[NaiveDate], values: &[f64]) -> Self {
        let points = dates
            .iter()
            .zip(values)
            .map(|(&date, &value)| NavPoint { date, value })
            .collect();
        Self {
            label: label.into(),
            points,
        }
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn first_value(&self) -> Option<f64> {
        self.points.first().map(|p| p.value)
    }

    pub fn final_value(&self) -> Option<f64> {
        self.points.last().map(|p| p.value)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Marks this base-currency NAV to market in the target currency.
    pub fn to_target_currency(&self, fx: &[f64], principal: f64) -> NavCurve {
        let values = convert_to_target_currency(&self.values(), fx, principal);
        NavCurve::new(self.label.clone(), &self.dates(), &values)
    }
}

/// `p[t] / p[t-1] - 1`, with day zero defined as no return.
pub fn compute_daily_returns(prices: &[f64]) -> Vec<f64> {
    if prices.is_empty() {
        return Vec::new();
    }

    let mut returns = Vec::with_capacity(prices.len());
    returns.push(0.0);
    returns.extend(prices.windows(2).map(|w| w[1] / w[0] - 1.0));
    returns
}

/// Subtracts `annual_rate / 252` from every daily return.
///
/// Day zero is dragged as well even though it has no market return.
/// `compound_nav` anchors day zero at 1.0, so that entry only shows in the
/// return series.
pub fn apply_tax_drag(returns: &[f64], annual_rate: f64) -> Vec<f64> {
    let daily = annual_rate / TRADING_DAYS_PER_YEAR;
    returns.iter().map(|r| r - daily).collect()
}

/// `nav[0] = 1.0`, `nav[t] = nav[t-1] * (1 + r[t])`.
pub fn compound_nav(returns: &[f64]) -> Vec<f64> {
    if returns.is_empty() {
        return Vec::new();
    }

    let mut nav = Vec::with_capacity(returns.len());
    let mut value = 1.0;
    nav.push(value);
    for r in &returns[1..] {
        value *= 1.0 + r;
        nav.push(value);
    }
    nav
}

pub fn simulate_single_instrument(
    aligned: &AlignedDataset,
    symbol: &str,
    tax: Option<&TaxDragModel>,
) -> Result<NavCurve, DuelError> {
    let prices = aligned
        .prices(symbol)
        .ok_or_else(|| DuelError::InsufficientData {
            symbol: symbol.to_string(),
        })?;

    let mut returns = compute_daily_returns(prices);
    let rate = tax.map_or(0.0, |model| model.rate_for(symbol));
    if rate != 0.0 {
        returns = apply_tax_drag(&returns, rate);
    }

    Ok(NavCurve::new(symbol, aligned.dates(), &compound_nav(&returns)))
}

/// Weighted sum of independently compounded constituent NAVs.
///
/// Each constituent grows from its own share of the principal with no
/// rebalancing.
pub fn simulate_combination(
    aligned: &AlignedDataset,
    policy: &AllocationPolicy,
    tax: Option<&TaxDragModel>,
) -> Result<NavCurve, DuelError> {
    let mut combined = vec![0.0; aligned.len()];

    for (symbol, weight) in policy.weights() {
        let nav = simulate_single_instrument(aligned, symbol, tax)?;
        for (total, point) in combined.iter_mut().zip(&nav.points) {
            *total += weight * point.value;
        }
    }

    Ok(NavCurve::new(policy.describe(), aligned.dates(), &combined))
}

/// `principal * nav[t] * fx[t]`, using each day's own rate.
pub fn convert_to_target_currency(nav: &[f64], fx: &[f64], principal: f64) -> Vec<f64> {
    debug_assert_eq!(nav.len(), fx.len());
    nav.iter()
        .zip(fx)
        .map(|(value, rate)| principal * value * rate)
        .collect()
}
