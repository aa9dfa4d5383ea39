//! Ranks the single-instrument strategy against the combination.

use crate::domain::align::AlignedDataset;
use crate::domain::allocation::AllocationPolicy;
use crate::domain::error::DuelError;
use crate::domain::metrics::CurveStats;
use crate::domain::quotes::{latest_quotes, LatestQuotes};
use crate::domain::simulate::{
    convert_to_target_currency, simulate_combination, simulate_single_instrument, NavCurve,
};
use crate::domain::tax::TaxDragModel;
use crate::domain::universe::Universe;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    Primary,
    Combination,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyOutcome {
    pub label: String,
    /// Value curve in the currency `compare` was given.
    pub curve: NavCurve,
    pub final_value: f64,
    pub return_pct: f64,
    pub stats: CurveStats,
}

impl StrategyOutcome {
    fn from_curve(curve: NavCurve, principal: f64) -> Self {
        let final_value = curve.final_value().unwrap_or(principal);
        let stats = CurveStats::compute(&curve.values());
        Self {
            label: curve.label.clone(),
            return_pct: return_pct(final_value, principal),
            final_value,
            curve,
            stats,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakdownRow {
    pub policy: AllocationPolicy,
    pub final_value: f64,
    pub return_pct: f64,
    /// The policy the comparison itself ran with.
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    pub primary: StrategyOutcome,
    pub combination: StrategyOutcome,
    pub winner: Winner,
    /// `|final_primary - final_combination|`
    pub gap_value: f64,
    /// Difference between the two returns, in percentage points.
    pub gap_pct: f64,
    /// Starting amount both curves are measured against.
    pub principal: f64,
    pub breakdown: Vec<BreakdownRow>,
    pub quotes: Option<LatestQuotes>,
}

impl ComparisonResult {
    pub fn winning(&self) -> &StrategyOutcome {
        match self.winner {
            Winner::Primary => &self.primary,
            Winner::Combination => &self.combination,
        }
    }

    pub fn is_tie(&self) -> bool {
        self.primary.final_value == self.combination.final_value
    }
}

/// `(final - principal) / principal * 100`
pub fn return_pct(final_value: f64, principal: f64) -> f64 {
    if principal > 0.0 {
        (final_value - principal) / principal * 100.0
    } else {
        0.0
    }
}

/// Compares two value curves denominated in the same currency as `principal`.
pub fn compare(primary: NavCurve, combination: NavCurve, principal: f64) -> ComparisonResult {
    let primary = StrategyOutcome::from_curve(primary, principal);
    let combination = StrategyOutcome::from_curve(combination, principal);

    // Exact ties go to the combination: a zero difference falls through to
    // the second strategy rather than counting as a primary win. That rule is
    // inherited and may be unintended, so `ComparisonResult::is_tie` lets
    // callers report the tie instead of a winner.
    let winner = if primary.final_value > combination.final_value {
        Winner::Primary
    } else {
        Winner::Combination
    };

    ComparisonResult {
        gap_value: (primary.final_value - combination.final_value).abs(),
        gap_pct: (primary.return_pct - combination.return_pct).abs(),
        primary,
        combination,
        winner,
        principal,
        breakdown: Vec::new(),
        quotes: None,
    }
}

/// Re-runs the combination for each preset ratio, plus `selected` when it is
/// not one of them.
pub fn allocation_breakdown(
    aligned: &AlignedDataset,
    selected: &AllocationPolicy,
    constituents: &[String],
    tax: Option<&TaxDragModel>,
    principal: f64,
) -> Result<Vec<BreakdownRow>, DuelError> {
    let mut policies = AllocationPolicy::presets(constituents)?;
    if !policies.iter().any(|p| p.approx_eq(selected)) {
        policies.push(selected.clone());
    }

    let fx = aligned.fx_rates();
    let invested = principal * fx.first().copied().ok_or(DuelError::EmptyAlignedRange)?;

    policies
        .into_iter()
        .map(|policy| {
            let nav = simulate_combination(aligned, &policy, tax)?;
            let values = convert_to_target_currency(&nav.values(), fx, principal);
            let final_value = values.last().copied().unwrap_or(invested);
            Ok(BreakdownRow {
                selected: policy.approx_eq(selected),
                return_pct: return_pct(final_value, invested),
                final_value,
                policy,
            })
        })
        .collect()
}

/// Full run: both strategies in the target currency, the ranking, the
/// allocation breakdown and the latest-quote snapshot.
///
/// `principal` is in the instruments' quote currency; the returned values and
/// `ComparisonResult::principal` are in the target currency.
pub fn run_comparison(
    aligned: &AlignedDataset,
    universe: &Universe,
    policy: &AllocationPolicy,
    tax: Option<&TaxDragModel>,
    principal: f64,
) -> Result<ComparisonResult, DuelError> {
    if !principal.is_finite() || principal <= 0.0 {
        return Err(DuelError::ConfigInvalid {
            section: "comparison".into(),
            key: "principal".into(),
            reason: format!("principal must be a positive number, got {principal}"),
        });
    }

    if let Some(stray) = policy
        .symbols()
        .find(|s| !universe.constituents.iter().any(|c| c == s))
    {
        return Err(DuelError::InvalidAllocation {
            reason: format!("{stray} is not a constituent of {}", universe.combination_label()),
        });
    }

    let fx = aligned.fx_rates();
    let invested = principal * fx.first().copied().ok_or(DuelError::EmptyAlignedRange)?;

    let primary = simulate_single_instrument(aligned, &universe.primary, tax)?
        .to_target_currency(fx, principal);
    let combination = simulate_combination(aligned, policy, tax)?.to_target_currency(fx, principal);

    let mut result = compare(primary, combination, invested);
    result.breakdown =
        allocation_breakdown(aligned, policy, &universe.constituents, tax, principal)?;
    result.quotes = Some(latest_quotes(aligned, universe, policy)?);

    tracing::info!(
        primary = result.primary.final_value,
        combination = result.combination.final_value,
        winner = ?result.winner,
        days = aligned.len(),
        "comparison complete"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::align::align;
    use crate::domain::series::InstrumentSeries;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn curve(label: &str, values: &[f64]) -> NavCurve {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates: Vec<NaiveDate> = (0..values.len())
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect();
        NavCurve::new(label, &dates, values)
    }

    fn aligned(fx: &[f64]) -> (AlignedDataset, Universe) {
        let universe = Universe::new("A", vec!["B".into(), "C".into()], "FX").unwrap();
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let columns: [(&str, Vec<f64>); 4] = [
            ("A", vec![100.0, 110.0]),
            ("B", vec![50.0, 55.0]),
            ("C", vec![200.0, 220.0]),
            ("FX", fx.to_vec()),
        ];
        let raw: HashMap<String, InstrumentSeries> = columns
            .into_iter()
            .map(|(s, prices)| {
                let points = prices
                    .into_iter()
                    .enumerate()
                    .map(|(i, p)| (start + chrono::Duration::days(i as i64), p));
                (s.to_string(), InstrumentSeries::from_pairs(s, points).unwrap())
            })
            .collect();
        (align(&raw, &universe).unwrap(), universe)
    }

    #[test]
    fn larger_final_value_wins() {
        let result = compare(curve("P", &[100.0, 120.0]), curve("C", &[100.0, 110.0]), 100.0);
        assert_eq!(result.winner, Winner::Primary);
        assert_relative_eq!(result.primary.return_pct, 20.0, epsilon = 1e-9);
        assert_relative_eq!(result.combination.return_pct, 10.0, epsilon = 1e-9);
        assert_relative_eq!(result.gap_value, 10.0, epsilon = 1e-9);
        assert_relative_eq!(result.gap_pct, 10.0, epsilon = 1e-9);
        assert_eq!(result.winning().label, "P");
    }

    #[test]
    fn exact_tie_goes_to_combination() {
        let result = compare(curve("P", &[100.0, 110.0]), curve("C", &[100.0, 110.0]), 100.0);
        assert!(result.is_tie());
        assert_eq!(result.winner, Winner::Combination);
        assert_eq!(result.gap_value, 0.0);
    }

    #[test]
    fn return_pct_guards_non_positive_principal() {
        assert_eq!(return_pct(110.0, 0.0), 0.0);
        assert_relative_eq!(return_pct(90.0, 100.0), -10.0, epsilon = 1e-12);
    }

    #[test]
    fn run_comparison_flat_fx() {
        let (data, universe) = aligned(&[1.0, 1.0]);
        let policy = AllocationPolicy::from_ratio(&universe.constituents, "50/50").unwrap();

        let result = run_comparison(&data, &universe, &policy, None, 10_000.0).unwrap();

        assert_relative_eq!(result.primary.final_value, 11_000.0, epsilon = 1e-6);
        assert_relative_eq!(result.combination.final_value, 11_000.0, epsilon = 1e-6);
        assert_relative_eq!(result.primary.return_pct, 10.0, epsilon = 1e-9);
        assert!(result.gap_value < 1e-6);
        assert_eq!(result.principal, 10_000.0);
    }

    #[test]
    fn run_comparison_reports_in_target_currency() {
        let (data, universe) = aligned(&[30.0, 30.0]);
        let policy = AllocationPolicy::from_ratio(&universe.constituents, "50/50").unwrap();

        let result = run_comparison(&data, &universe, &policy, None, 10_000.0).unwrap();

        assert_eq!(result.principal, 300_000.0);
        assert_eq!(result.primary.curve.first_value(), Some(300_000.0));
        assert_relative_eq!(result.primary.final_value, 330_000.0, epsilon = 1e-6);
        assert_relative_eq!(result.combination.return_pct, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn breakdown_lists_presets_and_marks_selection() {
        let (data, universe) = aligned(&[1.0, 1.0]);
        let policy = AllocationPolicy::from_ratio(&universe.constituents, "60/40").unwrap();

        let result = run_comparison(&data, &universe, &policy, None, 10_000.0).unwrap();

        let labels: Vec<String> = result.breakdown.iter().map(|r| r.policy.label()).collect();
        assert_eq!(labels, vec!["50/50", "60/40", "70/30"]);
        let selected: Vec<bool> = result.breakdown.iter().map(|r| r.selected).collect();
        assert_eq!(selected, vec![false, true, false]);
    }

    #[test]
    fn reversed_preset_is_not_listed_twice() {
        let (data, universe) = aligned(&[1.0, 1.0]);
        let policy = AllocationPolicy::new(vec![("C".into(), 0.4), ("B".into(), 0.6)]).unwrap();

        let result = run_comparison(&data, &universe, &policy, None, 100.0).unwrap();

        let labels: Vec<String> = result.breakdown.iter().map(|r| r.policy.label()).collect();
        assert_eq!(labels, vec!["50/50", "60/40", "70/30"]);
        let selected: Vec<bool> = result.breakdown.iter().map(|r| r.selected).collect();
        assert_eq!(selected, vec![false, true, false]);
    }

    #[test]
    fn non_positive_principal_is_rejected() {
        let (data, universe) = aligned(&[1.0, 1.0]);
        let policy = AllocationPolicy::from_ratio(&universe.constituents, "50/50").unwrap();

        for principal in [0.0, -100.0, f64::NAN] {
            let err = run_comparison(&data, &universe, &policy, None, principal).unwrap_err();
            assert!(matches!(err, DuelError::ConfigInvalid { ref key, .. } if key == "principal"));
        }
    }

    #[test]
    fn breakdown_appends_custom_policy() {
        let (data, universe) = aligned(&[1.0, 1.0]);
        let policy = AllocationPolicy::from_ratio(&universe.constituents, "80/20").unwrap();

        let rows = allocation_breakdown(&data, &policy, &universe.constituents, None, 10_000.0)
            .unwrap();

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[3].policy.label(), "80/20");
        assert!(rows[3].selected);
    }

    #[test]
    fn policy_outside_universe_is_rejected() {
        let (data, universe) = aligned(&[1.0, 1.0]);
        let policy = AllocationPolicy::new(vec![("B".into(), 0.5), ("Z".into(), 0.5)]).unwrap();

        let err = run_comparison(&data, &universe, &policy, None, 10_000.0).unwrap_err();
        assert!(matches!(err, DuelError::InvalidAllocation { .. }));
    }

    #[test]
    fn quotes_are_attached() {
        let (data, universe) = aligned(&[30.0, 31.0]);
        let policy = AllocationPolicy::from_ratio(&universe.constituents, "50/50").unwrap();

        let result = run_comparison(&data, &universe, &policy, None, 1.0).unwrap();
        let quotes = result.quotes.unwrap();
        assert_eq!(quotes.fx_rate, 31.0);
        assert_relative_eq!(quotes.combination.base_price, 137.5, epsilon = 1e-9);
    }
}
