//! Allocation weights for the combination strategy.

use crate::domain::error::DuelError;
use std::collections::HashSet;

pub const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Ratios offered side by side in the breakdown table.
pub const PRESET_RATIOS: [&str; 3] = ["50/50", "60/40", "70/30"];

/// Non-negative per-constituent weights summing to 1.0, in constituent order.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationPolicy {
    weights: Vec<(String, f64)>,
}

impl AllocationPolicy {
    pub fn new(weights: Vec<(String, f64)>) -> Result<Self, DuelError> {
        if weights.is_empty() {
            return Err(DuelError::InvalidAllocation {
                reason: "no constituents".into(),
            });
        }

        let mut seen = HashSet::new();
        for (symbol, weight) in &weights {
            if !seen.insert(symbol.as_str()) {
                return Err(DuelError::InvalidAllocation {
                    reason: format!("duplicate constituent {symbol}"),
                });
            }
            if !weight.is_finite() || *weight < 0.0 {
                return Err(DuelError::InvalidAllocation {
                    reason: format!("weight for {symbol} must be non-negative, got {weight}"),
                });
            }
        }

        let total: f64 = weights.iter().map(|(_, w)| w).sum();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(DuelError::InvalidAllocation {
                reason: format!("weights sum to {total}, expected 1"),
            });
        }

        Ok(Self { weights })
    }

    /// Parses a percentage ratio such as `"60/40"` against `constituents`, in order.
    pub fn from_ratio(constituents: &[String], ratio: &str) -> Result<Self, DuelError> {
        let parts: Vec<&str> = ratio.split('/').map(str::trim).collect();
        if parts.len() != constituents.len() {
            return Err(DuelError::InvalidAllocation {
                reason: format!(
                    "ratio '{ratio}' has {} parts for {} constituents",
                    parts.len(),
                    constituents.len()
                ),
            });
        }

        let mut percents = Vec::with_capacity(parts.len());
        for part in parts {
            let pct: f64 = part.parse().map_err(|_| DuelError::InvalidAllocation {
                reason: format!("'{part}' in ratio '{ratio}' is not a number"),
            })?;
            percents.push(pct);
        }

        let weights = constituents
            .iter()
            .zip(percents)
            .map(|(symbol, pct)| (symbol.clone(), pct / 100.0))
            .collect();
        Self::new(weights)
    }

    pub fn presets(constituents: &[String]) -> Result<Vec<Self>, DuelError> {
        PRESET_RATIOS
            .iter()
            .map(|ratio| Self::from_ratio(constituents, ratio))
            .collect()
    }

    pub fn weights(&self) -> &[(String, f64)] {
        &self.weights
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.weights.iter().map(|(s, _)| s.as_str())
    }

    pub fn weight_of(&self, symbol: &str) -> Option<f64> {
        self.weights
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, w)| *w)
    }

    /// `"60/40"` style ratio label.
    pub fn label(&self) -> String {
        self.weights
            .iter()
            .map(|(_, w)| format_percent(w * 100.0))
            .collect::<Vec<_>>()
            .join("/")
    }

    /// `"60% AVUV + 40% AVDV"`
    pub fn describe(&self) -> String {
        self.weights
            .iter()
            .map(|(s, w)| format!("{}% {}", format_percent(w * 100.0), s))
            .collect::<Vec<_>>()
            .join(" + ")
    }

    /// Same constituents and weights within tolerance, in any order.
    pub fn approx_eq(&self, other: &Self) -> bool {
        self.weights.len() == other.weights.len()
            && self.weights.iter().all(|(symbol, w)| {
                other
                    .weight_of(symbol)
                    .is_some_and(|o| (w - o).abs() <= WEIGHT_TOLERANCE)
            })
    }
}

fn format_percent(pct: f64) -> String {
    let rounded = pct.round();
    if (pct - rounded).abs() < 1e-6 {
        format!("{rounded:.0}")
    } else {
        format!("{pct:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> Vec<String> {
        vec!["AVUV".to_string(), "AVDV".to_string()]
    }

    #[test]
    fn from_ratio_splits_in_order() {
        let policy = AllocationPolicy::from_ratio(&pair(), "60/40").unwrap();
        assert_eq!(policy.weight_of("AVUV"), Some(0.6));
        assert_eq!(policy.weight_of("AVDV"), Some(0.4));
        assert_eq!(policy.label(), "60/40");
        assert_eq!(policy.describe(), "60% AVUV + 40% AVDV");
    }

    #[test]
    fn from_ratio_accepts_spaces_and_fractions() {
        let policy = AllocationPolicy::from_ratio(&pair(), " 62.5 / 37.5 ").unwrap();
        assert_eq!(policy.label(), "62.5/37.5");
    }

    #[test]
    fn from_ratio_rejects_bad_sum() {
        let err = AllocationPolicy::from_ratio(&pair(), "60/50").unwrap_err();
        assert!(matches!(err, DuelError::InvalidAllocation { .. }));
    }

    #[test]
    fn from_ratio_rejects_wrong_arity_and_garbage() {
        assert!(AllocationPolicy::from_ratio(&pair(), "100").is_err());
        assert!(AllocationPolicy::from_ratio(&pair(), "50/50/0").is_err());
        assert!(AllocationPolicy::from_ratio(&pair(), "half/half").is_err());
    }

    #[test]
    fn new_rejects_negative_weight() {
        let err = AllocationPolicy::new(vec![("A".into(), 1.5), ("B".into(), -0.5)]).unwrap_err();
        assert!(matches!(err, DuelError::InvalidAllocation { .. }));
    }

    #[test]
    fn new_rejects_duplicates_and_empty() {
        assert!(AllocationPolicy::new(vec![]).is_err());
        assert!(AllocationPolicy::new(vec![("A".into(), 0.5), ("A".into(), 0.5)]).is_err());
    }

    #[test]
    fn zero_weight_is_allowed() {
        let policy = AllocationPolicy::from_ratio(&pair(), "100/0").unwrap();
        assert_eq!(policy.weight_of("AVDV"), Some(0.0));
    }

    #[test]
    fn presets_are_fixed_ratios() {
        let labels: Vec<String> = AllocationPolicy::presets(&pair())
            .unwrap()
            .iter()
            .map(AllocationPolicy::label)
            .collect();
        assert_eq!(labels, vec!["50/50", "60/40", "70/30"]);
    }

    #[test]
    fn approx_eq_ignores_constituent_order() {
        let reversed =
            AllocationPolicy::new(vec![("AVDV".into(), 0.4), ("AVUV".into(), 0.6)]).unwrap();
        assert!(reversed.approx_eq(&AllocationPolicy::from_ratio(&pair(), "60/40").unwrap()));
        assert!(!reversed.approx_eq(&AllocationPolicy::from_ratio(&pair(), "40/60").unwrap()));
        assert!(!reversed.approx_eq(&AllocationPolicy::from_ratio(&pair(), "50/50").unwrap()));
    }

    #[test]
    fn approx_eq_needs_the_same_constituents() {
        let other =
            AllocationPolicy::new(vec![("AVUV".into(), 0.5), ("VOO".into(), 0.5)]).unwrap();
        assert!(!other.approx_eq(&AllocationPolicy::from_ratio(&pair(), "50/50").unwrap()));
    }
}
