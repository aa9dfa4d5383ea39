//! The fixed symbol set compared by a run: one primary instrument, the
//! combination's constituents and the FX rate series.

use std::collections::HashSet;

pub const DEFAULT_PRIMARY: &str = "AVGS.L";
pub const DEFAULT_CONSTITUENTS: [&str; 2] = ["AVUV", "AVDV"];
pub const DEFAULT_FX: &str = "USDTWD=X";
pub const REQUIRED_CONSTITUENTS: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct Universe {
    pub primary: String,
    pub constituents: Vec<String>,
    pub fx: String,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("empty {0} symbol")]
    EmptySymbol(&'static str),

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("expected {REQUIRED_CONSTITUENTS} constituents, found {0}")]
    ConstituentCount(usize),
}

impl Universe {
    pub fn new(
        primary: impl Into<String>,
        constituents: Vec<String>,
        fx: impl Into<String>,
    ) -> Result<Self, UniverseError> {
        let primary = primary.into().trim().to_uppercase();
        let fx = fx.into().trim().to_uppercase();
        let constituents: Vec<String> = constituents
            .iter()
            .map(|c| c.trim().to_uppercase())
            .collect();

        if primary.is_empty() {
            return Err(UniverseError::EmptySymbol("primary"));
        }
        if fx.is_empty() {
            return Err(UniverseError::EmptySymbol("fx"));
        }
        if constituents.len() != REQUIRED_CONSTITUENTS {
            return Err(UniverseError::ConstituentCount(constituents.len()));
        }
        if constituents.iter().any(String::is_empty) {
            return Err(UniverseError::EmptySymbol("constituent"));
        }

        let universe = Self {
            primary,
            constituents,
            fx,
        };

        let mut seen = HashSet::new();
        for symbol in universe.symbols() {
            if !seen.insert(symbol.clone()) {
                return Err(UniverseError::DuplicateSymbol(symbol));
            }
        }

        Ok(universe)
    }

    /// Tradable instruments: the primary followed by the constituents.
    pub fn instruments(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.constituents.iter().map(String::as_str))
    }

    /// Every series a run needs, instruments first and the FX rate last.
    pub fn symbols(&self) -> Vec<String> {
        self.instruments()
            .map(str::to_string)
            .chain(std::iter::once(self.fx.clone()))
            .collect()
    }

    pub fn combination_label(&self) -> String {
        self.constituents.join("+")
    }
}

impl Default for Universe {
    fn default() -> Self {
        Self {
            primary: DEFAULT_PRIMARY.to_string(),
            constituents: DEFAULT_CONSTITUENTS.iter().map(|s| s.to_string()).collect(),
            fx: DEFAULT_FX.to_string(),
        }
    }
}

pub fn parse_codes(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut codes = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let code = trimmed.to_uppercase();
        if !seen.insert(code.clone()) {
            return Err(UniverseError::DuplicateSymbol(code));
        }
        codes.push(code);
    }

    Ok(codes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn default_universe() {
        let u = Universe::default();
        assert_eq!(u.primary, "AVGS.L");
        assert_eq!(u.constituents, vec!["AVUV", "AVDV"]);
        assert_eq!(u.fx, "USDTWD=X");
        assert_eq!(u.combination_label(), "AVUV+AVDV");
    }

    #[test]
    fn symbols_order_instruments_then_fx() {
        let u = Universe::default();
        assert_eq!(u.symbols(), vec!["AVGS.L", "AVUV", "AVDV", "USDTWD=X"]);
        assert_eq!(
            u.instruments().collect::<Vec<_>>(),
            vec!["AVGS.L", "AVUV", "AVDV"]
        );
    }

    #[test]
    fn new_normalizes_case() {
        let u = Universe::new(" avgs.l ", codes(&["AVUV", "AVDV"]), "usdtwd=x").unwrap();
        assert_eq!(u.primary, "AVGS.L");
        assert_eq!(u.fx, "USDTWD=X");
    }

    #[test]
    fn new_rejects_wrong_constituent_count() {
        let err = Universe::new("A", codes(&["B"]), "FX").unwrap_err();
        assert!(matches!(err, UniverseError::ConstituentCount(1)));
    }

    #[test]
    fn new_rejects_primary_reused_as_constituent() {
        let err = Universe::new("AVUV", codes(&["AVUV", "AVDV"]), "FX").unwrap_err();
        assert!(matches!(err, UniverseError::DuplicateSymbol(s) if s == "AVUV"));
    }

    #[test]
    fn new_rejects_empty_fx() {
        let err = Universe::new("A", codes(&["B", "C"]), "  ").unwrap_err();
        assert!(matches!(err, UniverseError::EmptySymbol("fx")));
    }

    #[test]
    fn parse_codes_trims_and_uppercases() {
        let result = parse_codes("  avuv , AVDV ").unwrap();
        assert_eq!(result, vec!["AVUV", "AVDV"]);
    }

    #[test]
    fn parse_codes_empty_token() {
        assert!(matches!(parse_codes("AVUV,,AVDV"), Err(UniverseError::EmptyToken)));
    }

    #[test]
    fn parse_codes_duplicate() {
        let result = parse_codes("AVUV,avuv");
        assert!(matches!(result, Err(UniverseError::DuplicateSymbol(s)) if s == "AVUV"));
    }
}
