//! Configuration validation.
//!
//! Checks every comparison setting before any data is fetched.

use crate::domain::allocation::AllocationPolicy;
use crate::domain::config::DEFAULT_WEIGHTS;
use crate::domain::error::DuelError;
use crate::domain::period::Period;
use crate::domain::universe::{
    parse_codes, Universe, DEFAULT_CONSTITUENTS, DEFAULT_FX, DEFAULT_PRIMARY,
};
use crate::ports::config_port::ConfigPort;

pub fn validate_comparison_config(config: &dyn ConfigPort) -> Result<(), DuelError> {
    let universe = universe_from_config(config)?;
    validate_principal(config)?;
    validate_period(config)?;
    validate_weights(config, &universe)?;
    validate_tax_rates(config, &universe)?;
    Ok(())
}

/// `[symbols]` section, falling back to the default universe per key.
pub fn universe_from_config(config: &dyn ConfigPort) -> Result<Universe, DuelError> {
    let primary = config
        .get_nonblank("symbols", "primary")
        .unwrap_or_else(|| DEFAULT_PRIMARY.to_string());
    let fx = config
        .get_nonblank("symbols", "fx")
        .unwrap_or_else(|| DEFAULT_FX.to_string());

    let constituents = match config.get_string("symbols", "constituents") {
        Some(list) => parse_codes(&list).map_err(|e| invalid("symbols", "constituents", e))?,
        None => DEFAULT_CONSTITUENTS.iter().map(|s| s.to_string()).collect(),
    };

    Universe::new(primary, constituents, fx).map_err(|e| invalid("symbols", "constituents", e))
}

fn validate_principal(config: &dyn ConfigPort) -> Result<(), DuelError> {
    if config.get_string("comparison", "principal").is_none() {
        return Ok(());
    }
    let value = config.get_double("comparison", "principal", f64::NAN);
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(
            "comparison",
            "principal",
            "principal must be a positive number",
        ));
    }
    Ok(())
}

fn validate_period(config: &dyn ConfigPort) -> Result<(), DuelError> {
    match config.get_nonblank("comparison", "period") {
        Some(value) => value
            .parse::<Period>()
            .map(|_| ())
            .map_err(|e| invalid("comparison", "period", e)),
        None => Ok(()),
    }
}

fn validate_weights(config: &dyn ConfigPort, universe: &Universe) -> Result<(), DuelError> {
    let ratio = config
        .get_nonblank("comparison", "weights")
        .unwrap_or_else(|| DEFAULT_WEIGHTS.to_string());
    AllocationPolicy::from_ratio(&universe.constituents, &ratio)
        .map(|_| ())
        .map_err(|e| invalid("comparison", "weights", e))
}

fn validate_tax_rates(config: &dyn ConfigPort, universe: &Universe) -> Result<(), DuelError> {
    let known: Vec<String> = universe.instruments().map(str::to_lowercase).collect();

    for key in config.keys("tax") {
        let key = key.to_lowercase();
        if key == "enabled" {
            continue;
        }
        if !known.contains(&key) {
            return Err(invalid(
                "tax",
                &key,
                "tax rates may only be set for the compared instruments",
            ));
        }
        let rate = config.get_double("tax", &key, f64::NAN);
        if !rate.is_finite() || rate < 0.0 {
            return Err(invalid(
                "tax",
                &key,
                "annual drag rate must be a non-negative fraction",
            ));
        }
    }
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl ToString) -> DuelError {
    DuelError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
