//! Core domain types and logic.

pub mod error;
pub mod series;
pub mod period;
pub mod universe;
pub mod allocation;
pub mod tax;
pub mod align;
pub mod simulate;
pub mod metrics;
pub mod quotes;
pub mod comparison;
pub mod config;
pub mod config_validation;
