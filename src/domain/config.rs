//! Parameters for one comparison run.

use crate::domain::allocation::AllocationPolicy;
use crate::domain::period::Period;
use crate::domain::tax::TaxDragModel;
use crate::domain::universe::Universe;

pub const DEFAULT_PRINCIPAL: f64 = 10_000.0;
pub const DEFAULT_WEIGHTS: &str = "50/50";

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonConfig {
    pub universe: Universe,
    pub period: Period,
    /// Amount invested in each strategy, in the instruments' quote currency.
    pub principal: f64,
    pub policy: AllocationPolicy,
    pub tax_enabled: bool,
    pub tax_model: TaxDragModel,
}

impl ComparisonConfig {
    /// The tax model when the toggle is on.
    pub fn active_tax_model(&self) -> Option<&TaxDragModel> {
        self.tax_enabled.then_some(&self.tax_model)
    }
}
