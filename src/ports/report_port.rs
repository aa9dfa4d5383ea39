//! Report generation port trait.

use crate::domain::comparison::ComparisonResult;
use crate::domain::error::DuelError;
use std::path::Path;

/// Port for writing comparison reports.
pub trait ReportPort {
    fn write(&self, result: &ComparisonResult, output_path: &Path) -> Result<(), DuelError>;
}
