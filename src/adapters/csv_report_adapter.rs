//! CSV value-curve report.

use crate::domain::comparison::ComparisonResult;
use crate::domain::error::DuelError;
use crate::ports::report_port::ReportPort;
use std::path::Path;

/// Writes `date,<primary>,<combination>` rows of target-currency values.
pub struct CsvReportAdapter;

impl ReportPort for CsvReportAdapter {
    fn write(&self, result: &ComparisonResult, output_path: &Path) -> Result<(), DuelError> {
        let mut writer = csv::Writer::from_path(output_path).map_err(csv_to_io)?;

        writer
            .write_record(["date", &result.primary.label, &result.combination.label])
            .map_err(csv_to_io)?;

        for (p, c) in result
            .primary
            .curve
            .points
            .iter()
            .zip(&result.combination.curve.points)
        {
            writer
                .write_record([
                    p.date.format("%Y-%m-%d").to_string(),
                    format!("{:.2}", p.value),
                    format!("{:.2}", c.value),
                ])
                .map_err(csv_to_io)?;
        }

        writer.flush()?;
        tracing::info!(path = %output_path.display(), rows = result.primary.curve.len(), "report written");
        Ok(())
    }
}

fn csv_to_io(e: csv::Error) -> DuelError {
    DuelError::Io(std::io::Error::other(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::comparison::compare;
    use crate::domain::simulate::NavCurve;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn writes_one_row_per_date() {
        let dates = [
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
        ];
        let primary = NavCurve::new("AVGS.L", &dates, &[300000.0, 330000.0]);
        let combination = NavCurve::new("50% AVUV + 50% AVDV", &dates, &[300000.0, 315000.0]);
        let result = compare(primary, combination, 300000.0);

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.csv");
        CsvReportAdapter.write(&result, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "date,AVGS.L,50% AVUV + 50% AVDV");
        assert_eq!(lines[2], "2024-01-03,330000.00,315000.00");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn unwritable_path_is_io_error() {
        let result = compare(
            NavCurve::new("A", &[], &[]),
            NavCurve::new("B", &[], &[]),
            1.0,
        );
        let err = CsvReportAdapter
            .write(&result, Path::new("/nonexistent/dir/report.csv"))
            .unwrap_err();
        assert!(matches!(err, DuelError::Io(_)));
    }
}
