//! CSV report writing.
//!
//! Header row `Problem ID,Subject,Number of Incidents`, then one row per
//! problem group. The file is created only once the full row set is final,
//! so a failed run leaves no partial report behind.

use std::path::Path;

use thiserror::Error;

use crate::types::ReportRow;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// Write the report rows to `path` as UTF-8 CSV.
///
/// The header comes from the serde field names on [`ReportRow`].
pub fn write_report(path: &Path, rows: &[ReportRow]) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
