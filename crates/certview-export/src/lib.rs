//! Flatten-and-export pipeline for certview.
//!
//! Turns the nested result set (one person, zero or more certifications)
//! into flat rows and writes them as an `.xlsx` workbook. Pure synchronous;
//! no network access.
//!
//! Export always takes the full record set, never a visible page.
//!
//! # Quick start
//!
//! ```no_run
//! use certview_core::{columns::ColumnSet, record::PersonRecord};
//!
//! let records = vec![PersonRecord::new("11111111111", "Joao")];
//! let columns = ColumnSet::detect(&records);
//! certview_export::write_xlsx("certificacoes.xlsx", &records, &columns).unwrap();
//! ```

pub mod error;
mod flatten;
mod xlsx;

use std::path::Path;

use certview_core::{columns::ColumnSet, record::PersonRecord};

pub use error::{Error, Result};
pub use flatten::{FlatRow, flatten};
pub use xlsx::SHEET_NAME;

/// Serialize already-flattened rows to workbook bytes.
pub fn to_xlsx(rows: &[FlatRow], columns: &ColumnSet) -> Result<Vec<u8>> {
  xlsx::serialize(rows, columns)
}

/// Flatten `records`, serialize them and write the workbook to `path`.
/// Returns the number of data rows written.
pub fn write_xlsx(
  path: impl AsRef<Path>,
  records: &[PersonRecord],
  columns: &ColumnSet,
) -> Result<usize> {
  let path = path.as_ref();
  let rows = flatten(records);
  let bytes = to_xlsx(&rows, columns)?;
  std::fs::write(path, bytes)?;
  tracing::info!(path = %path.display(), rows = rows.len(), "workbook written");
  Ok(rows.len())
}
