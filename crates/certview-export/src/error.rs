//! Error types for `certview-export`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("spreadsheet error: {0}")]
  Xlsx(#[from] rust_xlsxwriter::XlsxError),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
