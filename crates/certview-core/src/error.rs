//! Error types for `certview-core`.

use thiserror::Error;

use crate::lookup::LookupMode;

#[derive(Debug, Error)]
pub enum Error {
  #[error("a {0} request is already in flight")]
  RequestInFlight(LookupMode),

  #[error("the identifier list is empty")]
  NoIdentifiers,

  #[error("unknown sort key: {0:?}")]
  UnknownSortKey(String),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
