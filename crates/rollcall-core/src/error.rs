//! Error types for `rollcall-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The input could not be read as a two-letter jurisdiction code or a
  /// known state name.
  #[error("invalid region: {0:?}")]
  InvalidRegion(String),

  /// The input is neither an ISO calendar date nor a bare year.
  #[error("invalid period: {0:?}")]
  InvalidPeriod(String),

  #[error("invalid query: {0}")]
  InvalidQuery(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
