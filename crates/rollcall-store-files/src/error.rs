//! Error type for `rollcall-store-files`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] rollcall_core::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("csv line {line}: {message}")]
  Csv { line: usize, message: String },

  /// The two persisted representations disagree in a way the last-updated
  /// tiebreak cannot resolve, or one of the paired writes failed after the
  /// other succeeded. Fatal: the run halts for manual reconciliation.
  #[error("store inconsistency: {0}")]
  Inconsistent(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
