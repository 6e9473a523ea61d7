//! Error type for `rollcall-sources`.
//!
//! These errors stay inside the adapter: `ElectionSource::fetch` converts
//! them into fault markers instead of letting them cross its boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// No listing pages are known for this region (not one of the fifty
  /// states).
  #[error("no listing page known for region {0}")]
  UnknownRegion(String),

  /// The shutdown signal fired while waiting for the politeness delay.
  #[error("fetch cancelled")]
  Cancelled,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
