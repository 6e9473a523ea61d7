//! Ingest request and run summary types.

use serde::Serialize;

use crate::{raw::FetchFault, region::Region};

/// What to scrape. Empty `regions` means the caller's configured default
/// priority set; empty `years` means the configured horizon.
#[derive(Debug, Clone, Default)]
pub struct IngestRequest {
  pub regions: Vec<Region>,
  pub years:   Vec<i32>,
}

/// Returned to the caller after an ingest run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
  /// Raw candidate rows yielded by the source.
  pub fetched:   usize,
  /// Rows the normalizer rejected for missing mandatory fields.
  pub rejected:  usize,
  pub inserted:  usize,
  pub updated:   usize,
  pub unchanged: usize,
  pub faults:    Vec<FetchFault>,
  /// True when the run was cut short by the shutdown signal. Data fetched
  /// before the signal is still merged and saved.
  pub cancelled: bool,
}
