//! The untyped boundary between source adapters and the normalizer.
//!
//! Scraped fields stay a string-keyed bag until normalization; strict
//! typing starts at [`crate::record::NewRecord`]. The bag is confined to
//! this one stage.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::region::Region;

/// Field keys a source adapter is expected to populate where available.
/// The normalizer reads these; unknown keys are ignored.
pub mod keys {
  pub const REGION: &str = "region";
  pub const OFFICE: &str = "office";
  pub const DISTRICT: &str = "district";
  pub const YEAR: &str = "year";
  pub const DATE: &str = "date";
  pub const CANDIDATES: &str = "candidates";
  pub const INCUMBENT: &str = "incumbent";
  pub const PARTISAN_LEAN: &str = "partisan_lean";
  pub const SOURCE_URL: &str = "source_url";
}

/// An unvalidated bag of scraped text fields for one listing row.
#[derive(Debug, Clone, Default)]
pub struct RawCandidate {
  fields: BTreeMap<String, String>,
}

impl RawCandidate {
  pub fn new() -> Self { Self::default() }

  pub fn set(mut self, key: &str, value: impl Into<String>) -> Self {
    self.fields.insert(key.to_string(), value.into());
    self
  }

  /// Trimmed, non-empty field lookup.
  pub fn get(&self, key: &str) -> Option<&str> {
    self
      .fields
      .get(key)
      .map(|v| v.trim())
      .filter(|v| !v.is_empty())
  }
}

/// One element of the sequence a source adapter yields for a
/// (region, year) request.
#[derive(Debug, Clone)]
pub enum SourceItem {
  Candidate(RawCandidate),
  /// The request for this pair failed; the run continues without it.
  Fault(FetchFault),
}

/// A recorded fetch failure, attributable to one (region, year) pair.
#[derive(Debug, Clone, Serialize)]
pub struct FetchFault {
  pub region: Region,
  pub year:   i32,
  pub reason: String,
}

impl std::fmt::Display for FetchFault {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{} {}: {}", self.region, self.year, self.reason)
  }
}
