//! Query engine — composable predicate filters plus summary statistics.
//!
//! Filters are independent and conjunctive. Output order is the record
//! set's deterministic key order, so identical filters over an unchanged
//! store always return matches in identical order (reproducible exports).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
  record::{ElectionRecord, Office, RecordSet},
  region::Region,
  Error, Result,
};

/// A filtered view request. All fields optional and composable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryRequest {
  pub region:    Option<Region>,
  pub office:    Option<Office>,
  pub contested: Option<bool>,
  /// Inclusive lower bound on partisan lean. Records with no lean never
  /// match a range filter.
  pub min_lean:  Option<f64>,
  /// Inclusive upper bound on partisan lean.
  pub max_lean:  Option<f64>,
  /// Match only records whose partisan lean is unknown. Mutually
  /// exclusive with the range bounds.
  #[serde(default)]
  pub lean_unknown: bool,
}

impl QueryRequest {
  pub fn validate(&self) -> Result<()> {
    if self.lean_unknown && (self.min_lean.is_some() || self.max_lean.is_some())
    {
      return Err(Error::InvalidQuery(
        "lean_unknown cannot be combined with a lean range".to_string(),
      ));
    }
    Ok(())
  }

  fn matches(&self, record: &ElectionRecord) -> bool {
    if let Some(region) = &self.region {
      if &record.region != region {
        return false;
      }
    }
    if let Some(office) = &self.office {
      if &record.office != office {
        return false;
      }
    }
    if let Some(contested) = self.contested {
      if record.contested != contested {
        return false;
      }
    }
    if self.lean_unknown && record.partisan_lean.is_some() {
      return false;
    }
    if self.min_lean.is_some() || self.max_lean.is_some() {
      let Some(lean) = record.partisan_lean else {
        return false;
      };
      if self.min_lean.is_some_and(|min| lean < min) {
        return false;
      }
      if self.max_lean.is_some_and(|max| lean > max) {
        return false;
      }
    }
    true
  }
}

/// Summary statistics computed over the matches of one query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryStats {
  pub total:       usize,
  /// Match count per region code.
  pub by_region:   BTreeMap<String, usize>,
  pub contested:   usize,
  pub uncontested: usize,
  /// Mean partisan lean over the matches that carry one.
  pub mean_lean:   Option<f64>,
  /// Distinct office categories among the matches.
  pub offices:     usize,
}

/// Apply `request` over `set`, returning matches in stable order plus
/// statistics.
pub fn query(
  set: &RecordSet,
  request: &QueryRequest,
) -> Result<(Vec<ElectionRecord>, QueryStats)> {
  request.validate()?;

  let matches: Vec<ElectionRecord> = set
    .iter()
    .filter(|record| request.matches(record))
    .cloned()
    .collect();

  let mut stats = QueryStats { total: matches.len(), ..Default::default() };

  let mut lean_sum = 0.0;
  let mut lean_count = 0usize;
  let mut offices: Vec<&str> = Vec::new();

  for record in &matches {
    *stats
      .by_region
      .entry(record.region.as_str().to_string())
      .or_default() += 1;
    if record.contested {
      stats.contested += 1;
    } else {
      stats.uncontested += 1;
    }
    if let Some(lean) = record.partisan_lean {
      lean_sum += lean;
      lean_count += 1;
    }
    let label = record.office.label();
    if !offices.contains(&label) {
      offices.push(label);
    }
  }

  if lean_count > 0 {
    stats.mean_lean = Some(lean_sum / lean_count as f64);
  }
  stats.offices = offices.len();

  Ok((matches, stats))
}
