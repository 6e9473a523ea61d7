//! Normalizer — raw scraped bags into strictly-typed records.
//!
//! Strict typing starts here: a [`RawCandidate`] either becomes a
//! [`NewRecord`] or a [`Rejection`] naming the mandatory fields that could
//! not be extracted. Rejections are tallied by the pipeline, never
//! silently dropped.

use std::fmt;

use crate::{
  raw::{keys, RawCandidate},
  record::{display_location, NewRecord, Office, Period},
  region::Region,
};

/// Incumbent cells that mean "no incumbent".
const INCUMBENT_PLACEHOLDERS: &[&str] = &["vacant", "none", "n/a", "tba"];

/// A raw candidate that could not be normalized. Carries the mandatory
/// fields that were missing or unparseable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
  pub missing: Vec<&'static str>,
}

impl fmt::Display for Rejection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "missing mandatory fields: {}", self.missing.join(", "))
  }
}

impl std::error::Error for Rejection {}

/// Convert one raw candidate into a typed record.
///
/// Mandatory fields are region, office, district, and a usable period
/// (an ISO date in `date` or a bare year in `year`). `last_updated` is
/// never set here — that is the merge engine's job.
pub fn normalize(raw: &RawCandidate) -> Result<NewRecord, Rejection> {
  let mut missing: Vec<&'static str> = Vec::new();

  let region: Option<Region> =
    raw.get(keys::REGION).and_then(|v| v.parse().ok());
  if region.is_none() {
    missing.push(keys::REGION);
  }

  let office: Option<Office> = raw.get(keys::OFFICE).map(Office::canonicalize);
  if office.is_none() {
    missing.push(keys::OFFICE);
  }

  let district = raw.get(keys::DISTRICT).map(clean_district);
  if district.is_none() {
    missing.push(keys::DISTRICT);
  }

  let period = parse_period(raw);
  if period.is_none() {
    missing.push(keys::DATE);
  }

  if !missing.is_empty() {
    return Err(Rejection { missing });
  }

  let (region, office, district, period) = (
    region.expect("checked above"),
    office.expect("checked above"),
    district.expect("checked above"),
    period.expect("checked above"),
  );

  Ok(NewRecord {
    location: display_location(&region, &office, &district),
    contested: classify_contested(raw),
    incumbent: extract_incumbent(raw),
    partisan_lean: raw
      .get(keys::PARTISAN_LEAN)
      .and_then(|v| v.parse::<f64>().ok()),
    source_reference: raw.get(keys::SOURCE_URL).unwrap_or_default().to_string(),
    region,
    office,
    district,
    period,
  })
}

/// Prefer a full date; fall back to a bare year.
fn parse_period(raw: &RawCandidate) -> Option<Period> {
  if let Some(date) = raw.get(keys::DATE) {
    if let Ok(period) = date.parse::<Period>() {
      return Some(period);
    }
  }
  raw.get(keys::YEAR).and_then(|y| y.parse::<Period>().ok())
}

/// Strip a redundant office/district prefix from a scraped district cell
/// (`"District 12"` → `"12"`, `"Senate District 3"` → `"3"`).
fn clean_district(cell: &str) -> String {
  let cell = cell.trim();
  let lower = cell.to_ascii_lowercase();
  if let Some(idx) = lower.rfind("district") {
    let rest = cell[idx + "district".len()..].trim();
    if !rest.is_empty() {
      return rest.to_string();
    }
  }
  cell.to_string()
}

/// Contested/uncontested classification.
///
/// Counts distinct named-candidate mentions: two or more → contested.
/// Explicit `uncontested`/`unopposed` wording forces uncontested. A row
/// with no identifiable names and no explicit wording is ambiguous and
/// classified as contested. Known limitation: that default over-reports
/// competition rather than under-reporting it.
fn classify_contested(raw: &RawCandidate) -> bool {
  let text = raw.get(keys::CANDIDATES).unwrap_or_default();
  let lower = text.to_ascii_lowercase();
  if lower.contains("uncontested") || lower.contains("unopposed") {
    return false;
  }

  match distinct_candidates(text) {
    0 => true, // ambiguous
    1 => false,
    _ => true,
  }
}

/// Count distinct names in a candidate listing cell. Names are split on
/// common listing separators and compared case-insensitively with party
/// markers (`(R)`, `(D)`, …) removed.
fn distinct_candidates(text: &str) -> usize {
  let mut seen: Vec<String> = Vec::new();
  for part in text
    .replace(" vs. ", ";")
    .replace(" vs ", ";")
    .replace(" and ", ";")
    .replace('\n', ";")
    .replace(',', ";")
    .replace('/', ";")
    .split(';')
  {
    let name = strip_party_marker(part);
    if name.is_empty() {
      continue;
    }
    let folded = name.to_ascii_lowercase();
    if !seen.contains(&folded) {
      seen.push(folded);
    }
  }
  seen.len()
}

fn strip_party_marker(part: &str) -> String {
  let mut out = String::with_capacity(part.len());
  let mut depth = 0usize;
  for ch in part.chars() {
    match ch {
      '(' => depth += 1,
      ')' => depth = depth.saturating_sub(1),
      _ if depth == 0 => out.push(ch),
      _ => {}
    }
  }
  out.trim().to_string()
}

fn extract_incumbent(raw: &RawCandidate) -> Option<String> {
  let cell = raw.get(keys::INCUMBENT)?;
  let lower = cell.to_ascii_lowercase();
  if INCUMBENT_PLACEHOLDERS.contains(&lower.as_str()) {
    return None;
  }
  Some(cell.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn raw_va_senate() -> RawCandidate {
    RawCandidate::new()
      .set(keys::REGION, "VA")
      .set(keys::OFFICE, "State Senate")
      .set(keys::DISTRICT, "District 1")
      .set(keys::YEAR, "2025")
      .set(keys::CANDIDATES, "A. Smith (R), B. Jones (D)")
      .set(keys::INCUMBENT, "A. Smith")
      .set(keys::SOURCE_URL, "https://example.org/VA_2025")
  }

  #[test]
  fn normalizes_a_complete_row() {
    let record = normalize(&raw_va_senate()).unwrap();
    assert_eq!(record.region.as_str(), "VA");
    assert_eq!(record.office, Office::StateSenate);
    assert_eq!(record.district, "1");
    assert_eq!(record.period, Period::Year(2025));
    assert_eq!(record.location, "Virginia - State Senate District 1");
    assert!(record.contested);
    assert_eq!(record.incumbent.as_deref(), Some("A. Smith"));
    assert_eq!(record.partisan_lean, None);
  }

  #[test]
  fn missing_mandatory_fields_reject_with_names() {
    let raw = RawCandidate::new().set(keys::OFFICE, "State Senate");
    let rejection = normalize(&raw).unwrap_err();
    assert!(rejection.missing.contains(&keys::REGION));
    assert!(rejection.missing.contains(&keys::DISTRICT));
    assert!(rejection.missing.contains(&keys::DATE));
    assert!(!rejection.missing.contains(&keys::OFFICE));
  }

  #[test]
  fn full_date_beats_bare_year() {
    let raw = raw_va_senate().set(keys::DATE, "2025-11-04");
    let record = normalize(&raw).unwrap();
    assert_eq!(record.period.to_string(), "2025-11-04");
    assert!(record.period.is_day_precision());
  }

  #[test]
  fn explicit_uncontested_wording_wins() {
    let raw = raw_va_senate().set(keys::CANDIDATES, "A. Smith (unopposed)");
    assert!(!normalize(&raw).unwrap().contested);
  }

  #[test]
  fn single_candidate_is_uncontested() {
    let raw = raw_va_senate().set(keys::CANDIDATES, "A. Smith (R)");
    assert!(!normalize(&raw).unwrap().contested);
  }

  #[test]
  fn repeated_name_counts_once() {
    let raw = raw_va_senate().set(keys::CANDIDATES, "A. Smith, a. smith (R)");
    assert!(!normalize(&raw).unwrap().contested);
  }

  #[test]
  fn ambiguous_rows_default_to_contested() {
    let raw = raw_va_senate().set(keys::CANDIDATES, "");
    assert!(normalize(&raw).unwrap().contested);
  }

  #[test]
  fn placeholder_incumbents_normalize_to_none() {
    for cell in ["Vacant", "none", "N/A"] {
      let raw = raw_va_senate().set(keys::INCUMBENT, cell);
      assert_eq!(normalize(&raw).unwrap().incumbent, None);
    }
  }

  #[test]
  fn partisan_lean_is_carried_never_computed() {
    let raw = raw_va_senate().set(keys::PARTISAN_LEAN, "4.5");
    assert_eq!(normalize(&raw).unwrap().partisan_lean, Some(4.5));
  }
}
