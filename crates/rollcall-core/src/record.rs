//! Election record types — the fundamental unit of the Rollcall store.
//!
//! A record is addressed by its identity key (region, office, district,
//! period-year). The store holds at most one record per key; repeated
//! scrapes mutate the stored record in place through the merge engine.

use std::{cmp::Ordering, collections::BTreeMap, fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{region::Region, Error, Result};

// ─── Office ──────────────────────────────────────────────────────────────────

/// The office a race is for, canonicalized to a small controlled
/// vocabulary. Free-text offices that match none of the known categories
/// are carried verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Office {
  StateSenate,
  StateHouse,
  CountyCommissioner,
  Mayor,
  CityCouncil,
  SchoolBoard,
  Other(String),
}

impl Office {
  /// The canonical display label, also the persisted string form.
  pub fn label(&self) -> &str {
    match self {
      Self::StateSenate => "State Senate",
      Self::StateHouse => "State House",
      Self::CountyCommissioner => "County Commissioner",
      Self::Mayor => "Mayor",
      Self::CityCouncil => "City Council",
      Self::SchoolBoard => "School Board",
      Self::Other(s) => s,
    }
  }

  /// Map raw scraped office wording onto the controlled vocabulary.
  ///
  /// `"House of Representatives"`, `"State Assembly"` and similar all fold
  /// into [`Office::StateHouse`]; unrecognised wording is preserved as
  /// [`Office::Other`].
  pub fn canonicalize(raw: &str) -> Self {
    let lower = raw.trim().to_ascii_lowercase();
    if lower.contains("senate") {
      Self::StateSenate
    } else if lower.contains("house")
      || lower.contains("assembly")
      || lower.contains("representatives")
    {
      Self::StateHouse
    } else if lower.contains("county commission") {
      Self::CountyCommissioner
    } else if lower.contains("mayor") {
      Self::Mayor
    } else if lower.contains("council") {
      Self::CityCouncil
    } else if lower.contains("school") {
      Self::SchoolBoard
    } else {
      Self::Other(raw.trim().to_string())
    }
  }

  fn is_other(&self) -> bool { matches!(self, Self::Other(_)) }
}

impl FromStr for Office {
  type Err = std::convert::Infallible;

  /// Exact canonical labels map to their variant; anything else goes
  /// through [`Office::canonicalize`].
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let exact = match s.trim() {
      "State Senate" => Some(Self::StateSenate),
      "State House" => Some(Self::StateHouse),
      "County Commissioner" => Some(Self::CountyCommissioner),
      "Mayor" => Some(Self::Mayor),
      "City Council" => Some(Self::CityCouncil),
      "School Board" => Some(Self::SchoolBoard),
      _ => None,
    };
    Ok(exact.unwrap_or_else(|| Self::canonicalize(s)))
  }
}

impl fmt::Display for Office {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

// Ordered by label so query output sorts the way it prints. The `is_other`
// tie-break keeps Ord consistent with Eq if a free-text office ever
// collides with a canonical label.
impl Ord for Office {
  fn cmp(&self, other: &Self) -> Ordering {
    (self.label(), self.is_other()).cmp(&(other.label(), other.is_other()))
  }
}

impl PartialOrd for Office {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Serialize for Office {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(self.label())
  }
}

impl<'de> Deserialize<'de> for Office {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Ok(raw.parse().expect("Office::from_str is infallible"))
  }
}

// ─── Period ──────────────────────────────────────────────────────────────────

/// When the election happens. Sources usually publish a full calendar
/// date; when only the year is known the period carries year precision and
/// serializes as the bare ISO-8601 reduced-precision year (`"2026"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
  /// Full day precision.
  Day(NaiveDate),
  /// Year precision only.
  Year(i32),
}

impl Period {
  pub fn year(&self) -> i32 {
    match self {
      Self::Day(d) => {
        use chrono::Datelike;
        d.year()
      }
      Self::Year(y) => *y,
    }
  }

  /// Canonical approximate date for display and sorting. Year-precision
  /// periods resolve to November 5, the general-election convention the
  /// source material uses.
  pub fn approx_date(&self) -> NaiveDate {
    match self {
      Self::Day(d) => *d,
      Self::Year(y) => {
        NaiveDate::from_ymd_opt(*y, 11, 5).expect("Nov 5 exists in every year")
      }
    }
  }

  pub fn is_day_precision(&self) -> bool { matches!(self, Self::Day(_)) }
}

impl FromStr for Period {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let trimmed = s.trim();
    if trimmed.len() == 4 && trimmed.chars().all(|c| c.is_ascii_digit()) {
      let year = trimmed
        .parse::<i32>()
        .map_err(|_| Error::InvalidPeriod(trimmed.to_string()))?;
      return Ok(Self::Year(year));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
      .map(Self::Day)
      .map_err(|_| Error::InvalidPeriod(trimmed.to_string()))
  }
}

impl fmt::Display for Period {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Day(d) => write!(f, "{}", d.format("%Y-%m-%d")),
      Self::Year(y) => write!(f, "{y}"),
    }
  }
}

impl Serialize for Period {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&self.to_string())
  }
}

impl<'de> Deserialize<'de> for Period {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(de::Error::custom)
  }
}

// ─── Identity key ────────────────────────────────────────────────────────────

/// The (region, office, district, period-year) tuple that uniquely
/// addresses one stored record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
  pub region:   Region,
  pub office:   Office,
  pub district: String,
  pub year:     i32,
}

impl fmt::Display for IdentityKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{}/{}/{}/{}",
      self.region, self.office, self.district, self.year
    )
  }
}

impl Ord for IdentityKey {
  fn cmp(&self, other: &Self) -> Ordering {
    (&self.region, &self.office, &self.district, self.year).cmp(&(
      &other.region,
      &other.office,
      &other.district,
      other.year,
    ))
  }
}

impl PartialOrd for IdentityKey {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// Display label for a race, derived from its identity parts. First column
/// of the tabular file.
pub fn display_location(
  region: &Region,
  office: &Office,
  district: &str,
) -> String {
  if district.to_ascii_lowercase().contains("district") {
    format!("{} - {} {}", region.display_name(), office.label(), district)
  } else {
    format!(
      "{} - {} District {}",
      region.display_name(),
      office.label(),
      district
    )
  }
}

/// A normalized record that has not been merged yet. `last_updated` is
/// always assigned by the merge engine; it is not accepted from callers.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
  pub location:         String,
  pub region:           Region,
  pub office:           Office,
  pub district:         String,
  pub period:           Period,
  pub partisan_lean:    Option<f64>,
  pub contested:        bool,
  pub incumbent:        Option<String>,
  pub source_reference: String,
}

impl NewRecord {
  pub fn identity_key(&self) -> IdentityKey {
    IdentityKey {
      region:   self.region.clone(),
      office:   self.office.clone(),
      district: self.district.clone(),
      year:     self.period.year(),
    }
  }
}

/// A stored election record. Field order here is the column order of the
/// tabular file and the key order of the structured file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectionRecord {
  pub location:         String,
  pub region:           Region,
  pub office:           Office,
  pub district:         String,
  pub period:           Period,
  pub partisan_lean:    Option<f64>,
  pub contested:        bool,
  pub incumbent:        Option<String>,
  pub source_reference: String,
  /// Set by the merge engine at the moment of any insert or update.
  pub last_updated:     DateTime<Utc>,
}

impl ElectionRecord {
  pub fn identity_key(&self) -> IdentityKey {
    IdentityKey {
      region:   self.region.clone(),
      office:   self.office.clone(),
      district: self.district.clone(),
      year:     self.period.year(),
    }
  }

  /// Promote a normalized record into a stored one at insert time.
  pub fn from_new(new: NewRecord, now: DateTime<Utc>) -> Self {
    Self {
      location:         new.location,
      region:           new.region,
      office:           new.office,
      district:         new.district,
      period:           new.period,
      partisan_lean:    new.partisan_lean,
      contested:        new.contested,
      incumbent:        new.incumbent,
      source_reference: new.source_reference,
      last_updated:     now,
    }
  }
}

// ─── RecordSet ───────────────────────────────────────────────────────────────

/// The full dataset in memory: one record per identity key, iterated in
/// deterministic key order (region, office, district, year). Identity
/// uniqueness is structural — the map cannot hold two records for one key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
  records: BTreeMap<IdentityKey, ElectionRecord>,
}

impl RecordSet {
  pub fn new() -> Self { Self::default() }

  pub fn len(&self) -> usize { self.records.len() }

  pub fn is_empty(&self) -> bool { self.records.is_empty() }

  pub fn get(&self, key: &IdentityKey) -> Option<&ElectionRecord> {
    self.records.get(key)
  }

  pub fn get_mut(&mut self, key: &IdentityKey) -> Option<&mut ElectionRecord> {
    self.records.get_mut(key)
  }

  /// Insert under the record's own identity key, returning any displaced
  /// record.
  pub fn insert(&mut self, record: ElectionRecord) -> Option<ElectionRecord> {
    self.records.insert(record.identity_key(), record)
  }

  pub fn iter(&self) -> impl Iterator<Item = &ElectionRecord> {
    self.records.values()
  }

  /// Distinct region codes present, in order. Key order keeps a region's
  /// records contiguous, so one look-behind suffices.
  pub fn regions(&self) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for record in self.records.values() {
      let code = record.region.as_str();
      if out.last().map(String::as_str) != Some(code) {
        out.push(code.to_string());
      }
    }
    out
  }
}

impl FromIterator<ElectionRecord> for RecordSet {
  fn from_iter<I: IntoIterator<Item = ElectionRecord>>(iter: I) -> Self {
    let mut set = Self::new();
    for record in iter {
      set.insert(record);
    }
    set
  }
}

impl IntoIterator for RecordSet {
  type Item = ElectionRecord;
  type IntoIter = std::collections::btree_map::IntoValues<IdentityKey, ElectionRecord>;

  fn into_iter(self) -> Self::IntoIter { self.records.into_values() }
}
