//! Region — a validated two-letter jurisdiction code.
//!
//! Regions arrive from the command line and from scraped pages as either a
//! code (`"CA"`, `"ca"`) or a state name (`"California"`,
//! `"North_Carolina"`). All forms normalize to the uppercase code; the code
//! is what every persisted representation carries.

use std::{fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

/// Code/name pairs for the fifty states. Names use underscores, matching
/// the URL segments of the listing pages they are scraped from.
const STATES: &[(&str, &str)] = &[
  ("AL", "Alabama"),
  ("AK", "Alaska"),
  ("AZ", "Arizona"),
  ("AR", "Arkansas"),
  ("CA", "California"),
  ("CO", "Colorado"),
  ("CT", "Connecticut"),
  ("DE", "Delaware"),
  ("FL", "Florida"),
  ("GA", "Georgia"),
  ("HI", "Hawaii"),
  ("ID", "Idaho"),
  ("IL", "Illinois"),
  ("IN", "Indiana"),
  ("IA", "Iowa"),
  ("KS", "Kansas"),
  ("KY", "Kentucky"),
  ("LA", "Louisiana"),
  ("ME", "Maine"),
  ("MD", "Maryland"),
  ("MA", "Massachusetts"),
  ("MI", "Michigan"),
  ("MN", "Minnesota"),
  ("MS", "Mississippi"),
  ("MO", "Missouri"),
  ("MT", "Montana"),
  ("NE", "Nebraska"),
  ("NV", "Nevada"),
  ("NH", "New_Hampshire"),
  ("NJ", "New_Jersey"),
  ("NM", "New_Mexico"),
  ("NY", "New_York"),
  ("NC", "North_Carolina"),
  ("ND", "North_Dakota"),
  ("OH", "Ohio"),
  ("OK", "Oklahoma"),
  ("OR", "Oregon"),
  ("PA", "Pennsylvania"),
  ("RI", "Rhode_Island"),
  ("SC", "South_Carolina"),
  ("SD", "South_Dakota"),
  ("TN", "Tennessee"),
  ("TX", "Texas"),
  ("UT", "Utah"),
  ("VT", "Vermont"),
  ("VA", "Virginia"),
  ("WA", "Washington"),
  ("WV", "West_Virginia"),
  ("WI", "Wisconsin"),
  ("WY", "Wyoming"),
];

/// A two-letter jurisdiction code, always uppercase ASCII.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Region(String);

impl Region {
  /// Accepts a two-letter code in any case. Codes outside the state table
  /// are allowed (territories, test fixtures) as long as they are two
  /// ASCII letters.
  pub fn new(code: &str) -> Result<Self> {
    let code = code.trim();
    if code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) {
      Ok(Self(code.to_ascii_uppercase()))
    } else {
      Err(Error::InvalidRegion(code.to_string()))
    }
  }

  pub fn as_str(&self) -> &str { &self.0 }

  /// The underscored state name used in listing-page URLs, if this code is
  /// one of the fifty states.
  pub fn page_name(&self) -> Option<&'static str> {
    STATES
      .iter()
      .find(|(code, _)| *code == self.0)
      .map(|(_, name)| *name)
  }

  /// Every state code, in table order.
  pub fn all_states() -> Vec<Self> {
    STATES.iter().map(|(code, _)| Self(code.to_string())).collect()
  }

  /// Human-readable state name (`"North Carolina"`), falling back to the
  /// code itself for unknown jurisdictions.
  pub fn display_name(&self) -> String {
    match self.page_name() {
      Some(name) => name.replace('_', " "),
      None => self.0.clone(),
    }
  }
}

impl FromStr for Region {
  type Err = Error;

  /// Parses a code or a state name (`"California"`, `"North_Carolina"`,
  /// `"north carolina"`).
  fn from_str(s: &str) -> Result<Self> {
    let trimmed = s.trim();
    if trimmed.len() == 2 {
      return Self::new(trimmed);
    }
    let wanted = trimmed.replace(' ', "_").to_ascii_lowercase();
    STATES
      .iter()
      .find(|(_, name)| name.to_ascii_lowercase() == wanted)
      .map(|(code, _)| Self(code.to_string()))
      .ok_or_else(|| Error::InvalidRegion(trimmed.to_string()))
  }
}

impl fmt::Display for Region {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl Serialize for Region {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&self.0)
  }
}

impl<'de> Deserialize<'de> for Region {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(de::Error::custom)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn code_normalizes_to_uppercase() {
    assert_eq!(Region::new("ca").unwrap().as_str(), "CA");
    assert_eq!(Region::new(" tx ").unwrap().as_str(), "TX");
  }

  #[test]
  fn state_names_resolve_to_codes() {
    assert_eq!("California".parse::<Region>().unwrap().as_str(), "CA");
    assert_eq!("North_Carolina".parse::<Region>().unwrap().as_str(), "NC");
    assert_eq!("north carolina".parse::<Region>().unwrap().as_str(), "NC");
  }

  #[test]
  fn junk_is_rejected() {
    assert!(Region::new("C").is_err());
    assert!(Region::new("CAL").is_err());
    assert!("Atlantis".parse::<Region>().is_err());
  }

  #[test]
  fn display_name_unescapes_underscores() {
    let nc: Region = "NC".parse().unwrap();
    assert_eq!(nc.display_name(), "North Carolina");
    assert_eq!(nc.page_name(), Some("North_Carolina"));
  }
}
