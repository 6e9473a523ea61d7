//! Layered runtime configuration.
//!
//! Values come from `rollcall.toml` (or the path given with `--config`),
//! overridden by `ROLLCALL_*` environment variables, overridden in turn by
//! command-line flags where those exist.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

/// The default scrape set: larger states first, mirroring where most
/// listed races are.
const PRIORITY_REGIONS: &[&str] = &[
  "CA", "TX", "FL", "NY", "PA", "IL", "OH", "GA", "NC", "MI", "NJ", "VA",
  "WA", "AZ", "MA", "TN", "IN", "MO", "MD", "WI", "CO", "MN", "SC", "AL",
  "LA",
];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// Directory holding `elections.csv` and `elections.json`.
  pub data_dir:             PathBuf,
  pub base_url:             String,
  /// Politeness delay between listing-page requests.
  pub request_delay_ms:     u64,
  pub request_timeout_secs: u64,
  pub max_retries:          u32,
  /// Concurrent (region, year) fetches.
  pub fetch_concurrency:    usize,
  /// Horizon for a scrape with no explicit years: current year plus this
  /// many following years.
  pub years_ahead:          i32,
  /// Region codes scraped when none are given on the command line.
  pub priority_regions:     Vec<String>,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      data_dir:             PathBuf::from("data"),
      base_url:             "https://ballotpedia.org".to_string(),
      request_delay_ms:     2000,
      request_timeout_secs: 10,
      max_retries:          3,
      fetch_concurrency:    4,
      years_ahead:          6,
      priority_regions:     PRIORITY_REGIONS
        .iter()
        .map(|r| r.to_string())
        .collect(),
    }
  }
}

impl Settings {
  pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
    let file = match path {
      Some(p) => config::File::from(p.to_path_buf()).required(true),
      None => config::File::with_name("rollcall").required(false),
    };

    let settings = config::Config::builder()
      .add_source(file)
      .add_source(config::Environment::with_prefix("ROLLCALL"))
      .build()
      .context("failed to read configuration")?;

    settings
      .try_deserialize()
      .context("failed to deserialise Settings")
  }
}
