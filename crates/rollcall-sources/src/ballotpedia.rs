//! Ballotpedia-style listing scraper.
//!
//! Each (region, year) request maps to two state-legislative listing
//! pages — State Senate and House of Representatives — whose marked
//! tables carry one race per row. Network failures surface as
//! [`SourceItem::Fault`] markers; they never cross the adapter boundary
//! as errors.

use std::time::Duration;

use rollcall_core::{
  raw::{keys, RawCandidate},
  ElectionSource, FetchFault, Office, Region, SourceItem,
};
use tokio::sync::watch;

use crate::{html, throttle::Throttle, Error, Result};

const TABLE_MARKERS: &[&str] = &["wikitable", "bptable"];

const USER_AGENT: &str =
  "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Connection and politeness settings for [`BallotpediaSource`].
#[derive(Debug, Clone)]
pub struct BallotpediaConfig {
  pub base_url:        String,
  /// Minimum delay between successive page requests.
  pub request_delay:   Duration,
  pub request_timeout: Duration,
  /// Transient-failure retries per page, on top of the first attempt.
  pub max_retries:     u32,
}

impl Default for BallotpediaConfig {
  fn default() -> Self {
    Self {
      base_url:        "https://ballotpedia.org".to_string(),
      request_delay:   Duration::from_secs(2),
      request_timeout: Duration::from_secs(10),
      max_retries:     3,
    }
  }
}

/// Scraper for Ballotpedia state-legislative election listings.
pub struct BallotpediaSource {
  client:   reqwest::Client,
  config:   BallotpediaConfig,
  throttle: Throttle,
  shutdown: watch::Receiver<bool>,
}

impl BallotpediaSource {
  pub fn new(
    config: BallotpediaConfig,
    shutdown: watch::Receiver<bool>,
  ) -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(config.request_timeout)
      .user_agent(USER_AGENT)
      .build()?;
    let throttle = Throttle::new(config.request_delay);
    Ok(Self { client, config, throttle, shutdown })
  }

  /// The two listing URLs for a state, or `None` for jurisdictions
  /// without listing pages.
  fn listing_urls(
    &self,
    region: &Region,
    year: i32,
  ) -> Option<[(Office, String); 2]> {
    let page = region.page_name()?;
    let base = self.config.base_url.trim_end_matches('/');
    Some([
      (
        Office::StateSenate,
        format!("{base}/{page}_State_Senate_elections,_{year}"),
      ),
      (
        Office::StateHouse,
        format!("{base}/{page}_House_of_Representatives_elections,_{year}"),
      ),
    ])
  }

  /// One throttled GET with bounded retries on transient failures.
  async fn fetch_page(&self, url: &str) -> Result<String> {
    let mut shutdown = self.shutdown.clone();
    let mut last_err: Option<Error> = None;

    for attempt in 0..=self.config.max_retries {
      if !self.throttle.wait(&mut shutdown).await {
        return Err(Error::Cancelled);
      }
      if attempt > 0 {
        tracing::debug!(url, attempt, "retrying listing page");
      }

      match self.get_once(url).await {
        Ok(body) => return Ok(body),
        Err(e) => last_err = Some(e),
      }
    }

    Err(last_err.expect("at least one attempt was made"))
  }

  async fn get_once(&self, url: &str) -> Result<String> {
    let response = self.client.get(url).send().await?.error_for_status()?;
    Ok(response.text().await?)
  }
}

/// Turn one listing page into raw candidate bags.
///
/// Cell layout follows the listing convention: district first, incumbent
/// second, candidates third where present. Header rows and short rows are
/// skipped.
fn page_candidates(
  body: &str,
  url: &str,
  region: &Region,
  office: &Office,
  year: i32,
) -> Vec<RawCandidate> {
  let mut out = Vec::new();

  for table in html::tables_with_class(body, TABLE_MARKERS) {
    for row in html::rows(table).into_iter().skip(1) {
      let cells = html::cells(row);
      if cells.len() < 2 || cells[0].is_empty() {
        continue;
      }

      let candidates = cells
        .get(2)
        .cloned()
        .unwrap_or_else(|| html::strip_tags(row));

      out.push(
        RawCandidate::new()
          .set(keys::REGION, region.as_str())
          .set(keys::OFFICE, office.label())
          .set(keys::DISTRICT, cells[0].clone())
          .set(keys::YEAR, year.to_string())
          .set(keys::INCUMBENT, cells[1].clone())
          .set(keys::CANDIDATES, candidates)
          .set(keys::SOURCE_URL, url),
      );
    }
  }

  out
}

impl ElectionSource for BallotpediaSource {
  async fn fetch(&self, region: Region, year: i32) -> Vec<SourceItem> {
    let Some(urls) = self.listing_urls(&region, year) else {
      return vec![SourceItem::Fault(FetchFault {
        reason: Error::UnknownRegion(region.to_string()).to_string(),
        region,
        year,
      })];
    };

    let mut items = Vec::new();
    for (office, url) in urls {
      match self.fetch_page(&url).await {
        Ok(body) => {
          let candidates =
            page_candidates(&body, &url, &region, &office, year);
          tracing::info!(
            %region,
            year,
            office = %office,
            rows = candidates.len(),
            "fetched listing page"
          );
          items.extend(candidates.into_iter().map(SourceItem::Candidate));
        }
        Err(Error::Cancelled) => {
          tracing::info!(%region, year, "fetch cancelled; keeping partial results");
          break;
        }
        Err(e) => {
          tracing::warn!(%region, year, office = %office, error = %e, "listing page failed");
          items.push(SourceItem::Fault(FetchFault {
            region: region.clone(),
            year,
            reason: format!("{office}: {e}"),
          }));
        }
      }
    }
    items
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn source() -> (watch::Sender<bool>, BallotpediaSource) {
    let (tx, rx) = watch::channel(false);
    let source =
      BallotpediaSource::new(BallotpediaConfig::default(), rx).unwrap();
    (tx, source)
  }

  #[test]
  fn listing_urls_follow_the_page_naming_convention() {
    let (_tx, s) = source();
    let nc: Region = "NC".parse().unwrap();
    let [(_, senate), (_, house)] = s.listing_urls(&nc, 2026).unwrap();
    assert_eq!(
      senate,
      "https://ballotpedia.org/North_Carolina_State_Senate_elections,_2026"
    );
    assert_eq!(
      house,
      "https://ballotpedia.org/North_Carolina_House_of_Representatives_elections,_2026"
    );
  }

  #[test]
  fn unknown_regions_have_no_listing_urls() {
    let (_tx, s) = source();
    let gu: Region = "GU".parse().unwrap();
    assert!(s.listing_urls(&gu, 2026).is_none());
  }

  #[test]
  fn page_rows_become_raw_candidates() {
    let body = r#"
      <table class="wikitable">
        <tr><th>District</th><th>Incumbent</th><th>Candidates</th></tr>
        <tr>
          <td>District 4</td>
          <td>J. Roe</td>
          <td>J. Roe (D) vs. K. Poe (R)</td>
        </tr>
        <tr><td></td><td>skipped: empty district</td></tr>
      </table>"#;

    let va: Region = "VA".parse().unwrap();
    let raws = page_candidates(
      body,
      "https://example.org/page",
      &va,
      &Office::StateSenate,
      2025,
    );

    assert_eq!(raws.len(), 1);
    let raw = &raws[0];
    assert_eq!(raw.get(keys::REGION), Some("VA"));
    assert_eq!(raw.get(keys::OFFICE), Some("State Senate"));
    assert_eq!(raw.get(keys::DISTRICT), Some("District 4"));
    assert_eq!(raw.get(keys::YEAR), Some("2025"));
    assert_eq!(raw.get(keys::INCUMBENT), Some("J. Roe"));
    assert_eq!(raw.get(keys::CANDIDATES), Some("J. Roe (D) vs. K. Poe (R)"));
    assert_eq!(raw.get(keys::SOURCE_URL), Some("https://example.org/page"));
  }
}
