//! The `ElectionSource` capability trait.
//!
//! Each concrete scraper (Ballotpedia today, others later) implements this
//! one method; the pipeline depends only on the trait. Network failures
//! never cross the boundary as errors — they come back as
//! [`SourceItem::Fault`](crate::raw::SourceItem) markers so a run can
//! continue with its remaining (region, year) pairs.

use std::future::Future;

use crate::{raw::SourceItem, region::Region};

/// Abstraction over a scrapeable election listing source.
///
/// `fetch` returns the full batch of items for one (region, year)
/// request. Run-level laziness comes from the pipeline fetching pairs on
/// demand through its bounded pool.
pub trait ElectionSource: Send + Sync {
  fn fetch(
    &self,
    region: Region,
    year: i32,
  ) -> impl Future<Output = Vec<SourceItem>> + Send + '_;
}
