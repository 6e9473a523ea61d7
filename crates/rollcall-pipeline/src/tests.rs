//! Pipeline tests against a scripted source and an in-memory store.

use std::{
  collections::HashMap,
  convert::Infallible,
  sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
  },
};

use rollcall_core::{
  raw::{keys, RawCandidate},
  ElectionSource, ElectionStore, FetchFault, IngestRequest, RecordSet, Region,
  SourceItem,
};
use tokio::sync::watch;

use crate::{Pipeline, RunOptions};

/// Yields scripted items per (region, year); unknown pairs yield nothing.
#[derive(Default)]
struct StubSource {
  responses: HashMap<(String, i32), Vec<SourceItem>>,
  fetches:   AtomicUsize,
}

impl StubSource {
  fn with(
    mut self,
    region: &str,
    year: i32,
    items: Vec<SourceItem>,
  ) -> Self {
    self.responses.insert((region.to_string(), year), items);
    self
  }
}

impl ElectionSource for StubSource {
  async fn fetch(&self, region: Region, year: i32) -> Vec<SourceItem> {
    self.fetches.fetch_add(1, Ordering::SeqCst);
    self
      .responses
      .get(&(region.as_str().to_string(), year))
      .cloned()
      .unwrap_or_default()
  }
}

#[derive(Default)]
struct MemStore {
  records: Mutex<RecordSet>,
}

impl ElectionStore for MemStore {
  type Error = Infallible;

  async fn load(&self) -> Result<RecordSet, Infallible> {
    Ok(self.records.lock().unwrap().clone())
  }

  async fn save(&self, records: &RecordSet) -> Result<(), Infallible> {
    *self.records.lock().unwrap() = records.clone();
    Ok(())
  }
}

fn candidate(region: &str, district: &str, year: i32) -> SourceItem {
  SourceItem::Candidate(
    RawCandidate::new()
      .set(keys::REGION, region)
      .set(keys::OFFICE, "State Senate")
      .set(keys::DISTRICT, district)
      .set(keys::YEAR, year.to_string())
      .set(keys::CANDIDATES, "A. Smith (R), B. Jones (D)")
      .set(keys::SOURCE_URL, "https://example.org"),
  )
}

fn fault(region: &str, year: i32) -> SourceItem {
  SourceItem::Fault(FetchFault {
    region: region.parse().unwrap(),
    year,
    reason: "connect timeout".to_string(),
  })
}

fn options() -> (watch::Sender<bool>, RunOptions) {
  let (tx, rx) = watch::channel(false);
  (tx, RunOptions { concurrency: 4, shutdown: rx })
}

fn request(regions: &[&str], years: &[i32]) -> IngestRequest {
  IngestRequest {
    regions: regions.iter().map(|r| r.parse().unwrap()).collect(),
    years:   years.to_vec(),
  }
}

#[tokio::test]
async fn a_fault_in_one_pair_does_not_block_another() {
  let source = Arc::new(
    StubSource::default()
      .with("OH", 2026, vec![fault("OH", 2026)])
      .with("CA", 2025, vec![candidate("CA", "12", 2025)]),
  );
  let store = Arc::new(MemStore::default());
  let pipeline = Pipeline::new(source, Arc::clone(&store));

  let (_tx, opts) = options();
  let summary = pipeline
    .ingest(request(&["CA", "OH"], &[2025, 2026]), opts)
    .await
    .unwrap();

  assert_eq!(summary.fetched, 1);
  assert_eq!(summary.inserted, 1);
  assert_eq!(summary.faults.len(), 1);
  assert_eq!(summary.faults[0].region.as_str(), "OH");
  assert_eq!(summary.faults[0].year, 2026);
  assert!(!summary.cancelled);

  let saved = store.load().await.unwrap();
  assert_eq!(saved.len(), 1);
  assert_eq!(saved.iter().next().unwrap().region.as_str(), "CA");
}

#[tokio::test]
async fn rescraping_an_unchanged_source_is_idempotent() {
  let source = Arc::new(
    StubSource::default().with("CA", 2025, vec![candidate("CA", "12", 2025)]),
  );
  let store = Arc::new(MemStore::default());
  let pipeline = Pipeline::new(source, store);

  let (_tx, opts) = options();
  let first = pipeline
    .ingest(request(&["CA"], &[2025]), opts.clone())
    .await
    .unwrap();
  assert_eq!(first.inserted, 1);

  let second =
    pipeline.ingest(request(&["CA"], &[2025]), opts).await.unwrap();
  assert_eq!(second.inserted, 0);
  assert_eq!(second.updated, 0);
  assert_eq!(second.unchanged, 1);
}

#[tokio::test]
async fn rejections_are_counted_not_dropped_silently() {
  let no_district = SourceItem::Candidate(
    RawCandidate::new()
      .set(keys::REGION, "CA")
      .set(keys::OFFICE, "State Senate")
      .set(keys::YEAR, "2025"),
  );
  let source = Arc::new(StubSource::default().with(
    "CA",
    2025,
    vec![no_district, candidate("CA", "12", 2025)],
  ));
  let pipeline = Pipeline::new(source, Arc::new(MemStore::default()));

  let (_tx, opts) = options();
  let summary =
    pipeline.ingest(request(&["CA"], &[2025]), opts).await.unwrap();

  assert_eq!(summary.fetched, 2);
  assert_eq!(summary.rejected, 1);
  assert_eq!(summary.inserted, 1);
}

#[tokio::test]
async fn shutdown_before_the_run_skips_fetches_but_still_saves() {
  let source = Arc::new(
    StubSource::default().with("CA", 2025, vec![candidate("CA", "12", 2025)]),
  );
  let fetches = Arc::clone(&source);
  let store = Arc::new(MemStore::default());
  let pipeline = Pipeline::new(source, Arc::clone(&store));

  let (tx, opts) = options();
  tx.send(true).unwrap();

  let summary =
    pipeline.ingest(request(&["CA"], &[2025]), opts).await.unwrap();

  assert!(summary.cancelled);
  assert_eq!(summary.fetched, 0);
  assert_eq!(fetches.fetches.load(Ordering::SeqCst), 0);
  // The (empty) merge result is still committed to the store.
  assert!(store.load().await.unwrap().is_empty());
}
