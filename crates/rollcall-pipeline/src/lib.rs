//! Run orchestration: fetch concurrently, merge sequentially, save once.
//!
//! One [`Pipeline::ingest`] call is one logical run. Fetches for
//! independent (region, year) pairs execute concurrently up to a bounded
//! pool, but every result funnels through the merge engine in
//! deterministic pair order, and the whole load→merge→save cycle holds a
//! single lock — the store is never written concurrently.

use std::sync::Arc;

use rollcall_core::{
  merge::merge, normalize::normalize, ElectionSource, ElectionStore,
  IngestRequest, Region, RunSummary, SourceItem,
};
use thiserror::Error;
use tokio::{
  sync::{watch, Mutex, Semaphore},
  task::JoinSet,
};

#[derive(Debug, Error)]
pub enum Error {
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Knobs for one ingest run.
#[derive(Debug, Clone)]
pub struct RunOptions {
  /// Maximum concurrent (region, year) fetches.
  pub concurrency: usize,
  /// Run-level shutdown signal. Raising it stops further fetches and
  /// aborts politeness waits; already-fetched data is still merged and
  /// saved.
  pub shutdown:    watch::Receiver<bool>,
}

/// Owns a source and a store for the duration of the process and runs
/// ingest cycles against them.
pub struct Pipeline<Src, St> {
  source:   Arc<Src>,
  store:    Arc<St>,
  run_lock: Mutex<()>,
}

impl<Src, St> Pipeline<Src, St>
where
  Src: ElectionSource + 'static,
  St: ElectionStore,
{
  pub fn new(source: Arc<Src>, store: Arc<St>) -> Self {
    Self { source, store, run_lock: Mutex::new(()) }
  }

  /// Execute one full scrape-merge-save run and report what happened.
  ///
  /// Runs are serialized: a second `ingest` issued while one is in flight
  /// waits for the first to finish its save.
  pub async fn ingest(
    &self,
    request: IngestRequest,
    options: RunOptions,
  ) -> Result<RunSummary> {
    let _cycle = self.run_lock.lock().await;

    let pairs: Vec<(Region, i32)> = request
      .regions
      .iter()
      .flat_map(|region| {
        request.years.iter().map(move |year| (region.clone(), *year))
      })
      .collect();

    tracing::info!(
      regions = request.regions.len(),
      years = request.years.len(),
      pairs = pairs.len(),
      "starting ingest run"
    );

    let per_pair = self.fetch_all(&pairs, &options).await;

    // Normalize and tally in deterministic pair order, never completion
    // order, so same-key collisions resolve the same way on every run.
    let mut summary = RunSummary::default();
    let mut incoming = Vec::new();

    for ((region, year), items) in pairs.iter().zip(per_pair) {
      for item in items {
        match item {
          SourceItem::Candidate(raw) => {
            summary.fetched += 1;
            match normalize(&raw) {
              Ok(record) => incoming.push(record),
              Err(rejection) => {
                summary.rejected += 1;
                tracing::debug!(%region, year, %rejection, "rejected raw candidate");
              }
            }
          }
          SourceItem::Fault(fault) => {
            summary.faults.push(fault);
          }
        }
      }
    }

    summary.cancelled = *options.shutdown.borrow();

    let mut set = self.store.load().await.map_err(box_store_err)?;
    let stats = merge(&mut set, incoming);
    self.store.save(&set).await.map_err(box_store_err)?;

    summary.inserted = stats.inserted;
    summary.updated = stats.updated;
    summary.unchanged = stats.unchanged;

    tracing::info!(
      fetched = summary.fetched,
      rejected = summary.rejected,
      inserted = summary.inserted,
      updated = summary.updated,
      unchanged = summary.unchanged,
      faults = summary.faults.len(),
      cancelled = summary.cancelled,
      "ingest run finished"
    );
    Ok(summary)
  }

  /// Fetch every pair through a bounded pool, results indexed by pair.
  async fn fetch_all(
    &self,
    pairs: &[(Region, i32)],
    options: &RunOptions,
  ) -> Vec<Vec<SourceItem>> {
    let semaphore = Arc::new(Semaphore::new(options.concurrency.max(1)));
    let mut tasks: JoinSet<(usize, Vec<SourceItem>)> = JoinSet::new();

    for (index, (region, year)) in pairs.iter().enumerate() {
      let source = Arc::clone(&self.source);
      let semaphore = Arc::clone(&semaphore);
      let shutdown = options.shutdown.clone();
      let region = region.clone();
      let year = *year;

      tasks.spawn(async move {
        let _permit =
          semaphore.acquire_owned().await.expect("semaphore never closed");
        if *shutdown.borrow() {
          return (index, Vec::new());
        }
        (index, source.fetch(region, year).await)
      });
    }

    let mut per_pair: Vec<Vec<SourceItem>> = vec![Vec::new(); pairs.len()];
    while let Some(joined) = tasks.join_next().await {
      match joined {
        Ok((index, items)) => per_pair[index] = items,
        Err(e) => tracing::error!(error = %e, "fetch task panicked"),
      }
    }
    per_pair
  }
}

fn box_store_err<E: std::error::Error + Send + Sync + 'static>(e: E) -> Error {
  Error::Store(Box::new(e))
}

#[cfg(test)]
mod tests;
