//! Core types and trait definitions for the Rollcall election tracker.
//!
//! This crate is deliberately free of HTTP and filesystem dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod ingest;
pub mod merge;
pub mod normalize;
pub mod query;
pub mod raw;
pub mod record;
pub mod region;
pub mod source;
pub mod store;

pub use error::{Error, Result};
pub use ingest::{IngestRequest, RunSummary};
pub use merge::{merge, MergeStats};
pub use normalize::{normalize, Rejection};
pub use query::{query, QueryRequest, QueryStats};
pub use raw::{FetchFault, RawCandidate, SourceItem};
pub use record::{
  ElectionRecord, IdentityKey, NewRecord, Office, Period, RecordSet,
};
pub use region::Region;
pub use source::ElectionSource;
pub use store::ElectionStore;
