//! The `ElectionStore` trait.
//!
//! Implemented by storage backends (e.g. `rollcall-store-files`). Higher
//! layers (`rollcall-pipeline`, `rollcall-api`, the CLI) depend on this
//! abstraction, not on any concrete backend.
//!
//! Both operations move the complete dataset; there are no partial writes.
//! Callers that run a full load→merge→save cycle must serialize those
//! cycles themselves — the store is not designed for concurrent writers.

use std::future::Future;

use crate::record::RecordSet;

/// Abstraction over a Rollcall dataset backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ElectionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Load the full record set. Reads observe either the state before or
  /// after any concurrent `save`, never a partial write.
  fn load(
    &self,
  ) -> impl Future<Output = Result<RecordSet, Self::Error>> + Send + '_;

  /// Persist the full record set, atomically across every representation
  /// the backend maintains.
  fn save<'a>(
    &'a self,
    records: &'a RecordSet,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
