//! Read-only JSON API for Rollcall.
//!
//! Exposes an axum [`Router`] backed by any
//! [`rollcall_core::ElectionStore`]. Queries run against a fresh load of
//! the store, so a request observes either the pre- or post-save state of
//! a concurrent ingest, never a partial write. Auth, TLS, and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", rollcall_api::api_router(store.clone()))
//! ```

pub mod elections;
pub mod error;

use std::sync::Arc;

use axum::{routing::get, Router};
use rollcall_core::ElectionStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ElectionStore + 'static,
{
  Router::new()
    .route("/elections", get(elections::list::<S>))
    .route("/stats", get(elections::stats::<S>))
    .route("/regions", get(elections::regions::<S>))
    .with_state(store)
}
