//! Handlers for the election endpoints.
//!
//! Query params map directly onto
//! [`QueryRequest`](rollcall_core::QueryRequest) fields.

use std::sync::Arc;

use axum::{
  extract::{Query, State},
  Json,
};
use rollcall_core::{
  query, ElectionRecord, ElectionStore, QueryRequest, QueryStats,
};

use crate::error::ApiError;

/// `GET /elections[?region=..][&office=..][&contested=..]`
/// `[&min_lean=..][&max_lean=..][&lean_unknown=..]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(request): Query<QueryRequest>,
) -> Result<Json<Vec<ElectionRecord>>, ApiError>
where
  S: ElectionStore,
{
  let records = store
    .load()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let (matches, _) = query(&records, &request)
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
  Ok(Json(matches))
}

/// `GET /stats` — whole-store summary statistics.
pub async fn stats<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<QueryStats>, ApiError>
where
  S: ElectionStore,
{
  let records = store
    .load()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let (_, stats) = query(&records, &QueryRequest::default())
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
  Ok(Json(stats))
}

/// `GET /regions` — distinct region codes present in the store.
pub async fn regions<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<String>>, ApiError>
where
  S: ElectionStore,
{
  let records = store
    .load()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(records.regions()))
}
