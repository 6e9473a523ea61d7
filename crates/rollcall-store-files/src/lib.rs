//! [`FileStore`] — the dual-file implementation of
//! [`ElectionStore`](rollcall_core::ElectionStore).
//!
//! The full record set is persisted twice: a tabular file
//! (`elections.csv`) and a structured file (`elections.json`). Both are
//! replaced atomically on every save and cross-checked on every load, so
//! they always round-trip to the same logical record set or the store
//! refuses to proceed.

mod csv;
mod encode;
pub mod error;
mod store;

#[cfg(test)]
mod tests;

pub use error::{Error, Result};
pub use store::FileStore;
