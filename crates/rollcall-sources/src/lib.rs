//! Concrete [`ElectionSource`](rollcall_core::ElectionSource)
//! implementations.
//!
//! One source exists today: a Ballotpedia-style state-legislative listing
//! scraper. The pipeline only sees the trait, so further sources slot in
//! beside it.

pub mod ballotpedia;
pub mod error;
mod html;
pub mod throttle;

pub use ballotpedia::{BallotpediaConfig, BallotpediaSource};
pub use error::{Error, Result};
pub use throttle::Throttle;
