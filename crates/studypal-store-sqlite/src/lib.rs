//! SQLite backend for the StudyPal persistence gateway.
//!
//! A single table maps each [`studypal_core::gateway::StoreKey`] to its
//! encoded bytes. Multi-key saves run inside one transaction, so the
//! engine's paired writes (a flashcard and its document's count, a cascade
//! delete) land together or not at all.

mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteGateway;
