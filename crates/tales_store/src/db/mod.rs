//! Storage engine bootstrap for both backends.
//!
//! # Responsibility
//! - Open and configure the SQLite connection used by the JSON-blob adapter.
//! - Connect to MongoDB and prepare collections for the document adapter.
//!
//! # Invariants
//! - Repositories never see a SQLite connection whose tables are missing.
//! - Engine failures surface as `DbError`, never as panics.

use thiserror::Error;

pub mod mongo;
mod open;
pub mod schema;

pub use mongo::{connect_mongo, ensure_id_indexes};
pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Transport or engine-level failure from either backend.
#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),
}
