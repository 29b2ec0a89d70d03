//! Repository layer: one generic contract, two storage adapters.
//!
//! # Responsibility
//! - Define the `EntityStore` contract every backend implements.
//! - Provide the relational (SQLite JSON-blob) and document (MongoDB) adapters.
//! - Expose typed per-kind repositories on top of the contract.
//!
//! # Invariants
//! - Both adapters return the same `RepoError` variants for the same situation.
//! - IDs are immutable after insert; updates never move a record to another ID
//!   unless the caller goes through `update_by_field` with a new entity ID.
//! - A zero-match scan is success; only single-record lookups report `NotFound`.

use crate::db::DbError;
use crate::model::Entity;
use crate::query::{QueryParams, QueryValue};
use std::ops::ControlFlow;
use thiserror::Error;

pub mod document;
pub mod relational;
mod repository;

pub use document::DocumentRepo;
pub use relational::SqliteRepo;
pub use repository::{
    CharacterTemplatesRepository, CharactersRepository, ConversationsRepository,
    DialogsRepository, ItemsQuery, ItemsRepository, LootTablesRepository, NpcSpawnersRepository,
    NpcsRepository, PartiesRepository, Repository, RoomsQuery, RoomsRepository,
    ScriptsRepository, ServerSettingsRepository, UsersRepository,
};

pub type RepoResult<T> = Result<T, RepoError>;

/// Callback receiving scanned entities one at a time.
///
/// Returning `ControlFlow::Break(())` stops the scan without error.
pub type Collector<'c, T> = &'c mut dyn FnMut(T) -> ControlFlow<()>;

/// Failure taxonomy shared by every backend.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{collection}: no record with {key} = {value}")]
    NotFound {
        collection: &'static str,
        key: String,
        value: String,
    },
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
    #[error("{collection}: stored record could not be decoded: {message}")]
    DecodeFailure {
        collection: &'static str,
        message: String,
    },
    #[error("{collection}: entity carries no identifier")]
    IdentifierExtractionFailure { collection: &'static str },
    #[error("{collection}: identifier `{id}` already exists")]
    DuplicateId { collection: &'static str, id: String },
    #[error("{collection}: entity could not be encoded: {message}")]
    EncodeFailure {
        collection: &'static str,
        message: String,
    },
    #[error("storage connection failure: {0}")]
    Connection(#[from] DbError),
}

impl RepoError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub(crate) fn not_found(
        collection: &'static str,
        key: &str,
        value: impl std::fmt::Display,
    ) -> Self {
        Self::NotFound {
            collection,
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    pub(crate) fn decode(collection: &'static str, err: impl std::fmt::Display) -> Self {
        Self::DecodeFailure {
            collection,
            message: err.to_string(),
        }
    }

    pub(crate) fn encode(collection: &'static str, err: impl std::fmt::Display) -> Self {
        Self::EncodeFailure {
            collection,
            message: err.to_string(),
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Connection(DbError::Sqlite(value))
    }
}

impl From<mongodb::error::Error> for RepoError {
    fn from(value: mongodb::error::Error) -> Self {
        Self::Connection(DbError::Mongo(value))
    }
}

/// Storage contract for one entity kind.
///
/// Implemented once per backend; per-kind repositories only ever talk to a
/// `dyn EntityStore<T>`.
pub trait EntityStore<T: Entity> {
    /// Returns the entity stored under `id`.
    fn find_by_id(&self, id: &str) -> RepoResult<T>;

    /// Returns the first entity whose `key` equals `value`.
    ///
    /// Which record wins when several match is unspecified.
    fn find_by_field(&self, key: &str, value: &QueryValue) -> RepoResult<T>;

    /// Hands every entity matching all `params` to `collect`.
    ///
    /// # Errors
    /// - `DecodeFailure` aborts the scan; entities already handed out stay
    ///   delivered.
    fn find_all_with_param(&self, params: &QueryParams, collect: Collector<'_, T>)
        -> RepoResult<()>;

    fn find_all(&self, collect: Collector<'_, T>) -> RepoResult<()> {
        self.find_all_with_param(&QueryParams::new(), collect)
    }

    /// Inserts `entity`, assigning a fresh ID when it has none.
    fn store(&self, entity: T) -> RepoResult<T>;

    /// Inserts `entity` keeping its caller-supplied ID.
    fn import(&self, entity: T) -> RepoResult<T> {
        if !entity.has_id() {
            return Err(RepoError::InvalidIdentifier(format!(
                "{}: import requires a non-empty id",
                T::COLLECTION
            )));
        }
        self.store(entity)
    }

    /// Replaces the record stored under `id`. The stored ID stays `id`.
    fn update(&self, entity: &T, id: &str) -> RepoResult<()>;

    /// Replaces the first record whose `key` equals `value`; the record then
    /// lives under `entity`'s ID.
    fn update_by_field(&self, entity: &T, key: &str, value: &QueryValue) -> RepoResult<()>;

    /// Removes the record stored under `id`. Missing records are not an error.
    fn delete(&self, id: &str) -> RepoResult<()>;

    /// Removes every record; the collection stays usable.
    fn drop_collection(&self) -> RepoResult<()>;

    fn count(&self) -> RepoResult<u64>;
}

/// Rejects an empty identifier before any storage round trip.
pub(crate) fn require_id(collection: &'static str, id: &str) -> RepoResult<()> {
    if id.trim().is_empty() {
        return Err(RepoError::InvalidIdentifier(format!(
            "{collection}: id must not be empty"
        )));
    }
    Ok(())
}

/// Runs a scan and gathers every delivered entity.
pub fn collect_matching<T: Entity>(
    store: &dyn EntityStore<T>,
    params: &QueryParams,
) -> RepoResult<Vec<T>> {
    let mut found = Vec::new();
    store.find_all_with_param(params, &mut |entity| {
        found.push(entity);
        ControlFlow::Continue(())
    })?;
    Ok(found)
}
