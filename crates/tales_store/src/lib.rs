//! Entity persistence for the Tales MUD server.
//! One repository contract over two storage engines: SQLite and MongoDB.

pub mod config;
pub mod db;
pub mod factory;
pub mod identity;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;

pub use config::{ConfigError, StoreBackend, StoreConfig};
pub use factory::RepositoryFactory;
pub use identity::new_identity;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::{Entity, ENTITY_COLLECTIONS};
pub use query::{QueryParam, QueryParams, QueryValue};
pub use repo::{
    collect_matching, Collector, EntityStore, ItemsQuery, RepoError, RepoResult, Repository,
    RoomsQuery,
};

/// Returns the store crate version.
pub fn store_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
