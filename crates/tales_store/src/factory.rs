//! Repository factory: the composition root of the store.
//!
//! # Responsibility
//! - Select one backend at construction and own its connection.
//! - Hand out typed repositories that borrow that connection.
//!
//! # Invariants
//! - Repositories borrow the factory, so none can outlive `close()`.
//! - The backend never changes after construction.

use crate::config::{StoreBackend, StoreConfig, IN_MEMORY_PATH};
use crate::db::{connect_mongo, ensure_id_indexes, open_db, open_db_in_memory, DbError};
use crate::model::{
    Character, CharacterTemplate, Conversation, Dialog, Entity, Item, LootTable, Npc, NpcSpawner,
    Party, Room, Script, ServerSettings, User, ENTITY_COLLECTIONS,
};
use crate::repo::{
    CharacterTemplatesRepository, CharactersRepository, ConversationsRepository,
    DialogsRepository, DocumentRepo, ItemsRepository, LootTablesRepository,
    NpcSpawnersRepository, NpcsRepository, PartiesRepository, RepoResult, Repository,
    RoomsRepository, ScriptsRepository, ServerSettingsRepository, SqliteRepo, UsersRepository,
};
use log::info;
use mongodb::sync::{Client, Database};
use rusqlite::Connection;
use std::path::Path;

enum Backend {
    Relational(Connection),
    Document { client: Client, database: Database },
}

/// Owns the storage connection and builds per-kind repositories.
pub struct RepositoryFactory {
    backend: Backend,
}

impl RepositoryFactory {
    /// Opens the backend described by `config`.
    pub fn open(config: &StoreConfig) -> RepoResult<Self> {
        match &config.backend {
            StoreBackend::Sqlite { path } if path == IN_MEMORY_PATH => Self::in_memory(),
            StoreBackend::Sqlite { path } => Self::sqlite(path),
            StoreBackend::MongoDb { uri, database } => Self::mongodb(uri, database),
        }
    }

    pub fn sqlite(path: impl AsRef<Path>) -> RepoResult<Self> {
        Ok(Self {
            backend: Backend::Relational(open_db(path)?),
        })
    }

    pub fn in_memory() -> RepoResult<Self> {
        Ok(Self {
            backend: Backend::Relational(open_db_in_memory()?),
        })
    }

    /// Connects to MongoDB and makes sure every collection has its `id` index.
    pub fn mongodb(uri: &str, database: &str) -> RepoResult<Self> {
        let (client, database) = connect_mongo(uri, database)?;
        ensure_id_indexes(&database, ENTITY_COLLECTIONS);
        Ok(Self {
            backend: Backend::Document { client, database },
        })
    }

    pub fn backend_name(&self) -> &'static str {
        match self.backend {
            Backend::Relational(_) => "sqlite",
            Backend::Document { .. } => "mongodb",
        }
    }

    /// Repository for any entity kind on the selected backend.
    pub fn repository<T: Entity>(&self) -> Repository<'_, T> {
        match &self.backend {
            Backend::Relational(conn) => Repository::new(Box::new(SqliteRepo::<T>::new(conn))),
            Backend::Document { database, .. } => {
                Repository::new(Box::new(DocumentRepo::<T>::new(database)))
            }
        }
    }

    pub fn users(&self) -> UsersRepository<'_> {
        self.repository()
    }

    pub fn characters(&self) -> CharactersRepository<'_> {
        self.repository()
    }

    pub fn character_templates(&self) -> CharacterTemplatesRepository<'_> {
        self.repository()
    }

    pub fn rooms(&self) -> RoomsRepository<'_> {
        self.repository()
    }

    pub fn items(&self) -> ItemsRepository<'_> {
        self.repository()
    }

    pub fn scripts(&self) -> ScriptsRepository<'_> {
        self.repository()
    }

    pub fn npcs(&self) -> NpcsRepository<'_> {
        self.repository()
    }

    pub fn npc_spawners(&self) -> NpcSpawnersRepository<'_> {
        self.repository()
    }

    pub fn dialogs(&self) -> DialogsRepository<'_> {
        self.repository()
    }

    pub fn conversations(&self) -> ConversationsRepository<'_> {
        self.repository()
    }

    pub fn parties(&self) -> PartiesRepository<'_> {
        self.repository()
    }

    pub fn loot_tables(&self) -> LootTablesRepository<'_> {
        self.repository()
    }

    pub fn server_settings(&self) -> ServerSettingsRepository<'_> {
        self.repository()
    }

    /// Record count of every collection, in declaration order.
    pub fn collection_counts(&self) -> RepoResult<Vec<(&'static str, u64)>> {
        Ok(vec![
            (User::COLLECTION, self.users().count()?),
            (Character::COLLECTION, self.characters().count()?),
            (CharacterTemplate::COLLECTION, self.character_templates().count()?),
            (Room::COLLECTION, self.rooms().count()?),
            (Item::COLLECTION, self.items().count()?),
            (Script::COLLECTION, self.scripts().count()?),
            (Npc::COLLECTION, self.npcs().count()?),
            (NpcSpawner::COLLECTION, self.npc_spawners().count()?),
            (Dialog::COLLECTION, self.dialogs().count()?),
            (Conversation::COLLECTION, self.conversations().count()?),
            (Party::COLLECTION, self.parties().count()?),
            (LootTable::COLLECTION, self.loot_tables().count()?),
            (ServerSettings::COLLECTION, self.server_settings().count()?),
        ])
    }

    /// Releases the underlying connection.
    pub fn close(self) -> RepoResult<()> {
        let backend = self.backend_name();
        match self.backend {
            Backend::Relational(conn) => conn.close().map_err(|(_, err)| DbError::from(err))?,
            Backend::Document { client, database } => {
                drop(database);
                drop(client);
            }
        }
        info!("event=store_close module=factory status=ok backend={}", backend);
        Ok(())
    }
}
