//! Persisted game-world entity kinds.
//!
//! # Responsibility
//! - Declare the `Entity` capability every persisted record satisfies.
//! - Define the serializable shape of each kind.
//!
//! # Invariants
//! - Every entity serializes its identifier under the `id` key.
//! - `Entity::blank()` never leaves nested containers uninitialized, so a
//!   stored record missing a field still decodes.
//! - Each kind maps to exactly one collection/table name.

use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod character;
pub mod conversation;
pub mod dialog;
pub mod item;
pub mod npc;
pub mod party;
pub mod room;
pub mod script;
pub mod settings;
pub mod user;

pub use character::{Attribute, Character, CharacterTemplate, Inventory, StartingItem};
pub use conversation::{Conversation, TargetType};
pub use dialog::{Dialog, DialogOption};
pub use item::{Item, LootEntry, LootTable};
pub use npc::{Npc, NpcSpawner};
pub use party::Party;
pub use room::{Exit, Room, RoomAction};
pub use script::Script;
pub use settings::{ServerSettings, SERVER_SETTINGS_ID};
pub use user::{Role, User};

/// Capability shared by every persisted record.
///
/// Replaces runtime discovery of the ID field: adapters read and assign the
/// identifier through `id`/`set_id` and decode into `blank()` instances.
pub trait Entity: Default + Serialize + DeserializeOwned + 'static {
    /// Collection (document store) and table (relational store) name.
    const COLLECTION: &'static str;

    /// Blank decode target. Stored fields are overlaid onto it.
    fn blank() -> Self {
        Self::default()
    }

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    fn has_id(&self) -> bool {
        !self.id().is_empty()
    }
}

/// Every collection/table name known to the store.
pub const ENTITY_COLLECTIONS: &[&str] = &[
    User::COLLECTION,
    Character::COLLECTION,
    CharacterTemplate::COLLECTION,
    Room::COLLECTION,
    Item::COLLECTION,
    Script::COLLECTION,
    Npc::COLLECTION,
    NpcSpawner::COLLECTION,
    Dialog::COLLECTION,
    Conversation::COLLECTION,
    Party::COLLECTION,
    LootTable::COLLECTION,
    ServerSettings::COLLECTION,
];

/// Current time as Unix epoch milliseconds.
pub(crate) fn now_epoch_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
