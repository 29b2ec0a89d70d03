//! Typed per-kind repositories.
//!
//! A `Repository<T>` wraps whichever `EntityStore<T>` the factory selected and
//! adds argument checks plus the lookups each entity kind needs.

use super::{collect_matching, require_id, Collector, EntityStore, RepoError, RepoResult};
use crate::model::{
    Character, CharacterTemplate, Conversation, Dialog, Entity, Item, LootTable, Npc, NpcSpawner,
    Party, Room, Script, ServerSettings, User, SERVER_SETTINGS_ID,
};
use crate::query::{QueryParams, QueryValue};
use log::{debug, info};

/// Typed facade over one backend collection.
pub struct Repository<'a, T: Entity> {
    store: Box<dyn EntityStore<T> + 'a>,
}

pub type UsersRepository<'a> = Repository<'a, User>;
pub type CharactersRepository<'a> = Repository<'a, Character>;
pub type CharacterTemplatesRepository<'a> = Repository<'a, CharacterTemplate>;
pub type RoomsRepository<'a> = Repository<'a, Room>;
pub type ItemsRepository<'a> = Repository<'a, Item>;
pub type ScriptsRepository<'a> = Repository<'a, Script>;
pub type NpcsRepository<'a> = Repository<'a, Npc>;
pub type NpcSpawnersRepository<'a> = Repository<'a, NpcSpawner>;
pub type DialogsRepository<'a> = Repository<'a, Dialog>;
pub type ConversationsRepository<'a> = Repository<'a, Conversation>;
pub type PartiesRepository<'a> = Repository<'a, Party>;
pub type LootTablesRepository<'a> = Repository<'a, LootTable>;
pub type ServerSettingsRepository<'a> = Repository<'a, ServerSettings>;

impl<'a, T: Entity> Repository<'a, T> {
    pub fn new(store: Box<dyn EntityStore<T> + 'a>) -> Self {
        Self { store }
    }

    pub fn find_by_id(&self, id: &str) -> RepoResult<T> {
        require_id(T::COLLECTION, id)?;
        self.store.find_by_id(id)
    }

    pub fn find_all(&self) -> RepoResult<Vec<T>> {
        collect_matching(&*self.store, &QueryParams::new())
    }

    /// Collects every entity matching all `params`.
    pub fn find_all_matching(&self, params: &QueryParams) -> RepoResult<Vec<T>> {
        collect_matching(&*self.store, params)
    }

    /// Streams matching entities into `collect`, which may stop the scan.
    pub fn for_each_matching(
        &self,
        params: &QueryParams,
        collect: Collector<'_, T>,
    ) -> RepoResult<()> {
        self.store.find_all_with_param(params, collect)
    }

    pub fn store(&self, entity: T) -> RepoResult<T> {
        self.store.store(entity)
    }

    /// Inserts an entity under its own, already assigned ID.
    pub fn import(&self, entity: T) -> RepoResult<T> {
        self.store.import(entity)
    }

    pub fn update(&self, entity: &T, id: &str) -> RepoResult<()> {
        require_id(T::COLLECTION, id)?;
        self.store.update(entity, id)
    }

    pub fn delete(&self, id: &str) -> RepoResult<()> {
        require_id(T::COLLECTION, id)?;
        self.store.delete(id)
    }

    pub fn drop_collection(&self) -> RepoResult<()> {
        info!(
            "event=drop_collection module=repo status=start collection={}",
            T::COLLECTION
        );
        self.store.drop_collection()
    }

    pub fn count(&self) -> RepoResult<u64> {
        self.store.count()
    }

    fn find_all_by(&self, key: &str, value: impl Into<QueryValue>) -> RepoResult<Vec<T>> {
        self.find_all_matching(&QueryParams::new().with(key, value))
    }

    fn find_first_by(&self, key: &str, value: impl Into<QueryValue>) -> RepoResult<T> {
        self.store.find_by_field(key, &value.into())
    }
}

fn require_arg(collection: &'static str, name: &str, value: &str) -> RepoResult<()> {
    if value.trim().is_empty() {
        return Err(RepoError::InvalidIdentifier(format!(
            "{collection}: {name} must not be empty"
        )));
    }
    Ok(())
}

impl Repository<'_, User> {
    /// Stores `user` as a brand-new account, discarding any ID it carries.
    pub fn create(&self, mut user: User) -> RepoResult<User> {
        user.id.clear();
        let user = self.store(user)?;
        debug!("event=user_create module=repo status=ok id={}", user.id);
        Ok(user)
    }

    pub fn find_by_ref_id(&self, ref_id: &str) -> RepoResult<User> {
        require_arg(User::COLLECTION, "refid", ref_id)?;
        self.find_first_by("refid", ref_id)
    }

    pub fn find_all_online(&self) -> RepoResult<Vec<User>> {
        self.find_all_by("isOnline", true)
    }

    /// Replaces the account linked to `ref_id`. The record takes `user.id`.
    pub fn update_by_ref_id(&self, user: &User, ref_id: &str) -> RepoResult<()> {
        require_arg(User::COLLECTION, "refid", ref_id)?;
        self.store
            .update_by_field(user, "refid", &QueryValue::from(ref_id))
    }
}

impl Repository<'_, Character> {
    pub fn find_all_for_user(&self, user_id: &str) -> RepoResult<Vec<Character>> {
        require_arg(Character::COLLECTION, "user id", user_id)?;
        self.find_all_by("belongsUser", user_id)
    }

    pub fn find_by_name(&self, name: &str) -> RepoResult<Vec<Character>> {
        self.find_all_by("name", name)
    }
}

impl Repository<'_, CharacterTemplate> {
    pub fn find_by_name(&self, name: &str) -> RepoResult<Vec<CharacterTemplate>> {
        self.find_all_by("name", name)
    }
}

/// Room filter; empty fields are ignored.
#[derive(Debug, Clone, Default)]
pub struct RoomsQuery {
    pub name: String,
    pub description: String,
    pub detail: String,
    pub room_type: String,
    pub area: String,
    pub area_type: String,
}

impl RoomsQuery {
    fn to_params(&self) -> QueryParams {
        [
            ("name", &self.name),
            ("description", &self.description),
            ("detail", &self.detail),
            ("roomType", &self.room_type),
            ("area", &self.area),
            ("areaType", &self.area_type),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .fold(QueryParams::new(), |params, (key, value)| {
            params.with(key, value)
        })
    }
}

impl Repository<'_, Room> {
    pub fn find_by_name(&self, name: &str) -> RepoResult<Vec<Room>> {
        self.find_all_by("name", name)
    }

    pub fn find_all_with_query(&self, query: &RoomsQuery) -> RepoResult<Vec<Room>> {
        self.find_all_matching(&query.to_params())
    }
}

/// Item filter; empty strings and `None` are ignored.
#[derive(Debug, Clone, Default)]
pub struct ItemsQuery {
    pub name: String,
    pub item_type: String,
    pub sub_type: String,
    pub slot: String,
    pub quality: String,
    pub level: Option<i32>,
    pub is_template: Option<bool>,
}

impl ItemsQuery {
    fn to_params(&self) -> QueryParams {
        let mut params = [
            ("name", &self.name),
            ("type", &self.item_type),
            ("subType", &self.sub_type),
            ("slot", &self.slot),
            ("quality", &self.quality),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .fold(QueryParams::new(), |params, (key, value)| {
            params.with(key, value)
        });

        if let Some(level) = self.level {
            params = params.with("level", level);
        }
        if let Some(is_template) = self.is_template {
            params = params.with("isTemplate", is_template);
        }
        params
    }
}

impl Repository<'_, Item> {
    pub fn find_by_name(&self, name: &str) -> RepoResult<Vec<Item>> {
        self.find_all_by("name", name)
    }

    pub fn find_all_with_query(&self, query: &ItemsQuery) -> RepoResult<Vec<Item>> {
        self.find_all_matching(&query.to_params())
    }

    pub fn find_templates(&self) -> RepoResult<Vec<Item>> {
        self.find_all_by("isTemplate", true)
    }
}

impl Repository<'_, Script> {
    pub fn find_by_name(&self, name: &str) -> RepoResult<Vec<Script>> {
        self.find_all_by("name", name)
    }
}

impl Repository<'_, Npc> {
    pub fn find_by_name(&self, name: &str) -> RepoResult<Vec<Npc>> {
        self.find_all_by("name", name)
    }

    pub fn find_by_room(&self, room_id: &str) -> RepoResult<Vec<Npc>> {
        require_arg(Npc::COLLECTION, "room id", room_id)?;
        self.find_all_by("currentRoomID", room_id)
    }
}

impl Repository<'_, NpcSpawner> {
    pub fn find_by_room(&self, room_id: &str) -> RepoResult<Vec<NpcSpawner>> {
        require_arg(NpcSpawner::COLLECTION, "room id", room_id)?;
        self.find_all_by("roomId", room_id)
    }

    pub fn find_by_template(&self, template_id: &str) -> RepoResult<Vec<NpcSpawner>> {
        require_arg(NpcSpawner::COLLECTION, "template id", template_id)?;
        self.find_all_by("templateId", template_id)
    }
}

impl Repository<'_, Dialog> {
    /// First dialog with this name; names are expected to be unique.
    pub fn find_by_name(&self, name: &str) -> RepoResult<Dialog> {
        require_arg(Dialog::COLLECTION, "name", name)?;
        self.find_first_by("name", name)
    }
}

impl Repository<'_, Conversation> {
    pub fn find_by_character_and_target(
        &self,
        character_id: &str,
        target_id: &str,
    ) -> RepoResult<Conversation> {
        require_arg(Conversation::COLLECTION, "character id", character_id)?;
        require_arg(Conversation::COLLECTION, "target id", target_id)?;

        let params = QueryParams::new()
            .with("characterID", character_id)
            .with("targetID", target_id);
        let mut found = None;
        self.for_each_matching(&params, &mut |conversation| {
            found = Some(conversation);
            std::ops::ControlFlow::Break(())
        })?;

        found.ok_or_else(|| {
            RepoError::not_found(
                Conversation::COLLECTION,
                "characterID,targetID",
                format!("{character_id},{target_id}"),
            )
        })
    }

    pub fn find_all_for_character(&self, character_id: &str) -> RepoResult<Vec<Conversation>> {
        require_arg(Conversation::COLLECTION, "character id", character_id)?;
        self.find_all_by("characterID", character_id)
    }
}

impl Repository<'_, LootTable> {
    pub fn find_by_name(&self, name: &str) -> RepoResult<Vec<LootTable>> {
        self.find_all_by("name", name)
    }
}

impl Repository<'_, ServerSettings> {
    /// Returns the stored settings, or the defaults when none were saved yet.
    pub fn get(&self) -> RepoResult<ServerSettings> {
        match self.find_by_id(SERVER_SETTINGS_ID) {
            Err(err) if err.is_not_found() => Ok(ServerSettings::default()),
            other => other,
        }
    }

    /// Saves `settings` under the sentinel ID, creating the record if needed.
    pub fn upsert(&self, mut settings: ServerSettings) -> RepoResult<ServerSettings> {
        settings.id = SERVER_SETTINGS_ID.to_string();
        match self.update(&settings, SERVER_SETTINGS_ID) {
            Ok(()) => Ok(settings),
            Err(err) if err.is_not_found() => self.store(settings),
            Err(err) => Err(err),
        }
    }
}
