//! Player characters and the templates they are created from.

use super::Entity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub short: String,
    pub value: i32,
}

/// Carried items, referenced by item ID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inventory {
    pub items: Vec<String>,
    pub gold: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: String,
    /// Owning user ID.
    pub belongs_user: String,
    #[serde(rename = "currentRoomID")]
    pub current_room_id: String,
    pub name: String,
    pub description: String,
    pub race: String,
    pub class: String,
    pub level: i32,
    pub current_hit_points: i32,
    pub max_hit_points: i32,
    pub armor_class: i32,
    pub created: i64,
    pub attributes: Vec<Attribute>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personality_traits: Option<String>,
    pub inventory: Inventory,
    /// Equipment slot name to item ID.
    pub equipped_items: BTreeMap<String, String>,
}

impl Character {
    pub fn new(belongs_user: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            belongs_user: belongs_user.into(),
            name: name.into(),
            level: 1,
            created: super::now_epoch_ms(),
            ..Self::default()
        }
    }
}

impl Entity for Character {
    const COLLECTION: &'static str = "characters";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartingItem {
    pub slot: String,
    pub item_template_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_template_name: Option<String>,
}

/// Editable archetype offered during character creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub backstory: String,
    pub origin_area: String,
    /// e.g. warrior, rogue, mage
    pub archetype: String,
    pub race: String,
    pub class: String,
    pub level: i32,
    pub current_hit_points: i32,
    pub max_hit_points: i32,
    pub attributes: Vec<Attribute>,
    pub starting_items: Vec<StartingItem>,
    /// "db" or "system".
    pub source: String,
    pub created: i64,
}

impl Entity for CharacterTemplate {
    const COLLECTION: &'static str = "charactertemplates";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
