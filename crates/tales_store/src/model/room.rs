use super::Entity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Action a player can invoke inside a room.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomAction {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub action_type: String,
    pub params: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exit {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub exit_type: String,
    pub hidden: bool,
    /// Target room ID.
    pub target: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub name: String,
    pub description: String,
    pub detail: String,
    pub room_type: String,
    pub area: String,
    pub area_type: String,
    pub actions: Vec<RoomAction>,
    pub exits: Vec<Exit>,
    /// IDs of characters currently present.
    pub characters: Vec<String>,
}

impl Room {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Entity for Room {
    const COLLECTION: &'static str = "rooms";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
