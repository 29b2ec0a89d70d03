use super::Entity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Npc {
    pub id: String,
    #[serde(rename = "currentRoomID")]
    pub current_room_id: String,
    pub name: String,
    pub description: String,
    pub race: String,
    pub class: String,
    pub level: i32,
    pub current_hit_points: i32,
    pub max_hit_points: i32,
    /// Main interactive dialog.
    #[serde(rename = "dialogID", skip_serializing_if = "Option::is_none")]
    pub dialog_id: Option<String>,
    #[serde(rename = "idleDialogID", skip_serializing_if = "Option::is_none")]
    pub idle_dialog_id: Option<String>,
    pub created: i64,
}

impl Entity for Npc {
    const COLLECTION: &'static str = "npcs";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Keeps a room populated with instances of one NPC template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NpcSpawner {
    pub id: String,
    pub name: String,
    pub template_id: String,
    pub room_id: String,
    pub max_instances: i32,
    pub spawn_interval_secs: i64,
    pub initial_count: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub respawn_time_override_secs: Option<i64>,
    pub created: i64,
    pub updated: i64,
}

impl Entity for NpcSpawner {
    const COLLECTION: &'static str = "npc_spawners";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
