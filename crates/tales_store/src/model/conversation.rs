//! Resumable dialog state between a character and an NPC or item.

use super::Entity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    #[default]
    Npc,
    Item,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    #[serde(rename = "characterID")]
    pub character_id: String,
    #[serde(rename = "targetID")]
    pub target_id: String,
    pub target_type: TargetType,
    #[serde(rename = "dialogID")]
    pub dialog_id: String,
    #[serde(rename = "currentNodeID")]
    pub current_node_id: String,
    /// Dialog node ID to visit count.
    pub visited_nodes: BTreeMap<String, i32>,
    /// Template variables for dialog rendering.
    pub context: BTreeMap<String, String>,
    pub last_interacted: i64,
    pub created: i64,
}

impl Conversation {
    /// Starts a conversation at the `main` node.
    pub fn new(
        character_id: impl Into<String>,
        target_id: impl Into<String>,
        target_type: TargetType,
        dialog_id: impl Into<String>,
    ) -> Self {
        let now = super::now_epoch_ms();
        Self {
            character_id: character_id.into(),
            target_id: target_id.into(),
            target_type,
            dialog_id: dialog_id.into(),
            current_node_id: "main".to_string(),
            last_interacted: now,
            created: now,
            ..Self::default()
        }
    }

    pub fn mark_visited(&mut self, node_id: &str) {
        *self.visited_nodes.entry(node_id.to_string()).or_insert(0) += 1;
    }

    pub fn visit_count(&self, node_id: &str) -> i32 {
        self.visited_nodes.get(node_id).copied().unwrap_or(0)
    }
}

impl Entity for Conversation {
    const COLLECTION: &'static str = "conversations";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
