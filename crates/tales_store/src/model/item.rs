//! Items, item templates and loot tables.
//!
//! Item templates are ordinary items flagged with `isTemplate`; instances
//! point back at their template through `templateId`.

use super::Entity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub is_template: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_suffix: Option<String>,
    pub name: String,
    pub description: String,
    pub detail: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub sub_type: String,
    pub slot: String,
    pub quality: String,
    pub level: i32,
    pub properties: BTreeMap<String, String>,
    pub attributes: BTreeMap<String, i32>,
}

impl Item {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: 1,
            ..Self::default()
        }
    }

    pub fn template(name: impl Into<String>) -> Self {
        Self {
            is_template: true,
            ..Self::new(name)
        }
    }

    /// True when this item was created from a template.
    pub fn is_instance(&self) -> bool {
        self.template_id.is_some() && self.instance_suffix.is_some()
    }
}

impl Entity for Item {
    const COLLECTION: &'static str = "items";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// One potential drop of a loot table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LootEntry {
    pub item_template_id: String,
    /// Probability in `0.0..=1.0`.
    pub drop_chance: f64,
    pub min_quantity: i32,
    pub max_quantity: i32,
    pub guaranteed: bool,
    pub required_tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LootTable {
    pub id: String,
    pub name: String,
    pub description: String,
    pub entries: Vec<LootEntry>,
    pub gold_multiplier: f64,
    pub drop_bonus: f64,
}

impl Entity for LootTable {
    const COLLECTION: &'static str = "loot_tables";

    fn blank() -> Self {
        Self {
            gold_multiplier: 1.0,
            ..Self::default()
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
