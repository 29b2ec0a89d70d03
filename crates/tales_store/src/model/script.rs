use super::Entity;
use serde::{Deserialize, Serialize};

/// Lua source attached to rooms, items or NPCs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub id: String,
    pub name: String,
    pub description: String,
    pub code: String,
}

impl Entity for Script {
    const COLLECTION: &'static str = "scripts";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
