use super::Entity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub id: String,
    pub name: String,
    pub created: i64,
    /// Member character IDs.
    pub characters: Vec<String>,
}

impl Entity for Party {
    const COLLECTION: &'static str = "parties";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
