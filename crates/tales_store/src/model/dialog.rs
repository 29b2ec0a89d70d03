use super::Entity;
use serde::{Deserialize, Serialize};

/// Player response leading to another dialog node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogOption {
    pub id: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dialog {
    pub id: String,
    pub name: String,
    pub text: String,
    pub options: Vec<DialogOption>,
    pub requires_visited_dialogs: Vec<String>,
}

impl Entity for Dialog {
    const COLLECTION: &'static str = "dialogs";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
