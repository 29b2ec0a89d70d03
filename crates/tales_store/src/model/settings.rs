//! Server-wide settings singleton.
//!
//! Stored as an ordinary entity under the fixed `SERVER_SETTINGS_ID`.

use super::Entity;
use serde::{Deserialize, Serialize};

/// Sentinel ID of the single settings record.
pub const SERVER_SETTINGS_ID: &str = "server-settings";

const DEFAULT_SERVER_NAME: &str = "TalesMUD";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSettings {
    pub id: String,
    pub server_name: String,
    pub about: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            id: SERVER_SETTINGS_ID.to_string(),
            server_name: DEFAULT_SERVER_NAME.to_string(),
            about: String::new(),
        }
    }
}

impl Entity for ServerSettings {
    const COLLECTION: &'static str = "server_settings";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
