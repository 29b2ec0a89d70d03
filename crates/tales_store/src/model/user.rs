//! Player account record.

use super::Entity;
use serde::{Deserialize, Serialize};

/// Access level of a user account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Player,
    Creator,
    Admin,
}

/// Links login credentials to an in-game identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    /// External login reference. Unique per user and independent of `id`.
    #[serde(rename = "refid")]
    pub ref_id: String,
    pub name: String,
    pub email: String,
    pub nickname: String,
    pub picture: String,
    /// Epoch milliseconds.
    pub created: i64,
    /// Epoch milliseconds.
    pub last_seen: i64,
    pub last_character: String,
    pub is_new_user: bool,
    pub is_online: bool,
    pub role: Role,
    pub is_banned: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banned_email: Option<String>,
}

impl User {
    pub fn new(ref_id: impl Into<String>) -> Self {
        Self {
            ref_id: ref_id.into(),
            is_new_user: true,
            created: super::now_epoch_ms(),
            ..Self::default()
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Creators and admins may edit world content.
    pub fn is_creator(&self) -> bool {
        matches!(self.role, Role::Creator | Role::Admin)
    }
}

impl Entity for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
