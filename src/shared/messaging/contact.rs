//! Counterpart User Summary
//!
//! A user as listed for starting or selecting a conversation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public profile fields of another user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    /// User ID
    pub id: Uuid,
    /// Display username
    pub username: String,
    /// Optional avatar URL
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl UserSummary {
    pub fn new(id: Uuid, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            avatar_url: None,
        }
    }
}
