//! The party on whose behalf a mutation is performed.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::id::UserId;

/// Fixed identifier recorded for internally triggered changes.
pub const SYSTEM_ACTOR_ID: Uuid = Uuid::nil();

/// Who is responsible for a change, as recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Actor {
    /// An authenticated caller.
    User(UserId),
    /// Service-initiated maintenance with no human caller.
    System,
}

impl Actor {
    /// The identifier written to the audit store.
    pub fn id(&self) -> Uuid {
        match self {
            Self::User(id) => id.into_uuid(),
            Self::System => SYSTEM_ACTOR_ID,
        }
    }

    /// Returns the user ID when the actor is a real caller.
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::User(id) => Some(*id),
            Self::System => None,
        }
    }
}

impl From<UserId> for Actor {
    fn from(id: UserId) -> Self {
        Self::User(id)
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user:{id}"),
            Self::System => write!(f, "system"),
        }
    }
}
