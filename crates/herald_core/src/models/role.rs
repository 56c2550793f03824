//! Role models.

use crate::{GuildId, Keyed, RoleId};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};

/// A guild role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Setters)]
#[setters(prefix = "with_", strip_option, into)]
pub struct Role {
    /// Role ID
    #[setters(skip)]
    pub id: RoleId,
    /// Owning guild
    #[serde(default)]
    pub guild_id: Option<GuildId>,
    /// Role name
    pub name: String,
    /// Role hierarchy position
    #[serde(default)]
    pub position: i64,
    /// RGB color as a decimal integer, 0 for no color
    #[serde(default)]
    pub color: u32,
}

impl Role {
    /// Create a role with its identity and name set.
    pub fn new(id: RoleId, name: impl Into<String>) -> Self {
        Self {
            id,
            guild_id: None,
            name: name.into(),
            position: 0,
            color: 0,
        }
    }
}

impl Keyed for Role {
    type Key = RoleId;

    fn key(&self) -> RoleId {
        self.id
    }
}
