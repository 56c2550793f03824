//! Custom emoji models.

use crate::{EmojiId, Keyed};
use serde::{Deserialize, Serialize};

/// A guild's custom emoji.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emoji {
    /// Emoji ID
    pub id: EmojiId,
    /// Emoji name, absent when the emoji was deleted
    #[serde(default)]
    pub name: Option<String>,
    /// Whether the emoji is animated
    #[serde(default)]
    pub animated: bool,
}

impl Keyed for Emoji {
    type Key = EmojiId;

    fn key(&self) -> EmojiId {
        self.id
    }
}
