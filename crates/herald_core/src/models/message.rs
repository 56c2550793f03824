//! Message models.

use crate::{Attachment, ChannelId, GuildId, Keyed, MessageId, User};
use chrono::{DateTime, Utc};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A message snapshot.
///
/// Messages are mutable on Discord; every edit arrives as a new snapshot of
/// the whole message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Setters)]
#[setters(prefix = "with_", strip_option, into)]
pub struct Message {
    /// Message ID
    #[setters(skip)]
    pub id: MessageId,
    /// Channel the message was posted in
    pub channel_id: ChannelId,
    /// Guild the message was posted in, absent in DMs
    #[serde(default)]
    pub guild_id: Option<GuildId>,
    /// Message author. Embed-resolution updates arrive without one.
    #[serde(default)]
    pub author: Option<User>,
    /// Text content
    #[serde(default)]
    pub content: String,
    /// Raw embed objects
    #[serde(default)]
    pub embeds: Vec<JsonValue>,
    /// Attached files
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// When the message was posted
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// When the message was last edited
    #[serde(default)]
    pub edited_timestamp: Option<DateTime<Utc>>,
}

impl Message {
    /// Create an empty message in a channel.
    pub fn new(id: MessageId, channel_id: ChannelId) -> Self {
        Self {
            id,
            channel_id,
            guild_id: None,
            author: None,
            content: String::new(),
            embeds: Vec::new(),
            attachments: Vec::new(),
            timestamp: None,
            edited_timestamp: None,
        }
    }
}

impl Keyed for Message {
    type Key = MessageId;

    fn key(&self) -> MessageId {
        self.id
    }
}
