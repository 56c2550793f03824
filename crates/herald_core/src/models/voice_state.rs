//! Voice presence models.

use crate::{ChannelId, GuildId, Keyed, UserId};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};

/// A user's voice connection state within a guild.
///
/// A snapshot without `channel_id` means the user left voice; the cache
/// removes the entry instead of storing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Setters)]
#[setters(prefix = "with_", strip_option, into)]
pub struct VoiceState {
    /// User the state belongs to
    #[setters(skip)]
    pub user_id: UserId,
    /// Guild the state belongs to
    #[serde(default)]
    pub guild_id: Option<GuildId>,
    /// Connected voice channel, absent when disconnected
    #[serde(default)]
    pub channel_id: Option<ChannelId>,
    /// Voice session ID
    #[serde(default)]
    pub session_id: Option<String>,
    /// Whether the user is muted by themselves
    #[serde(default)]
    pub self_mute: bool,
    /// Whether the user is deafened by themselves
    #[serde(default)]
    pub self_deaf: bool,
}

impl VoiceState {
    /// Create a disconnected voice state for a user.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            guild_id: None,
            channel_id: None,
            session_id: None,
            self_mute: false,
            self_deaf: false,
        }
    }

    /// Check if the user is connected to a voice channel.
    pub fn is_connected(&self) -> bool {
        self.channel_id.is_some()
    }
}

impl Keyed for VoiceState {
    type Key = UserId;

    fn key(&self) -> UserId {
        self.user_id
    }
}
