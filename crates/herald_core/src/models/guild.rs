//! Guild (Discord server) models.

use crate::{
    Channel, ChannelId, Emoji, EmojiId, GuildId, Keyed, Member, Role, RoleId, UserId, VoiceState,
    keyed,
};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A guild snapshot, or the cache's assembled view of one.
///
/// Sub-collections are keyed by their entries' own identifiers. On the wire
/// they are arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Setters)]
#[setters(prefix = "with_", strip_option, into)]
pub struct Guild {
    /// Guild ID
    #[setters(skip)]
    pub id: GuildId,
    /// Guild name
    #[serde(default)]
    pub name: Option<String>,
    /// User ID of the guild owner
    #[serde(default)]
    pub owner_id: Option<UserId>,
    /// Member counter; snapshots do not carry an authoritative value
    #[serde(default)]
    pub member_count: u64,
    /// Whether the guild is unavailable due to an outage
    #[serde(default)]
    pub unavailable: bool,
    /// Roles
    #[serde(default, with = "keyed")]
    pub roles: HashMap<RoleId, Role>,
    /// Custom emojis
    #[serde(default, with = "keyed")]
    pub emojis: HashMap<EmojiId, Emoji>,
    /// Voice presence of connected users
    #[serde(default, with = "keyed")]
    pub voice_states: HashMap<UserId, VoiceState>,
    /// Members
    #[serde(default, with = "keyed")]
    pub members: HashMap<UserId, Member>,
    /// Channels
    #[serde(default, with = "keyed")]
    pub channels: HashMap<ChannelId, Channel>,
    /// Active threads
    #[serde(default, with = "keyed")]
    pub threads: HashMap<ChannelId, Channel>,
}

impl Guild {
    /// Create a guild with empty sub-collections.
    pub fn new(id: GuildId) -> Self {
        Self {
            id,
            name: None,
            owner_id: None,
            member_count: 0,
            unavailable: false,
            roles: HashMap::new(),
            emojis: HashMap::new(),
            voice_states: HashMap::new(),
            members: HashMap::new(),
            channels: HashMap::new(),
            threads: HashMap::new(),
        }
    }

    /// Add a role to the snapshot.
    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.insert(role.id, role);
        self
    }

    /// Add a custom emoji to the snapshot.
    pub fn with_emoji(mut self, emoji: Emoji) -> Self {
        self.emojis.insert(emoji.id, emoji);
        self
    }

    /// Add a voice state to the snapshot.
    pub fn with_voice_state(mut self, voice_state: VoiceState) -> Self {
        self.voice_states.insert(voice_state.user_id, voice_state);
        self
    }

    /// Add a member to the snapshot.
    pub fn with_member(mut self, member: Member) -> Self {
        self.members.insert(member.id, member);
        self
    }

    /// Add a channel to the snapshot.
    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channels.insert(channel.id, channel);
        self
    }

    /// Add a thread to the snapshot.
    pub fn with_thread(mut self, thread: Channel) -> Self {
        self.threads.insert(thread.id, thread);
        self
    }
}

impl Keyed for Guild {
    type Key = GuildId;

    fn key(&self) -> GuildId {
        self.id
    }
}
