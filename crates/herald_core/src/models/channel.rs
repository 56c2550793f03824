//! Channel models.

use crate::{ChannelId, GuildId, Keyed};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};

/// Channel discriminant, decoded from Discord's integer `type` field.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(from = "u8", into = "u8")]
pub enum ChannelKind {
    /// Text channel within a guild.
    #[display("text channel")]
    GuildText,
    /// Direct message between users.
    #[display("DM channel")]
    Dm,
    /// Voice channel within a guild.
    #[display("voice channel")]
    GuildVoice,
    /// Direct message between multiple users.
    #[display("group DM channel")]
    GroupDm,
    /// Announcement channel that users can follow.
    #[display("guild announcement")]
    GuildAnnouncement,
    /// Thread within an announcement channel.
    #[display("announcement thread")]
    AnnouncementThread,
    /// Public thread within a text channel.
    #[display("public thread")]
    PublicThread,
    /// Private thread visible to invited members.
    #[display("private thread")]
    PrivateThread,
    /// Stage voice channel.
    #[display("stage channel")]
    GuildStageVoice,
    /// Any discriminant Herald does not model.
    #[display("unknown channel type (ID {_0})")]
    Unknown(u8),
}

impl ChannelKind {
    /// Check if this channel kind is a thread.
    pub fn is_thread(self) -> bool {
        matches!(
            self,
            Self::AnnouncementThread | Self::PublicThread | Self::PrivateThread
        )
    }
}

impl From<u8> for ChannelKind {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::GuildText,
            1 => Self::Dm,
            2 => Self::GuildVoice,
            3 => Self::GroupDm,
            5 => Self::GuildAnnouncement,
            10 => Self::AnnouncementThread,
            11 => Self::PublicThread,
            12 => Self::PrivateThread,
            13 => Self::GuildStageVoice,
            other => Self::Unknown(other),
        }
    }
}

impl From<ChannelKind> for u8 {
    fn from(kind: ChannelKind) -> u8 {
        match kind {
            ChannelKind::GuildText => 0,
            ChannelKind::Dm => 1,
            ChannelKind::GuildVoice => 2,
            ChannelKind::GroupDm => 3,
            ChannelKind::GuildAnnouncement => 5,
            ChannelKind::AnnouncementThread => 10,
            ChannelKind::PublicThread => 11,
            ChannelKind::PrivateThread => 12,
            ChannelKind::GuildStageVoice => 13,
            ChannelKind::Unknown(other) => other,
        }
    }
}

/// A guild channel, thread or DM channel.
///
/// Channels are replaced wholesale on every update.
///
/// # Examples
///
/// ```
/// use herald_core::{Channel, ChannelId, ChannelKind, GuildId};
///
/// let channel = Channel::new(ChannelId(10), ChannelKind::GuildText)
///     .with_guild_id(GuildId(1))
///     .with_name("general");
///
/// assert_eq!(channel.guild_id, Some(GuildId(1)));
/// assert_eq!(channel.name.as_deref(), Some("general"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Setters)]
#[setters(prefix = "with_", strip_option, into)]
pub struct Channel {
    /// Channel ID
    #[setters(skip)]
    pub id: ChannelId,
    /// Channel kind
    #[serde(rename = "type")]
    pub kind: ChannelKind,
    /// Owning guild, absent for DM channels
    #[serde(default)]
    pub guild_id: Option<GuildId>,
    /// Channel name, absent for DM channels
    #[serde(default)]
    pub name: Option<String>,
    /// Parent category or, for threads, parent channel
    #[serde(default)]
    pub parent_id: Option<ChannelId>,
}

impl Channel {
    /// Create a channel with only its identity set.
    pub fn new(id: ChannelId, kind: ChannelKind) -> Self {
        Self {
            id,
            kind,
            guild_id: None,
            name: None,
            parent_id: None,
        }
    }
}

impl Keyed for Channel {
    type Key = ChannelId;

    fn key(&self) -> ChannelId {
        self.id
    }
}
