//! Tagged entity snapshots.

use crate::{Attachment, Channel, Guild, Member, Message, Role, User, VoiceState};
use serde::{Deserialize, Serialize};

/// Entity kinds the cache tracks.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Guild snapshot
    #[display("guild")]
    Guild,
    /// Channel snapshot
    #[display("channel")]
    Channel,
    /// User snapshot
    #[display("user")]
    User,
    /// Member snapshot
    #[display("member")]
    Member,
    /// Message snapshot
    #[display("message")]
    Message,
    /// Attachment snapshot
    #[display("attachment")]
    Attachment,
    /// Role snapshot
    #[display("role")]
    Role,
    /// Voice state snapshot
    #[display("voice state")]
    VoiceState,
}

/// A decoded entity snapshot tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_more::From)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Entity {
    /// Guild snapshot
    Guild(Guild),
    /// Channel snapshot
    Channel(Channel),
    /// User snapshot
    User(User),
    /// Member snapshot
    Member(Member),
    /// Message snapshot
    Message(Message),
    /// Attachment snapshot
    Attachment(Attachment),
    /// Role snapshot
    Role(Role),
    /// Voice state snapshot
    VoiceState(VoiceState),
}

impl Entity {
    /// Kind of the wrapped snapshot.
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Guild(_) => EntityKind::Guild,
            Self::Channel(_) => EntityKind::Channel,
            Self::User(_) => EntityKind::User,
            Self::Member(_) => EntityKind::Member,
            Self::Message(_) => EntityKind::Message,
            Self::Attachment(_) => EntityKind::Attachment,
            Self::Role(_) => EntityKind::Role,
            Self::VoiceState(_) => EntityKind::VoiceState,
        }
    }
}
