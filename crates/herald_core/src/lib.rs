//! Core data types for Herald.
//!
//! This crate defines the entity snapshots Herald mirrors from the Discord
//! gateway, the identifier newtypes they are keyed by, and small helpers for
//! working with snowflakes. It has no knowledge of caching or services.
//!
//! # Examples
//!
//! ```
//! use herald_core::{Channel, ChannelId, ChannelKind, Guild, GuildId};
//!
//! let guild = Guild::new(GuildId(1))
//!     .with_name("Herald HQ")
//!     .with_channel(Channel::new(ChannelId(10), ChannelKind::GuildText));
//!
//! assert_eq!(guild.channels.len(), 1);
//! assert_eq!(guild.member_count, 0);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod entity;
mod id;
pub mod keyed;
mod models;
mod snowflake;

pub use entity::{Entity, EntityKind};
pub use id::{AttachmentId, ChannelId, EmojiId, GuildId, MessageId, RoleId, UserId};
pub use keyed::Keyed;
pub use models::{
    Attachment, Channel, ChannelKind, Emoji, Guild, Member, Message, NO_DISCRIMINATOR, Role, User,
    VoiceState,
};
pub use snowflake::{is_valid_snowflake, snowflake_from_identifier};
