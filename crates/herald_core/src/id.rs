//! Snowflake identifiers.
//!
//! Every entity kind gets its own identifier newtype so that a channel ID can
//! never be used to look up a guild. On the wire, Discord sends snowflakes as
//! decimal strings; the newtypes accept both strings and integers.

use serde::{Deserialize, Deserializer, Serialize};

/// Raw snowflake as it may appear in a JSON payload.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawSnowflake {
    Int(u64),
    Str(String),
}

impl RawSnowflake {
    fn into_u64(self) -> Result<u64, String> {
        match self {
            Self::Int(value) => Ok(value),
            Self::Str(value) => value
                .parse()
                .map_err(|_| format!("invalid snowflake: {value:?}")),
        }
    }
}

macro_rules! snowflake_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Serialize,
            derive_more::Display,
            derive_more::From,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Get the raw snowflake value.
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> u64 {
                id.0
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                RawSnowflake::deserialize(deserializer)?
                    .into_u64()
                    .map(Self)
                    .map_err(serde::de::Error::custom)
            }
        }
    };
}

snowflake_id!(
    /// Guild (Discord server) identifier. Guilds are the tenants of local services.
    GuildId
);
snowflake_id!(
    /// Channel or thread identifier.
    ChannelId
);
snowflake_id!(
    /// User identifier. Members are keyed by the ID of their user.
    UserId
);
snowflake_id!(
    /// Message identifier.
    MessageId
);
snowflake_id!(
    /// Attachment identifier.
    AttachmentId
);
snowflake_id!(
    /// Role identifier.
    RoleId
);
snowflake_id!(
    /// Custom emoji identifier.
    EmojiId
);
