//! Human-readable entity descriptions for log records.

use herald_core::{
    Channel, ChannelId, Guild, GuildId, Member, Message, MessageId, Role, RoleId, User, UserId,
};

use crate::{EntityCache, EntityStore};

/// Formats entities, or identifiers resolved against the cache, as short
/// strings such as `guild 'Herald HQ' (ID 1)`.
///
/// Identifiers that are not cached render as `uncached <kind> (ID <id>)`.
///
/// # Example
///
/// ```
/// use herald_cache::{EntityCache, EntityCacheConfig, ReqwestFetcher};
/// use herald_core::{Guild, GuildId};
/// use std::sync::Arc;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = Arc::new(ReqwestFetcher::new("Herald")?);
/// let cache = EntityCache::new(fetcher, EntityCacheConfig::default(), &tracing::Span::none());
/// cache.cache_guild(Guild::new(GuildId(1)).with_name("Herald HQ"));
///
/// let diagnostics = cache.diagnostics();
/// assert_eq!(diagnostics.guild_id(GuildId(1)), "guild 'Herald HQ' (ID 1)");
/// assert_eq!(diagnostics.guild_id(GuildId(2)), "uncached guild (ID 2)");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Diagnostics<'a> {
    cache: &'a EntityCache,
}

impl<'a> Diagnostics<'a> {
    /// Create a formatter resolving identifiers against `cache`.
    pub fn new(cache: &'a EntityCache) -> Self {
        Self { cache }
    }

    /// Describe a user.
    pub fn user(&self, user: &User) -> String {
        format!("{} (ID {})", user.tag(), user.id)
    }

    /// Describe a user for display, as `<tag> · ID <id>`.
    pub fn user_pretty(&self, user: &User) -> String {
        format!("{} · ID {}", user.tag(), user.id)
    }

    /// Describe a user by ID.
    pub fn user_id(&self, id: UserId) -> String {
        self.cache.read(|store| describe_user_id(store, id))
    }

    /// Describe a user by ID for display.
    pub fn user_id_pretty(&self, id: UserId) -> String {
        self.cache.read(|store| match store.user(id) {
            Some(user) => self.user_pretty(user),
            None => format!("uncached user (ID {id})"),
        })
    }

    /// Describe a member as `<user> @ <guild>`.
    pub fn member(&self, member: &Member) -> String {
        self.cache.read(|store| {
            let user = match &member.user {
                Some(user) => self.user(user),
                None => describe_user_id(store, member.id),
            };
            let guild = match member.guild_id {
                Some(guild_id) => describe_guild_id(store, guild_id),
                None => "unknown guild".to_string(),
            };
            format!("{user} @ {guild}")
        })
    }

    /// Describe a role.
    pub fn role(&self, role: &Role) -> String {
        format!("role '{}' (ID {})", role.name, role.id)
    }

    /// Describe a role by ID.
    pub fn role_id(&self, id: RoleId) -> String {
        self.cache.read(|store| match store.role(id) {
            Some(role) => self.role(role),
            None => format!("uncached role (ID {id})"),
        })
    }

    /// Describe a guild.
    pub fn guild(&self, guild: &Guild) -> String {
        describe_guild(guild.id, guild.name.as_deref())
    }

    /// Describe a guild by ID.
    pub fn guild_id(&self, id: GuildId) -> String {
        self.cache.read(|store| describe_guild_id(store, id))
    }

    /// Describe a message by its size and author.
    pub fn message(&self, message: &Message) -> String {
        self.cache.read(|store| describe_message(store, message))
    }

    /// Describe the latest snapshot of a message by ID.
    pub fn message_id(&self, id: MessageId) -> String {
        self.cache.read(|store| match store.message(id) {
            Some(message) => describe_message(store, message),
            None => format!("uncached message (ID {id})"),
        })
    }

    /// Describe a channel as `<kind> '<name>' (ID <id>) @ <guild>`.
    pub fn channel(&self, channel: &Channel) -> String {
        self.cache.read(|store| describe_channel(store, channel))
    }

    /// Describe a channel by ID.
    pub fn channel_id(&self, id: ChannelId) -> String {
        self.cache.read(|store| match store.channel(id) {
            Some(channel) => describe_channel(store, channel),
            None => format!("uncached channel (ID {id})"),
        })
    }
}

fn describe_user_id(store: &EntityStore, id: UserId) -> String {
    match store.user(id) {
        Some(user) => format!("{} (ID {})", user.tag(), user.id),
        None => format!("uncached user (ID {id})"),
    }
}

fn describe_guild(id: GuildId, name: Option<&str>) -> String {
    match name {
        Some(name) => format!("guild '{name}' (ID {id})"),
        None => format!("unnamed guild (ID {id})"),
    }
}

fn describe_guild_id(store: &EntityStore, id: GuildId) -> String {
    match store.guild_name(id) {
        Some(name) => describe_guild(id, name),
        None => format!("uncached guild (ID {id})"),
    }
}

fn describe_message(store: &EntityStore, message: &Message) -> String {
    let author = match &message.author {
        Some(author) => describe_user_id(store, author.id),
        None => "unknown user".to_string(),
    };
    format!(
        "message of length {} with {} embeds (ID {}) posted by {}",
        message.content.chars().count(),
        message.embeds.len(),
        message.id,
        author
    )
}

fn describe_channel(store: &EntityStore, channel: &Channel) -> String {
    let guild = match channel.guild_id {
        Some(guild_id) => describe_guild_id(store, guild_id),
        None => "unknown guild".to_string(),
    };
    match &channel.name {
        Some(name) => format!("{} '{}' (ID {}) @ {}", channel.kind, name, channel.id, guild),
        None => format!("unnamed {} (ID {}) @ {}", channel.kind, channel.id, guild),
    }
}
