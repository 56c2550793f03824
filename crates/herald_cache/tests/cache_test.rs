//! Tests for entity merge policies.

use async_trait::async_trait;
use bytes::Bytes;
use herald_cache::{EntityCache, EntityCacheConfig};
use herald_core::{
    Channel, ChannelId, ChannelKind, Emoji, EmojiId, Entity, Guild, GuildId, Member, Message,
    MessageId, Role, RoleId, User, UserId, VoiceState,
};
use herald_error::{CacheError, CacheErrorKind, CacheResult};
use std::sync::Arc;

/// Fetcher for tests that never touch attachments.
struct UnreachableFetcher;

#[async_trait]
impl herald_cache::AttachmentFetcher for UnreachableFetcher {
    async fn fetch(&self, url: &str) -> CacheResult<Bytes> {
        Err(CacheError::new(CacheErrorKind::Fetch {
            url: url.to_string(),
            message: "network disabled in tests".to_string(),
        }))
    }
}

fn cache() -> EntityCache {
    EntityCache::new(
        Arc::new(UnreachableFetcher),
        EntityCacheConfig::default(),
        &tracing::Span::none(),
    )
}

fn text_channel(id: u64, guild_id: u64) -> Channel {
    Channel::new(ChannelId(id), ChannelKind::GuildText)
        .with_guild_id(GuildId(guild_id))
        .with_name(format!("channel-{id}"))
}

#[test]
fn test_guild_snapshots_union_sub_collections() {
    let cache = cache();

    cache.cache_guild(
        Guild::new(GuildId(1))
            .with_name("First")
            .with_role(Role::new(RoleId(100), "@everyone"))
            .with_emoji(Emoji {
                id: EmojiId(7),
                name: Some("wave".to_string()),
                animated: false,
            })
            .with_channel(text_channel(10, 1)),
    );
    cache.cache_guild(
        Guild::new(GuildId(1))
            .with_name("Renamed")
            .with_role(Role::new(RoleId(100), "everyone"))
            .with_role(Role::new(RoleId(101), "Moderator"))
            .with_channel(text_channel(11, 1)),
    );

    let guild = cache.guild(GuildId(1)).expect("guild is cached");
    assert_eq!(guild.name.as_deref(), Some("Renamed"));
    assert_eq!(guild.roles.len(), 2);
    assert_eq!(guild.roles[&RoleId(100)].name, "everyone");
    assert_eq!(guild.emojis.len(), 1);
    assert!(guild.channels.contains_key(&ChannelId(10)));
    assert!(guild.channels.contains_key(&ChannelId(11)));

    // Guild sub-collections are views of the canonical maps.
    assert_eq!(
        cache.role(RoleId(101)).and_then(|role| role.guild_id),
        Some(GuildId(1))
    );
    assert_eq!(
        cache.channel(ChannelId(11)).map(|channel| channel.name),
        Some(Some("channel-11".to_string()))
    );
}

#[test]
fn test_guild_merge_preserves_member_count() {
    let cache = cache();

    // The wire value is ignored on a first sighting too.
    let mut snapshot = Guild::new(GuildId(1));
    snapshot.member_count = 999;
    cache.cache_guild(snapshot);
    assert_eq!(cache.guild(GuildId(1)).map(|g| g.member_count), Some(0));

    assert!(cache.set_member_count(GuildId(1), 42));
    let mut snapshot = Guild::new(GuildId(1));
    snapshot.member_count = 7;
    cache.cache_guild(snapshot);
    assert_eq!(cache.guild(GuildId(1)).map(|g| g.member_count), Some(42));

    assert!(!cache.set_member_count(GuildId(2), 1));
}

#[test]
fn test_message_history_is_one_generation_deep() {
    let cache = cache();
    let id = MessageId(50);

    for content in ["first", "second", "third"] {
        cache.cache_message(Message::new(id, ChannelId(10)).with_content(content));
    }

    assert_eq!(cache.message(id).map(|m| m.content), Some("third".to_string()));
    assert_eq!(
        cache.previous_message(id).map(|m| m.content),
        Some("second".to_string())
    );
    assert_eq!(cache.stats().messages, 1);
    assert_eq!(cache.stats().previous_messages, 1);
}

#[test]
fn test_first_message_has_no_previous_generation() {
    let cache = cache();
    cache.cache_message(Message::new(MessageId(1), ChannelId(10)));
    assert!(cache.message(MessageId(1)).is_some());
    assert!(cache.previous_message(MessageId(1)).is_none());
}

#[test]
fn test_channel_with_cached_guild_joins_view() {
    let cache = cache();
    cache.cache_guild(Guild::new(GuildId(1)));

    let returned = cache.cache_channel(text_channel(10, 1));
    assert_eq!(returned.id, ChannelId(10));

    assert_eq!(cache.guild_channels(GuildId(1)).len(), 1);
    assert!(cache.channel(ChannelId(10)).is_some());
}

#[test]
fn test_channel_before_guild_is_stored_canonically_only() {
    let cache = cache();
    cache.cache_channel(text_channel(10, 1));

    assert!(cache.channel(ChannelId(10)).is_some());
    assert!(cache.guild(GuildId(1)).is_none());
    assert!(cache.guild_channels(GuildId(1)).is_empty());
}

#[test]
fn test_channel_moving_guilds_leaves_old_view() {
    let cache = cache();
    cache.cache_guild(Guild::new(GuildId(1)));
    cache.cache_guild(Guild::new(GuildId(2)));

    cache.cache_channel(text_channel(10, 1));
    cache.cache_channel(text_channel(10, 2));

    assert!(cache.guild_channels(GuildId(1)).is_empty());
    assert_eq!(cache.guild_channels(GuildId(2)).len(), 1);
}

#[test]
fn test_role_with_and_without_cached_guild() {
    let cache = cache();

    cache.cache_role(Role::new(RoleId(100), "Early").with_guild_id(GuildId(1)));
    assert!(cache.role(RoleId(100)).is_some());
    assert!(cache.guild_roles(GuildId(1)).is_empty());

    cache.cache_guild(Guild::new(GuildId(1)));
    cache.cache_role(Role::new(RoleId(101), "Late").with_guild_id(GuildId(1)));

    let names: Vec<String> = cache
        .guild_roles(GuildId(1))
        .into_iter()
        .map(|role| role.name)
        .collect();
    assert_eq!(names, vec!["Late".to_string()]);
}

#[test]
fn test_member_with_and_without_cached_guild() {
    let cache = cache();

    cache.cache_member(Member::new(UserId(5)).with_guild_id(GuildId(1)));
    assert!(cache.member(GuildId(1), UserId(5)).is_some());
    assert!(cache.guild_members(GuildId(1)).is_empty());

    cache.cache_guild(Guild::new(GuildId(1)));
    cache.cache_member(
        Member::new(UserId(6))
            .with_guild_id(GuildId(1))
            .with_nick("late"),
    );

    let guild = cache.guild(GuildId(1)).expect("guild is cached");
    assert_eq!(guild.members.len(), 1);
    assert_eq!(guild.members[&UserId(6)].nick.as_deref(), Some("late"));
    assert_eq!(cache.members(GuildId(1)).map(|m| m.len()), Some(2));
}

#[test]
fn test_member_without_guild_is_dropped() {
    let cache = cache();
    cache.cache_guild(Guild::new(GuildId(1)));

    let returned = cache.cache_member(Member::new(UserId(5)));
    assert_eq!(returned.id, UserId(5));

    assert!(cache.members(GuildId(1)).is_none());
    assert!(cache.guild_members(GuildId(1)).is_empty());
    assert_eq!(cache.stats().members, 0);
}

#[test]
fn test_voice_state_with_cached_guild() {
    let cache = cache();
    cache.cache_guild(Guild::new(GuildId(1)));

    cache.cache_voice_state(
        VoiceState::new(UserId(5))
            .with_guild_id(GuildId(1))
            .with_channel_id(ChannelId(20)),
    );
    assert_eq!(
        cache
            .voice_state(GuildId(1), UserId(5))
            .and_then(|state| state.channel_id),
        Some(ChannelId(20))
    );

    cache.cache_voice_state(VoiceState::new(UserId(5)).with_guild_id(GuildId(1)));
    assert!(cache.voice_state(GuildId(1), UserId(5)).is_none());
    assert!(
        cache
            .guild(GuildId(1))
            .is_some_and(|guild| guild.voice_states.is_empty())
    );
}

#[test]
fn test_voice_state_without_cached_guild_is_ignored() {
    let cache = cache();

    cache.cache_voice_state(
        VoiceState::new(UserId(5))
            .with_guild_id(GuildId(1))
            .with_channel_id(ChannelId(20)),
    );
    cache.cache_guild(Guild::new(GuildId(1)));

    assert!(cache.voice_state(GuildId(1), UserId(5)).is_none());
}

#[test]
fn test_users_are_replaced() {
    let cache = cache();
    cache.cache_user(User::new(UserId(5), "ada"));
    cache.cache_user(User::new(UserId(5), "ada_lovelace"));

    assert_eq!(
        cache.user(UserId(5)).map(|user| user.username),
        Some("ada_lovelace".to_string())
    );
    assert_eq!(cache.stats().users, 1);
}

#[test]
fn test_replaying_a_guild_snapshot_is_idempotent() {
    let cache = cache();
    let snapshot = Guild::new(GuildId(1))
        .with_name("Herald HQ")
        .with_role(Role::new(RoleId(100), "@everyone"))
        .with_member(Member::new(UserId(5)))
        .with_channel(text_channel(10, 1));

    cache.cache_guild(snapshot.clone());
    let first = cache.guild(GuildId(1));
    cache.cache_guild(snapshot);

    assert_eq!(cache.guild(GuildId(1)), first);
    assert_eq!(cache.stats().members, 1);
}

#[test]
fn test_apply_dispatches_on_entity_kind() {
    let cache = cache();

    let entity = cache.apply(Entity::Guild(Guild::new(GuildId(1))));
    assert!(matches!(entity, Entity::Guild(_)));

    cache.apply(Entity::Channel(text_channel(10, 1)));
    cache.apply(Entity::User(User::new(UserId(5), "ada")));

    let stats = cache.stats();
    assert_eq!(stats.guilds, 1);
    assert_eq!(stats.channels, 1);
    assert_eq!(stats.users, 1);
    assert_eq!(cache.guild_channels(GuildId(1)).len(), 1);
}

#[test]
fn test_stats_display() {
    let cache = cache();
    cache.cache_guild(Guild::new(GuildId(1)).with_channel(text_channel(10, 1)));

    let summary = cache.stats().to_string();
    assert!(summary.starts_with("1 guilds, 1 channels"));
}
