//! Tests for diagnostic entity descriptions.

use async_trait::async_trait;
use bytes::Bytes;
use herald_cache::{AttachmentFetcher, EntityCache, EntityCacheConfig};
use herald_core::{
    Channel, ChannelId, ChannelKind, Guild, GuildId, Member, Message, MessageId, Role, RoleId,
    User, UserId,
};
use herald_error::{CacheError, CacheErrorKind, CacheResult};
use std::sync::Arc;

struct OfflineFetcher;

#[async_trait]
impl AttachmentFetcher for OfflineFetcher {
    async fn fetch(&self, url: &str) -> CacheResult<Bytes> {
        Err(CacheError::new(CacheErrorKind::Fetch {
            url: url.to_string(),
            message: "offline".to_string(),
        }))
    }
}

fn populated_cache() -> EntityCache {
    let cache = EntityCache::new(
        Arc::new(OfflineFetcher),
        EntityCacheConfig::default(),
        &tracing::Span::none(),
    );
    cache.cache_guild(
        Guild::new(GuildId(1))
            .with_name("Herald HQ")
            .with_role(Role::new(RoleId(100), "Moderator")),
    );
    cache.cache_user(User::new(UserId(5), "ada"));
    cache.cache_channel(
        Channel::new(ChannelId(10), ChannelKind::GuildText)
            .with_guild_id(GuildId(1))
            .with_name("general"),
    );
    cache
}

#[test]
fn test_uncached_identifiers() {
    let cache = populated_cache();
    let diagnostics = cache.diagnostics();

    assert_eq!(diagnostics.guild_id(GuildId(2)), "uncached guild (ID 2)");
    assert_eq!(diagnostics.user_id(UserId(6)), "uncached user (ID 6)");
    assert_eq!(diagnostics.role_id(RoleId(101)), "uncached role (ID 101)");
    assert_eq!(
        diagnostics.channel_id(ChannelId(11)),
        "uncached channel (ID 11)"
    );
    assert_eq!(
        diagnostics.message_id(MessageId(50)),
        "uncached message (ID 50)"
    );
}

#[test]
fn test_cached_entities() {
    let cache = populated_cache();
    let diagnostics = cache.diagnostics();

    assert_eq!(diagnostics.guild_id(GuildId(1)), "guild 'Herald HQ' (ID 1)");
    assert_eq!(diagnostics.user_id(UserId(5)), "ada (ID 5)");
    assert_eq!(
        diagnostics.role_id(RoleId(100)),
        "role 'Moderator' (ID 100)"
    );
    assert_eq!(
        diagnostics.channel_id(ChannelId(10)),
        "text channel 'general' (ID 10) @ guild 'Herald HQ' (ID 1)"
    );
}

#[test]
fn test_legacy_discriminator_is_shown() {
    let cache = populated_cache();
    let user = User::new(UserId(8), "grace").with_discriminator("1906");
    assert_eq!(cache.diagnostics().user(&user), "grace#1906 (ID 8)");
}

#[test]
fn test_member_and_unnamed_channel() {
    let cache = populated_cache();
    let diagnostics = cache.diagnostics();

    let member = Member::new(UserId(5)).with_guild_id(GuildId(1));
    assert_eq!(
        diagnostics.member(&member),
        "ada (ID 5) @ guild 'Herald HQ' (ID 1)"
    );

    let orphan = Member::new(UserId(6));
    assert_eq!(
        diagnostics.member(&orphan),
        "uncached user (ID 6) @ unknown guild"
    );

    let dm = Channel::new(ChannelId(20), ChannelKind::Dm);
    assert_eq!(
        diagnostics.channel(&dm),
        "unnamed DM channel (ID 20) @ unknown guild"
    );
}

#[test]
fn test_message_description() {
    let cache = populated_cache();
    let message = cache.cache_message(
        Message::new(MessageId(50), ChannelId(10))
            .with_author(User::new(UserId(5), "ada"))
            .with_content("hello"),
    );

    let diagnostics = cache.diagnostics();
    let expected = "message of length 5 with 0 embeds (ID 50) posted by ada (ID 5)";
    assert_eq!(diagnostics.message(&message), expected);
    assert_eq!(diagnostics.message_id(MessageId(50)), expected);
}

#[test]
fn test_pretty_user_description() {
    let cache = populated_cache();
    let diagnostics = cache.diagnostics();

    assert_eq!(diagnostics.user_pretty(&User::new(UserId(5), "ada")), "ada · ID 5");
    assert_eq!(
        diagnostics.user_pretty(&User::new(UserId(8), "grace").with_discriminator("1906")),
        "grace#1906 · ID 8"
    );
    assert_eq!(diagnostics.user_id_pretty(UserId(5)), "ada · ID 5");
    assert_eq!(diagnostics.user_id_pretty(UserId(9)), "uncached user (ID 9)");
}
