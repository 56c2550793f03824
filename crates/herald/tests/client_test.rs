//! Tests for gateway event dispatch.

use async_trait::async_trait;
use bytes::Bytes;
use herald::{
    AttachmentFetcher, AttachmentId, CacheResult, ChannelId, EntityCacheConfig, GatewayEvent,
    GuildId, Herald, LocalContext, MessageId, Service, ServiceRegistry, ServiceResult, UserId,
};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

struct StaticFetcher;

#[async_trait]
impl AttachmentFetcher for StaticFetcher {
    async fn fetch(&self, _url: &str) -> CacheResult<Bytes> {
        Ok(Bytes::from_static(b"content"))
    }
}

struct Welcome {
    stops: Arc<AtomicUsize>,
}

#[async_trait]
impl Service for Welcome {
    fn name(&self) -> &str {
        "welcome"
    }

    async fn start(&self) -> ServiceResult<()> {
        Ok(())
    }

    async fn stop(&self) -> ServiceResult<()> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn herald_with_welcome(stops: &Arc<AtomicUsize>) -> Herald {
    let stops = Arc::clone(stops);
    let mut registry = ServiceRegistry::new();
    registry
        .register_local("welcome", move |_context: LocalContext| Welcome {
            stops: Arc::clone(&stops),
        })
        .expect("register welcome");

    Herald::with_fetcher(
        Arc::new(StaticFetcher),
        EntityCacheConfig::default().with_fetch_attachments(false),
        registry,
        &tracing::Span::none(),
    )
}

fn event(value: serde_json::Value) -> GatewayEvent {
    serde_json::from_value(value).expect("valid gateway event")
}

#[tokio::test]
async fn test_guild_create_caches_and_starts_local_services() {
    let stops = Arc::new(AtomicUsize::new(0));
    let herald = herald_with_welcome(&stops);

    herald
        .handle_event(event(json!({
            "t": "GUILD_CREATE",
            "d": {
                "id": "1",
                "name": "Herald HQ",
                "member_count": 120,
                "channels": [{ "id": "10", "type": 0, "name": "general" }],
                "members": [{ "user": { "id": "5", "username": "ada" }, "roles": [] }]
            }
        })))
        .await
        .expect("guild create");

    let guild = herald.cache().guild(GuildId(1)).expect("guild cached");
    assert_eq!(guild.member_count, 120);
    assert!(guild.channels.contains_key(&ChannelId(10)));
    assert!(herald.cache().user(UserId(5)).is_some());
    assert!(herald.cache().member(GuildId(1), UserId(5)).is_some());
    assert!(herald.services().has_local_service("welcome", GuildId(1)));
}

#[tokio::test]
async fn test_member_add_keys_member_by_embedded_user() {
    let stops = Arc::new(AtomicUsize::new(0));
    let herald = herald_with_welcome(&stops);

    herald
        .handle_event(event(json!({ "t": "GUILD_CREATE", "d": { "id": "1" } })))
        .await
        .expect("guild create");
    herald
        .handle_event(event(json!({
            "t": "GUILD_MEMBER_ADD",
            "d": {
                "guild_id": "1",
                "user": { "id": "5", "username": "ada" },
                "nick": "Ada",
                "roles": []
            }
        })))
        .await
        .expect("member add");

    let member = herald
        .cache()
        .member(GuildId(1), UserId(5))
        .expect("member cached");
    assert_eq!(member.nick.as_deref(), Some("Ada"));
    assert_eq!(herald.cache().guild_members(GuildId(1)).len(), 1);
    assert!(herald.cache().user(UserId(5)).is_some());
}

#[tokio::test]
async fn test_guild_delete_stops_local_services() {
    let stops = Arc::new(AtomicUsize::new(0));
    let herald = herald_with_welcome(&stops);

    herald
        .handle_event(event(json!({ "t": "GUILD_CREATE", "d": { "id": "1" } })))
        .await
        .expect("guild create");
    herald
        .handle_event(event(json!({
            "t": "GUILD_DELETE",
            "d": { "id": "1", "unavailable": true }
        })))
        .await
        .expect("guild delete");

    assert!(!herald.services().has_local_service("welcome", GuildId(1)));
    assert_eq!(stops.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unavailable_guild_create_does_not_start_services() {
    let stops = Arc::new(AtomicUsize::new(0));
    let herald = herald_with_welcome(&stops);

    herald
        .handle_event(event(json!({
            "t": "GUILD_CREATE",
            "d": { "id": "1", "unavailable": true }
        })))
        .await
        .expect("guild create");

    assert!(!herald.services().has_local_service("welcome", GuildId(1)));
}

#[tokio::test]
async fn test_message_update_without_author_is_dropped() {
    let stops = Arc::new(AtomicUsize::new(0));
    let herald = herald_with_welcome(&stops);

    herald
        .handle_event(event(json!({
            "t": "MESSAGE_CREATE",
            "d": {
                "id": "50",
                "channel_id": "10",
                "content": "hello",
                "author": { "id": "5", "username": "ada" }
            }
        })))
        .await
        .expect("message create");
    herald
        .handle_event(event(json!({
            "t": "MESSAGE_UPDATE",
            "d": { "id": "50", "channel_id": "10", "embeds": [{ "type": "image" }] }
        })))
        .await
        .expect("message update");

    let message = herald.cache().message(MessageId(50)).expect("message cached");
    assert_eq!(message.content, "hello");
    assert!(herald.cache().previous_message(MessageId(50)).is_none());
}

#[tokio::test]
async fn test_message_caches_author_and_attachments() {
    let stops = Arc::new(AtomicUsize::new(0));
    let herald = herald_with_welcome(&stops);

    herald
        .handle_event(event(json!({
            "t": "MESSAGE_CREATE",
            "d": {
                "id": "50",
                "channel_id": "10",
                "author": { "id": "5", "username": "ada" },
                "attachments": [{
                    "id": "70",
                    "url": "https://cdn.example/70.png",
                    "filename": "70.png",
                    "size": 4
                }]
            }
        })))
        .await
        .expect("message create");

    assert!(herald.cache().user(UserId(5)).is_some());
    assert!(herald.cache().attachment(AttachmentId(70)).is_some());
}

#[tokio::test]
async fn test_role_event_fills_in_guild() {
    let stops = Arc::new(AtomicUsize::new(0));
    let herald = herald_with_welcome(&stops);

    herald
        .handle_event(event(json!({ "t": "GUILD_CREATE", "d": { "id": "1" } })))
        .await
        .expect("guild create");
    herald
        .handle_event(event(json!({
            "t": "GUILD_ROLE_CREATE",
            "d": { "guild_id": "1", "role": { "id": "100", "name": "Moderator" } }
        })))
        .await
        .expect("role create");

    assert_eq!(herald.cache().guild_roles(GuildId(1)).len(), 1);
}

#[tokio::test]
async fn test_shutdown_stops_every_tenant() {
    let stops = Arc::new(AtomicUsize::new(0));
    let herald = herald_with_welcome(&stops);
    herald.start().await.expect("start");

    for id in ["1", "2", "3"] {
        herald
            .handle_event(event(json!({ "t": "GUILD_CREATE", "d": { "id": id } })))
            .await
            .expect("guild create");
    }
    herald.shutdown().await.expect("shutdown");

    assert_eq!(stops.load(Ordering::SeqCst), 3);
    assert_eq!(herald.services().live_count(), 0);
}
