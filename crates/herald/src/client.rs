//! The Herald client: gateway event dispatch into the cache and services.

use herald_cache::{AttachmentFetcher, EntityCache, EntityCacheConfig, ReqwestFetcher};
use herald_core::{Guild, GuildId, Message};
use herald_error::HeraldResult;
use herald_services::{ServiceOrchestrator, ServiceRegistry};
use std::sync::Arc;
use tracing::{Span, debug, info, instrument};

use crate::{GatewayEvent, HeraldConfig};

/// Glue between the gateway transport, the entity cache and the services.
///
/// The transport decodes each gateway payload into a [`GatewayEvent`] and
/// hands it to [`handle_event`](Self::handle_event). Entities are merged into
/// the cache, nested ones included, and guild availability changes start or
/// stop that guild's local services.
///
/// # Example
///
/// ```no_run
/// use herald::{GatewayEvent, Herald, HeraldConfig};
/// use herald_services::ServiceRegistry;
///
/// # async fn run(events: Vec<GatewayEvent>) -> Result<(), Box<dyn std::error::Error>> {
/// let config = HeraldConfig::load()?;
/// let herald = Herald::new(&config, ServiceRegistry::new(), &tracing::Span::current())?;
///
/// herald.start().await?;
/// for event in events {
///     herald.handle_event(event).await?;
/// }
/// herald.shutdown().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Herald {
    cache: EntityCache,
    services: ServiceOrchestrator,
    span: Span,
}

impl Herald {
    /// Build a client downloading attachments over HTTP.
    pub fn new(
        config: &HeraldConfig,
        registry: ServiceRegistry,
        parent: &Span,
    ) -> HeraldResult<Self> {
        let fetcher = ReqwestFetcher::new(config.user_agent())?;
        Ok(Self::with_fetcher(
            Arc::new(fetcher),
            config.cache_config(),
            registry,
            parent,
        ))
    }

    /// Build a client around a custom attachment fetcher.
    pub fn with_fetcher(
        fetcher: Arc<dyn AttachmentFetcher>,
        cache_config: EntityCacheConfig,
        registry: ServiceRegistry,
        parent: &Span,
    ) -> Self {
        let span = tracing::info_span!(parent: parent, "herald");
        let cache = EntityCache::new(fetcher, cache_config, &span);
        let services = ServiceOrchestrator::new(registry, cache.clone(), &span);
        Self {
            cache,
            services,
            span,
        }
    }

    /// The entity cache.
    pub fn cache(&self) -> &EntityCache {
        &self.cache
    }

    /// The service orchestrator.
    pub fn services(&self) -> &ServiceOrchestrator {
        &self.services
    }

    /// Start global services.
    pub async fn start(&self) -> HeraldResult<()> {
        self.services.setup().await?;
        Ok(())
    }

    /// Stop every service.
    pub async fn shutdown(&self) -> HeraldResult<()> {
        self.services.teardown().await?;
        Ok(())
    }

    /// Apply one gateway event.
    ///
    /// Cache merges never fail; errors come from starting or stopping a
    /// guild's services.
    #[instrument(parent = &self.span, skip_all, level = "debug", fields(event = event.name()))]
    pub async fn handle_event(&self, event: GatewayEvent) -> HeraldResult<()> {
        match event {
            GatewayEvent::GuildCreate(guild) => {
                let guild_id = guild.id;
                let available = !guild.unavailable;
                self.guild_create(guild);
                if available {
                    self.services.start_for_tenant(guild_id).await?;
                }
            }
            GatewayEvent::GuildUpdate(guild) => {
                self.cache_guild(guild);
            }
            GatewayEvent::GuildDelete(deleted) => {
                if deleted.unavailable {
                    info!(guild_id = %deleted.id, "Guild became unavailable");
                } else {
                    info!(guild_id = %deleted.id, "Removed from guild");
                }
                self.services.stop_for_tenant(deleted.id).await?;
            }
            GatewayEvent::ChannelCreate(channel)
            | GatewayEvent::ChannelUpdate(channel)
            | GatewayEvent::ThreadCreate(channel)
            | GatewayEvent::ThreadUpdate(channel) => {
                self.cache.cache_channel(channel);
            }
            GatewayEvent::GuildMemberAdd(member) | GatewayEvent::GuildMemberUpdate(member) => {
                if let Some(user) = &member.user {
                    self.cache.cache_user(user.clone());
                }
                self.cache.cache_member(member);
            }
            GatewayEvent::GuildRoleCreate(event) | GatewayEvent::GuildRoleUpdate(event) => {
                self.cache.cache_role(event.into_role());
            }
            GatewayEvent::MessageCreate(message) => {
                self.cache_message(message);
            }
            GatewayEvent::MessageUpdate(message) => {
                // Embed resolution produces author-less updates; they carry nothing new.
                if message.author.is_none() {
                    debug!(message_id = %message.id, "Dropping message update without author");
                    return Ok(());
                }
                self.cache_message(message);
            }
            GatewayEvent::VoiceStateUpdate(state) => {
                self.cache.cache_voice_state(state);
            }
            GatewayEvent::UserUpdate(user) => {
                self.cache.cache_user(user);
            }
        }
        Ok(())
    }

    /// Merge a guild and apply its member count when it is first seen.
    fn guild_create(&self, guild: Guild) {
        let guild_id: GuildId = guild.id;
        let first_seen = !self.cache.has_guild(guild_id);
        let member_count = guild.member_count;

        self.cache_guild(guild);

        if first_seen && member_count > 0 {
            self.cache.set_member_count(guild_id, member_count);
        }
    }

    fn cache_guild(&self, guild: Guild) {
        for user in guild.members.values().filter_map(|member| member.user.as_ref()) {
            self.cache.cache_user(user.clone());
        }
        self.cache.cache_guild(guild);
    }

    fn cache_message(&self, message: Message) {
        if let Some(author) = &message.author {
            self.cache.cache_user(author.clone());
        }
        for attachment in &message.attachments {
            self.cache.cache_attachment(attachment.clone());
        }
        self.cache.cache_message(message);
    }
}
