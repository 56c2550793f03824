//! Entity cache facade.

use herald_core::{
    Attachment, AttachmentId, Channel, ChannelId, Entity, Guild, GuildId, Member, Message,
    MessageId, Role, RoleId, User, UserId, VoiceState,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{Instrument, Span, debug, instrument, warn};

use crate::{
    AttachmentEnricher, AttachmentFetcher, CacheStats, Diagnostics, EnrichmentOutcome,
    EntityCacheConfig, EntityStore, MemberMerge, VoiceMerge,
};

/// Live mirror of gateway entities.
///
/// Each `cache_*` handler takes a freshly decoded snapshot, merges it into the
/// store and hands the snapshot back unchanged, so the transport can keep
/// using it. Handlers never fail: snapshots whose owning guild is not cached
/// yet are written to the canonical maps only.
///
/// Cloning the cache is cheap and yields a handle to the same store.
///
/// # Example
///
/// ```
/// use herald_cache::{EntityCache, EntityCacheConfig, ReqwestFetcher};
/// use herald_core::{Channel, ChannelId, ChannelKind, Guild, GuildId};
/// use std::sync::Arc;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = Arc::new(ReqwestFetcher::new("Herald")?);
/// let cache = EntityCache::new(fetcher, EntityCacheConfig::default(), &tracing::Span::none());
///
/// cache.cache_guild(Guild::new(GuildId(1)));
/// cache.cache_channel(
///     Channel::new(ChannelId(10), ChannelKind::GuildText).with_guild_id(GuildId(1)),
/// );
///
/// let guild = cache.guild(GuildId(1)).expect("guild is cached");
/// assert!(guild.channels.contains_key(&ChannelId(10)));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct EntityCache {
    store: Arc<RwLock<EntityStore>>,
    enricher: Arc<AttachmentEnricher>,
    config: EntityCacheConfig,
    span: Span,
}

impl EntityCache {
    /// Create an empty cache.
    ///
    /// Log records are emitted under an `entity_cache` span parented to
    /// `parent`.
    pub fn new(
        fetcher: Arc<dyn AttachmentFetcher>,
        config: EntityCacheConfig,
        parent: &Span,
    ) -> Self {
        let span = tracing::info_span!(parent: parent, "entity_cache");
        span.in_scope(|| {
            debug!(
                fetch_attachments = config.fetch_attachments(),
                "Creating entity cache"
            )
        });
        Self {
            store: Arc::new(RwLock::new(EntityStore::new())),
            enricher: Arc::new(AttachmentEnricher::new(fetcher)),
            config,
            span,
        }
    }

    /// The cache's configuration.
    pub fn config(&self) -> &EntityCacheConfig {
        &self.config
    }

    /// The span the cache logs under.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Merge any tagged entity snapshot, dispatching on its kind.
    pub fn apply(&self, entity: Entity) -> Entity {
        match entity {
            Entity::Guild(guild) => Entity::Guild(self.cache_guild(guild)),
            Entity::Channel(channel) => Entity::Channel(self.cache_channel(channel)),
            Entity::User(user) => Entity::User(self.cache_user(user)),
            Entity::Member(member) => Entity::Member(self.cache_member(member)),
            Entity::Message(message) => Entity::Message(self.cache_message(message)),
            Entity::Attachment(attachment) => {
                Entity::Attachment(self.cache_attachment(attachment))
            }
            Entity::Role(role) => Entity::Role(self.cache_role(role)),
            Entity::VoiceState(state) => Entity::VoiceState(self.cache_voice_state(state)),
        }
    }

    // ------------------------------------------------------------------
    // Handlers
    // ------------------------------------------------------------------

    /// Merge a guild snapshot, unioning its sub-collections with the cached
    /// guild and merging each of its channels through [`Self::cache_channel`].
    #[instrument(parent = &self.span, skip_all, level = "debug", fields(guild_id = %guild.id))]
    pub fn cache_guild(&self, guild: Guild) -> Guild {
        self.store.write().merge_guild(&guild);
        debug!(
            channels = guild.channels.len(),
            roles = guild.roles.len(),
            members = guild.members.len(),
            "Cached guild"
        );
        guild
    }

    /// Replace a channel.
    #[instrument(parent = &self.span, skip_all, level = "debug", fields(channel_id = %channel.id))]
    pub fn cache_channel(&self, channel: Channel) -> Channel {
        let mirrored = self.store.write().merge_channel(channel.clone());
        if !mirrored && let Some(guild_id) = channel.guild_id {
            debug!(%guild_id, "Owning guild not cached, channel stored canonically only");
        }
        channel
    }

    /// Replace a user.
    #[instrument(parent = &self.span, skip_all, level = "debug", fields(user_id = %user.id))]
    pub fn cache_user(&self, user: User) -> User {
        self.store.write().merge_user(user.clone());
        user
    }

    /// Upsert a member. Members without a guild ID are dropped.
    #[instrument(parent = &self.span, skip_all, level = "debug", fields(user_id = %member.id))]
    pub fn cache_member(&self, member: Member) -> Member {
        match self.store.write().merge_member(member.clone()) {
            MemberMerge::Dropped => debug!("Member has no guild ID, dropping"),
            MemberMerge::Stored { mirrored: false } => {
                debug!("Owning guild not cached, member stored in per-guild map only")
            }
            MemberMerge::Stored { mirrored: true } => {}
        }
        member
    }

    /// Store a message snapshot, keeping the one it replaces as `previous`.
    #[instrument(parent = &self.span, skip_all, level = "debug", fields(message_id = %message.id))]
    pub fn cache_message(&self, message: Message) -> Message {
        if self.store.write().merge_message(message.clone()) {
            debug!("Rotated previous message snapshot");
        }
        message
    }

    /// Register an attachment, downloading its content in the background.
    ///
    /// Returns immediately. The attachment appears in the cache once its
    /// download completes; attachments already stored or already being
    /// downloaded are skipped. With `fetch_attachments` disabled the
    /// attachment is stored as-is.
    #[instrument(parent = &self.span, skip_all, level = "debug", fields(attachment_id = %attachment.id))]
    pub fn cache_attachment(&self, attachment: Attachment) -> Attachment {
        if !self.config.fetch_attachments() {
            self.store.write().insert_attachment(attachment.clone());
            return attachment;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No async runtime available, attachment will not be fetched");
            return attachment;
        };

        let guard = match self.enricher.reserve(&self.store, attachment.id) {
            Ok(guard) => guard,
            Err(skipped) => {
                debug!(outcome = ?skipped, "Skipping attachment fetch");
                return attachment;
            }
        };

        let store = Arc::clone(&self.store);
        let enricher = Arc::clone(&self.enricher);
        let pending = attachment.clone();
        runtime.spawn(
            async move {
                enricher.fetch_reserved(&store, guard, pending).await;
            }
            .instrument(Span::current()),
        );

        attachment
    }

    /// Download and store an attachment, waiting for the result.
    ///
    /// The awaitable form of [`Self::cache_attachment`], with the same
    /// deduplication.
    pub async fn enrich_attachment(&self, attachment: Attachment) -> EnrichmentOutcome {
        self.enricher
            .enrich(&self.store, attachment)
            .instrument(self.span.clone())
            .await
    }

    /// Replace a role.
    #[instrument(parent = &self.span, skip_all, level = "debug", fields(role_id = %role.id))]
    pub fn cache_role(&self, role: Role) -> Role {
        let mirrored = self.store.write().merge_role(role.clone());
        if !mirrored {
            debug!("Owning guild not cached, role stored canonically only");
        }
        role
    }

    /// Upsert a voice state, or remove it when the user left voice.
    #[instrument(parent = &self.span, skip_all, level = "debug", fields(user_id = %state.user_id))]
    pub fn cache_voice_state(&self, state: VoiceState) -> VoiceState {
        match self.store.write().merge_voice_state(state.clone()) {
            VoiceMerge::GuildNotCached => debug!("Owning guild not cached, ignoring voice state"),
            VoiceMerge::Connected => debug!("User connected to voice"),
            VoiceMerge::Disconnected => debug!("User left voice"),
        }
        state
    }

    /// Set a cached guild's member counter.
    ///
    /// Guild snapshots never change the counter; this is its only update
    /// path. Returns `false` if the guild is not cached.
    pub fn set_member_count(&self, guild_id: GuildId, count: u64) -> bool {
        self.store.write().set_member_count(guild_id, count)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Run `f` against the store under a read lock.
    ///
    /// Do not call back into the cache from `f`.
    pub fn read<R>(&self, f: impl FnOnce(&EntityStore) -> R) -> R {
        f(&self.store.read())
    }

    /// Formatter for log-friendly entity descriptions.
    pub fn diagnostics(&self) -> Diagnostics<'_> {
        Diagnostics::new(self)
    }

    /// Check if a guild is cached.
    pub fn has_guild(&self, id: GuildId) -> bool {
        self.store.read().has_guild(id)
    }

    /// Assembled view of a cached guild.
    pub fn guild(&self, id: GuildId) -> Option<Guild> {
        self.store.read().guild(id)
    }

    /// Channels in a cached guild's view.
    pub fn guild_channels(&self, id: GuildId) -> Vec<Channel> {
        self.store.read().guild_channels(id).cloned().collect()
    }

    /// Roles in a cached guild's view.
    pub fn guild_roles(&self, id: GuildId) -> Vec<Role> {
        self.store.read().guild_roles(id).cloned().collect()
    }

    /// Members in a cached guild's view.
    pub fn guild_members(&self, id: GuildId) -> Vec<Member> {
        self.store.read().guild_members(id).cloned().collect()
    }

    /// Canonical channel.
    pub fn channel(&self, id: ChannelId) -> Option<Channel> {
        self.store.read().channel(id).cloned()
    }

    /// Canonical user.
    pub fn user(&self, id: UserId) -> Option<User> {
        self.store.read().user(id).cloned()
    }

    /// Member of a guild.
    pub fn member(&self, guild_id: GuildId, user_id: UserId) -> Option<Member> {
        self.store.read().member(guild_id, user_id).cloned()
    }

    /// Per-guild member map.
    pub fn members(&self, guild_id: GuildId) -> Option<HashMap<UserId, Member>> {
        self.store.read().members(guild_id).cloned()
    }

    /// Latest snapshot of a message.
    pub fn message(&self, id: MessageId) -> Option<Message> {
        self.store.read().message(id).cloned()
    }

    /// Snapshot immediately prior to the latest one.
    pub fn previous_message(&self, id: MessageId) -> Option<Message> {
        self.store.read().previous_message(id).cloned()
    }

    /// Enriched attachment.
    pub fn attachment(&self, id: AttachmentId) -> Option<Attachment> {
        self.store.read().attachment(id).cloned()
    }

    /// Check if an attachment is being downloaded.
    pub fn is_fetching(&self, id: AttachmentId) -> bool {
        self.enricher.is_in_flight(id)
    }

    /// Canonical role.
    pub fn role(&self, id: RoleId) -> Option<Role> {
        self.store.read().role(id).cloned()
    }

    /// Voice state of a user in a cached guild.
    pub fn voice_state(&self, guild_id: GuildId, user_id: UserId) -> Option<VoiceState> {
        self.store.read().voice_state(guild_id, user_id).cloned()
    }

    /// Sizes of the canonical maps.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.store.read().stats();
        stats.pending_fetches = self.enricher.in_flight_count();
        stats
    }
}
