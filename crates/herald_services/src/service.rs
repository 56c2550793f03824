//! The service capability and the context local services are created with.

use async_trait::async_trait;
use derive_getters::Getters;
use herald_cache::EntityCache;
use herald_core::{Guild, GuildId};
use herald_error::ServiceResult;
use tracing::Span;

/// A long-lived component with an explicit start/stop lifecycle.
///
/// Services are registered with a [`ServiceRegistry`](crate::ServiceRegistry)
/// either as a single global instance or as a factory producing one instance
/// per guild. The orchestrator guarantees `start` and `stop` are each called
/// at most once per instance, and never concurrently with each other.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use herald_error::ServiceResult;
/// use herald_services::Service;
///
/// struct Heartbeat;
///
/// #[async_trait]
/// impl Service for Heartbeat {
///     fn name(&self) -> &str {
///         "heartbeat"
///     }
///
///     async fn start(&self) -> ServiceResult<()> {
///         Ok(())
///     }
///
///     async fn stop(&self) -> ServiceResult<()> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Service: Send + Sync {
    /// Name the service is registered and looked up under.
    fn name(&self) -> &str;

    /// Bring the service up.
    async fn start(&self) -> ServiceResult<()>;

    /// Shut the service down.
    async fn stop(&self) -> ServiceResult<()>;
}

/// Where a service instance lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ServiceScope {
    /// One instance for the whole process.
    #[display("global")]
    Global,
    /// One instance per guild.
    #[display("local to guild {_0}")]
    Local(GuildId),
}

impl ServiceScope {
    /// The guild a local scope belongs to.
    pub fn guild_id(&self) -> Option<GuildId> {
        match self {
            Self::Global => None,
            Self::Local(guild_id) => Some(*guild_id),
        }
    }
}

/// Everything a local service factory gets to build a guild's instance.
#[derive(Debug, Clone, Getters)]
pub struct LocalContext {
    /// Guild the instance is created for
    guild_id: GuildId,
    /// Shared entity cache
    cache: EntityCache,
    /// Span for the instance's log records
    span: Span,
}

impl LocalContext {
    pub(crate) fn new(guild_id: GuildId, cache: EntityCache, parent: &Span) -> Self {
        let span = tracing::info_span!(parent: parent, "local_service", %guild_id);
        Self {
            guild_id,
            cache,
            span,
        }
    }

    /// Current view of the owning guild, if it is cached.
    pub fn guild(&self) -> Option<Guild> {
        self.cache.guild(self.guild_id)
    }

    /// Human-readable description of the owning guild for log records.
    pub fn describe_guild(&self) -> String {
        self.cache.diagnostics().guild_id(self.guild_id)
    }
}
