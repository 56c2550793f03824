//! Service lifecycle orchestration.

use futures::future::join_all;
use herald_cache::EntityCache;
use herald_core::GuildId;
use herald_error::{ServiceError, ServiceResult};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{Span, debug, error, info, instrument, warn};

use crate::registry::ServiceHandle;
use crate::{LocalContext, Service, ServiceRegistry, ServiceState};

/// Drives service start/stop across the process and per guild.
///
/// Global services are started once by [`setup`](Self::setup). Local services
/// are started when a guild becomes available and stopped when it goes away.
/// [`teardown`](Self::teardown) stops everything.
///
/// Within one phase all lifecycle calls run concurrently. The registry lock is
/// never held across a service's `start` or `stop`; instances sit in the
/// `Starting`/`Stopping` states meanwhile, so overlapping calls cannot start or
/// stop the same instance twice. A stop that reaches an instance still
/// starting flags it, and the start batch stops it instead of marking it
/// running.
#[derive(Debug, Clone)]
pub struct ServiceOrchestrator {
    registry: Arc<RwLock<ServiceRegistry>>,
    cache: EntityCache,
    span: Span,
}

impl ServiceOrchestrator {
    /// Create an orchestrator over the services in `registry`.
    pub fn new(registry: ServiceRegistry, cache: EntityCache, parent: &Span) -> Self {
        let span = tracing::info_span!(parent: parent, "services");
        Self {
            registry: Arc::new(RwLock::new(registry)),
            cache,
            span,
        }
    }

    /// Start every registered global service.
    ///
    /// If any start fails, the services that did start are stopped again and
    /// the first error is returned.
    #[instrument(parent = &self.span, skip(self))]
    pub async fn setup(&self) -> ServiceResult<()> {
        info!("Setting up services");

        let batch = self.registry.write().reserve_global_starts();
        info!(count = batch.len(), "Starting global services");
        self.start_batch(batch).await?;

        info!("Services set up");
        Ok(())
    }

    /// Stop every running global service, then every running local instance.
    ///
    /// The local phase runs even if the global phase fails; the first error
    /// is returned.
    #[instrument(parent = &self.span, skip(self))]
    pub async fn teardown(&self) -> ServiceResult<()> {
        info!("Tearing down services");

        let globals = self.registry.write().reserve_global_stops();
        info!(
            count = globals.handles.len(),
            deferred = globals.deferred,
            "Stopping global services"
        );
        let global_result = self.stop_batch(globals.handles).await;

        let locals = self.registry.write().reserve_all_local_stops();
        info!(
            count = locals.handles.len(),
            deferred = locals.deferred,
            "Stopping all local services"
        );
        let local_result = self.stop_batch(locals.handles).await;

        global_result.and(local_result)?;
        info!("Services torn down");
        Ok(())
    }

    /// Create and start the guild's local services.
    ///
    /// Services already starting or running on the guild are left alone.
    #[instrument(parent = &self.span, skip_all, fields(%guild_id))]
    pub async fn start_for_tenant(&self, guild_id: GuildId) -> ServiceResult<()> {
        let guild = self.cache.diagnostics().guild_id(guild_id);

        let batch = {
            let mut registry = self.registry.write();
            if !registry.has_local_factories() {
                info!("There were no local services to start on {guild}");
                return Ok(());
            }
            let context = LocalContext::new(guild_id, self.cache.clone(), &self.span);
            registry.reserve_local_starts(&context)
        };

        if batch.is_empty() {
            debug!("Local services on {guild} are already running");
            return Ok(());
        }

        info!(count = batch.len(), "Starting local services on {guild}");
        self.start_batch(batch).await?;
        info!("Local services on {guild} started");
        Ok(())
    }

    /// Stop the guild's running local services and discard them.
    #[instrument(parent = &self.span, skip_all, fields(%guild_id))]
    pub async fn stop_for_tenant(&self, guild_id: GuildId) -> ServiceResult<()> {
        let guild = self.cache.diagnostics().guild_id(guild_id);

        let batch = self.registry.write().reserve_local_stops(guild_id);
        if batch.is_empty() {
            info!("There were no local services to stop on {guild}");
            return Ok(());
        }
        if batch.deferred > 0 {
            info!(
                count = batch.deferred,
                "Local services on {guild} will stop once their start completes"
            );
        }

        info!(count = batch.handles.len(), "Stopping local services on {guild}");
        self.stop_batch(batch.handles).await?;
        info!("Local services on {guild} stopped");
        Ok(())
    }

    /// Check if a global service is registered.
    pub fn has_global_service(&self, name: &str) -> bool {
        self.registry.read().has_global_service(name)
    }

    /// Check if a local service is running on a guild.
    pub fn has_local_service(&self, name: &str, guild_id: GuildId) -> bool {
        self.registry.read().has_local_service(name, guild_id)
    }

    /// A registered global service.
    pub fn global<T>(&self, name: &str) -> ServiceResult<Arc<T>>
    where
        T: Service + 'static,
    {
        self.registry.read().global(name)
    }

    /// A local service running on a guild.
    pub fn local<T>(&self, name: &str, guild_id: GuildId) -> ServiceResult<Arc<T>>
    where
        T: Service + 'static,
    {
        self.registry.read().local(name, guild_id)
    }

    /// Run `f` against the registry under a read lock.
    pub fn registry<R>(&self, f: impl FnOnce(&ServiceRegistry) -> R) -> R {
        f(&self.registry.read())
    }

    /// Number of instances starting, running or stopping.
    pub fn live_count(&self) -> usize {
        self.registry.read().live_count()
    }

    async fn start_batch(&self, batch: Vec<ServiceHandle>) -> ServiceResult<()> {
        let results = join_all(batch.iter().map(|handle| handle.service.start())).await;

        let mut started = Vec::new();
        let mut cancelled = Vec::new();
        let mut first_error: Option<ServiceError> = None;
        {
            let mut registry = self.registry.write();
            for (handle, result) in batch.into_iter().zip(results) {
                match result {
                    Ok(()) if registry.take_stop_request(&handle) => {
                        registry.set_state(&handle, ServiceState::Stopping);
                        cancelled.push(handle);
                    }
                    Ok(()) => started.push(handle),
                    Err(e) => {
                        error!(service = %handle.name, scope = %handle.scope, error = %e, "Service failed to start");
                        registry.release(&handle);
                        first_error.get_or_insert(e);
                    }
                }
            }

            let state = if first_error.is_some() {
                ServiceState::Stopping
            } else {
                ServiceState::Running
            };
            for handle in &started {
                registry.set_state(handle, state);
            }
        }

        if !cancelled.is_empty() {
            info!(
                count = cancelled.len(),
                "Stopping services whose stop was requested while starting"
            );
            if let Err(e) = self.stop_batch(cancelled).await {
                warn!(error = %e, "Deferred stop did not stop every service cleanly");
            }
        }

        let Some(e) = first_error else {
            for handle in &started {
                debug!(service = %handle.name, scope = %handle.scope, "Service started");
            }
            return Ok(());
        };

        if !started.is_empty() {
            warn!(count = started.len(), "Rolling back services started in the failed batch");
            if let Err(rollback) = self.stop_batch(started).await {
                warn!(error = %rollback, "Rollback did not stop every service cleanly");
            }
        }
        Err(e)
    }

    async fn stop_batch(&self, batch: Vec<ServiceHandle>) -> ServiceResult<()> {
        let results = join_all(batch.iter().map(|handle| handle.service.stop())).await;

        let mut first_error: Option<ServiceError> = None;
        let mut registry = self.registry.write();
        for (handle, result) in batch.iter().zip(results) {
            registry.release(handle);
            match result {
                Ok(()) => debug!(service = %handle.name, scope = %handle.scope, "Service stopped"),
                Err(e) => {
                    error!(service = %handle.name, scope = %handle.scope, error = %e, "Service failed to stop");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
