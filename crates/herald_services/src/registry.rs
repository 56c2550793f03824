//! Typed containers for global and per-guild service instances.

use herald_core::GuildId;
use herald_error::{ServiceError, ServiceErrorKind, ServiceResult};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::{LocalContext, Service, ServiceScope};

type AnyService = Arc<dyn Any + Send + Sync>;
type LocalFactory = Box<dyn Fn(LocalContext) -> (Arc<dyn Service>, AnyService) + Send + Sync>;

/// Lifecycle state of a service instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ServiceState {
    /// Registered but not running. Only global services rest here; local
    /// instances are removed instead.
    #[display("stopped")]
    Stopped,
    /// `start` is in progress.
    #[display("starting")]
    Starting,
    /// `start` succeeded.
    #[display("running")]
    Running,
    /// `stop` is in progress.
    #[display("stopping")]
    Stopping,
}

/// Instances reserved for stopping, plus the number still starting that were
/// flagged to stop as soon as their start completes.
#[derive(Debug, Default)]
pub(crate) struct StopBatch {
    pub(crate) handles: Vec<ServiceHandle>,
    pub(crate) deferred: usize,
}

impl StopBatch {
    fn push(&mut self, slot: &mut Slot, name: &str, scope: ServiceScope) {
        let starting = slot.state == ServiceState::Starting;
        if slot.reserve_stop() {
            self.handles.push(slot.handle(name, scope));
        } else if starting {
            self.deferred += 1;
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.handles.is_empty() && self.deferred == 0
    }
}

/// A service instance handed to the orchestrator for a lifecycle call.
#[derive(Clone)]
pub(crate) struct ServiceHandle {
    pub(crate) name: String,
    pub(crate) scope: ServiceScope,
    pub(crate) service: Arc<dyn Service>,
}

impl std::fmt::Debug for ServiceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceHandle")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

struct Slot {
    service: Arc<dyn Service>,
    any: AnyService,
    state: ServiceState,
    // Set when a stop arrives while `start` is still in progress.
    stop_requested: bool,
}

impl Slot {
    fn new(service: Arc<dyn Service>, any: AnyService, state: ServiceState) -> Self {
        Self {
            service,
            any,
            state,
            stop_requested: false,
        }
    }

    /// Reserve a running slot for stopping, or flag a starting one so its
    /// start batch stops it instead of promoting it. Returns whether the slot
    /// joins the stop batch now.
    fn reserve_stop(&mut self) -> bool {
        match self.state {
            ServiceState::Running => {
                self.state = ServiceState::Stopping;
                true
            }
            ServiceState::Starting => {
                self.stop_requested = true;
                false
            }
            ServiceState::Stopped | ServiceState::Stopping => false,
        }
    }

    fn handle(&self, name: &str, scope: ServiceScope) -> ServiceHandle {
        ServiceHandle {
            name: name.to_string(),
            scope,
            service: Arc::clone(&self.service),
        }
    }
}

/// Global services keyed by name, and local services keyed by name then guild.
///
/// Services are registered up front; the
/// [`ServiceOrchestrator`](crate::ServiceOrchestrator) drives their lifecycle.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use herald_error::ServiceResult;
/// use herald_services::{LocalContext, Service, ServiceRegistry};
///
/// struct Greeter {
///     guild: String,
/// }
///
/// #[async_trait]
/// impl Service for Greeter {
///     fn name(&self) -> &str {
///         "greeter"
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
///
/// let mut registry = ServiceRegistry::new();
/// registry
///     .register_local("greeter", |context: LocalContext| Greeter {
///         guild: context.guild_id().to_string(),
///     })
///     .unwrap();
///
/// assert_eq!(registry.local_service_names(), vec!["greeter"]);
/// ```
#[derive(Default)]
pub struct ServiceRegistry {
    globals: HashMap<String, Slot>,
    factories: Vec<(String, LocalFactory)>,
    locals: HashMap<String, HashMap<GuildId, Slot>>,
}

impl std::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("globals", &self.global_service_names())
            .field("locals", &self.local_service_names())
            .finish()
    }
}

impl ServiceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Register the process-wide instance of a service under its name.
    pub fn register_global<S>(&mut self, service: S) -> ServiceResult<()>
    where
        S: Service + 'static,
    {
        let name = service.name().to_string();
        if self.globals.contains_key(&name) {
            return Err(ServiceError::new(ServiceErrorKind::DuplicateRegistration(
                name,
            )));
        }

        let service = Arc::new(service);
        let any: AnyService = service.clone();
        self.globals
            .insert(name, Slot::new(service, any, ServiceState::Stopped));
        Ok(())
    }

    /// Register a factory building one instance of a service per guild.
    ///
    /// The factory runs while the registry is locked and must not call back
    /// into the orchestrator.
    pub fn register_local<S, F>(&mut self, name: impl Into<String>, factory: F) -> ServiceResult<()>
    where
        S: Service + 'static,
        F: Fn(LocalContext) -> S + Send + Sync + 'static,
    {
        let name = name.into();
        if self.factories.iter().any(|(existing, _)| *existing == name) {
            return Err(ServiceError::new(ServiceErrorKind::DuplicateRegistration(
                name,
            )));
        }

        let factory: LocalFactory = Box::new(move |context| {
            let service = Arc::new(factory(context));
            let any: AnyService = service.clone();
            (service as Arc<dyn Service>, any)
        });
        self.factories.push((name.clone(), factory));
        self.locals.entry(name).or_default();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Names of every registered global service.
    pub fn global_service_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.globals.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Names of every registered local service, in registration order.
    pub fn local_service_names(&self) -> Vec<&str> {
        self.factories.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Check if a global service is registered.
    pub fn has_global_service(&self, name: &str) -> bool {
        self.globals.contains_key(name)
    }

    /// Check if a local service is running on a guild.
    pub fn has_local_service(&self, name: &str, guild_id: GuildId) -> bool {
        self.local_state(name, guild_id) == Some(ServiceState::Running)
    }

    /// Lifecycle state of a global service.
    pub fn global_state(&self, name: &str) -> Option<ServiceState> {
        self.globals.get(name).map(|slot| slot.state)
    }

    /// Lifecycle state of a local service on a guild. `None` when absent.
    pub fn local_state(&self, name: &str, guild_id: GuildId) -> Option<ServiceState> {
        self.locals
            .get(name)
            .and_then(|instances| instances.get(&guild_id))
            .map(|slot| slot.state)
    }

    /// Number of instances in any state other than stopped.
    pub fn live_count(&self) -> usize {
        let globals = self
            .globals
            .values()
            .filter(|slot| slot.state != ServiceState::Stopped)
            .count();
        let locals: usize = self.locals.values().map(HashMap::len).sum();
        globals + locals
    }

    /// Names of the local services running on a guild.
    pub fn running_on(&self, guild_id: GuildId) -> Vec<&str> {
        self.factories
            .iter()
            .map(|(name, _)| name.as_str())
            .filter(|name| self.has_local_service(name, guild_id))
            .collect()
    }

    /// The registered global instance, downcast to its concrete type.
    pub fn global<T>(&self, name: &str) -> ServiceResult<Arc<T>>
    where
        T: Service + 'static,
    {
        let slot = self.globals.get(name).ok_or_else(|| {
            ServiceError::new(ServiceErrorKind::GlobalNotEnabled(name.to_string()))
        })?;
        downcast(name, &slot.any)
    }

    /// The running instance on a guild, downcast to its concrete type.
    pub fn local<T>(&self, name: &str, guild_id: GuildId) -> ServiceResult<Arc<T>>
    where
        T: Service + 'static,
    {
        let slot = self
            .locals
            .get(name)
            .and_then(|instances| instances.get(&guild_id))
            .filter(|slot| slot.state == ServiceState::Running)
            .ok_or_else(|| {
                ServiceError::new(ServiceErrorKind::LocalNotEnabled {
                    service: name.to_string(),
                    guild_id: guild_id.get(),
                })
            })?;
        downcast(name, &slot.any)
    }

    // ------------------------------------------------------------------
    // Lifecycle bookkeeping
    // ------------------------------------------------------------------

    pub(crate) fn has_local_factories(&self) -> bool {
        !self.factories.is_empty()
    }

    /// Move every stopped global to `Starting` and hand them out.
    pub(crate) fn reserve_global_starts(&mut self) -> Vec<ServiceHandle> {
        self.globals
            .iter_mut()
            .filter(|(_, slot)| slot.state == ServiceState::Stopped)
            .map(|(name, slot)| {
                slot.state = ServiceState::Starting;
                slot.handle(name, ServiceScope::Global)
            })
            .collect()
    }

    /// Move every running global to `Stopping` and hand them out. Globals
    /// still starting are flagged to stop once started.
    pub(crate) fn reserve_global_stops(&mut self) -> StopBatch {
        let mut batch = StopBatch::default();
        for (name, slot) in &mut self.globals {
            batch.push(slot, name, ServiceScope::Global);
        }
        batch
    }

    /// Build the guild's missing instances in `Starting` and hand them out.
    ///
    /// Services that already have an instance on the guild, in any state,
    /// are skipped.
    pub(crate) fn reserve_local_starts(&mut self, context: &LocalContext) -> Vec<ServiceHandle> {
        let guild_id = *context.guild_id();
        let scope = ServiceScope::Local(guild_id);
        let mut batch = Vec::new();

        for (name, factory) in &self.factories {
            let instances = self.locals.entry(name.clone()).or_default();
            if instances.contains_key(&guild_id) {
                continue;
            }
            let (service, any) = factory(context.clone());
            let slot = Slot::new(service, any, ServiceState::Starting);
            batch.push(slot.handle(name, scope));
            instances.insert(guild_id, slot);
        }
        batch
    }

    /// Move the guild's running instances to `Stopping` and hand them out.
    /// Instances still starting are flagged to stop once started.
    pub(crate) fn reserve_local_stops(&mut self, guild_id: GuildId) -> StopBatch {
        let scope = ServiceScope::Local(guild_id);
        let mut batch = StopBatch::default();

        for (name, instances) in &mut self.locals {
            if let Some(slot) = instances.get_mut(&guild_id) {
                batch.push(slot, name, scope);
            }
        }
        batch
    }

    /// Reserve every local instance on every guild for stopping.
    pub(crate) fn reserve_all_local_stops(&mut self) -> StopBatch {
        let mut batch = StopBatch::default();

        for (name, instances) in &mut self.locals {
            for (guild_id, slot) in instances.iter_mut() {
                batch.push(slot, name, ServiceScope::Local(*guild_id));
            }
        }
        batch
    }

    /// Clear and return the stop flag of a handed-out instance.
    pub(crate) fn take_stop_request(&mut self, handle: &ServiceHandle) -> bool {
        self.slot_mut(handle)
            .map(|slot| std::mem::take(&mut slot.stop_requested))
            .unwrap_or(false)
    }

    /// Set the state of a handed-out instance.
    pub(crate) fn set_state(&mut self, handle: &ServiceHandle, state: ServiceState) {
        if let Some(slot) = self.slot_mut(handle) {
            slot.state = state;
        }
    }

    /// Return a handed-out instance to rest: globals become `Stopped`, local
    /// instances are removed.
    pub(crate) fn release(&mut self, handle: &ServiceHandle) {
        match handle.scope {
            ServiceScope::Global => {
                if let Some(slot) = self.slot_mut(handle) {
                    slot.state = ServiceState::Stopped;
                    slot.stop_requested = false;
                }
            }
            ServiceScope::Local(guild_id) => {
                if let Some(instances) = self.locals.get_mut(&handle.name) {
                    instances.remove(&guild_id);
                }
            }
        }
    }

    fn slot_mut(&mut self, handle: &ServiceHandle) -> Option<&mut Slot> {
        match handle.scope {
            ServiceScope::Global => self.globals.get_mut(&handle.name),
            ServiceScope::Local(guild_id) => self.locals.get_mut(&handle.name)?.get_mut(&guild_id),
        }
    }
}

fn downcast<T>(name: &str, any: &AnyService) -> ServiceResult<Arc<T>>
where
    T: Service + 'static,
{
    Arc::clone(any).downcast::<T>().map_err(|_| {
        ServiceError::new(ServiceErrorKind::TypeMismatch {
            service: name.to_string(),
            expected: std::any::type_name::<T>(),
        })
    })
}
