//! Service registry and lifecycle orchestration for Herald.
//!
//! A [`Service`] is anything with an asynchronous start/stop lifecycle.
//! Services are registered with a [`ServiceRegistry`] either as one global
//! instance or as a factory that builds one instance per guild. The
//! [`ServiceOrchestrator`] starts global services once, starts and stops
//! local services as guilds come and go, and stops everything on teardown.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod orchestrator;
mod registry;
mod service;

pub use orchestrator::ServiceOrchestrator;
pub use registry::{ServiceRegistry, ServiceState};
pub use service::{LocalContext, Service, ServiceScope};
