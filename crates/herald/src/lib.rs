//! Herald - a live Discord entity cache with per-guild service orchestration.
//!
//! Herald mirrors the entities a Discord gateway connection reports (guilds,
//! channels, users, members, messages, attachments, roles and voice states)
//! into an in-memory cache, and runs application services either once per
//! process or once per guild.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use herald::{GatewayEvent, Herald, HeraldConfig, ServiceRegistry};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = HeraldConfig::load()?;
//!     let herald = Herald::new(&config, ServiceRegistry::new(), &tracing::Span::current())?;
//!     herald.start().await?;
//!
//!     let event: GatewayEvent = serde_json::from_str(
//!         r#"{"t": "GUILD_CREATE", "d": {"id": "1", "name": "Herald HQ"}}"#,
//!     )?;
//!     herald.handle_event(event).await?;
//!
//!     println!("{}", herald.cache().stats());
//!     herald.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Cargo Features
//!
//! - `otel` - OpenTelemetry span export to stdout
//!
//! # Architecture
//!
//! - `herald_error` - Error types
//! - `herald_core` - Entity models and identifiers
//! - `herald_cache` - Entity cache and attachment enrichment
//! - `herald_services` - Service registry and lifecycle orchestration
//!
//! This crate re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod config;
mod event;
pub mod observability;
mod replay;

pub use client::Herald;
pub use config::{DEFAULT_USER_AGENT, DISCORD_SECRET_VARIABLE, HeraldConfig};
pub use event::{Dispatch, GatewayEvent, RoleEvent, UnavailableGuild};
pub use replay::{Replay, ReplaySummary};

pub use herald_cache::*;
pub use herald_core::*;
pub use herald_error::*;
pub use herald_services::*;
