//! Volatile mirror of Discord gateway entities.
//!
//! [`EntityCache`] receives decoded entity snapshots from the transport and
//! merges them into an [`EntityStore`] of canonical maps, one per entity kind.
//! Each cached guild's channels, roles and members are views over those maps.
//! Attachments are enriched with their downloaded content the first time they
//! are seen, at most one download per attachment at a time.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod config;
mod diagnostics;
mod enrichment;
mod store;

pub use cache::EntityCache;
pub use config::{EntityCacheConfig, EntityCacheConfigBuilder};
pub use diagnostics::Diagnostics;
pub use enrichment::{
    AttachmentEnricher, AttachmentFetcher, EnrichmentOutcome, InFlightGuard, ReqwestFetcher,
};
pub use store::{CacheStats, EntityStore, MemberMerge, VoiceMerge};
