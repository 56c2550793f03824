//! Entity cache configuration.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Configuration for the entity cache.
#[derive(
    Debug, Clone, Serialize, Deserialize, Getters, derive_setters::Setters, derive_builder::Builder,
)]
#[setters(prefix = "with_")]
pub struct EntityCacheConfig {
    /// Whether attachment content is downloaded when an attachment is first seen
    #[serde(default = "default_fetch_attachments")]
    #[builder(default = "default_fetch_attachments()")]
    fetch_attachments: bool,
}

fn default_fetch_attachments() -> bool {
    true
}

impl Default for EntityCacheConfig {
    fn default() -> Self {
        Self {
            fetch_attachments: default_fetch_attachments(),
        }
    }
}
