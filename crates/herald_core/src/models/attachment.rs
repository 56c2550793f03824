//! Message attachment models.

use crate::{AttachmentId, Keyed};
use bytes::Bytes;
use derive_setters::Setters;
use serde::{Deserialize, Serialize};

/// A file attached to a message.
///
/// `content` is filled in by the cache's enrichment step once the file has
/// been downloaded; it is never part of the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Setters)]
#[setters(prefix = "with_", strip_option, into)]
pub struct Attachment {
    /// Attachment ID
    #[setters(skip)]
    pub id: AttachmentId,
    /// Source URL of the file
    pub url: String,
    /// Name of the file
    pub filename: String,
    /// Media type of the file
    #[serde(default)]
    pub content_type: Option<String>,
    /// Size of the file in bytes
    #[serde(default)]
    pub size: u64,
    /// Downloaded file content
    #[serde(skip)]
    pub content: Option<Bytes>,
}

impl Attachment {
    /// Create an attachment that has not been downloaded yet.
    pub fn new(id: AttachmentId, url: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
            filename: filename.into(),
            content_type: None,
            size: 0,
            content: None,
        }
    }

    /// Check if the file content has been downloaded.
    pub fn is_enriched(&self) -> bool {
        self.content.is_some()
    }
}

impl Keyed for Attachment {
    type Key = AttachmentId;

    fn key(&self) -> AttachmentId {
        self.id
    }
}
