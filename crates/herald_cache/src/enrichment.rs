//! Attachment enrichment.
//!
//! When an attachment is first seen, its file is downloaded and stored with
//! the attachment. Each identifier is fetched at most once at a time: an
//! in-flight set guards against duplicate concurrent fetches, and the store
//! itself guards against refetching completed ones.

use async_trait::async_trait;
use bytes::Bytes;
use herald_core::{Attachment, AttachmentId};
use herald_error::{CacheError, CacheErrorKind, CacheResult};
use parking_lot::{Mutex, RwLock};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::EntityStore;

/// Outbound fetch capability used to download attachment content.
#[async_trait]
pub trait AttachmentFetcher: Send + Sync {
    /// Download the resource at `url`.
    async fn fetch(&self, url: &str) -> CacheResult<Bytes>;
}

/// [`AttachmentFetcher`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Build a fetcher that identifies itself with `user_agent`.
    pub fn new(user_agent: &str) -> CacheResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| CacheError::new(CacheErrorKind::ClientBuild(e.to_string())))?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AttachmentFetcher for ReqwestFetcher {
    #[instrument(skip(self), level = "debug")]
    async fn fetch(&self, url: &str) -> CacheResult<Bytes> {
        let response = self.client.get(url).send().await.map_err(|e| {
            CacheError::new(CacheErrorKind::Fetch {
                url: url.to_string(),
                message: e.to_string(),
            })
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CacheError::new(CacheErrorKind::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }));
        }

        response.bytes().await.map_err(|e| {
            CacheError::new(CacheErrorKind::Fetch {
                url: url.to_string(),
                message: e.to_string(),
            })
        })
    }
}

/// Result of an enrichment request.
#[derive(Debug, Clone)]
pub enum EnrichmentOutcome {
    /// The file was downloaded and the attachment stored.
    Stored,
    /// The attachment was already stored; nothing was fetched.
    AlreadyCached,
    /// Another request for the same attachment is in flight; nothing was fetched.
    InFlight,
    /// The download failed. The attachment may be retried later.
    Failed(CacheError),
}

impl EnrichmentOutcome {
    /// Check if this request stored the attachment.
    pub fn is_stored(&self) -> bool {
        matches!(self, Self::Stored)
    }

    /// Check if this request was skipped as a duplicate.
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::AlreadyCached | Self::InFlight)
    }
}

/// Marks an attachment as in flight until dropped.
///
/// Dropping the guard clears the marker, including when the owning task is
/// cancelled mid-fetch.
#[derive(Debug)]
pub struct InFlightGuard {
    id: AttachmentId,
    in_flight: Arc<Mutex<HashSet<AttachmentId>>>,
}

impl InFlightGuard {
    /// The reserved attachment.
    pub fn id(&self) -> AttachmentId {
        self.id
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.lock().remove(&self.id);
    }
}

/// Deduplicating attachment downloader.
pub struct AttachmentEnricher {
    fetcher: Arc<dyn AttachmentFetcher>,
    in_flight: Arc<Mutex<HashSet<AttachmentId>>>,
}

impl std::fmt::Debug for AttachmentEnricher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttachmentEnricher")
            .field("in_flight", &self.in_flight.lock().len())
            .finish_non_exhaustive()
    }
}

impl AttachmentEnricher {
    /// Create an enricher downloading through `fetcher`.
    pub fn new(fetcher: Arc<dyn AttachmentFetcher>) -> Self {
        Self {
            fetcher,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Check if an attachment is currently being fetched.
    pub fn is_in_flight(&self, id: AttachmentId) -> bool {
        self.in_flight.lock().contains(&id)
    }

    /// Number of attachments currently being fetched.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.lock().len()
    }

    /// Reserve an attachment for fetching.
    ///
    /// Fails with the reason to skip if the attachment is already stored or
    /// already in flight. The in-flight lock is held across the store check;
    /// completed fetches write the store before releasing their marker, so
    /// one of the two checks always observes a concurrent request.
    pub fn reserve(
        &self,
        store: &RwLock<EntityStore>,
        id: AttachmentId,
    ) -> Result<InFlightGuard, EnrichmentOutcome> {
        let mut in_flight = self.in_flight.lock();
        if store.read().has_attachment(id) {
            return Err(EnrichmentOutcome::AlreadyCached);
        }
        if !in_flight.insert(id) {
            return Err(EnrichmentOutcome::InFlight);
        }
        Ok(InFlightGuard {
            id,
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    /// Download a reserved attachment and store it.
    #[instrument(skip_all, fields(attachment_id = %attachment.id, url = %attachment.url))]
    pub async fn fetch_reserved(
        &self,
        store: &RwLock<EntityStore>,
        guard: InFlightGuard,
        mut attachment: Attachment,
    ) -> EnrichmentOutcome {
        debug!("Fetching attachment");

        let outcome = match self.fetcher.fetch(&attachment.url).await {
            Ok(content) => {
                debug!(bytes = content.len(), "Attachment fetched");
                attachment.content = Some(content);
                store.write().insert_attachment(attachment);
                EnrichmentOutcome::Stored
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch attachment, it will be retried on its next occurrence");
                EnrichmentOutcome::Failed(e)
            }
        };

        drop(guard);
        outcome
    }

    /// Download and store an attachment unless it is stored or in flight.
    pub async fn enrich(
        &self,
        store: &RwLock<EntityStore>,
        attachment: Attachment,
    ) -> EnrichmentOutcome {
        match self.reserve(store, attachment.id) {
            Ok(guard) => self.fetch_reserved(store, guard, attachment).await,
            Err(skipped) => {
                debug!(attachment_id = %attachment.id, outcome = ?skipped, "Skipping attachment fetch");
                skipped
            }
        }
    }
}
