//! Tests for attachment enrichment and its deduplication.

use async_trait::async_trait;
use bytes::Bytes;
use herald_cache::{AttachmentFetcher, EnrichmentOutcome, EntityCache, EntityCacheConfig};
use herald_core::{Attachment, AttachmentId};
use herald_error::{CacheError, CacheErrorKind, CacheResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Fetcher that counts calls and can be told to fail its first calls.
struct CountingFetcher {
    calls: AtomicUsize,
    failures: usize,
}

impl CountingFetcher {
    fn new() -> Self {
        Self::failing(0)
    }

    fn failing(failures: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            failures,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AttachmentFetcher for CountingFetcher {
    async fn fetch(&self, url: &str) -> CacheResult<Bytes> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        // Let any concurrent request run while this one is in flight.
        tokio::time::sleep(Duration::from_millis(20)).await;
        if call < self.failures {
            return Err(CacheError::new(CacheErrorKind::HttpStatus {
                url: url.to_string(),
                status: 503,
            }));
        }
        Ok(Bytes::from_static(b"\x89PNG"))
    }
}

fn attachment(id: u64) -> Attachment {
    Attachment::new(
        AttachmentId(id),
        format!("https://cdn.example/{id}.png"),
        format!("{id}.png"),
    )
}

fn cache_with(fetcher: Arc<CountingFetcher>) -> EntityCache {
    EntityCache::new(
        fetcher,
        EntityCacheConfig::default(),
        &tracing::Span::none(),
    )
}

#[tokio::test]
async fn test_concurrent_enrichment_fetches_once() {
    let fetcher = Arc::new(CountingFetcher::new());
    let cache = cache_with(Arc::clone(&fetcher));

    let (first, second) = tokio::join!(
        cache.enrich_attachment(attachment(1)),
        cache.enrich_attachment(attachment(1)),
    );

    assert_eq!(fetcher.calls(), 1);
    assert!(first.is_stored());
    assert!(matches!(second, EnrichmentOutcome::InFlight));

    let stored = cache.attachment(AttachmentId(1)).expect("attachment stored");
    assert_eq!(stored.content, Some(Bytes::from_static(b"\x89PNG")));
    assert_eq!(cache.stats().attachments, 1);
    assert!(!cache.is_fetching(AttachmentId(1)));
}

#[tokio::test]
async fn test_stored_attachment_is_not_refetched() {
    let fetcher = Arc::new(CountingFetcher::new());
    let cache = cache_with(Arc::clone(&fetcher));

    assert!(cache.enrich_attachment(attachment(1)).await.is_stored());
    let again = cache.enrich_attachment(attachment(1)).await;

    assert!(matches!(again, EnrichmentOutcome::AlreadyCached));
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn test_failed_fetch_is_retried_on_next_occurrence() {
    let fetcher = Arc::new(CountingFetcher::failing(1));
    let cache = cache_with(Arc::clone(&fetcher));

    let failed = cache.enrich_attachment(attachment(1)).await;
    match failed {
        EnrichmentOutcome::Failed(e) => {
            assert!(matches!(e.kind, CacheErrorKind::HttpStatus { status: 503, .. }))
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(cache.attachment(AttachmentId(1)).is_none());
    assert!(!cache.is_fetching(AttachmentId(1)));

    assert!(cache.enrich_attachment(attachment(1)).await.is_stored());
    assert_eq!(fetcher.calls(), 2);
}

#[tokio::test]
async fn test_cache_attachment_enriches_in_background() {
    let fetcher = Arc::new(CountingFetcher::new());
    let cache = cache_with(Arc::clone(&fetcher));

    let returned = cache.cache_attachment(attachment(1));
    cache.cache_attachment(attachment(1));
    assert!(returned.content.is_none());
    assert!(cache.is_fetching(AttachmentId(1)));

    for _ in 0..100 {
        if cache.attachment(AttachmentId(1)).is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert!(
        cache
            .attachment(AttachmentId(1))
            .is_some_and(|a| a.is_enriched())
    );
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn test_disabled_enrichment_stores_without_content() {
    let fetcher = Arc::new(CountingFetcher::new());
    let cache = EntityCache::new(
        Arc::clone(&fetcher) as Arc<dyn AttachmentFetcher>,
        EntityCacheConfig::default().with_fetch_attachments(false),
        &tracing::Span::none(),
    );

    cache.cache_attachment(attachment(1));

    let stored = cache.attachment(AttachmentId(1)).expect("attachment stored");
    assert!(!stored.is_enriched());
    assert_eq!(fetcher.calls(), 0);
}

#[test]
fn test_cache_attachment_without_runtime_is_skipped() {
    let fetcher = Arc::new(CountingFetcher::new());
    let cache = cache_with(Arc::clone(&fetcher));

    cache.cache_attachment(attachment(1));

    assert!(cache.attachment(AttachmentId(1)).is_none());
    assert!(!cache.is_fetching(AttachmentId(1)));
    assert_eq!(fetcher.calls(), 0);
}
