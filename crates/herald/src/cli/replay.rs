//! Replay command handler.

use herald::{
    DEFAULT_USER_AGENT, EntityCacheConfig, Herald, Replay, ReqwestFetcher, ServiceRegistry,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, instrument, warn};

const FETCH_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Feed a file of newline-delimited gateway frames through a fresh client.
#[instrument(skip_all, fields(file = %file.display()))]
pub async fn replay(file: &Path, fetch_attachments: bool) -> Result<(), Box<dyn std::error::Error>> {
    let fetcher = Arc::new(ReqwestFetcher::new(DEFAULT_USER_AGENT)?);
    let herald = Herald::with_fetcher(
        fetcher,
        EntityCacheConfig::default().with_fetch_attachments(fetch_attachments),
        ServiceRegistry::new(),
        &tracing::Span::current(),
    );
    herald.start().await?;

    let reader = BufReader::new(tokio::fs::File::open(file).await?);
    let mut lines = reader.lines();
    let mut replay = Replay::new(&herald);

    while let Some(line) = lines.next_line().await? {
        replay.feed(&line).await?;
    }
    let summary = replay.summary();
    info!(
        applied = summary.applied,
        skipped = summary.skipped,
        "Replay finished"
    );

    if tokio::time::timeout(FETCH_DRAIN_TIMEOUT, drain_fetches(&herald))
        .await
        .is_err()
    {
        warn!("Gave up waiting for attachment downloads");
    }

    println!("{summary}");
    println!("{}", herald.cache().stats());
    herald.shutdown().await?;
    Ok(())
}

async fn drain_fetches(herald: &Herald) {
    while herald.cache().stats().pending_fetches > 0 {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
