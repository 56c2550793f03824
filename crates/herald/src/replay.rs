//! Replaying recorded gateway streams through a client.

use herald_error::{HeraldResult, JsonError};
use tracing::debug;

use crate::{Dispatch, Herald};

/// Counts from a replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, derive_more::Display)]
#[display(
    "{} lines read, {} events applied, {} skipped",
    lines,
    applied,
    skipped
)]
pub struct ReplaySummary {
    /// Lines fed, blank ones included
    pub lines: usize,
    /// Events applied to the client
    pub applied: usize,
    /// Unmodelled events and frames without an event name
    pub skipped: usize,
}

/// Feeds newline-delimited gateway frames into a [`Herald`] client.
///
/// Blank lines are ignored and unmodelled events are skipped. Malformed JSON
/// and malformed payloads of modelled events fail with the line number.
#[derive(Debug)]
pub struct Replay<'a> {
    herald: &'a Herald,
    summary: ReplaySummary,
}

impl<'a> Replay<'a> {
    /// Start a replay into `herald`.
    pub fn new(herald: &'a Herald) -> Self {
        Self {
            herald,
            summary: ReplaySummary::default(),
        }
    }

    /// Counts so far.
    pub fn summary(&self) -> ReplaySummary {
        self.summary
    }

    /// Feed the next line of the recording.
    pub async fn feed(&mut self, line: &str) -> HeraldResult<()> {
        self.summary.lines += 1;
        let line_number = self.summary.lines;
        if line.trim().is_empty() {
            return Ok(());
        }

        let dispatch: Dispatch = serde_json::from_str(line).map_err(|e| {
            JsonError::new(format!("Invalid gateway frame on line {line_number}: {e}"))
        })?;
        let name = dispatch.name().to_string();
        let decoded = dispatch.decode().map_err(|e| {
            JsonError::new(format!("Invalid {name} event on line {line_number}: {e}"))
        })?;

        match decoded {
            Some(event) => {
                debug!(line = line_number, event = %name, "Replaying event");
                self.herald.handle_event(event).await?;
                self.summary.applied += 1;
            }
            None => {
                debug!(line = line_number, event = %name, "Skipping unmodelled event");
                self.summary.skipped += 1;
            }
        }
        Ok(())
    }
}
