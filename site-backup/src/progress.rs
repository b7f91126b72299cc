//! Progress reporting for backup operations.
//!
//! Orchestrators push discrete progress events to a caller-supplied sink;
//! the sink decides how to display or forward them. No history is retained
//! here.

use serde::{Deserialize, Serialize};

/// Pipeline stage a progress event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Preparing,
    Extracting,
    Downloading,
    Packing,
    Validating,
    Restoring,
    Committing,
    Complete,
}

/// A single progress event.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferProgress {
    pub stage: Stage,

    /// Percentage complete (0-100), monotone non-decreasing within one run
    pub percent: u8,

    pub message: String,

    /// Item currently being transferred, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_item: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_items: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_items: Option<usize>,
}

impl TransferProgress {
    /// Create a progress event without item counters
    pub fn at(stage: Stage, percent: u8, message: impl Into<String>) -> Self {
        Self {
            stage,
            percent: percent.min(100),
            message: message.into(),
            current_item: None,
            total_items: None,
            processed_items: None,
        }
    }

    /// Attach per-item counters to an event
    pub fn with_items(
        mut self,
        current_item: Option<String>,
        processed_items: usize,
        total_items: usize,
    ) -> Self {
        self.current_item = current_item;
        self.processed_items = Some(processed_items);
        self.total_items = Some(total_items);
        self
    }
}

/// Sink the orchestrators push progress events to.
///
/// Invoked synchronously and repeatedly during an export or import; sinks
/// should be cheap and must not block.
pub trait ProgressSink: Send + Sync {
    fn report(&self, progress: TransferProgress);
}

impl<F> ProgressSink for F
where
    F: Fn(TransferProgress) + Send + Sync,
{
    fn report(&self, progress: TransferProgress) {
        self(progress)
    }
}

/// Sink that discards all events.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _progress: TransferProgress) {}
}

/// Map a processed/total item count onto a fixed percentage band.
///
/// With `total == 0` the band start is returned, keeping the bar monotone.
pub fn band_percent(start: u8, end: u8, processed: usize, total: usize) -> u8 {
    if total == 0 {
        return start;
    }
    let span = end.saturating_sub(start) as usize;
    let offset = (span * processed.min(total)) / total;
    start + offset as u8
}
