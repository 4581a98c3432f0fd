//! Error-reporting sink
//!
//! Any layer that hits a recoverable failure hands a [`Toast`] to the
//! injected [`ErrorReporter`]. Views decide how to show it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::SourceId;

/// A user-facing error notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toast {
    /// Source the failure belongs to, if any
    pub source: Option<SourceId>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Toast {
    pub fn new(source: Option<SourceId>, message: impl Into<String>) -> Self {
        Self {
            source,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

impl std::fmt::Display for Toast {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.source {
            Some(source) => write!(f, "[{}] {}", source, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Sink for recoverable errors
pub trait ErrorReporter: Send + Sync {
    fn report(&self, toast: Toast);
}

/// Reporter that only logs
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, toast: Toast) {
        match toast.source {
            Some(source) => tracing::warn!(source = %source, "{}", toast.message),
            None => tracing::warn!("{}", toast.message),
        }
    }
}

/// Reporter that fans toasts out to any number of subscribers
#[derive(Debug, Clone)]
pub struct ToastChannel {
    tx: broadcast::Sender<Toast>,
}

impl ToastChannel {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Toast> {
        self.tx.subscribe()
    }
}

impl Default for ToastChannel {
    fn default() -> Self {
        Self::new(64)
    }
}

impl ErrorReporter for ToastChannel {
    fn report(&self, toast: Toast) {
        tracing::debug!(toast = %toast, "Raising toast");
        // No subscribers is fine: nobody is looking at the dashboard.
        let _ = self.tx.send(toast);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_toast_channel_delivers_to_subscribers() {
        let channel = ToastChannel::new(8);
        let mut rx = channel.subscribe();

        channel.report(Toast::new(Some(SourceId::News), "Request timeout"));

        let toast = rx.recv().await.unwrap();
        assert_eq!(toast.source, Some(SourceId::News));
        assert_eq!(toast.to_string(), "[news] Request timeout");
    }

    #[test]
    fn test_toast_channel_without_subscribers_does_not_panic() {
        ToastChannel::default().report(Toast::new(None, "nobody listening"));
    }
}
