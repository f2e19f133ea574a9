// Record streaming: subscriber contract, sources, sinks and processing stages

pub mod processing;
pub mod sink;
pub mod source;

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::StageError;

pub use sink::{ChannelSink, CollectingSink};
pub use source::{drive_channel, drive_iter};

/// Push-based consumer of an ordered sequence.
///
/// A well-behaved producer calls `on_next` zero or more times followed by at
/// most one of `on_completed` or `on_error`, and nothing after that.
#[async_trait]
pub trait Subscriber<T: Send>: Send {
    async fn on_next(&mut self, item: T);

    async fn on_completed(&mut self);

    async fn on_error(&mut self, error: StageError);

    /// Whether this subscriber (or anything downstream of it) has stopped
    /// accepting signals. Producers check this before each push.
    fn is_unsubscribed(&self) -> bool {
        false
    }
}

/// Cancellation handle shared between a subscriber and whoever hosts it
#[derive(Debug, Clone, Default)]
pub struct Subscription {
    cancelled: Arc<AtomicBool>,
}

impl Subscription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unsubscribe(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_unsubscribed(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// A single signal as observed by a downstream consumer
#[derive(Debug)]
pub enum Notification<T> {
    Next(T),
    Completed,
    Error(StageError),
}

impl<T> Notification<T> {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Notification::Next(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_clones_share_state() {
        let subscription = Subscription::new();
        let handle = subscription.clone();
        assert!(!subscription.is_unsubscribed());

        handle.unsubscribe();
        assert!(subscription.is_unsubscribed());
    }

    #[test]
    fn test_terminal_notifications() {
        assert!(!Notification::Next(1).is_terminal());
        assert!(Notification::<i32>::Completed.is_terminal());
        assert!(Notification::<i32>::Error(StageError::upstream(anyhow::anyhow!("boom"))).is_terminal());
    }
}
