use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::warn;

use super::{Notification, Subscriber, Subscription};
use crate::error::StageError;

/// Subscriber that keeps everything it receives in memory
#[derive(Debug)]
pub struct CollectingSink<T> {
    items: Vec<T>,
    terminal: Option<Notification<T>>,
    subscription: Subscription,
}

impl<T> CollectingSink<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            terminal: None,
            subscription: Subscription::new(),
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// The terminal signal, once one has been received
    pub fn terminal(&self) -> Option<&Notification<T>> {
        self.terminal.as_ref()
    }

    pub fn subscription(&self) -> Subscription {
        self.subscription.clone()
    }
}

impl<T> Default for CollectingSink<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Send> Subscriber<T> for CollectingSink<T> {
    async fn on_next(&mut self, item: T) {
        self.items.push(item);
    }

    async fn on_completed(&mut self) {
        self.terminal = Some(Notification::Completed);
    }

    async fn on_error(&mut self, error: StageError) {
        self.terminal = Some(Notification::Error(error));
    }

    fn is_unsubscribed(&self) -> bool {
        self.subscription.is_unsubscribed()
    }
}

/// Subscriber that forwards every signal into a channel.
///
/// Once the receiving half is dropped the sink treats itself as unsubscribed.
pub struct ChannelSink<T> {
    sender: mpsc::Sender<Notification<T>>,
}

impl<T> ChannelSink<T> {
    pub fn new(sender: mpsc::Sender<Notification<T>>) -> Self {
        Self { sender }
    }

    async fn forward(&mut self, notification: Notification<T>) {
        if self.sender.send(notification).await.is_err() {
            warn!("Channel sink receiver dropped, discarding notification");
        }
    }
}

#[async_trait]
impl<T: Send> Subscriber<T> for ChannelSink<T> {
    async fn on_next(&mut self, item: T) {
        self.forward(Notification::Next(item)).await;
    }

    async fn on_completed(&mut self) {
        self.forward(Notification::Completed).await;
    }

    async fn on_error(&mut self, error: StageError) {
        self.forward(Notification::Error(error)).await;
    }

    fn is_unsubscribed(&self) -> bool {
        self.sender.is_closed()
    }
}
