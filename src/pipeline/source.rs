use tokio::sync::mpsc;
use tracing::debug;

use super::Subscriber;
use crate::error::StageError;

/// Push every item of `items` into `subscriber`.
///
/// The first `Err` item is delivered through `on_error` and ends the stream.
/// If the iterator runs out, `on_completed` is delivered. Nothing is pushed
/// once the subscriber reports that it has unsubscribed, not even a terminal
/// signal.
pub async fn drive_iter<T, I, S>(items: I, subscriber: &mut S)
where
    T: Send,
    I: IntoIterator<Item = Result<T, StageError>>,
    S: Subscriber<T> + ?Sized,
{
    for item in items {
        if subscriber.is_unsubscribed() {
            debug!("Subscriber unsubscribed, stopping source");
            return;
        }
        match item {
            Ok(value) => subscriber.on_next(value).await,
            Err(error) => {
                subscriber.on_error(error).await;
                return;
            }
        }
    }

    if !subscriber.is_unsubscribed() {
        subscriber.on_completed().await;
    }
}

/// Drain a bounded channel into `subscriber` with the same rules as `drive_iter`.
///
/// The stream completes when every sender has been dropped. Backpressure comes
/// from the channel capacity: a producer waits while the subscriber is busy.
pub async fn drive_channel<T, S>(mut receiver: mpsc::Receiver<Result<T, StageError>>, subscriber: &mut S)
where
    T: Send,
    S: Subscriber<T> + ?Sized,
{
    while let Some(item) = receiver.recv().await {
        if subscriber.is_unsubscribed() {
            debug!("Subscriber unsubscribed, closing source channel");
            receiver.close();
            return;
        }
        match item {
            Ok(value) => subscriber.on_next(value).await,
            Err(error) => {
                receiver.close();
                subscriber.on_error(error).await;
                return;
            }
        }
    }

    if !subscriber.is_unsubscribed() {
        subscriber.on_completed().await;
    }
}
