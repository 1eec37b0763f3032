//! Subscription handles connecting a sensor source to its consumer.
//!
//! A subscription is a bounded channel plus a cancellation token. The source
//! keeps the [`SensorFeed`] half and pushes samples into it; the consumer
//! keeps the [`SensorSubscription`] half. Unsubscribing (or dropping the
//! subscription) cancels the token, which tells the source to stop producing
//! and makes any further `recv` return `None` even if samples are still
//! buffered.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;

/// Default buffer size for sensor subscriptions.
pub const DEFAULT_SUBSCRIPTION_CAPACITY: usize = 64;

/// Create a connected feed/subscription pair.
pub fn subscription_channel<T: Send>(capacity: usize) -> (SensorFeed<T>, SensorSubscription<T>) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    let token = CancellationToken::new();
    (
        SensorFeed {
            sender,
            token: token.clone(),
        },
        SensorSubscription { receiver, token },
    )
}

/// Consumer side of a sensor stream.
#[derive(Debug)]
pub struct SensorSubscription<T> {
    receiver: mpsc::Receiver<T>,
    token: CancellationToken,
}

impl<T: Send> SensorSubscription<T> {
    /// Wait for the next sample.
    ///
    /// Returns `None` once unsubscribed or when the source has finished.
    pub async fn recv(&mut self) -> Option<T> {
        if self.token.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            sample = self.receiver.recv() => sample,
        }
    }

    /// Stop the stream. Safe to call more than once.
    pub fn unsubscribe(&mut self) {
        self.token.cancel();
        self.receiver.close();
    }

    /// Whether the subscription is still live.
    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Token that cancels this subscription when triggered.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }
}

impl<T> Drop for SensorSubscription<T> {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Producer side of a sensor stream.
#[derive(Debug)]
pub struct SensorFeed<T> {
    sender: mpsc::Sender<T>,
    token: CancellationToken,
}

impl<T: Send> SensorFeed<T> {
    /// Push a sample without waiting.
    ///
    /// Returns `true` if the sample was queued. A full buffer drops the
    /// sample; sensors produce fresh readings faster than stale ones matter.
    pub fn try_emit(&self, sample: T) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        match self.sender.try_send(sample) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::trace!("Sensor subscriber lagging, sample dropped");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    /// Push a sample, waiting for buffer space.
    ///
    /// Returns `false` once the consumer has unsubscribed.
    pub async fn emit(&self, sample: T) -> bool {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => false,
            result = self.sender.send(sample) => result.is_ok(),
        }
    }

    /// Whether the consumer has gone away.
    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled() || self.sender.is_closed()
    }

    /// Resolves once the consumer unsubscribes.
    pub async fn closed(&self) {
        tokio::select! {
            _ = self.token.cancelled() => {}
            _ = self.sender.closed() => {}
        }
    }
}
