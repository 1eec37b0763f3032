//! Host-driven sensor sources.
//!
//! Manual sources do not read any hardware: the host pushes samples into
//! them, and they fan each sample out to every live subscriber. Platform
//! bridges use them to forward callbacks from a native sensor API, and tests
//! use them to script sample sequences precisely.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::error::{SensorError, SensorKind};
use super::sample::{HeadingSample, PositionSample};
use super::subscription::{
    subscription_channel, SensorFeed, SensorSubscription, DEFAULT_SUBSCRIPTION_CAPACITY,
};
use super::traits::{HeadingSource, PositionSource, SensorFuture, WatchOptions};

/// Fan-out of pushed samples to live subscribers.
#[derive(Debug)]
struct FeedSet<T> {
    feeds: Mutex<Vec<SensorFeed<T>>>,
    subscribed: AtomicUsize,
}

impl<T: Clone + Send> FeedSet<T> {
    fn new() -> Self {
        Self {
            feeds: Mutex::new(Vec::new()),
            subscribed: AtomicUsize::new(0),
        }
    }

    fn subscribe(&self) -> SensorSubscription<T> {
        let (feed, subscription) = subscription_channel(DEFAULT_SUBSCRIPTION_CAPACITY);
        self.feeds.lock().push(feed);
        self.subscribed.fetch_add(1, Ordering::Relaxed);
        subscription
    }

    fn push(&self, sample: T) -> usize {
        let mut feeds = self.feeds.lock();
        feeds.retain(|feed| !feed.is_closed());
        feeds
            .iter()
            .filter(|feed| feed.try_emit(sample.clone()))
            .count()
    }

    fn live(&self) -> usize {
        let mut feeds = self.feeds.lock();
        feeds.retain(|feed| !feed.is_closed());
        feeds.len()
    }

    fn subscribed(&self) -> usize {
        self.subscribed.load(Ordering::Relaxed)
    }
}

/// Position source fed by the host.
#[derive(Debug)]
pub struct ManualPositionSource {
    feeds: FeedSet<PositionSample>,
    current_fix: Mutex<Option<PositionSample>>,
}

impl Default for ManualPositionSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualPositionSource {
    /// Create a source with no fix available yet.
    pub fn new() -> Self {
        Self {
            feeds: FeedSet::new(),
            current_fix: Mutex::new(None),
        }
    }

    /// Create a source that answers one-shot requests with `fix`.
    pub fn with_current_fix(fix: PositionSample) -> Self {
        let source = Self::new();
        *source.current_fix.lock() = Some(fix);
        source
    }

    /// Change the answer to one-shot requests without notifying subscribers.
    pub fn set_current_fix(&self, fix: PositionSample) {
        *self.current_fix.lock() = Some(fix);
    }

    /// Deliver a sample to all subscribers. Returns how many received it.
    ///
    /// The sample also becomes the answer to later one-shot requests.
    pub fn push(&self, sample: PositionSample) -> usize {
        *self.current_fix.lock() = Some(sample);
        self.feeds.push(sample)
    }

    /// Total number of `watch_position` calls served.
    pub fn subscription_count(&self) -> usize {
        self.feeds.subscribed()
    }

    /// Number of subscriptions that have not been cancelled.
    pub fn live_subscribers(&self) -> usize {
        self.feeds.live()
    }
}

impl PositionSource for ManualPositionSource {
    fn current_position(
        &self,
        _options: WatchOptions,
    ) -> SensorFuture<'_, Result<PositionSample, SensorError>> {
        let fix = *self.current_fix.lock();
        Box::pin(async move {
            fix.ok_or_else(|| SensorError::unavailable(SensorKind::Position, "no fix available"))
        })
    }

    fn watch_position(
        &self,
        _options: WatchOptions,
    ) -> Result<SensorSubscription<PositionSample>, SensorError> {
        Ok(self.feeds.subscribe())
    }
}

/// Heading source fed by the host.
#[derive(Debug)]
pub struct ManualHeadingSource {
    feeds: FeedSet<HeadingSample>,
    available: bool,
}

impl Default for ManualHeadingSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualHeadingSource {
    pub fn new() -> Self {
        Self {
            feeds: FeedSet::new(),
            available: true,
        }
    }

    /// A source standing in for a device without a compass.
    pub fn unavailable() -> Self {
        Self {
            feeds: FeedSet::new(),
            available: false,
        }
    }

    /// Deliver a sample to all subscribers. Returns how many received it.
    pub fn push(&self, sample: HeadingSample) -> usize {
        self.feeds.push(sample)
    }

    pub fn subscription_count(&self) -> usize {
        self.feeds.subscribed()
    }

    pub fn live_subscribers(&self) -> usize {
        self.feeds.live()
    }
}

impl HeadingSource for ManualHeadingSource {
    fn watch_heading(&self) -> Result<SensorSubscription<HeadingSample>, SensorError> {
        if !self.available {
            return Err(SensorError::unavailable(
                SensorKind::Heading,
                "no compass on this device",
            ));
        }
        Ok(self.feeds.subscribe())
    }
}
