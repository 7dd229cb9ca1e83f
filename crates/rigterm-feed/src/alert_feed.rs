//! Simulated incoming alerts
//!
//! Each tick rolls the random source once to decide whether an alert
//! arrives, then once for its kind and once more for its message. Kind and
//! message are drawn independently, so any message may arrive under any
//! kind.

use crate::config::FeedConfig;
use crate::task::TaskHandle;
use rigterm_core::{AlertId, NewAlert, RandomSource, Store};
use tokio::time::{self, Instant, MissedTickBehavior};

/// Deterministic core of the alert feed
#[derive(Debug)]
pub struct AlertFeed<R> {
    config: FeedConfig,
    rng: R,
    ticks: u64,
}

impl<R: RandomSource> AlertFeed<R> {
    pub fn new(config: FeedConfig, rng: R) -> Self {
        Self {
            config,
            rng,
            ticks: 0,
        }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Ticks processed so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Decide what, if anything, arrives on this tick
    pub fn roll(&mut self) -> Option<NewAlert> {
        if !self.rng.chance(self.config.probability) {
            return None;
        }
        let kind = *self
            .rng
            .pick_index(self.config.kinds.len())
            .and_then(|i| self.config.kinds.get(i))?;
        let message = self
            .rng
            .pick_index(self.config.messages.len())
            .and_then(|i| self.config.messages.get(i))?
            .clone();
        Some(NewAlert::new(kind, message))
    }

    /// Run one tick against the store
    pub fn tick(&mut self, store: &Store) -> Option<AlertId> {
        self.ticks += 1;
        match self.roll() {
            Some(alert) => Some(store.add_alert(alert)),
            None => {
                tracing::debug!(tick = self.ticks, "feed tick quiet");
                None
            }
        }
    }
}

/// Start the feed on the current tokio runtime.
///
/// The first tick happens one interval after the call.
pub fn spawn_alert_feed<R>(store: Store, mut feed: AlertFeed<R>) -> TaskHandle
where
    R: RandomSource + 'static,
{
    let period = feed.config.interval();
    let handle = tokio::spawn(async move {
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            feed.tick(&store);
        }
    });
    TaskHandle::new("alert_feed", handle)
}
