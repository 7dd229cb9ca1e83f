//! Header clock refreshed on a fixed period

use crate::config::MAX_PERIOD_MS;
use crate::task::TaskHandle;
use rigterm_core::Clock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

/// Display format of the header clock
pub const CLOCK_FORMAT: &str = "%H:%M:%S";

/// Current time of `clock` as shown in the header
pub fn clock_text(clock: &dyn Clock) -> String {
    clock.now().format(CLOCK_FORMAT).to_string()
}

/// Publish the formatted time every `period`.
///
/// The receiver holds the current time immediately; later values arrive on
/// each tick. `period` is clamped to between 1 ms and one day.
pub fn spawn_live_clock(
    clock: Arc<dyn Clock>,
    period: Duration,
) -> (TaskHandle, watch::Receiver<String>) {
    let period = period.clamp(Duration::from_millis(1), Duration::from_millis(MAX_PERIOD_MS));
    let (tx, rx) = watch::channel(clock_text(clock.as_ref()));
    let handle = tokio::spawn(async move {
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if tx.send(clock_text(clock.as_ref())).is_err() {
                tracing::debug!("live clock has no viewers, stopping");
                break;
            }
        }
    });
    (TaskHandle::new("live_clock", handle), rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rigterm_core::ManualClock;

    #[test]
    fn test_clock_text() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2027, 10, 25, 7, 5, 9).unwrap());
        assert_eq!(clock_text(&clock), "07:05:09");
    }

    #[tokio::test(start_paused = true)]
    async fn test_publishes_on_each_tick() {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2027, 10, 25, 23, 59, 58).unwrap(),
        ));
        let (_task, mut rx) = spawn_live_clock(clock.clone(), Duration::from_secs(1));
        assert_eq!(*rx.borrow_and_update(), "23:59:58");

        clock.advance(chrono::Duration::seconds(1));
        time::sleep(Duration::from_millis(1500)).await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), "23:59:59");
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_period_keeps_running() {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2027, 10, 25, 0, 0, 0).unwrap()));
        let (task, _rx) = spawn_live_clock(clock, Duration::MAX);
        time::sleep(Duration::from_millis(50)).await;
        assert!(task.is_running());
    }
}
