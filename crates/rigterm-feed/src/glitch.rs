//! Periodic screen glitch trigger

use crate::config::GlitchConfig;
use crate::task::TaskHandle;
use rigterm_core::RandomSource;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Deterministic core of the glitch trigger
#[derive(Debug)]
pub struct GlitchTrigger<R> {
    config: GlitchConfig,
    rng: R,
}

impl<R: RandomSource> GlitchTrigger<R> {
    pub fn new(config: GlitchConfig, rng: R) -> Self {
        Self { config, rng }
    }

    /// Roll period: `min_delay + r * jitter`
    pub fn next_delay(&mut self) -> Duration {
        self.config.period(self.rng.next_f64())
    }

    /// Whether this roll starts a glitch
    pub fn roll(&mut self) -> bool {
        self.rng.chance(self.config.probability)
    }
}

/// Lowers the flag when the task ends, aborts included
struct LowerOnDrop(watch::Sender<bool>);

impl Drop for LowerOnDrop {
    fn drop(&mut self) {
        self.0.send_replace(false);
    }
}

/// Run the trigger, raising the flag for one pulse whenever a roll hits.
///
/// The roll period is drawn once here and kept for the trigger's lifetime.
/// The receiver reads `false` again once the task is cancelled.
pub fn spawn_glitch_trigger<R>(mut trigger: GlitchTrigger<R>) -> (TaskHandle, watch::Receiver<bool>)
where
    R: RandomSource + 'static,
{
    let (tx, rx) = watch::channel(false);
    let pulse = trigger.config.pulse();
    let period = trigger.next_delay();
    let handle = tokio::spawn(async move {
        let flag = LowerOnDrop(tx);
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if !trigger.roll() {
                continue;
            }
            if flag.0.send(true).is_err() {
                break;
            }
            time::sleep(pulse).await;
            if flag.0.send(false).is_err() {
                break;
            }
        }
        tracing::debug!("glitch trigger has no viewers, stopping");
    });
    (TaskHandle::new("glitch", handle), rx)
}
