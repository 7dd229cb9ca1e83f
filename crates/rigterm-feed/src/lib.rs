//! rigterm Feed - Timer-driven tasks for the rig control terminal
//!
//! Everything here runs on tokio and talks to the store only through its
//! public mutations:
//!
//! - **Alert feed**: rolls for a simulated incoming alert every interval
//! - **Live clock**: publishes the formatted header time
//! - **Glitch trigger**: raises a short glitch flag at random intervals
//!
//! Each task returns a [`TaskHandle`]; dropping it stops the task. The
//! deterministic parts ([`AlertFeed`], [`GlitchTrigger`]) take any
//! [`rigterm_core::RandomSource`] so tests can script them.

mod alert_feed;
mod config;
mod error;
mod glitch;
mod live_clock;
mod task;

pub use alert_feed::{spawn_alert_feed, AlertFeed};
pub use config::{FeedConfig, GlitchConfig, TerminalConfig, MAX_PERIOD_MS};
pub use error::{Error, Result};
pub use glitch::{spawn_glitch_trigger, GlitchTrigger};
pub use live_clock::{clock_text, spawn_live_clock, CLOCK_FORMAT};
pub use task::TaskHandle;

use rigterm_core::{RandomSource, XorShiftRng};

/// Random source for production wiring: seeded from config, else the clock
pub fn rng_from_config(config: &TerminalConfig) -> Box<dyn RandomSource> {
    match config.seed {
        Some(seed) => Box::new(XorShiftRng::new(seed)),
        None => Box::new(XorShiftRng::from_entropy()),
    }
}
