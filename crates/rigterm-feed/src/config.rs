//! Terminal configuration
//!
//! Loaded from a RON file. Every field is optional; omitted fields keep the
//! defaults below.
//!
//! ```ron
//! (
//!     feed: (interval_secs: 10, probability: 0.3),
//!     glitch: (min_delay_ms: 2000, jitter_ms: 3000, probability: 0.3, pulse_ms: 300),
//!     clock_interval_ms: 1000,
//!     seed: Some(42),
//! )
//! ```

use crate::error::{Error, Result};
use rigterm_core::AlertKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Longest period or delay any timer accepts: one day
pub const MAX_PERIOD_MS: u64 = 86_400_000;

/// `ms` as a timer period, kept within `1..=MAX_PERIOD_MS`
fn bounded_period(ms: u64) -> Duration {
    Duration::from_millis(ms.clamp(1, MAX_PERIOD_MS))
}

/// Simulated alert feed settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Seconds between ticks
    pub interval_secs: u64,
    /// Chance that a tick raises an alert
    pub probability: f64,
    /// Kinds to draw from
    pub kinds: Vec<AlertKind>,
    /// Messages to draw from, independently of the kind
    pub messages: Vec<String>,
}

impl FeedConfig {
    /// Tick period, bounded to a usable timer range
    pub fn interval(&self) -> Duration {
        bounded_period(self.interval_secs.saturating_mul(1000))
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            interval_secs: 10,
            probability: 0.3,
            kinds: AlertKind::ALL.to_vec(),
            messages: vec![
                "Crew member requesting backup at Sector 7.".to_string(),
                "Authority broadcast detected. Acknowledge to continue.".to_string(),
                "System: Left arm critical \u{2014} tape won't fix this.".to_string(),
                "Warning: Power levels dropping below 20%.".to_string(),
            ],
        }
    }
}

/// Screen glitch trigger settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlitchConfig {
    /// Shortest wait between rolls
    pub min_delay_ms: u64,
    /// Extra random wait on top of `min_delay_ms`
    pub jitter_ms: u64,
    /// Chance that a roll starts a glitch
    pub probability: f64,
    /// How long a glitch stays visible
    pub pulse_ms: u64,
}

impl GlitchConfig {
    pub fn pulse(&self) -> Duration {
        Duration::from_millis(self.pulse_ms.min(MAX_PERIOD_MS))
    }

    /// Roll period for a jitter sample `r` in `[0, 1)`
    pub fn period(&self, r: f64) -> Duration {
        let jitter = (r * self.jitter_ms as f64) as u64;
        bounded_period(self.min_delay_ms.saturating_add(jitter))
    }
}

impl Default for GlitchConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 2000,
            jitter_ms: 3000,
            probability: 0.3,
            pulse_ms: 300,
        }
    }
}

/// Complete terminal configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    pub feed: FeedConfig,
    pub glitch: GlitchConfig,
    /// Live clock refresh period
    pub clock_interval_ms: u64,
    /// RNG seed; `None` seeds from the wall clock
    pub seed: Option<u64>,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            feed: FeedConfig::default(),
            glitch: GlitchConfig::default(),
            clock_interval_ms: 1000,
            seed: None,
        }
    }
}

impl TerminalConfig {
    /// Parse and validate a RON document
    pub fn from_ron(content: &str) -> Result<Self> {
        let config: TerminalConfig = ron::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config = Self::from_ron(&content)?;
        tracing::info!(path = %path.as_ref().display(), "terminal config loaded");
        Ok(config)
    }

    pub fn clock_interval(&self) -> Duration {
        bounded_period(self.clock_interval_ms)
    }

    /// Check ranges and non-empty pools
    pub fn validate(&self) -> Result<()> {
        check_probability("feed.probability", self.feed.probability)?;
        check_probability("glitch.probability", self.glitch.probability)?;
        if self.feed.interval_secs == 0 {
            return Err(Error::Invalid("feed.interval_secs must be positive".into()));
        }
        if self.feed.kinds.is_empty() {
            return Err(Error::Invalid("feed.kinds must not be empty".into()));
        }
        if self.feed.messages.is_empty() {
            return Err(Error::Invalid("feed.messages must not be empty".into()));
        }
        if self.glitch.min_delay_ms == 0 && self.glitch.jitter_ms == 0 {
            return Err(Error::Invalid("glitch delay must be positive".into()));
        }
        if self.clock_interval_ms == 0 {
            return Err(Error::Invalid("clock_interval_ms must be positive".into()));
        }
        check_period(
            "feed.interval_secs",
            self.feed.interval_secs.checked_mul(1000),
        )?;
        check_period(
            "glitch.min_delay_ms + glitch.jitter_ms",
            self.glitch.min_delay_ms.checked_add(self.glitch.jitter_ms),
        )?;
        check_period("glitch.pulse_ms", Some(self.glitch.pulse_ms))?;
        check_period("clock_interval_ms", Some(self.clock_interval_ms))?;
        Ok(())
    }
}

fn check_probability(field: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::Invalid(format!("{field} must be within [0, 1], got {value}")))
    }
}

fn check_period(field: &str, ms: Option<u64>) -> Result<()> {
    match ms {
        Some(ms) if ms <= MAX_PERIOD_MS => Ok(()),
        _ => Err(Error::Invalid(format!(
            "{field} must not exceed {MAX_PERIOD_MS} ms"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_dashboard() {
        let config = TerminalConfig::default();
        assert_eq!(config.feed.interval(), Duration::from_secs(10));
        assert_eq!(config.feed.probability, 0.3);
        assert_eq!(config.feed.kinds.len(), 4);
        assert_eq!(config.feed.messages.len(), 4);
        assert_eq!(config.glitch.min_delay_ms, 2000);
        assert_eq!(config.glitch.jitter_ms, 3000);
        assert_eq!(config.glitch.pulse(), Duration::from_millis(300));
        assert_eq!(config.clock_interval(), Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config = TerminalConfig::from_ron("(feed: (interval_secs: 2), seed: Some(7))").unwrap();
        assert_eq!(config.feed.interval_secs, 2);
        assert_eq!(config.feed.probability, 0.3);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.glitch, GlitchConfig::default());
    }

    #[test]
    fn test_kinds_parse_lowercase() {
        let config =
            TerminalConfig::from_ron("(feed: (kinds: [authority], messages: [\"Halt.\"]))").unwrap();
        assert_eq!(config.feed.kinds, vec![AlertKind::Authority]);
        assert_eq!(config.feed.messages, vec!["Halt.".to_string()]);
    }

    #[test]
    fn test_rejects_bad_probability() {
        let err = TerminalConfig::from_ron("(feed: (probability: 1.5))").unwrap_err();
        assert!(matches!(err, Error::Invalid(_)));
        assert!(err.to_string().contains("feed.probability"));
    }

    #[test]
    fn test_rejects_empty_pool() {
        let err = TerminalConfig::from_ron("(feed: (messages: []))").unwrap_err();
        assert!(matches!(err, Error::Invalid(_)));
    }

    #[test]
    fn test_rejects_periods_past_one_day() {
        for doc in [
            "(feed: (interval_secs: 18446744073709551615))",
            "(feed: (interval_secs: 86401))",
            "(glitch: (min_delay_ms: 18446744073709551615, jitter_ms: 1))",
            "(glitch: (pulse_ms: 86400001))",
            "(clock_interval_ms: 18446744073709551615)",
        ] {
            let err = TerminalConfig::from_ron(doc).unwrap_err();
            assert!(matches!(err, Error::Invalid(_)), "{doc}");
        }
        assert!(TerminalConfig::from_ron("(feed: (interval_secs: 86400))").is_ok());
    }

    #[test]
    fn test_unvalidated_periods_are_bounded() {
        let feed = FeedConfig {
            interval_secs: u64::MAX,
            ..FeedConfig::default()
        };
        assert_eq!(feed.interval(), Duration::from_millis(MAX_PERIOD_MS));

        let glitch = GlitchConfig {
            min_delay_ms: u64::MAX,
            jitter_ms: u64::MAX,
            pulse_ms: u64::MAX,
            ..GlitchConfig::default()
        };
        assert_eq!(glitch.period(0.99), Duration::from_millis(MAX_PERIOD_MS));
        assert_eq!(glitch.pulse(), Duration::from_millis(MAX_PERIOD_MS));

        let config = TerminalConfig {
            clock_interval_ms: 0,
            ..TerminalConfig::default()
        };
        assert_eq!(config.clock_interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_parse_error() {
        let err = TerminalConfig::from_ron("(feed: ").unwrap_err();
        assert!(matches!(err, Error::Ron(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = TerminalConfig::load("/nonexistent/rigterm.ron").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
