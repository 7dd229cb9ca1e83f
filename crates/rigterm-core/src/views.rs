//! Derived read views
//!
//! Pure functions over a state snapshot. None of these values are stored,
//! so they can never drift from the records they are computed from.

use crate::{Alert, AlertKind, AppState, Part, RobotComponent, RobotStats};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Battery level at or below which the boost button pulses
pub const LOW_POWER_THRESHOLD: f64 = 20.0;

/// Alerts still waiting for acknowledgement, in list order
pub fn unacknowledged_alerts(state: &AppState) -> impl Iterator<Item = &Alert> {
    state.alerts.iter().filter(|a| !a.acknowledged)
}

/// Unacknowledged alerts of kind `authority`, in list order
pub fn authority_alerts(state: &AppState) -> impl Iterator<Item = &Alert> {
    unacknowledged_alerts(state).filter(|a| a.kind == AlertKind::Authority)
}

/// Components flagged damaged, in roster order
pub fn damaged_components(state: &AppState) -> impl Iterator<Item = &RobotComponent> {
    state.components.values().filter(|c| c.damaged)
}

/// Components flagged critical, in roster order
pub fn critical_components(state: &AppState) -> impl Iterator<Item = &RobotComponent> {
    state.components.values().filter(|c| c.critical)
}

/// Parts shown on the inventory tab
pub fn legal_parts(state: &AppState) -> impl Iterator<Item = &Part> {
    state.parts.iter().filter(|p| !p.illegal)
}

/// Parts shown on the black-market tab
pub fn illegal_parts(state: &AppState) -> impl Iterator<Item = &Part> {
    state.parts.iter().filter(|p| p.illegal)
}

/// True when the battery is low enough to warn the pilot
pub fn is_low_power(stats: &RobotStats) -> bool {
    stats.battery <= LOW_POWER_THRESHOLD
}

/// How closely the authorities are watching
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SurveillanceLevel {
    Low,
    Moderate,
    High,
}

impl SurveillanceLevel {
    /// Band for a notoriety value: above 70 is high, above 40 moderate
    pub fn from_notoriety(notoriety: f64) -> Self {
        if notoriety > 70.0 {
            SurveillanceLevel::High
        } else if notoriety > 40.0 {
            SurveillanceLevel::Moderate
        } else {
            SurveillanceLevel::Low
        }
    }

    /// Status line under the meter
    pub fn status_text(&self) -> &'static str {
        match self {
            SurveillanceLevel::Low => "Flying under the radar.",
            SurveillanceLevel::Moderate => "Moderate attention.",
            SurveillanceLevel::High => "Expect increased patrols.",
        }
    }
}

impl fmt::Display for SurveillanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SurveillanceLevel::Low => "LOW",
            SurveillanceLevel::Moderate => "MODERATE",
            SurveillanceLevel::High => "HIGH",
        })
    }
}

/// Shorthand for `SurveillanceLevel::from_notoriety(state.notoriety)`
pub fn surveillance_level(state: &AppState) -> SurveillanceLevel {
    SurveillanceLevel::from_notoriety(state.notoriety)
}

/// Colour band of a health or durability gauge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthBand {
    /// Below 30
    Critical,
    /// Below 60
    Worn,
    Good,
}

impl HealthBand {
    pub fn from_value(value: f64) -> Self {
        if value < 30.0 {
            HealthBand::Critical
        } else if value < 60.0 {
            HealthBand::Worn
        } else {
            HealthBand::Good
        }
    }
}
