//! Boost mode button rules

use crate::patch::RobotStatsPatch;
use crate::Store;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

/// Battery must be strictly above this to boost
pub const BOOST_MIN_BATTERY: f64 = 10.0;
/// Battery spent per boost
pub const BOOST_BATTERY_COST: f64 = 15.0;
/// How long a boost stays engaged
pub const BOOST_DURATION_SECS: i64 = 5;

/// Why a boost request was turned down. The store is untouched.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum BoostRefusal {
    #[error("battery at {battery}% is too low to boost")]
    LowBattery { battery: f64 },

    #[error("boost already engaged")]
    AlreadyActive,
}

/// Panel-local boost state; time comes from the store's clock
#[derive(Debug, Clone, Default)]
pub struct BoostMode {
    active_until: Option<DateTime<Utc>>,
}

impl BoostMode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a boost is running at `now`
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.active_until.is_some_and(|until| now < until)
    }

    /// Whether a boost is running according to the store clock
    pub fn is_active(&self, store: &Store) -> bool {
        self.is_active_at(store.clock().now())
    }

    /// Whether the button is clickable
    pub fn is_available(&self, store: &Store) -> bool {
        store.robot_stats().battery > BOOST_MIN_BATTERY && !self.is_active(store)
    }

    /// Spend battery and start a boost
    pub fn engage(&mut self, store: &Store) -> Result<DateTime<Utc>, BoostRefusal> {
        let now = store.clock().now();
        if self.is_active_at(now) {
            return Err(BoostRefusal::AlreadyActive);
        }
        let battery = store.robot_stats().battery;
        if battery <= BOOST_MIN_BATTERY {
            return Err(BoostRefusal::LowBattery { battery });
        }

        store.set_robot_stats(RobotStatsPatch::new().battery(battery - BOOST_BATTERY_COST));
        let until = now + Duration::seconds(BOOST_DURATION_SECS);
        self.active_until = Some(until);
        tracing::info!(battery = battery - BOOST_BATTERY_COST, %until, "boost engaged");
        Ok(until)
    }
}
