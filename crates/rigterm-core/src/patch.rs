//! Partial updates and creation inputs for store mutations
//!
//! A patch carries `Some` for every field the caller wants to change and
//! `None` for fields that keep their prior value.

use crate::{AlertKind, ArmInfo, ArmState, BattleReplay, ReplayId, ReplayResult, RobotComponent, RobotStats};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Partial [`RobotStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RobotStatsPatch {
    pub battery: Option<f64>,
    pub armor: Option<f64>,
    pub weapon_heat: Option<f64>,
    pub stability: Option<f64>,
}

impl RobotStatsPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn battery(mut self, value: f64) -> Self {
        self.battery = Some(value);
        self
    }

    pub fn armor(mut self, value: f64) -> Self {
        self.armor = Some(value);
        self
    }

    pub fn weapon_heat(mut self, value: f64) -> Self {
        self.weapon_heat = Some(value);
        self
    }

    pub fn stability(mut self, value: f64) -> Self {
        self.stability = Some(value);
        self
    }

    /// Merge into `stats`. Values pass through unclamped.
    pub fn apply_to(&self, stats: &mut RobotStats) {
        if let Some(v) = self.battery {
            stats.battery = v;
        }
        if let Some(v) = self.armor {
            stats.armor = v;
        }
        if let Some(v) = self.weapon_heat {
            stats.weapon_heat = v;
        }
        if let Some(v) = self.stability {
            stats.stability = v;
        }
    }
}

/// Partial [`RobotComponent`]. The ID is not patchable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentPatch {
    pub name: Option<String>,
    pub durability: Option<f64>,
    pub damaged: Option<bool>,
    pub critical: Option<bool>,
}

impl ComponentPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, value: impl Into<String>) -> Self {
        self.name = Some(value.into());
        self
    }

    pub fn durability(mut self, value: f64) -> Self {
        self.durability = Some(value);
        self
    }

    pub fn damaged(mut self, value: bool) -> Self {
        self.damaged = Some(value);
        self
    }

    pub fn critical(mut self, value: bool) -> Self {
        self.critical = Some(value);
        self
    }

    pub fn apply_to(&self, component: &mut RobotComponent) {
        if let Some(name) = &self.name {
            component.name.clone_from(name);
        }
        if let Some(v) = self.durability {
            component.durability = v;
        }
        if let Some(v) = self.damaged {
            component.damaged = v;
        }
        if let Some(v) = self.critical {
            component.critical = v;
        }
    }
}

/// Partial [`ArmInfo`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArmInfoPatch {
    pub state: Option<ArmState>,
    pub health: Option<f64>,
    pub repair_time: Option<u32>,
    pub material_cost: Option<u32>,
    pub upgrades: Option<Vec<String>>,
}

impl ArmInfoPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(mut self, value: ArmState) -> Self {
        self.state = Some(value);
        self
    }

    pub fn health(mut self, value: f64) -> Self {
        self.health = Some(value);
        self
    }

    pub fn repair_time(mut self, seconds: u32) -> Self {
        self.repair_time = Some(seconds);
        self
    }

    pub fn material_cost(mut self, credits: u32) -> Self {
        self.material_cost = Some(credits);
        self
    }

    pub fn upgrades<I, S>(mut self, upgrades: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.upgrades = Some(upgrades.into_iter().map(Into::into).collect());
        self
    }

    pub fn apply_to(&self, arm: &mut ArmInfo) {
        if let Some(v) = self.state {
            arm.state = v;
        }
        if let Some(v) = self.health {
            arm.health = v;
        }
        if let Some(v) = self.repair_time {
            arm.repair_time = v;
        }
        if let Some(v) = self.material_cost {
            arm.material_cost = v;
        }
        if let Some(upgrades) = &self.upgrades {
            arm.upgrades.clone_from(upgrades);
        }
    }
}

/// Input of `Store::add_alert`; ID, timestamp and acknowledgement are
/// assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAlert {
    pub kind: AlertKind,
    pub message: String,
}

impl NewAlert {
    pub fn new(kind: AlertKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Input of `Store::add_replay`; the ID is assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReplay {
    pub date: NaiveDate,
    pub opponent: String,
    pub result: ReplayResult,
    pub duration: u32,
}

impl NewReplay {
    pub fn new(date: NaiveDate, opponent: impl Into<String>, result: ReplayResult, duration: u32) -> Self {
        Self {
            date,
            opponent: opponent.into(),
            result,
            duration,
        }
    }

    pub(crate) fn into_replay(self, id: ReplayId) -> BattleReplay {
        BattleReplay {
            id,
            date: self.date,
            opponent: self.opponent,
            result: self.result,
            duration: self.duration,
        }
    }
}
