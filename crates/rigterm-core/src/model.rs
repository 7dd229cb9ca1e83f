//! Store records
//!
//! Every record is plain data. The store owns one [`AppState`] and hands out
//! immutable snapshots of it; nothing here mutates itself except through the
//! patch types in [`crate::patch`].

use crate::{AlertId, ComponentId, Error, PartId, ReplayId};
use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declares `as_str`, `ALL`, `Display` and `FromStr` for a closed set of
/// lowercase names.
macro_rules! named_variants {
    ($ty:ident, $kind:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Every variant, in declaration order
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            /// Lowercase name of the variant
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok($ty::$variant),)+
                    other => Err(Error::unknown($kind, other)),
                }
            }
        }
    };
}

/// Live robot telemetry gauges, conventionally 0-100
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RobotStats {
    pub battery: f64,
    pub armor: f64,
    pub weapon_heat: f64,
    pub stability: f64,
}

/// One entry of the fixed component roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotComponent {
    pub id: ComponentId,
    pub name: String,
    /// 0-100
    pub durability: f64,
    /// Set independently of `durability`
    pub damaged: bool,
    /// Set independently of `durability`
    pub critical: bool,
}

/// Category of an inventory part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartKind {
    Weapon,
    Armor,
    Core,
    Limb,
}

named_variants!(PartKind, "part kind", {
    Weapon => "weapon",
    Armor => "armor",
    Core => "core",
    Limb => "limb",
});

/// Catalog entry shown in the inventory and black-market tabs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub id: PartId,
    pub name: String,
    pub kind: PartKind,
    pub durability: f64,
    pub weight: f64,
    pub compatible: bool,
    pub illegal: bool,
}

/// Source of an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Crew,
    Authority,
    System,
    Warning,
}

named_variants!(AlertKind, "alert kind", {
    Crew => "crew",
    Authority => "authority",
    System => "system",
    Warning => "warning",
});

/// A message on the comms panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    pub kind: AlertKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// Flips to `true` once and never back
    pub acknowledged: bool,
}

/// Outcome of a recorded fight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplayResult {
    Win,
    Loss,
    Draw,
}

named_variants!(ReplayResult, "replay result", {
    Win => "win",
    Loss => "loss",
    Draw => "draw",
});

/// One entry of the battle history, newest first in the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleReplay {
    pub id: ReplayId,
    pub date: NaiveDate,
    pub opponent: String,
    pub result: ReplayResult,
    /// Fight length in seconds
    pub duration: u32,
}

/// Repair workflow state of the arm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArmState {
    Normal,
    Damaged,
    Repaired,
}

named_variants!(ArmState, "arm state", {
    Normal => "normal",
    Damaged => "damaged",
    Repaired => "repaired",
});

/// Detail record behind the arm repair sidebar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmInfo {
    pub state: ArmState,
    /// 0-100
    pub health: f64,
    /// Seconds
    pub repair_time: u32,
    /// Credits
    pub material_cost: u32,
    pub upgrades: Vec<String>,
}

/// The complete store state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    pub robot_stats: RobotStats,
    /// Fixed roster keyed by ID, in display order
    pub components: IndexMap<ComponentId, RobotComponent>,
    pub parts: Vec<Part>,
    /// Append order, not sorted by time
    pub alerts: Vec<Alert>,
    /// Newest first
    pub replays: Vec<BattleReplay>,
    /// Always within [0, 100]
    pub notoriety: f64,
    pub arm_info: ArmInfo,
    pub selected_arm: bool,
}

impl AppState {
    /// Look up a component by ID
    pub fn component(&self, id: &ComponentId) -> Option<&RobotComponent> {
        self.components.get(id)
    }

    /// Look up an alert by ID
    pub fn alert(&self, id: AlertId) -> Option<&Alert> {
        self.alerts.iter().find(|a| a.id == id)
    }

    /// Look up a replay by ID
    pub fn replay(&self, id: ReplayId) -> Option<&BattleReplay> {
        self.replays.iter().find(|r| r.id == id)
    }
}

impl Default for AppState {
    /// The seeded state every store starts from
    fn default() -> Self {
        crate::seed::initial_state()
    }
}
