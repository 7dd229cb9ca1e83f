//! rigterm Core - Shared state for the rig control terminal
//!
//! This crate provides the one state container every terminal view reads
//! from and writes through:
//! - Plain data records (`RobotStats`, `RobotComponent`, `Alert`, ...)
//! - Partial patches and creation inputs for mutations
//! - The `Store` handle with its mutation operations and subscriptions
//! - Derived views computed from snapshots
//! - The authority broadcast gate and the control panel rules
//! - Pluggable clock and random sources
//!
//! ## Example
//!
//! ```
//! use rigterm_core::{AlertKind, AuthorityGate, NewAlert, Store};
//!
//! let store = Store::with_system_clock();
//! let gate = AuthorityGate::watch(&store);
//!
//! let id = store.add_alert(NewAlert::new(AlertKind::Authority, "Acknowledge to continue."));
//! assert!(gate.is_visible());
//!
//! store.acknowledge_alert(id);
//! assert!(!gate.is_visible());
//! ```

pub mod arm;
pub mod boost;
mod clock;
mod error;
pub mod gate;
mod identity;
mod model;
pub mod patch;
mod rng;
pub mod seed;
mod store;
pub mod views;
pub mod viewer;

pub use arm::ArmPanel;
pub use boost::{BoostMode, BoostRefusal};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use gate::{AuthorityGate, GateWatch};
pub use identity::{AlertId, ComponentId, IdSequence, PartId, ReplayId, SubscriptionId};
pub use model::{
    Alert, AlertKind, AppState, ArmInfo, ArmState, BattleReplay, Part, PartKind, ReplayResult,
    RobotComponent, RobotStats,
};
pub use patch::{ArmInfoPatch, ComponentPatch, NewAlert, NewReplay, RobotStatsPatch};
pub use rng::{RandomSource, ScriptedRandom, XorShiftRng};
pub use store::{Store, Subscription, NOTORIETY_MAX, NOTORIETY_MIN};
pub use viewer::ViewerSlot;
pub use views::{HealthBand, SurveillanceLevel};
