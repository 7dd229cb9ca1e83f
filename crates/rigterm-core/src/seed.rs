//! Seed data every store starts from

use crate::{
    AppState, ArmInfo, ArmState, BattleReplay, ComponentId, Part, PartId, PartKind, ReplayId,
    ReplayResult, RobotComponent, RobotStats,
};
use chrono::NaiveDate;
use indexmap::IndexMap;

/// Initial notoriety level
pub const INITIAL_NOTORIETY: f64 = 45.0;

/// Initial telemetry
pub fn initial_stats() -> RobotStats {
    RobotStats {
        battery: 75.0,
        armor: 60.0,
        weapon_heat: 30.0,
        stability: 85.0,
    }
}

/// The fixed component roster, in display order
pub fn initial_components() -> IndexMap<ComponentId, RobotComponent> {
    [
        ("left-arm", "Left Arm", 40.0, true, false),
        ("right-arm", "Right Arm", 90.0, false, false),
        ("core", "Core", 65.0, true, true),
        ("left-leg", "Left Leg", 80.0, false, false),
        ("right-leg", "Right Leg", 85.0, false, false),
    ]
    .into_iter()
    .map(|(id, name, durability, damaged, critical)| {
        let id = ComponentId::new(id);
        let component = RobotComponent {
            id: id.clone(),
            name: name.to_string(),
            durability,
            damaged,
            critical,
        };
        (id, component)
    })
    .collect()
}

/// The part catalog
pub fn initial_parts() -> Vec<Part> {
    [
        (1, "Plasma Cannon Mk.II", PartKind::Weapon, 85.0, 45.0, true, false),
        (2, "Reinforced Chassis", PartKind::Armor, 70.0, 120.0, true, false),
        (3, "Overclocked Core", PartKind::Core, 50.0, 30.0, false, true),
        (4, "Hydraulic Arm", PartKind::Limb, 90.0, 60.0, true, false),
    ]
    .into_iter()
    .map(|(id, name, kind, durability, weight, compatible, illegal)| Part {
        id: PartId::new(id),
        name: name.to_string(),
        kind,
        durability,
        weight,
        compatible,
        illegal,
    })
    .collect()
}

/// Battle history, newest first
pub fn initial_replays() -> Vec<BattleReplay> {
    [
        (1, (2027, 10, 25), "Iron Mongrels", ReplayResult::Win, 180),
        (2, (2027, 10, 24), "Steel Hawks", ReplayResult::Loss, 95),
        (3, (2027, 10, 23), "Rust Riders", ReplayResult::Win, 210),
    ]
    .into_iter()
    .map(|(id, (y, m, d), opponent, result, duration)| BattleReplay {
        id: ReplayId::new(id),
        date: NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
        opponent: opponent.to_string(),
        result,
        duration,
    })
    .collect()
}

/// Arm repair details
pub fn initial_arm_info() -> ArmInfo {
    ArmInfo {
        state: ArmState::Damaged,
        health: 40.0,
        repair_time: 120,
        material_cost: 850,
        upgrades: vec![
            "Reinforced Joints".to_string(),
            "Enhanced Grip".to_string(),
            "Quick Release".to_string(),
        ],
    }
}

/// Full seeded state
pub fn initial_state() -> AppState {
    AppState {
        robot_stats: initial_stats(),
        components: initial_components(),
        parts: initial_parts(),
        alerts: Vec::new(),
        replays: initial_replays(),
        notoriety: INITIAL_NOTORIETY,
        arm_info: initial_arm_info(),
        selected_arm: false,
    }
}
