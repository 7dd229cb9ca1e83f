//! Screen drawing

use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use rigterm_core::{
    views::{self, HealthBand, SurveillanceLevel},
    AlertKind, AppState, ArmState, AuthorityGate, ReplayResult,
};
use std::io::{Stdout, Write};

const MAX_ALERTS: usize = 5;
const MAX_REPLAYS: usize = 3;

/// Everything one frame shows
pub struct Frame<'a> {
    pub state: &'a AppState,
    pub clock: &'a str,
    pub glitch: bool,
    pub gate_visible: bool,
    pub boost_active: bool,
    pub status: &'a str,
}

/// Raw mode ignores `\n`, so every line is placed explicitly.
struct Lines<'a> {
    out: &'a mut Stdout,
    row: u16,
}

impl<'a> Lines<'a> {
    fn line(&mut self, color: Color, text: impl std::fmt::Display) -> std::io::Result<()> {
        queue!(
            self.out,
            MoveTo(0, self.row),
            SetForegroundColor(color),
            Print(text),
            ResetColor
        )?;
        self.row += 1;
        Ok(())
    }

    fn gap(&mut self) {
        self.row += 1;
    }
}

fn band_color(value: f64) -> Color {
    match HealthBand::from_value(value) {
        HealthBand::Critical => Color::Red,
        HealthBand::Worn => Color::Yellow,
        HealthBand::Good => Color::Green,
    }
}

fn alert_color(kind: AlertKind) -> Color {
    match kind {
        AlertKind::Authority => Color::Cyan,
        AlertKind::Warning => Color::Red,
        AlertKind::Crew => Color::Green,
        AlertKind::System => Color::Yellow,
    }
}

pub fn draw(out: &mut Stdout, frame: &Frame<'_>) -> std::io::Result<()> {
    queue!(out, Clear(ClearType::All))?;
    let mut lines = Lines { out, row: 0 };
    let state = frame.state;

    let title = if frame.glitch {
        "R1GT3RM // C0NTR0L T3RM1NAL"
    } else {
        "RIGTERM // CONTROL TERMINAL"
    };
    let title_color = if frame.glitch { Color::Magenta } else { Color::Yellow };
    lines.line(title_color, format!("{title}    {}", frame.clock))?;
    lines.gap();

    if frame.gate_visible {
        let headline = AuthorityGate::headline(state).unwrap_or_default();
        lines.line(Color::Cyan, "==================== AUTHORITY BROADCAST ====================")?;
        lines.line(Color::White, format!("  {headline}"))?;
        lines.line(
            Color::Cyan,
            format!(
                "  {} pending. Press [a] to ACKNOWLEDGE.",
                AuthorityGate::pending_count(state)
            ),
        )?;
        lines.line(Color::Cyan, "==============================================================")?;
        return lines.out.flush();
    }

    // Telemetry
    let stats = &state.robot_stats;
    lines.line(
        Color::White,
        format!(
            "Battery {:>5.1}  Armor {:>5.1}  Heat {:>5.1}  Stability {:>5.1}",
            stats.battery, stats.armor, stats.weapon_heat, stats.stability
        ),
    )?;
    if frame.boost_active {
        lines.line(Color::Red, "BOOST MODE ENGAGED")?;
    } else if views::is_low_power(stats) {
        lines.line(Color::Magenta, "LOW POWER: boost while you still can")?;
    }

    let level = views::surveillance_level(state);
    let level_color = match level {
        SurveillanceLevel::High => Color::Red,
        SurveillanceLevel::Moderate => Color::Yellow,
        SurveillanceLevel::Low => Color::Green,
    };
    lines.line(
        level_color,
        format!("Notoriety {:>3.0}% [{level}] {}", state.notoriety, level.status_text()),
    )?;
    lines.gap();

    // Components
    for component in state.components.values() {
        let mut flags = String::new();
        if component.damaged {
            flags.push_str(" DAMAGED");
        }
        if component.critical {
            flags.push_str(" CRITICAL");
        }
        lines.line(
            band_color(component.durability),
            format!("  {:<10} {:>5.1}%{flags}", component.name, component.durability),
        )?;
    }
    lines.gap();

    // Arm panel
    let arm = &state.arm_info;
    if state.selected_arm {
        let marker = |s: ArmState| if arm.state == s { "*" } else { " " };
        lines.line(Color::White, "ROBOT ARM")?;
        lines.line(band_color(arm.health), format!("  Health {:.0}%", arm.health))?;
        lines.line(
            Color::White,
            format!(
                "  [1]{} Normal  [2]{} Damaged  [3]{} Repaired",
                marker(ArmState::Normal),
                marker(ArmState::Damaged),
                marker(ArmState::Repaired)
            ),
        )?;
        lines.line(
            Color::White,
            format!(
                "  Repair {}s for {} credits  [r] Initiate Repair",
                arm.repair_time, arm.material_cost
            ),
        )?;
        lines.line(Color::DarkGrey, format!("  Upgrades: {}", arm.upgrades.join(", ")))?;
    } else {
        lines.line(Color::DarkGrey, format!("Arm: {} ([o] to inspect)", arm.state))?;
    }
    lines.gap();

    // Alerts
    let pending: Vec<_> = views::unacknowledged_alerts(state).collect();
    lines.line(Color::White, format!("ALERTS & COMMS ({} pending)", pending.len()))?;
    if pending.is_empty() {
        lines.line(Color::DarkGrey, "  No alerts. Suspiciously quiet.")?;
    }
    for alert in pending.iter().rev().take(MAX_ALERTS) {
        lines.line(
            alert_color(alert.kind),
            format!(
                "  {} [{}] {}",
                alert.timestamp.format("%H:%M:%S"),
                alert.kind,
                alert.message
            ),
        )?;
    }
    lines.gap();

    // History and inventory
    for replay in state.replays.iter().take(MAX_REPLAYS) {
        let color = match replay.result {
            ReplayResult::Win => Color::Green,
            ReplayResult::Loss => Color::Red,
            ReplayResult::Draw => Color::Yellow,
        };
        lines.line(
            color,
            format!(
                "  {} vs {:<14} {:<4} {}s",
                replay.date, replay.opponent, replay.result, replay.duration
            ),
        )?;
    }
    lines.line(
        Color::DarkGrey,
        format!(
            "Inventory: {} parts  Black market: {} parts",
            views::legal_parts(state).count(),
            views::illegal_parts(state).count()
        ),
    )?;
    lines.gap();

    lines.line(Color::White, frame.status)?;
    lines.line(
        Color::DarkGrey,
        "[k] ack  [b] boost  [o] arm  [+/-] notoriety  [h] log match  [q] quit",
    )?;

    lines.out.flush()
}
