//! Rig Control Terminal
//!
//! A console front end over the shared store:
//! - Alerts arrive from the simulated feed every few seconds
//! - Authority broadcasts block every key but [a] until acknowledged
//! - Boost, arm repair and notoriety controls drive store mutations
//! - Logs go to `rigterm.log` so they don't tear the screen

mod render;

use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use rigterm_core::{
    views, AlertKind, ArmPanel, ArmState, AuthorityGate, BoostMode, NewAlert, NewReplay,
    ReplayResult, Store, XorShiftRng,
};
use rigterm_feed::{
    rng_from_config, spawn_alert_feed, spawn_glitch_trigger, spawn_live_clock, AlertFeed,
    GlitchTrigger, TerminalConfig,
};
use std::io::stdout;
use std::path::Path;
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;

const FRAME_MS: u64 = 100;
const NOTORIETY_STEP: f64 = 5.0;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _log_guard = init_tracing();
    let config = load_config()?;

    // Timers need a runtime; the key loop itself stays on this thread.
    let runtime = tokio::runtime::Runtime::new()?;
    let _enter = runtime.enter();

    let store = Store::with_system_clock();
    store.add_alert(NewAlert::new(
        AlertKind::System,
        "Terminal online. Left arm still held together with tape.",
    ));

    terminal::enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, Hide)?;

    let result = run_terminal(&mut stdout, &store, &config);

    execute!(stdout, Show, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    result
}

fn init_tracing() -> WorkerGuard {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(
        ".",
        "rigterm.log",
    ));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_target(false)
            .with_ansi(false)
            .compact()
            .init();
    }
    guard
}

fn load_config() -> Result<TerminalConfig, Box<dyn std::error::Error>> {
    if let Some(path) = std::env::args().nth(1) {
        return Ok(TerminalConfig::load(path)?);
    }

    let paths = ["demos/console/data/terminal.ron", "data/terminal.ron"];
    for path in &paths {
        if Path::new(path).exists() {
            return Ok(TerminalConfig::load(path)?);
        }
    }

    tracing::info!("no config file found, using defaults");
    Ok(TerminalConfig::default())
}

fn run_terminal(
    stdout: &mut std::io::Stdout,
    store: &Store,
    config: &TerminalConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let gate = AuthorityGate::watch(store);
    let arm = ArmPanel::new(store.clone());
    let mut boost = BoostMode::new();

    // Handles live as long as this view; dropping them stops the timers.
    let _feed = spawn_alert_feed(
        store.clone(),
        AlertFeed::new(config.feed.clone(), rng_from_config(config)),
    );
    let (_clock_task, clock_rx) = spawn_live_clock(store.clock(), config.clock_interval());
    let glitch_rng = match config.seed {
        Some(seed) => XorShiftRng::new(seed.wrapping_add(1)),
        None => XorShiftRng::from_entropy(),
    };
    let (_glitch_task, glitch_rx) =
        spawn_glitch_trigger(GlitchTrigger::new(config.glitch.clone(), glitch_rng));

    let mut status = String::from("Ready.");

    loop {
        let state = store.snapshot();
        let clock = clock_rx.borrow().clone();
        let frame = render::Frame {
            state: &state,
            clock: &clock,
            glitch: *glitch_rx.borrow(),
            gate_visible: gate.is_visible(),
            boost_active: boost.is_active(store),
            status: &status,
        };
        render::draw(stdout, &frame)?;

        if !event::poll(Duration::from_millis(FRAME_MS))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return Ok(()),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(()),
            KeyCode::Char('a') => {
                let acked = AuthorityGate::acknowledge_all(store);
                status = format!("Acknowledged {} authority broadcast(s).", acked.len());
            }
            // While the broadcast is up nothing else gets through
            _ if gate.is_visible() => {
                status = "Authority broadcast pending. Press [a] to acknowledge.".into();
            }
            KeyCode::Char('k') => {
                let oldest = views::unacknowledged_alerts(&store.snapshot())
                    .next()
                    .map(|a| a.id);
                status = match oldest {
                    Some(id) => {
                        store.acknowledge_alert(id);
                        format!("Acknowledged {id}.")
                    }
                    None => "No alerts. Suspiciously quiet.".into(),
                };
            }
            KeyCode::Char('b') => {
                status = match boost.engage(store) {
                    Ok(_) => "BOOST MODE ENGAGED. Hope you don't explode.".into(),
                    Err(refusal) => format!("Boost unavailable: {refusal}."),
                };
            }
            KeyCode::Char('o') => {
                if arm.is_open() {
                    arm.close();
                } else {
                    arm.open();
                }
            }
            KeyCode::Char('r') if arm.is_open() => {
                arm.repair();
                status = "Arm repair initiated.".into();
            }
            KeyCode::Char('1') if arm.is_open() => arm.choose_state(ArmState::Normal),
            KeyCode::Char('2') if arm.is_open() => arm.choose_state(ArmState::Damaged),
            KeyCode::Char('3') if arm.is_open() => arm.choose_state(ArmState::Repaired),
            KeyCode::Char('+') => store.set_notoriety(store.notoriety() + NOTORIETY_STEP),
            KeyCode::Char('-') => store.set_notoriety(store.notoriety() - NOTORIETY_STEP),
            KeyCode::Char('h') => {
                let today = store.clock().now().date_naive();
                store.add_replay(NewReplay::new(today, "Training Drone", ReplayResult::Win, 42));
                status = "Sparring match logged.".into();
            }
            _ => {}
        }
    }
}
