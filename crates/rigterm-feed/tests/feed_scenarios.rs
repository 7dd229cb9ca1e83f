use chrono::{TimeZone, Utc};
use rigterm_core::{AlertKind, AuthorityGate, ManualClock, ScriptedRandom, Store};
use rigterm_feed::{spawn_alert_feed, AlertFeed, FeedConfig};
use std::sync::Arc;
use std::time::Duration;

fn store() -> Store {
    let start = Utc.with_ymd_and_hms(2027, 10, 26, 21, 0, 0).unwrap();
    Store::new(Arc::new(ManualClock::new(start)))
}

/// Every tick fires an authority alert with the first message
fn always_authority() -> AlertFeed<ScriptedRandom> {
    let config = FeedConfig {
        probability: 1.0,
        kinds: vec![AlertKind::Authority],
        ..FeedConfig::default()
    };
    AlertFeed::new(config, ScriptedRandom::new([0.5]))
}

#[tokio::test(start_paused = true)]
async fn test_feed_ticks_on_interval() {
    let store = store();
    let _task = spawn_alert_feed(store.clone(), always_authority());

    tokio::time::sleep(Duration::from_secs(9)).await;
    assert!(store.alerts().is_empty());

    tokio::time::sleep(Duration::from_secs(26)).await;
    assert_eq!(store.alerts().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_feed_stops_when_cancelled() {
    let store = store();
    let mut task = spawn_alert_feed(store.clone(), always_authority());

    tokio::time::sleep(Duration::from_secs(15)).await;
    assert_eq!(store.alerts().len(), 1);

    task.cancel();
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(store.alerts().len(), 1);
    assert!(!task.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_dropping_handle_stops_feed() {
    let store = store();
    {
        let _task = spawn_alert_feed(store.clone(), always_authority());
        tokio::time::sleep(Duration::from_secs(25)).await;
    }
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(store.alerts().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_feed_raises_gate_until_acknowledged() {
    let store = store();
    let gate = AuthorityGate::watch(&store);
    let mut task = spawn_alert_feed(store.clone(), always_authority());

    tokio::time::sleep(Duration::from_secs(21)).await;
    task.cancel();
    assert!(gate.is_visible());
    assert_eq!(AuthorityGate::pending_count(&store.snapshot()), 2);

    let acked = AuthorityGate::acknowledge_all(&store);
    assert_eq!(acked.len(), 2);
    assert!(!gate.is_visible());
}

#[tokio::test(start_paused = true)]
async fn test_quiet_feed_adds_nothing() {
    let store = store();
    let feed = AlertFeed::new(FeedConfig::default(), ScriptedRandom::new([0.2]));
    let _task = spawn_alert_feed(store.clone(), feed);

    tokio::time::sleep(Duration::from_secs(100)).await;
    assert!(store.alerts().is_empty());
}
