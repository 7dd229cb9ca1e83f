//! Authority broadcast gate
//!
//! While any unacknowledged authority alert exists the whole interface sits
//! behind a modal. Visibility is a pure function of the state; [`GateWatch`]
//! recomputes it after every store mutation.

use crate::views::authority_alerts;
use crate::{AlertId, AppState, Store, Subscription};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Stateless gate rules
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorityGate;

impl AuthorityGate {
    /// True when at least one authority alert is unacknowledged
    pub fn is_blocking(state: &AppState) -> bool {
        authority_alerts(state).next().is_some()
    }

    /// Number of pending authority alerts
    pub fn pending_count(state: &AppState) -> usize {
        authority_alerts(state).count()
    }

    /// Message shown in the modal: the oldest pending authority alert
    pub fn headline(state: &AppState) -> Option<&str> {
        authority_alerts(state).next().map(|a| a.message.as_str())
    }

    /// Acknowledge every authority alert pending right now, oldest first.
    ///
    /// Returns the acknowledged IDs. Authority alerts raised after the
    /// snapshot is taken stay pending.
    pub fn acknowledge_all(store: &Store) -> Vec<AlertId> {
        let pending: Vec<AlertId> = authority_alerts(&store.snapshot()).map(|a| a.id).collect();
        for id in &pending {
            store.acknowledge_alert(*id);
        }
        if !pending.is_empty() {
            tracing::info!(count = pending.len(), "authority broadcast acknowledged");
        }
        pending
    }

    /// Track modal visibility for the lifetime of the returned watch
    pub fn watch(store: &Store) -> GateWatch {
        let visible = Arc::new(AtomicBool::new(Self::is_blocking(&store.snapshot())));
        let flag = Arc::clone(&visible);
        let subscription = store.subscribe(move |state| {
            let blocking = AuthorityGate::is_blocking(state);
            if flag.swap(blocking, Ordering::SeqCst) != blocking {
                tracing::debug!(blocking, "authority gate toggled");
            }
        });
        GateWatch {
            visible,
            _subscription: subscription,
        }
    }
}

/// Live modal visibility, kept current by a store subscription
#[derive(Debug)]
pub struct GateWatch {
    visible: Arc<AtomicBool>,
    _subscription: Subscription,
}

impl GateWatch {
    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }
}
