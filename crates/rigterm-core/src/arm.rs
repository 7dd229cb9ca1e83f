//! Arm repair sidebar actions

use crate::views::HealthBand;
use crate::{ArmState, Store};

/// Actions the arm sidebar offers, expressed as store mutations
#[derive(Debug, Clone)]
pub struct ArmPanel {
    store: Store,
}

impl ArmPanel {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn open(&self) {
        self.store.set_selected_arm(true);
    }

    pub fn close(&self) {
        self.store.set_selected_arm(false);
    }

    pub fn is_open(&self) -> bool {
        self.store.selected_arm()
    }

    /// Pick a state from the status buttons
    pub fn choose_state(&self, state: ArmState) {
        self.store.set_arm_state(state);
    }

    /// "Initiate Repair": mark repaired, then close the panel
    pub fn repair(&self) {
        self.store.set_arm_state(ArmState::Repaired);
        self.store.set_selected_arm(false);
        tracing::info!("arm repair initiated");
    }

    /// Colour band of the arm health gauge
    pub fn health_band(&self) -> HealthBand {
        HealthBand::from_value(self.store.arm_info().health)
    }
}
