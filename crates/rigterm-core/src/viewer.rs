//! Load state of decorative viewers (robot model, arm model)
//!
//! A viewer that fails to load degrades to a static placeholder. The failure
//! is logged and reported through the slot; the store is never involved.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Message shown in place of a viewer that failed to load
pub const PLACEHOLDER_TEXT: &str = "Failed to load 3D viewer";

/// What a viewer slot should currently display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ViewerSlot {
    #[default]
    Loading,
    Ready,
    Placeholder { reason: String },
}

impl ViewerSlot {
    /// Turn the outcome of loading `name` into a display state
    pub fn resolve<T, E: fmt::Display>(name: &str, result: Result<T, E>) -> (Self, Option<T>) {
        match result {
            Ok(asset) => (ViewerSlot::Ready, Some(asset)),
            Err(e) => {
                tracing::warn!(viewer = name, error = %e, "viewer failed to load, showing placeholder");
                (
                    ViewerSlot::Placeholder {
                        reason: e.to_string(),
                    },
                    None,
                )
            }
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, ViewerSlot::Placeholder { .. })
    }

    /// Text to render while not ready
    pub fn caption(&self) -> Option<&'static str> {
        match self {
            ViewerSlot::Loading => Some("Loading..."),
            ViewerSlot::Ready => None,
            ViewerSlot::Placeholder { .. } => Some(PLACEHOLDER_TEXT),
        }
    }
}
