//! Emergency mode state machine.

use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

/// Which face the dashboard shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmergencyState {
    /// The overview with the emergency trigger.
    #[default]
    Normal,
    /// The full-screen emergency information view.
    Active,
}

impl fmt::Display for EmergencyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Active => write!(f, "active"),
        }
    }
}

/// Two-state controller: `Normal` and `Active`.
///
/// Declaring is only possible once data has loaded; the trigger is simply
/// not offered before then. Both transitions are no-ops when they do not
/// apply, and report whether anything changed.
#[derive(Debug, Default)]
pub struct EmergencyController {
    state: EmergencyState,
}

impl EmergencyController {
    /// A controller in `Normal`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> EmergencyState {
        self.state
    }

    /// Whether the emergency view is showing.
    pub fn is_active(&self) -> bool {
        self.state == EmergencyState::Active
    }

    /// Whether [`declare`](Self::declare) would take effect.
    pub fn can_declare(&self, loaded: bool) -> bool {
        loaded && self.state == EmergencyState::Normal
    }

    /// `Normal -> Active`, only when `loaded`.
    pub fn declare(&mut self, loaded: bool) -> bool {
        if !loaded {
            debug!("Emergency trigger unavailable until data has loaded");
            return false;
        }
        if self.is_active() {
            return false;
        }
        self.state = EmergencyState::Active;
        info!("Emergency declared");
        true
    }

    /// `Active -> Normal`.
    pub fn cancel(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.state = EmergencyState::Normal;
        info!("Emergency cancelled");
        true
    }

    /// Back to `Normal` without logging a cancellation, as on a fresh mount.
    pub fn reset(&mut self) {
        self.state = EmergencyState::Normal;
    }
}
