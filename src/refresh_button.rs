//! Manual refresh button state machine

use serde::{Deserialize, Serialize};

use crate::constants::MANUAL_COOLDOWN_SECS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonState {
    Ready,
    Refreshing,
    /// Seconds left before the button re-enables
    Cooldown(u32),
    /// Last refresh failed; the button offers a retry
    Errored(String),
}

/// Refresh button with post-refresh cooldown
#[derive(Debug, Clone)]
pub struct RefreshButton {
    state: ButtonState,
    cooldown_secs: u32,
}

impl RefreshButton {
    pub fn new() -> Self {
        Self::with_cooldown(MANUAL_COOLDOWN_SECS)
    }

    pub fn with_cooldown(cooldown_secs: u32) -> Self {
        Self {
            state: ButtonState::Ready,
            cooldown_secs,
        }
    }

    /// Click (or retry). Returns true if a refresh must start.
    #[must_use]
    pub fn press(&mut self) -> bool {
        match self.state {
            ButtonState::Ready | ButtonState::Errored(_) => {
                self.state = ButtonState::Refreshing;
                true
            }
            ButtonState::Refreshing | ButtonState::Cooldown(_) => false,
        }
    }

    /// Refresh finished successfully
    ///
    /// Enters the cooldown unless auto-refresh is already pacing requests.
    pub fn succeed(&mut self, auto_refresh_on: bool) {
        if self.state != ButtonState::Refreshing {
            tracing::debug!(state = ?self.state, "Ignoring refresh completion");
            return;
        }
        self.state = if auto_refresh_on || self.cooldown_secs == 0 {
            ButtonState::Ready
        } else {
            ButtonState::Cooldown(self.cooldown_secs)
        };
    }

    /// Refresh failed
    pub fn fail(&mut self, message: impl Into<String>) {
        if self.state != ButtonState::Refreshing {
            tracing::debug!(state = ?self.state, "Ignoring refresh failure");
            return;
        }
        self.state = ButtonState::Errored(message.into());
    }

    /// One-second cooldown tick
    pub fn tick(&mut self) {
        if let ButtonState::Cooldown(n) = self.state {
            self.state = if n <= 1 {
                ButtonState::Ready
            } else {
                ButtonState::Cooldown(n - 1)
            };
        }
    }

    /// Drops a running cooldown
    pub fn clear_cooldown(&mut self) {
        if let ButtonState::Cooldown(_) = self.state {
            self.state = ButtonState::Ready;
        }
    }

    pub fn state(&self) -> &ButtonState {
        &self.state
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self.state, ButtonState::Ready | ButtonState::Errored(_))
    }

    pub fn in_cooldown(&self) -> bool {
        matches!(self.state, ButtonState::Cooldown(_))
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            ButtonState::Errored(message) => Some(message),
            _ => None,
        }
    }

    pub fn label(&self) -> String {
        match &self.state {
            ButtonState::Ready => "Refresh".to_string(),
            ButtonState::Refreshing => "Refreshing...".to_string(),
            ButtonState::Cooldown(n) => format!("Refresh ({}s)", n),
            ButtonState::Errored(_) => "Retry Refresh".to_string(),
        }
    }
}

impl Default for RefreshButton {
    fn default() -> Self {
        Self::new()
    }
}
