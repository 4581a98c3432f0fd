//! Periodic auto-refresh state machine
//!
//! Pure state: the owner feeds it one `tick()` per second and starts a
//! refresh whenever a transition asks for one. Timers live in
//! [`crate::controller`].

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Supported auto-refresh periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub enum RefreshInterval {
    Secs15,
    #[default]
    Secs30,
    Secs60,
    Secs300,
}

impl RefreshInterval {
    pub fn secs(&self) -> u32 {
        match self {
            RefreshInterval::Secs15 => 15,
            RefreshInterval::Secs30 => 30,
            RefreshInterval::Secs60 => 60,
            RefreshInterval::Secs300 => 300,
        }
    }

    /// Short label for interval pickers
    pub fn label(&self) -> &'static str {
        match self {
            RefreshInterval::Secs15 => "15s",
            RefreshInterval::Secs30 => "30s",
            RefreshInterval::Secs60 => "1m",
            RefreshInterval::Secs300 => "5m",
        }
    }

    pub fn all() -> &'static [RefreshInterval] {
        &[
            RefreshInterval::Secs15,
            RefreshInterval::Secs30,
            RefreshInterval::Secs60,
            RefreshInterval::Secs300,
        ]
    }
}

impl TryFrom<u64> for RefreshInterval {
    type Error = ConfigError;

    fn try_from(secs: u64) -> Result<Self, Self::Error> {
        match secs {
            15 => Ok(RefreshInterval::Secs15),
            30 => Ok(RefreshInterval::Secs30),
            60 => Ok(RefreshInterval::Secs60),
            300 => Ok(RefreshInterval::Secs300),
            other => Err(ConfigError::invalid(format!(
                "unsupported auto-refresh interval {}s (expected 15, 30, 60 or 300)",
                other
            ))),
        }
    }
}

impl From<RefreshInterval> for u64 {
    fn from(interval: RefreshInterval) -> Self {
        interval.secs() as u64
    }
}

impl std::fmt::Display for RefreshInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoRefreshState {
    Idle,
    Running {
        interval: RefreshInterval,
        remaining: u32,
    },
}

/// Auto-refresh toggle plus its countdown
#[derive(Debug, Clone)]
pub struct AutoRefresh {
    state: AutoRefreshState,
    /// Interval used on the next enable; kept while idle
    interval: RefreshInterval,
}

impl AutoRefresh {
    pub fn new(interval: RefreshInterval) -> Self {
        Self {
            state: AutoRefreshState::Idle,
            interval,
        }
    }

    /// Turns auto-refresh on. Returns true when a refresh must start now.
    ///
    /// Enabling while already running only changes the interval.
    #[must_use]
    pub fn enable(&mut self, interval: RefreshInterval) -> bool {
        if self.is_running() {
            if interval != self.interval {
                self.set_interval(interval);
            }
            return false;
        }
        self.interval = interval;
        self.state = AutoRefreshState::Running {
            interval: self.interval,
            remaining: self.interval.secs(),
        };
        tracing::info!(interval = %self.interval, "Auto-refresh enabled");
        true
    }

    pub fn disable(&mut self) {
        if self.is_running() {
            tracing::info!("Auto-refresh disabled");
        }
        self.state = AutoRefreshState::Idle;
    }

    /// Changes the period; a running countdown restarts from the new value
    pub fn set_interval(&mut self, interval: RefreshInterval) {
        self.interval = interval;
        if let AutoRefreshState::Running { .. } = self.state {
            self.state = AutoRefreshState::Running {
                interval,
                remaining: interval.secs(),
            };
        }
    }

    /// One-second tick. Returns true when the countdown elapsed and a
    /// refresh must start; the countdown then restarts.
    #[must_use]
    pub fn tick(&mut self) -> bool {
        match &mut self.state {
            AutoRefreshState::Idle => false,
            AutoRefreshState::Running {
                interval,
                remaining,
            } => {
                *remaining = remaining.saturating_sub(1);
                if *remaining == 0 {
                    *remaining = interval.secs();
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, AutoRefreshState::Running { .. })
    }

    /// Seconds until the next automatic refresh, if running
    pub fn remaining(&self) -> Option<u32> {
        match self.state {
            AutoRefreshState::Running { remaining, .. } => Some(remaining),
            AutoRefreshState::Idle => None,
        }
    }

    pub fn interval(&self) -> RefreshInterval {
        self.interval
    }

    pub fn state(&self) -> AutoRefreshState {
        self.state
    }
}

impl Default for AutoRefresh {
    fn default() -> Self {
        Self::new(RefreshInterval::default())
    }
}
