//! Refresh controller
//!
//! Owns the refresh button and the auto-refresh countdown in one background
//! task. Timers exist only while their state needs them, so nothing fires
//! after auto-refresh is disabled or the controller is shut down.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use crate::{
    auto_refresh::{AutoRefresh, AutoRefreshState, RefreshInterval},
    config::AutoRefreshConfig,
    constants::TICK_INTERVAL_MS,
    coordinator::{RefreshCoordinator, RefreshSummary},
    error::{DashboardError, FetchError},
    refresh_button::{ButtonState, RefreshButton},
};

const COMMAND_CHANNEL_CAPACITY: usize = 32;

enum Command {
    Press,
    SetAutoRefresh(bool),
    ToggleAutoRefresh,
    SetInterval(RefreshInterval),
    Shutdown,
}

/// What the refresh control shows right now
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerView {
    pub button: ButtonState,
    pub auto_refresh: AutoRefreshState,
    /// Button text, e.g. "Refresh (3s)" or "Auto (12s)"
    pub label: String,
    pub enabled: bool,
}

impl ControllerView {
    fn new(button: &RefreshButton, auto: &AutoRefresh) -> Self {
        let label = match (button.state(), auto.remaining()) {
            (ButtonState::Ready, Some(remaining)) => format!("Auto ({}s)", remaining),
            _ => button.label(),
        };
        Self {
            button: button.state().clone(),
            auto_refresh: auto.state(),
            label,
            enabled: button.is_enabled(),
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.button {
            ButtonState::Errored(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_auto_refresh_on(&self) -> bool {
        matches!(self.auto_refresh, AutoRefreshState::Running { .. })
    }
}

fn tick_timer() -> Interval {
    let period = Duration::from_millis(TICK_INTERVAL_MS);
    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}

async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn settle<T>(handle: &mut Option<JoinHandle<T>>) -> Result<T, JoinError> {
    match handle.as_mut() {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

struct ControllerTask {
    coordinator: Arc<RefreshCoordinator>,
    button: RefreshButton,
    auto: AutoRefresh,
    cooldown_timer: Option<Interval>,
    auto_timer: Option<Interval>,
    in_flight: Option<JoinHandle<Result<RefreshSummary, FetchError>>>,
    view: watch::Sender<ControllerView>,
}

impl ControllerTask {
    async fn run(mut self, mut commands: mpsc::Receiver<Command>, start_auto_refresh: bool) {
        tracing::info!(
            auto_refresh = start_auto_refresh,
            interval = %self.auto.interval(),
            "Refresh controller started"
        );

        if start_auto_refresh {
            self.set_auto_refresh(true);
            self.publish();
        }

        loop {
            tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else { break };
                    if !self.handle(command) {
                        break;
                    }
                }
                _ = next_tick(&mut self.cooldown_timer) => self.on_cooldown_tick(),
                _ = next_tick(&mut self.auto_timer) => self.on_auto_tick(),
                joined = settle(&mut self.in_flight) => {
                    self.in_flight = None;
                    self.on_refresh_finished(joined);
                }
            }
            self.publish();
        }

        tracing::info!("Refresh controller stopped");
    }

    /// Returns false once the controller must stop
    fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Press => self.start_refresh("manual"),
            Command::SetAutoRefresh(enabled) => self.set_auto_refresh(enabled),
            Command::ToggleAutoRefresh => {
                let enabled = !self.auto.is_running();
                self.set_auto_refresh(enabled);
            }
            Command::SetInterval(interval) => {
                self.auto.set_interval(interval);
                if self.auto.is_running() {
                    self.auto_timer = Some(tick_timer());
                }
            }
            Command::Shutdown => return false,
        }
        true
    }

    fn set_auto_refresh(&mut self, enabled: bool) {
        if !enabled {
            self.auto.disable();
            self.auto_timer = None;
            return;
        }

        if self.auto.enable(self.auto.interval()) {
            self.button.clear_cooldown();
            self.cooldown_timer = None;
            self.auto_timer = Some(tick_timer());
            self.start_refresh("auto-refresh enabled");
        }
    }

    /// Starts `refresh_backend_then_all` unless one is already running
    fn start_refresh(&mut self, trigger: &'static str) {
        if self.in_flight.is_some() {
            tracing::debug!(trigger, "Refresh already in flight, dropping trigger");
            return;
        }
        if !self.button.press() {
            tracing::debug!(trigger, state = ?self.button.state(), "Refresh not available");
            return;
        }

        tracing::info!(trigger, "Starting refresh");
        let coordinator = self.coordinator.clone();
        self.in_flight = Some(tokio::spawn(async move {
            coordinator.refresh_backend_then_all().await
        }));
    }

    fn on_refresh_finished(
        &mut self,
        joined: Result<Result<RefreshSummary, FetchError>, JoinError>,
    ) {
        match joined {
            Ok(Ok(summary)) => {
                tracing::debug!(
                    cycle = %summary.id,
                    succeeded = summary.succeeded(),
                    failed = summary.failed(),
                    "Refresh finished"
                );
                self.button.succeed(self.auto.is_running());
                if self.button.in_cooldown() {
                    self.cooldown_timer = Some(tick_timer());
                }
            }
            Ok(Err(e)) => self.button.fail(e.to_string()),
            Err(e) if e.is_panic() => {
                tracing::error!("Refresh task panicked");
                self.button.fail("refresh task panicked");
            }
            Err(_) => self.button.fail("refresh cancelled"),
        }
    }

    fn on_cooldown_tick(&mut self) {
        self.button.tick();
        if !self.button.in_cooldown() {
            self.cooldown_timer = None;
        }
    }

    fn on_auto_tick(&mut self) {
        if self.auto.tick() {
            self.start_refresh("interval");
        }
    }

    fn publish(&self) {
        let next = ControllerView::new(&self.button, &self.auto);
        self.view.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}

impl Drop for ControllerTask {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

/// Handle to the background refresh controller
///
/// Dropping the handle stops the controller and any refresh it started.
pub struct RefreshController {
    commands: mpsc::Sender<Command>,
    view: watch::Receiver<ControllerView>,
    task: Option<JoinHandle<()>>,
}

impl RefreshController {
    /// Spawns the controller on the current tokio runtime
    ///
    /// With `auto_refresh.enabled` the first refresh starts immediately.
    pub fn spawn(coordinator: Arc<RefreshCoordinator>, auto_refresh: &AutoRefreshConfig) -> Self {
        let button = RefreshButton::new();
        let auto = AutoRefresh::new(auto_refresh.interval);
        let (view_tx, view_rx) = watch::channel(ControllerView::new(&button, &auto));
        let (commands, commands_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);

        let task = ControllerTask {
            coordinator,
            button,
            auto,
            cooldown_timer: None,
            auto_timer: None,
            in_flight: None,
            view: view_tx,
        };
        let handle = tokio::spawn(task.run(commands_rx, auto_refresh.enabled));

        Self {
            commands,
            view: view_rx,
            task: Some(handle),
        }
    }

    /// Clicks the refresh button (or "Retry Refresh")
    pub async fn press(&self) -> Result<(), DashboardError> {
        self.send(Command::Press).await
    }

    pub async fn set_auto_refresh(&self, enabled: bool) -> Result<(), DashboardError> {
        self.send(Command::SetAutoRefresh(enabled)).await
    }

    pub async fn toggle_auto_refresh(&self) -> Result<(), DashboardError> {
        self.send(Command::ToggleAutoRefresh).await
    }

    pub async fn set_interval(&self, interval: RefreshInterval) -> Result<(), DashboardError> {
        self.send(Command::SetInterval(interval)).await
    }

    /// Current view snapshot
    pub fn view(&self) -> ControllerView {
        self.view.borrow().clone()
    }

    /// Watch view changes
    pub fn subscribe(&self) -> watch::Receiver<ControllerView> {
        self.view.clone()
    }

    /// Stops the controller, cancelling pending ticks and any in-flight refresh
    pub async fn shutdown(mut self) -> Result<(), DashboardError> {
        let _ = self.commands.send(Command::Shutdown).await;
        if let Some(task) = self.task.take() {
            task.await.map_err(|_| DashboardError::Closed)?;
        }
        Ok(())
    }

    async fn send(&self, command: Command) -> Result<(), DashboardError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| DashboardError::Closed)
    }
}

impl Drop for RefreshController {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
