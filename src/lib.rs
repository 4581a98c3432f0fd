//! # DataPulse Refresh Core
//!
//! Keeps a market, weather and news dashboard fresh. Five independent data
//! sources (crypto, stocks, weather, news, exchange rates) are fetched from
//! the DataPulse backend proxy, each under its own timeout, and every outcome
//! is recorded per source so one failing feed never blanks the others.
//!
//! ## Usage
//!
//! ```no_run
//! use datapulse::{DashboardConfig, RefreshController, RefreshCoordinator, ToastChannel};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DashboardConfig::load_or_default(None)?;
//! let toasts = Arc::new(ToastChannel::default());
//! let coordinator = Arc::new(RefreshCoordinator::from_config(config.clone(), toasts.clone())?);
//!
//! // Button plus auto-refresh countdown, driven by a background task
//! let controller = RefreshController::spawn(coordinator.clone(), &config.auto_refresh);
//! controller.press().await?;
//!
//! let view = controller.view();
//! println!("{}", view.label);
//! controller.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auto_refresh;
pub mod client;
pub mod config;
pub mod constants;
pub mod controller;
pub mod coordinator;
pub mod error;
pub mod format;
pub mod metrics;
pub mod refresh_button;
pub mod reporter;
pub mod sources;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use api::DashboardApi;
pub use auto_refresh::{AutoRefresh, AutoRefreshState, RefreshInterval};
pub use config::DashboardConfig;
pub use controller::{ControllerView, RefreshController};
pub use coordinator::{RefreshCoordinator, RefreshSummary};
pub use error::{ConfigError, DashboardError, FetchError};
pub use format::{format_elapsed, format_elapsed_now};
pub use metrics::SourceMetrics;
pub use refresh_button::{ButtonState, RefreshButton};
pub use reporter::{ErrorReporter, Toast, ToastChannel, TracingReporter};
pub use sources::BackendApi;
pub use store::DashboardStore;
pub use types::{
    ComponentHealth, DashboardEvent, DataSourceResult, HealthStatus, RefreshState, SourceId,
    SourceOutcome, SourcePayload,
};
