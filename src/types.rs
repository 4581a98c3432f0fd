//! Types for the dashboard refresh core

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use crate::error::FetchError;

/// The five independent upstream feeds shown on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceId {
    Crypto,
    Stock,
    Weather,
    News,
    ExchangeRate,
}

impl SourceId {
    /// Get the display name used in logs and toasts
    pub fn name(&self) -> &'static str {
        match self {
            SourceId::Crypto => "crypto",
            SourceId::Stock => "stock",
            SourceId::Weather => "weather",
            SourceId::News => "news",
            SourceId::ExchangeRate => "exchangeRate",
        }
    }

    /// Get all sources, in dashboard order
    pub fn all() -> &'static [SourceId] {
        &[
            SourceId::Crypto,
            SourceId::Stock,
            SourceId::Weather,
            SourceId::News,
            SourceId::ExchangeRate,
        ]
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One entry of `GET /crypto/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoQuote {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    pub price: f64,
}

impl CryptoQuote {
    /// Title shown on the tile: the asset name, or the symbol when the backend omits it
    pub fn title(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.symbol)
    }
}

/// Response of `GET /stocks/?symbol=S`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockQuote {
    pub symbol: String,
    pub price: f64,
}

/// Response of `GET /weather/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub city: String,
    pub temp: f64,
    pub desc: String,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub wind_speed: Option<f64>,
    #[serde(default)]
    pub feels_like: Option<f64>,
    #[serde(default)]
    pub pressure: Option<f64>,
    #[serde(default)]
    pub visibility: Option<f64>,
    #[serde(default)]
    pub icon: Option<String>,
}

/// One entry of `GET /news/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsHeadline {
    pub title: String,
    pub source: String,
    #[serde(default)]
    pub image: Option<String>,
    pub url: String,
    #[serde(rename = "publishedAt")]
    pub published_at: String,
}

/// Currency pair (e.g. `USD_EUR`) to rate
pub type ExchangeRates = BTreeMap<String, f64>;

/// Source-specific payload of a successful fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum SourcePayload {
    Crypto(Vec<CryptoQuote>),
    Stocks(Vec<StockQuote>),
    Weather(WeatherReport),
    News(Vec<NewsHeadline>),
    ExchangeRates(ExchangeRates),
}

impl SourcePayload {
    /// The source this payload belongs to
    pub fn source(&self) -> SourceId {
        match self {
            SourcePayload::Crypto(_) => SourceId::Crypto,
            SourcePayload::Stocks(_) => SourceId::Stock,
            SourcePayload::Weather(_) => SourceId::Weather,
            SourcePayload::News(_) => SourceId::News,
            SourcePayload::ExchangeRates(_) => SourceId::ExchangeRate,
        }
    }

    /// Number of items carried, for logging
    pub fn len(&self) -> usize {
        match self {
            SourcePayload::Crypto(v) => v.len(),
            SourcePayload::Stocks(v) => v.len(),
            SourcePayload::Weather(_) => 1,
            SourcePayload::News(v) => v.len(),
            SourcePayload::ExchangeRates(m) => m.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Tagged result of one source's fetch within a refresh cycle
///
/// Every source produces exactly one of these per cycle, whatever happened
/// to its request.
#[derive(Debug, Clone)]
pub struct SourceOutcome {
    pub source: SourceId,
    pub result: Result<SourcePayload, FetchError>,
    pub latency: std::time::Duration,
}

impl SourceOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Latest fetch attempt for a source, as exposed to views
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSourceResult {
    pub source: SourceId,
    /// Last successfully fetched payload; kept across failures
    pub payload: Option<SourcePayload>,
    pub fetched_at: DateTime<Utc>,
    pub succeeded: bool,
    pub error: Option<String>,
}

/// Per-source freshness and error flags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefreshState {
    pub last_updated: HashMap<SourceId, Option<DateTime<Utc>>>,
    pub last_error: HashMap<SourceId, bool>,
}

impl RefreshState {
    /// State before any refresh: every source "Never" updated, no errors
    pub fn empty() -> Self {
        let mut state = Self::default();
        for source in SourceId::all() {
            state.last_updated.insert(*source, None);
            state.last_error.insert(*source, false);
        }
        state
    }

    pub fn last_updated(&self, source: SourceId) -> Option<DateTime<Utc>> {
        self.last_updated.get(&source).copied().flatten()
    }

    pub fn has_error(&self, source: SourceId) -> bool {
        self.last_error.get(&source).copied().unwrap_or(false)
    }

    /// Most recent successful update across all sources
    pub fn newest_update(&self) -> Option<DateTime<Utc>> {
        self.last_updated.values().flatten().max().copied()
    }
}

/// Dashboard events broadcast to subscribers (views, the CLI printer, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DashboardEvent {
    /// A source fetched fresh data
    SourceUpdated {
        id: Uuid,
        source: SourceId,
        items: usize,
        timestamp: DateTime<Utc>,
    },

    /// A source failed; its previous data is kept
    SourceFetchFailed {
        id: Uuid,
        source: SourceId,
        error_message: String,
        timestamp: DateTime<Utc>,
    },

    /// A refresh cycle settled for every source
    RefreshCompleted {
        id: Uuid,
        succeeded: usize,
        failed: usize,
        timestamp: DateTime<Utc>,
    },
}

impl DashboardEvent {
    /// Get the event ID
    pub fn id(&self) -> Uuid {
        match self {
            DashboardEvent::SourceUpdated { id, .. } => *id,
            DashboardEvent::SourceFetchFailed { id, .. } => *id,
            DashboardEvent::RefreshCompleted { id, .. } => *id,
        }
    }

    /// Get the event type as string
    pub fn event_type(&self) -> &'static str {
        match self {
            DashboardEvent::SourceUpdated { .. } => "SOURCE_UPDATED",
            DashboardEvent::SourceFetchFailed { .. } => "SOURCE_FETCH_FAILED",
            DashboardEvent::RefreshCompleted { .. } => "REFRESH_COMPLETED",
        }
    }
}

impl std::fmt::Display for DashboardEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DashboardEvent::SourceUpdated { source, items, .. } => {
                write!(f, "{} updated ({} items)", source, items)
            }
            DashboardEvent::SourceFetchFailed {
                source,
                error_message,
                ..
            } => write!(f, "{} fetch failed: {}", source, error_message),
            DashboardEvent::RefreshCompleted {
                succeeded, failed, ..
            } => write!(f, "Refresh completed: {} ok, {} failed", succeeded, failed),
        }
    }
}

/// Overall health status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    /// Every source has fresh data
    Healthy,
    /// Some sources are failing or stale but data is shown
    Degraded,
    /// No source has ever been fetched successfully
    Unhealthy,
}

/// Component health information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Component name
    pub name: String,
    /// Component status
    pub status: HealthStatus,
    /// Optional status message
    pub message: Option<String>,
    /// Component-specific details
    pub details: HashMap<String, serde_json::Value>,
    /// Last checked timestamp
    pub last_checked: DateTime<Utc>,
}
