//! Refresh coordinator
//!
//! Fetches every data source concurrently, each under its own timeout, and
//! applies each outcome to the store as soon as it settles. A slow or failing
//! source never holds back or corrupts the others.

use chrono::{DateTime, Utc};
use futures::future::{join_all, BoxFuture, FutureExt};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tokio::time::Instant;
use uuid::Uuid;

use crate::{
    api::DashboardApi,
    config::DashboardConfig,
    constants::STALE_THRESHOLD_SECS,
    error::{ConfigError, FetchError},
    format::format_elapsed_now,
    metrics::{MetricsRegistry, SourceMetrics},
    reporter::{ErrorReporter, Toast},
    sources::{crypto::select_symbols, BackendApi},
    store::DashboardStore,
    types::{
        ComponentHealth, DashboardEvent, HealthStatus, RefreshState, SourceId, SourceOutcome,
        SourcePayload,
    },
};

/// Capacity of the dashboard event channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Result of one `refresh_all` cycle
#[derive(Debug, Clone)]
pub struct RefreshSummary {
    pub id: Uuid,
    /// Timestamp recorded as `last_updated` for every source that succeeded
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Exactly one outcome per source
    pub outcomes: Vec<SourceOutcome>,
}

impl RefreshSummary {
    pub fn outcome(&self, source: SourceId) -> Option<&SourceOutcome> {
        self.outcomes.iter().find(|o| o.source == source)
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn all_failed(&self) -> bool {
        self.succeeded() == 0
    }
}

/// Decrements the in-flight counter on every exit path
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Runs `fut` under `timeout`; expiry is a [`FetchError::Timeout`]
async fn with_timeout<T>(
    timeout: Duration,
    fut: impl Future<Output = Result<T, FetchError>>,
) -> Result<T, FetchError> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout),
    }
}

/// Orchestrates fetches across all data sources
///
/// # Example
/// ```no_run
/// use datapulse::{DashboardConfig, RefreshCoordinator, SourceId, TracingReporter};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let coordinator = RefreshCoordinator::from_config(
///     DashboardConfig::default(),
///     Arc::new(TracingReporter),
/// )?;
/// let summary = coordinator.refresh_all().await;
/// println!("{} sources updated", summary.succeeded());
/// println!("Weather: {}", coordinator.last_updated_label(SourceId::Weather).await);
/// # Ok(())
/// # }
/// ```
pub struct RefreshCoordinator {
    api: Arc<dyn DashboardApi>,
    config: RwLock<DashboardConfig>,
    store: Arc<DashboardStore>,
    metrics: MetricsRegistry,
    reporter: Arc<dyn ErrorReporter>,
    events: broadcast::Sender<DashboardEvent>,
    in_flight: AtomicUsize,
}

impl RefreshCoordinator {
    /// Creates a coordinator over any backend implementation
    pub fn new(
        api: Arc<dyn DashboardApi>,
        config: DashboardConfig,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            api,
            config: RwLock::new(config),
            store: Arc::new(DashboardStore::new()),
            metrics: MetricsRegistry::new(),
            reporter,
            events,
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Creates a coordinator talking to the configured HTTP backend
    pub fn from_config(
        config: DashboardConfig,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Result<Self, FetchError> {
        let api = Arc::new(BackendApi::new(&config.api)?);
        Ok(Self::new(api, config, reporter))
    }

    /// Fetches every source once
    ///
    /// Resolves after every source settled. Each outcome is applied to the
    /// store the moment its own request settles.
    pub async fn refresh_all(&self) -> RefreshSummary {
        let _guard = InFlight::enter(&self.in_flight);
        let config = self.config.read().await.clone();
        let timeout = config.api.request_timeout();
        let started_at = Utc::now();
        let id = Uuid::new_v4();

        tracing::debug!(cycle = %id, api = self.api.api_name(), "Starting refresh cycle");

        let crypto_symbols = config.crypto.symbols.clone();
        let top_n = config.crypto.top_n;
        let stock_symbols = config.stocks.active_symbols().to_vec();
        let city = config.weather.city.clone();
        let unit = config.weather.unit;
        let max_articles = config.news.max_articles;

        let tasks: Vec<BoxFuture<'_, SourceOutcome>> = vec![
            self.run_source(SourceId::Crypto, started_at, async move {
                let quotes = with_timeout(timeout, self.api.fetch_crypto(top_n)).await?;
                Ok::<_, FetchError>(SourcePayload::Crypto(select_symbols(quotes, &crypto_symbols)))
            })
            .boxed(),
            self.run_source(
                SourceId::Stock,
                started_at,
                self.fetch_stocks(stock_symbols, timeout),
            )
            .boxed(),
            self.run_source(SourceId::Weather, started_at, async move {
                let report = with_timeout(timeout, self.api.fetch_weather(&city, unit)).await?;
                Ok::<_, FetchError>(SourcePayload::Weather(report))
            })
            .boxed(),
            self.run_source(SourceId::News, started_at, async move {
                let mut headlines = with_timeout(timeout, self.api.fetch_news()).await?;
                headlines.truncate(max_articles);
                Ok::<_, FetchError>(SourcePayload::News(headlines))
            })
            .boxed(),
            self.run_source(SourceId::ExchangeRate, started_at, async move {
                let rates = with_timeout(timeout, self.api.fetch_exchange_rates()).await?;
                Ok::<_, FetchError>(SourcePayload::ExchangeRates(rates))
            })
            .boxed(),
        ];

        let outcomes = join_all(tasks).await;
        let summary = RefreshSummary {
            id,
            started_at,
            finished_at: Utc::now(),
            outcomes,
        };

        tracing::info!(
            cycle = %id,
            succeeded = summary.succeeded(),
            failed = summary.failed(),
            "Refresh cycle completed"
        );
        let _ = self.events.send(DashboardEvent::RefreshCompleted {
            id,
            succeeded: summary.succeeded(),
            failed: summary.failed(),
            timestamp: summary.finished_at,
        });

        summary
    }

    /// Asks the backend to refresh its caches, then refetches every source
    ///
    /// A failed backend refresh is returned without refetching.
    pub async fn refresh_backend_then_all(&self) -> Result<RefreshSummary, FetchError> {
        let timeout = self.config.read().await.api.request_timeout();

        if let Err(e) = with_timeout(timeout, self.api.refresh_backend()).await {
            tracing::warn!(error = %e, "Backend refresh failed");
            self.reporter
                .report(Toast::new(None, format!("Refresh failed: {}", e)));
            return Err(e);
        }

        Ok(self.refresh_all().await)
    }

    /// Awaits one source's fetch, records metrics, applies and announces the result
    async fn run_source(
        &self,
        source: SourceId,
        started_at: DateTime<Utc>,
        fetch: impl Future<Output = Result<SourcePayload, FetchError>>,
    ) -> SourceOutcome {
        let start = Instant::now();
        let result = fetch.await;
        let latency = start.elapsed();

        self.metrics.record(source, latency, result.is_ok()).await;
        self.store.apply(source, &result, started_at).await;

        let event = match &result {
            Ok(payload) => {
                tracing::debug!(
                    source = %source,
                    items = payload.len(),
                    latency_ms = latency.as_millis() as u64,
                    "Source refreshed"
                );
                DashboardEvent::SourceUpdated {
                    id: Uuid::new_v4(),
                    source,
                    items: payload.len(),
                    timestamp: started_at,
                }
            }
            Err(e) => {
                tracing::warn!(
                    source = %source,
                    error = %e,
                    "Source fetch failed, keeping previous data"
                );
                self.reporter.report(Toast::new(Some(source), e.to_string()));
                DashboardEvent::SourceFetchFailed {
                    id: Uuid::new_v4(),
                    source,
                    error_message: e.to_string(),
                    timestamp: Utc::now(),
                }
            }
        };
        let _ = self.events.send(event);

        SourceOutcome {
            source,
            result,
            latency,
        }
    }

    /// One quote per symbol, each under its own timeout
    ///
    /// The stock source fails only if every symbol failed; partial failures are
    /// reported per symbol and the quotes that arrived are kept.
    async fn fetch_stocks(
        &self,
        symbols: Vec<String>,
        timeout: Duration,
    ) -> Result<SourcePayload, FetchError> {
        if symbols.is_empty() {
            return Ok(SourcePayload::Stocks(Vec::new()));
        }

        let results = join_all(
            symbols
                .iter()
                .map(|symbol| with_timeout(timeout, self.api.fetch_stock(symbol))),
        )
        .await;

        let mut quotes = Vec::with_capacity(symbols.len());
        let mut failures = Vec::new();
        for (symbol, result) in symbols.iter().zip(results) {
            match result {
                Ok(quote) => quotes.push(quote),
                Err(e) => failures.push((symbol, e)),
            }
        }

        for (symbol, e) in &failures {
            tracing::warn!(symbol = %symbol, error = %e, "Stock quote failed");
            self.reporter
                .report(Toast::new(Some(SourceId::Stock), format!("{}: {}", symbol, e)));
        }

        if quotes.is_empty() {
            return Err(failures
                .into_iter()
                .next()
                .map(|(_, e)| e)
                .unwrap_or_else(|| FetchError::invalid_response("No stock quotes")));
        }

        Ok(SourcePayload::Stocks(quotes))
    }

    /// Snapshot of per-source timestamps and error flags
    pub async fn refresh_state(&self) -> RefreshState {
        self.store.refresh_state().await
    }

    /// "Last updated" label for one source
    pub async fn last_updated_label(&self, source: SourceId) -> String {
        let state = self.store.refresh_state().await;
        format_elapsed_now(state.last_updated(source))
    }

    /// Shared handle to the data store, for views
    pub fn store(&self) -> Arc<DashboardStore> {
        self.store.clone()
    }

    /// Subscribe to per-source and per-cycle events
    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events.subscribe()
    }

    /// Current configuration
    pub async fn config(&self) -> DashboardConfig {
        self.config.read().await.clone()
    }

    /// Replaces the configuration; the next cycle uses it
    ///
    /// A change to the crypto or stock symbol lists refetches right away,
    /// but only once the dashboard has loaded data at least once. Returns
    /// the summary of that refetch, if one ran.
    pub async fn update_config(
        &self,
        config: DashboardConfig,
    ) -> Result<Option<RefreshSummary>, ConfigError> {
        config.validate()?;
        let symbols_changed = {
            let mut current = self.config.write().await;
            let changed = current.crypto.symbols != config.crypto.symbols
                || current.stocks.symbols != config.stocks.symbols;
            *current = config;
            changed
        };
        tracing::info!(symbols_changed, "Dashboard configuration updated");

        if !symbols_changed {
            return Ok(None);
        }
        let loaded = self.store.refresh_state().await.newest_update().is_some();
        if !loaded {
            tracing::debug!("Symbols changed before the first load, nothing to refetch");
            return Ok(None);
        }
        Ok(Some(self.refresh_all().await))
    }

    /// True while at least one `refresh_all` call is in progress
    pub fn is_refreshing(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn api_name(&self) -> &'static str {
        self.api.api_name()
    }

    /// Latency and success metrics for every source
    pub async fn get_metrics(&self) -> Vec<SourceMetrics> {
        self.metrics.all().await
    }

    /// Health of the dashboard data as a whole
    pub async fn health_check(&self) -> ComponentHealth {
        let now = Utc::now();
        let state = self.store.refresh_state().await;
        let mut details = HashMap::new();

        let mut available = Vec::new();
        let mut failing = Vec::new();
        let mut stale = Vec::new();
        for source in SourceId::all() {
            if self.store.has_data(*source).await {
                available.push(source.name());
            }
            if state.has_error(*source) {
                failing.push(source.name());
            }
            if self.store.is_stale(*source, STALE_THRESHOLD_SECS, now).await {
                stale.push(source.name());
            }
        }

        details.insert("api_name".to_string(), serde_json::json!(self.api_name()));
        details.insert("available_sources".to_string(), serde_json::json!(available));
        details.insert("failing_sources".to_string(), serde_json::json!(failing));
        details.insert("stale_sources".to_string(), serde_json::json!(stale));

        let status = if available.is_empty() {
            HealthStatus::Unhealthy
        } else if !failing.is_empty() || !stale.is_empty() {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        let message = match status {
            HealthStatus::Healthy => "All sources are fresh".to_string(),
            HealthStatus::Degraded => format!(
                "{} failing, {} stale sources",
                failing.len(),
                stale.len()
            ),
            HealthStatus::Unhealthy => "No source has any data yet".to_string(),
        };

        ComponentHealth {
            name: "refresh_coordinator".to_string(),
            status,
            message: Some(message),
            details,
            last_checked: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{headlines, stock_quote, CollectingReporter, MockApi, Reply};
    use crate::reporter::TracingReporter;

    fn coordinator(api: Arc<MockApi>) -> RefreshCoordinator {
        RefreshCoordinator::new(api, DashboardConfig::default(), Arc::new(TracingReporter))
    }

    #[tokio::test]
    async fn test_all_sources_succeed() {
        let api = Arc::new(MockApi::healthy());
        let coordinator = coordinator(api.clone());

        let summary = coordinator.refresh_all().await;

        assert_eq!(summary.outcomes.len(), 5);
        assert_eq!(summary.succeeded(), 5);
        let state = coordinator.refresh_state().await;
        for source in SourceId::all() {
            assert_eq!(state.last_updated(*source), Some(summary.started_at));
            assert!(!state.has_error(*source));
        }
        assert_eq!(api.calls("stock"), 4);
    }

    #[tokio::test]
    async fn test_per_source_isolation() {
        let api = Arc::new(MockApi::healthy());
        let reporter = Arc::new(CollectingReporter::default());
        let coordinator =
            RefreshCoordinator::new(api.clone(), DashboardConfig::default(), reporter.clone());

        let first = coordinator.refresh_all().await;

        api.set_weather(Reply::Fail(FetchError::http(503, "Service Unavailable")));
        let second = coordinator.refresh_all().await;

        let state = coordinator.refresh_state().await;
        assert_eq!(state.last_updated(SourceId::Weather), Some(first.started_at));
        assert!(state.has_error(SourceId::Weather));
        for source in [
            SourceId::Crypto,
            SourceId::Stock,
            SourceId::News,
            SourceId::ExchangeRate,
        ] {
            assert_eq!(state.last_updated(source), Some(second.started_at));
            assert!(!state.has_error(source));
        }

        // Stale weather is still displayed
        assert!(coordinator.store().weather().await.is_some());

        let toasts = reporter.toasts();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].source, Some(SourceId::Weather));
        assert_eq!(toasts[0].message, "HTTP 503: Service Unavailable");
    }

    #[tokio::test]
    async fn test_never_succeeded_source_stays_never() {
        let api = Arc::new(MockApi::healthy());
        api.set_news(Reply::Fail(FetchError::invalid_response("not a list")));
        let coordinator = coordinator(api);

        coordinator.refresh_all().await;

        assert_eq!(coordinator.last_updated_label(SourceId::News).await, "Never");
        assert!(coordinator.store().news().await.is_empty());
        assert!(coordinator.refresh_state().await.has_error(SourceId::News));
    }

    #[tokio::test]
    async fn test_repeated_success_is_monotonic() {
        let api = Arc::new(MockApi::healthy());
        let coordinator = coordinator(api);

        let first = coordinator.refresh_all().await;
        let second = coordinator.refresh_all().await;

        assert!(second.started_at >= first.started_at);
        let state = coordinator.refresh_state().await;
        for source in SourceId::all() {
            assert_eq!(state.last_updated(*source), Some(second.started_at));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_source_times_out_without_blocking_others() {
        let api = Arc::new(MockApi::healthy());
        api.set_rates(Reply::Hang);
        let coordinator = Arc::new(coordinator(api));

        let start = Instant::now();
        let handle = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.refresh_all().await })
        };

        // Other sources are applied while exchange rates are still pending
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(coordinator.is_refreshing());
        assert!(coordinator.store().weather().await.is_some());
        assert!(!coordinator.refresh_state().await.has_error(SourceId::ExchangeRate));

        let summary = handle.await.unwrap();
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(10));
        assert!(elapsed < Duration::from_millis(10_100));
        assert!(!coordinator.is_refreshing());

        let rates = summary.outcome(SourceId::ExchangeRate).unwrap();
        assert_eq!(rates.result.as_ref().unwrap_err(), &FetchError::Timeout);
        assert_eq!(summary.succeeded(), 4);
        assert!(coordinator.refresh_state().await.has_error(SourceId::ExchangeRate));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_boundary_follows_config() {
        let api = Arc::new(MockApi::healthy());
        api.set_news(Reply::After(Duration::from_millis(2_500), headlines(2)));
        let mut config = DashboardConfig::default();
        config.api.request_timeout_secs = 2;
        let coordinator = RefreshCoordinator::new(api.clone(), config, Arc::new(TracingReporter));

        let summary = coordinator.refresh_all().await;
        assert!(!summary.outcome(SourceId::News).unwrap().succeeded());

        api.set_news(Reply::After(Duration::from_millis(1_500), headlines(2)));
        let summary = coordinator.refresh_all().await;
        assert!(summary.outcome(SourceId::News).unwrap().succeeded());
    }

    #[tokio::test]
    async fn test_partial_stock_failure_keeps_source_healthy() {
        let api = Arc::new(MockApi::healthy());
        api.set_stock("TSLA", Reply::Fail(FetchError::RateLimited));
        let reporter = Arc::new(CollectingReporter::default());
        let coordinator =
            RefreshCoordinator::new(api, DashboardConfig::default(), reporter.clone());

        let summary = coordinator.refresh_all().await;

        assert!(summary.outcome(SourceId::Stock).unwrap().succeeded());
        let symbols: Vec<_> = coordinator
            .store()
            .stocks()
            .await
            .into_iter()
            .map(|q| q.symbol)
            .collect();
        assert_eq!(symbols, vec!["AAPL", "GOOGL", "MSFT"]);
        assert_eq!(reporter.toasts().len(), 1);
        assert_eq!(reporter.toasts()[0].message, "TSLA: Rate limit exceeded");
    }

    #[tokio::test]
    async fn test_all_stock_symbols_failing_fails_source() {
        let api = Arc::new(MockApi::healthy());
        let mut config = DashboardConfig::default();
        config.stocks.symbols = vec!["NOPE".to_string(), "NADA".to_string()];
        let reporter = Arc::new(CollectingReporter::default());
        let coordinator = RefreshCoordinator::new(api, config, reporter.clone());

        let summary = coordinator.refresh_all().await;
        assert!(!summary.outcome(SourceId::Stock).unwrap().succeeded());

        let messages: Vec<_> = reporter.toasts().into_iter().map(|t| t.message).collect();
        assert!(messages.contains(&"NOPE: HTTP 404: Not Found".to_string()));
        assert!(messages.contains(&"NADA: HTTP 404: Not Found".to_string()));
        assert!(reporter
            .toasts()
            .iter()
            .all(|t| t.source == Some(SourceId::Stock)));
    }

    #[tokio::test]
    async fn test_payload_shaping() {
        let api = Arc::new(MockApi::healthy());
        api.set_stock("NVDA", Reply::Value(stock_quote("NVDA", 900.0)));
        let mut config = DashboardConfig::default();
        config.news.max_articles = 2;
        config.stocks.symbols = (0..10).map(|_| "NVDA".to_string()).collect();
        let coordinator = RefreshCoordinator::new(api.clone(), config, Arc::new(TracingReporter));

        coordinator.refresh_all().await;

        let store = coordinator.store();
        let crypto: Vec<_> = store.crypto().await.into_iter().map(|q| q.symbol).collect();
        assert_eq!(crypto, vec!["BTC", "ETH"]);
        assert_eq!(store.news().await.len(), 2);
        assert_eq!(api.calls("stock"), 8);
    }

    #[tokio::test]
    async fn test_events_are_broadcast() {
        let api = Arc::new(MockApi::healthy());
        api.set_crypto(Reply::Fail(FetchError::Timeout));
        let coordinator = coordinator(api);
        let mut rx = coordinator.subscribe();

        coordinator.refresh_all().await;

        let mut updated = 0;
        let mut failed = 0;
        let mut completed = None;
        while let Ok(event) = rx.try_recv() {
            match event {
                DashboardEvent::SourceUpdated { .. } => updated += 1,
                DashboardEvent::SourceFetchFailed { source, .. } => {
                    assert_eq!(source, SourceId::Crypto);
                    failed += 1;
                }
                DashboardEvent::RefreshCompleted {
                    succeeded, failed, ..
                } => completed = Some((succeeded, failed)),
            }
        }
        assert_eq!((updated, failed), (4, 1));
        assert_eq!(completed, Some((4, 1)));
    }

    #[tokio::test]
    async fn test_backend_refresh_failure_skips_refetch() {
        let api = Arc::new(MockApi::healthy());
        api.set_refresh(Reply::Fail(FetchError::http(500, "Internal Server Error")));
        let coordinator = coordinator(api.clone());

        let result = coordinator.refresh_backend_then_all().await;

        assert!(result.is_err());
        assert_eq!(api.calls("refresh"), 1);
        assert_eq!(api.calls("crypto"), 0);
    }

    #[tokio::test]
    async fn test_backend_refresh_then_all() {
        let api = Arc::new(MockApi::healthy());
        let coordinator = coordinator(api.clone());

        let summary = coordinator.refresh_backend_then_all().await.unwrap();

        assert_eq!(summary.succeeded(), 5);
        assert_eq!(api.calls("refresh"), 1);
        assert_eq!(api.calls("crypto"), 1);
    }

    #[tokio::test]
    async fn test_health_check() {
        let api = Arc::new(MockApi::healthy());
        let coordinator = coordinator(api.clone());
        assert_eq!(coordinator.health_check().await.status, HealthStatus::Unhealthy);

        coordinator.refresh_all().await;
        assert_eq!(coordinator.health_check().await.status, HealthStatus::Healthy);

        api.set_news(Reply::Fail(FetchError::Timeout));
        coordinator.refresh_all().await;
        let health = coordinator.health_check().await;
        assert_eq!(health.status, HealthStatus::Degraded);
        assert_eq!(health.details["failing_sources"], serde_json::json!(["news"]));
    }

    #[tokio::test]
    async fn test_metrics_recorded_per_source() {
        let api = Arc::new(MockApi::healthy());
        api.set_weather(Reply::Fail(FetchError::Timeout));
        let coordinator = coordinator(api);

        coordinator.refresh_all().await;

        let metrics = coordinator.get_metrics().await;
        let weather = metrics.iter().find(|m| m.source == SourceId::Weather).unwrap();
        assert_eq!(weather.failed_requests, 1);
        let news = metrics.iter().find(|m| m.source == SourceId::News).unwrap();
        assert_eq!((news.total_requests, news.failed_requests), (1, 0));
    }

    #[tokio::test]
    async fn test_update_config_rejects_invalid() {
        let coordinator = coordinator(Arc::new(MockApi::healthy()));
        let mut config = DashboardConfig::default();
        config.api.base_url = String::new();

        assert!(coordinator.update_config(config).await.is_err());
        assert_eq!(coordinator.config().await, DashboardConfig::default());
    }

    #[tokio::test]
    async fn test_symbol_change_refetches_after_first_load() {
        let api = Arc::new(MockApi::healthy());
        api.set_stock("NVDA", Reply::Value(stock_quote("NVDA", 900.0)));
        let coordinator = coordinator(api.clone());
        coordinator.refresh_all().await;
        assert_eq!(api.calls("crypto"), 1);

        let mut config = DashboardConfig::default();
        config.stocks.symbols = vec!["NVDA".to_string()];
        let summary = coordinator.update_config(config).await.unwrap();

        assert_eq!(summary.unwrap().succeeded(), 5);
        assert_eq!(api.calls("crypto"), 2);
        let symbols: Vec<_> = coordinator
            .store()
            .stocks()
            .await
            .into_iter()
            .map(|q| q.symbol)
            .collect();
        assert_eq!(symbols, vec!["NVDA"]);
    }

    #[tokio::test]
    async fn test_symbol_change_before_first_load_waits() {
        let api = Arc::new(MockApi::healthy());
        let coordinator = coordinator(api.clone());

        let mut config = DashboardConfig::default();
        config.crypto.symbols = vec!["SOL".to_string()];
        let summary = coordinator.update_config(config.clone()).await.unwrap();

        assert!(summary.is_none());
        assert_eq!(api.calls("crypto"), 0);
        assert_eq!(api.calls("stock"), 0);
        assert_eq!(coordinator.config().await, config);
    }

    #[tokio::test]
    async fn test_other_config_changes_do_not_refetch() {
        let api = Arc::new(MockApi::healthy());
        let coordinator = coordinator(api.clone());
        coordinator.refresh_all().await;

        let mut config = DashboardConfig::default();
        config.news.max_articles = 2;
        let summary = coordinator.update_config(config).await.unwrap();

        assert!(summary.is_none());
        assert_eq!(api.calls("crypto"), 1);
    }
}
