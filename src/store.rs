//! In-memory per-source data store
//!
//! Holds the last good payload, the last successful timestamp and the error
//! flag for every source. A failed fetch never touches payload or timestamp.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::{
    error::FetchError,
    types::{
        CryptoQuote, DataSourceResult, ExchangeRates, NewsHeadline, RefreshState, SourceId,
        SourcePayload, StockQuote, WeatherReport,
    },
};

/// State of one source
#[derive(Debug, Clone, Default)]
struct SourceSlot {
    payload: Option<SourcePayload>,
    last_updated: Option<DateTime<Utc>>,
    last_attempt: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

/// In-memory store for dashboard data
pub struct DashboardStore {
    slots: RwLock<HashMap<SourceId, SourceSlot>>,
}

impl DashboardStore {
    /// Creates a store with an empty slot for every source
    pub fn new() -> Self {
        let slots = SourceId::all()
            .iter()
            .map(|s| (*s, SourceSlot::default()))
            .collect();
        Self {
            slots: RwLock::new(slots),
        }
    }

    /// Records a successful fetch: replaces payload, stamps `at`, clears the error
    ///
    /// A success from a cycle older than the stored data is dropped, so
    /// `last_updated` never moves backwards.
    pub async fn record_success(&self, payload: SourcePayload, at: DateTime<Utc>) {
        let source = payload.source();
        let mut slots = self.slots.write().await;
        let slot = slots.entry(source).or_default();
        if !slot.last_updated.map_or(true, |t| at >= t) {
            tracing::debug!(source = %source, "Dropped result from an older refresh cycle");
            return;
        }
        tracing::debug!(source = %source, items = payload.len(), "Updated source data");
        slot.payload = Some(payload);
        slot.last_updated = Some(at);
        slot.last_attempt = Some(at);
        slot.last_error = None;
    }

    /// Records a failed fetch: sets the error flag, keeps payload and timestamp
    ///
    /// Ignored when a newer cycle already succeeded for this source.
    pub async fn record_failure(&self, source: SourceId, error: &FetchError, at: DateTime<Utc>) {
        let mut slots = self.slots.write().await;
        let slot = slots.entry(source).or_default();
        if slot.last_updated.is_some_and(|t| at < t) {
            tracing::debug!(source = %source, "Dropped failure from an older refresh cycle");
            return;
        }
        slot.last_attempt = Some(at);
        slot.last_error = Some(error.to_string());
    }

    /// Applies one source's outcome from a refresh cycle started at `at`
    pub async fn apply(
        &self,
        source: SourceId,
        result: &Result<SourcePayload, FetchError>,
        at: DateTime<Utc>,
    ) {
        match result {
            Ok(payload) => self.record_success(payload.clone(), at).await,
            Err(e) => self.record_failure(source, e, at).await,
        }
    }

    /// Snapshot of per-source timestamps and error flags
    pub async fn refresh_state(&self) -> RefreshState {
        let slots = self.slots.read().await;
        let mut state = RefreshState::empty();
        for (source, slot) in slots.iter() {
            state.last_updated.insert(*source, slot.last_updated);
            state.last_error.insert(*source, slot.last_error.is_some());
        }
        state
    }

    /// Latest attempt for a source, or `None` if it was never attempted
    pub async fn result(&self, source: SourceId) -> Option<DataSourceResult> {
        let slots = self.slots.read().await;
        let slot = slots.get(&source)?;
        let fetched_at = slot.last_attempt?;
        Some(DataSourceResult {
            source,
            payload: slot.payload.clone(),
            fetched_at,
            succeeded: slot.last_error.is_none(),
            error: slot.last_error.clone(),
        })
    }

    /// Last good payload for a source
    pub async fn payload(&self, source: SourceId) -> Option<SourcePayload> {
        let slots = self.slots.read().await;
        slots.get(&source).and_then(|s| s.payload.clone())
    }

    pub async fn crypto(&self) -> Vec<CryptoQuote> {
        match self.payload(SourceId::Crypto).await {
            Some(SourcePayload::Crypto(quotes)) => quotes,
            _ => Vec::new(),
        }
    }

    pub async fn stocks(&self) -> Vec<StockQuote> {
        match self.payload(SourceId::Stock).await {
            Some(SourcePayload::Stocks(quotes)) => quotes,
            _ => Vec::new(),
        }
    }

    pub async fn weather(&self) -> Option<WeatherReport> {
        match self.payload(SourceId::Weather).await {
            Some(SourcePayload::Weather(report)) => Some(report),
            _ => None,
        }
    }

    pub async fn news(&self) -> Vec<NewsHeadline> {
        match self.payload(SourceId::News).await {
            Some(SourcePayload::News(headlines)) => headlines,
            _ => Vec::new(),
        }
    }

    pub async fn exchange_rates(&self) -> Option<ExchangeRates> {
        match self.payload(SourceId::ExchangeRate).await {
            Some(SourcePayload::ExchangeRates(rates)) => Some(rates),
            _ => None,
        }
    }

    /// True if the source has been fetched successfully at least once
    pub async fn has_data(&self, source: SourceId) -> bool {
        let slots = self.slots.read().await;
        slots.get(&source).is_some_and(|s| s.payload.is_some())
    }

    /// True if the source has no data or its data is older than the threshold
    pub async fn is_stale(
        &self,
        source: SourceId,
        threshold_secs: u64,
        now: DateTime<Utc>,
    ) -> bool {
        let slots = self.slots.read().await;
        match slots.get(&source).and_then(|s| s.last_updated) {
            Some(updated) => {
                now.signed_duration_since(updated).num_seconds() > threshold_secs as i64
            }
            None => true,
        }
    }
}

impl Default for DashboardStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn rates() -> SourcePayload {
        SourcePayload::ExchangeRates([("USD_EUR".to_string(), 0.9)].into_iter().collect())
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_data() {
        let store = DashboardStore::new();
        let t0 = Utc::now();
        store.record_success(rates(), t0).await;

        let t1 = t0 + Duration::seconds(30);
        store
            .record_failure(SourceId::ExchangeRate, &FetchError::Timeout, t1)
            .await;

        let state = store.refresh_state().await;
        assert_eq!(state.last_updated(SourceId::ExchangeRate), Some(t0));
        assert!(state.has_error(SourceId::ExchangeRate));
        assert!(store.exchange_rates().await.is_some());

        let result = store.result(SourceId::ExchangeRate).await.unwrap();
        assert!(!result.succeeded);
        assert_eq!(result.fetched_at, t1);
        assert_eq!(result.error.as_deref(), Some("Request timeout"));
    }

    #[tokio::test]
    async fn test_older_cycle_settling_late_is_dropped() {
        let store = DashboardStore::new();
        let older = Utc::now();
        let newer = older + Duration::milliseconds(20);
        let newer_rates =
            SourcePayload::ExchangeRates([("USD_EUR".to_string(), 0.95)].into_iter().collect());

        store.record_success(newer_rates.clone(), newer).await;
        store.record_success(rates(), older).await;
        store
            .record_failure(SourceId::ExchangeRate, &FetchError::Timeout, older)
            .await;

        let state = store.refresh_state().await;
        assert_eq!(state.last_updated(SourceId::ExchangeRate), Some(newer));
        assert!(!state.has_error(SourceId::ExchangeRate));
        assert_eq!(
            store.payload(SourceId::ExchangeRate).await,
            Some(newer_rates)
        );
    }

    #[tokio::test]
    async fn test_success_clears_error_flag() {
        let store = DashboardStore::new();
        let t0 = Utc::now();
        store
            .record_failure(SourceId::ExchangeRate, &FetchError::RateLimited, t0)
            .await;
        assert!(store.refresh_state().await.has_error(SourceId::ExchangeRate));

        store.record_success(rates(), t0).await;
        assert!(!store.refresh_state().await.has_error(SourceId::ExchangeRate));
    }

    #[tokio::test]
    async fn test_never_fetched_source() {
        let store = DashboardStore::new();
        assert!(store.result(SourceId::News).await.is_none());
        assert!(store.news().await.is_empty());
        assert!(!store.has_data(SourceId::News).await);
        assert!(store.is_stale(SourceId::News, 300, Utc::now()).await);
    }

    #[tokio::test]
    async fn test_staleness_threshold() {
        let store = DashboardStore::new();
        let t0 = Utc::now();
        store.record_success(rates(), t0).await;

        assert!(!store.is_stale(SourceId::ExchangeRate, 300, t0 + Duration::seconds(300)).await);
        assert!(store.is_stale(SourceId::ExchangeRate, 300, t0 + Duration::seconds(301)).await);
    }
}
