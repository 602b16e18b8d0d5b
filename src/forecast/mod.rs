pub mod aggregate;
pub mod openweather;
pub mod types;

#[cfg(test)]
pub mod mock;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::config::FetchRequest;
use openweather::{FetchError, OpenWeatherClient};
use types::RawForecast;

/// The only key in use; the store itself is keyed so per-location slots can
/// be added without touching callers.
pub const FORECAST_CACHE_KEY: &str = "forecast";

pub type ForecastCache = Cache<String, CacheEntry>;

pub fn init_cache() -> ForecastCache {
    Cache::builder()
        .max_capacity(64)
        .time_to_live(Duration::from_secs(24 * 60 * 60)) // longest configurable cache duration
        .build()
}

#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub payload: RawForecast,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Keyed forecast slots with explicit expiry, plus one refresh lock per key.
pub struct ForecastStore {
    entries: ForecastCache,
    refresh_locks: Cache<String, Arc<Mutex<()>>>,
}

impl Default for ForecastStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ForecastStore {
    pub fn new() -> Self {
        Self {
            entries: init_cache(),
            refresh_locks: Cache::builder().max_capacity(64).build(),
        }
    }

    /// Payload under `key` unless absent or expired at `now`. Expired entries
    /// stay in place until overwritten or cleared.
    pub async fn get(&self, key: &str, now: DateTime<Utc>) -> Option<RawForecast> {
        self.entries
            .get(key)
            .await
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.payload)
    }

    pub async fn set(&self, key: &str, payload: RawForecast, expires_at: DateTime<Utc>) {
        self.entries
            .insert(key.to_string(), CacheEntry { payload, expires_at })
            .await;
    }

    /// Removes `key` whether or not it has expired.
    pub async fn clear(&self, key: &str) {
        self.entries.invalidate(key).await;
    }

    async fn refresh_lock(&self, key: &str) -> Arc<Mutex<()>> {
        self.refresh_locks
            .get_with(key.to_string(), async { Arc::new(Mutex::new(())) })
            .await
    }
}

/// Cache-first access to the remote forecast.
///
/// Concurrent callers that miss the cache queue on the key's refresh lock;
/// the first one fetches, the rest re-check the cache once they get the lock
/// and return the fresh payload without calling the API again.
pub struct ForecastFetcher {
    client: OpenWeatherClient,
    store: ForecastStore,
}

impl ForecastFetcher {
    pub fn new(client: OpenWeatherClient, store: ForecastStore) -> Self {
        Self { client, store }
    }

    pub fn store(&self) -> &ForecastStore {
        &self.store
    }

    pub async fn fetch(&self, request: &FetchRequest) -> Result<RawForecast, FetchError> {
        if let Some(cached) = self.store.get(FORECAST_CACHE_KEY, Utc::now()).await {
            tracing::debug!("Forecast cache hit");
            return Ok(cached);
        }

        let lock = self.store.refresh_lock(FORECAST_CACHE_KEY).await;
        let _guard = lock.lock().await;

        if let Some(cached) = self.store.get(FORECAST_CACHE_KEY, Utc::now()).await {
            tracing::debug!("Forecast refreshed by concurrent request");
            return Ok(cached);
        }

        tracing::info!(
            "Fetching forecast for {:.3}, {:.3}",
            request.latitude,
            request.longitude
        );
        let forecast = self
            .client
            .get_forecast3h(&request.api_key, request.latitude, request.longitude)
            .await?;

        let expires_at =
            Utc::now() + chrono::Duration::minutes(i64::from(request.cache_duration_minutes));
        self.store
            .set(FORECAST_CACHE_KEY, forecast.clone(), expires_at)
            .await;
        tracing::debug!("Forecast cached until {}", expires_at);

        Ok(forecast)
    }

    pub async fn clear_cache(&self) {
        self.store.clear(FORECAST_CACHE_KEY).await;
        tracing::info!("Forecast cache cleared");
    }
}
