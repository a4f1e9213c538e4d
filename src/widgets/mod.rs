//! Free-API widget fetchers
//!
//! Each widget wraps one public HTTP API behind the shared
//! [`ResponseCache`], so dashboard polls hit the network at most once per
//! TTL window and upstream outages serve the last good payload. A `None`
//! from any fetch means "temporarily unavailable" and renders as an empty
//! widget; it is never an error.

pub mod crypto;
pub mod news;
pub mod quakes;
pub mod weather;

use serde_json::Value;

use crate::cache::{ResponseCache, DEFAULT_MAX_ENTRIES};

/// Shared state for all widget fetchers: one HTTP client, one cache.
pub struct WidgetHub {
    client: reqwest::Client,
    cache: ResponseCache<Value>,
}

impl WidgetHub {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_capacity(client, DEFAULT_MAX_ENTRIES)
    }

    pub fn with_capacity(client: reqwest::Client, max_entries: usize) -> Self {
        Self {
            client,
            cache: ResponseCache::new(max_entries),
        }
    }

    /// Current conditions from Open-Meteo.
    pub async fn weather(
        &self,
        city: Option<&str>,
        lat: Option<f64>,
        lon: Option<f64>,
    ) -> Option<Value> {
        weather::fetch(&self.client, &self.cache, city, lat, lon).await
    }

    /// Spot prices from CoinGecko for the default coin pair.
    pub async fn crypto(&self) -> Option<Value> {
        crypto::fetch(&self.client, &self.cache, crypto::DEFAULT_COINS).await
    }

    /// Spot prices for the wider ticker-bar coin set.
    pub async fn crypto_bar(&self) -> Option<Value> {
        crypto::fetch(&self.client, &self.cache, crypto::BAR_COINS).await
    }

    /// Top Hacker News stories.
    pub async fn hacker_news(&self, limit: usize) -> Option<Value> {
        news::hacker_news(&self.client, &self.cache, limit).await
    }

    /// Hot posts from one subreddit.
    pub async fn reddit(&self, subreddit: &str, limit: usize) -> Option<Value> {
        news::reddit(&self.client, &self.cache, subreddit, limit).await
    }

    /// World headlines merged from Reddit worldnews and Hacker News.
    pub async fn headlines(&self, limit: usize) -> Option<Value> {
        news::headlines(&self.client, &self.cache, limit).await
    }

    /// Recent significant earthquakes from USGS.
    pub async fn earthquakes(&self, min_magnitude: f64) -> Option<Value> {
        quakes::earthquakes(&self.client, &self.cache, min_magnitude).await
    }

    /// Aggregated threat level derived from seismic activity.
    pub async fn threat_status(&self) -> Option<Value> {
        quakes::threat_status(&self.client, &self.cache).await
    }
}
