//! Dashboard icon lookup
//!
//! Serves bookmark icon suggestions from the homarr-labs dashboard-icons
//! repository. The icon name index is fetched through the GitHub contents
//! API once an hour and held in a [`ResponseCache`], so a GitHub outage
//! degrades to the last good index instead of an empty picker.

use std::time::Duration;

use serde_json::{json, Value};

use crate::cache::ResponseCache;

/// Raw URL prefix for individual icon PNGs.
pub const ICON_RAW_BASE: &str =
    "https://raw.githubusercontent.com/homarr-labs/dashboard-icons/main/png/";
/// GitHub contents API listing the PNG directory.
pub const ICON_API_URL: &str =
    "https://api.github.com/repos/homarr-labs/dashboard-icons/contents/png";
/// Icon used when a bookmark has none configured.
pub const DEFAULT_ICON: &str =
    "https://raw.githubusercontent.com/homarr-labs/dashboard-icons/main/png/homarr.png";

const INDEX_TTL: Duration = Duration::from_secs(60 * 60);
const INDEX_TIMEOUT: Duration = Duration::from_secs(6);

/// Cached icon index with substring search.
pub struct IconService {
    client: reqwest::Client,
    cache: ResponseCache<Vec<String>>,
}

impl IconService {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            cache: ResponseCache::new(4),
        }
    }

    /// Search icon names, returning `{name, url}` payloads capped at
    /// `limit`. No query returns the head of the full index.
    pub async fn search(&self, query: Option<&str>, limit: usize) -> Vec<Value> {
        let index = self.index().await;
        let needle = query.map(str::to_lowercase);

        index
            .into_iter()
            .filter(|name| match &needle {
                Some(needle) => name.to_lowercase().contains(needle),
                None => true,
            })
            .take(limit)
            .map(|name| json!({ "name": name, "url": format!("{ICON_RAW_BASE}{name}.png") }))
            .collect()
    }

    async fn index(&self) -> Vec<String> {
        let client = self.client.clone();
        self.cache
            .get_or_fetch("icon_index", INDEX_TTL, || async move {
                let resp = client
                    .get(ICON_API_URL)
                    .timeout(INDEX_TIMEOUT)
                    .send()
                    .await?
                    .error_for_status()?;
                let listing: Vec<Value> = resp.json().await?;
                let icons = listing
                    .iter()
                    .filter_map(|item| item.get("name").and_then(Value::as_str))
                    .filter_map(|name| name.strip_suffix(".png"))
                    .map(str::to_string)
                    .collect();
                Ok(icons)
            })
            .await
            .unwrap_or_default()
    }
}
