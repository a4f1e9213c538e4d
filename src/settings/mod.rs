//! Settings store
//!
//! Persists the nested dashboard configuration document to
//! `settings.json`, always deep-merged against the canonical defaults so
//! a missing key can never fail a lookup. Reads go through a short-TTL
//! in-memory cache; every write takes one exclusive lock, persists the
//! full document, and refreshes the cache with the merged result
//! (write-through, never write-invalidate). Dotted-path writes run the
//! whole load+mutate+save cycle under the same lock, so settings writes
//! are fully serialized.

pub mod themes;

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde_json::{json, Map, Value};

use crate::error::Result;

/// Default TTL for the in-process settings cache.
pub const CACHE_TTL: Duration = Duration::from_secs(60);

/// The canonical default settings document.
///
/// Every read is merged onto this, so new keys added here appear for
/// existing installations without migration.
pub fn default_settings() -> Value {
    json!({
        "widgets": {
            "weather":      { "enabled": true, "position": 0 },
            "crypto":       { "enabled": true, "position": 1 },
            "news":         { "enabled": true, "position": 2 },
            "reddit":       { "enabled": true, "position": 3 },
            "threats":      { "enabled": true, "position": 4 },
            "earthquakes":  { "enabled": true, "position": 5 },
            "system_stats": { "enabled": true, "position": 6 },
            "docker":       { "enabled": true, "position": 7 },
        },
        "integrations": {
            "pihole":    { "enabled": false, "url": "", "api_key": "" },
            "portainer": { "enabled": false, "url": "", "api_key": "" },
            "proxmox": {
                "enabled": false,
                "url": "",
                "user": "",
                "token_name": "",
                "token_secret": "",
            },
            "speedtest":      { "enabled": false, "url": "", "api_key": "" },
            "uptime_kuma":    { "enabled": false, "url": "", "slug": "default" },
            "audiobookshelf": { "enabled": false, "url": "", "api_key": "" },
        },
        "appearance": {
            "theme": "dark",
            "show_loading_screen": true,
            "loading_screen_style": "server",
            "animations_enabled": true,
        },
        "dashboard": {
            "news_ticker_enabled": true,
            "weather_bar_enabled": true,
            "crypto_bar_enabled": true,
        },
        "location": {
            "city": "",
            "latitude": "",
            "longitude": "",
            "timezone": "",
            "use_auto": true,
            "units": "imperial",
        },
    })
}

/// Deep merge: `overlay` wins, objects merge recursively, everything else
/// replaces wholesale.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            let mut merged: Map<String, Value> = base_map.clone();
            for (key, value) in overlay_map {
                match merged.get(key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        merged.insert(key.clone(), deep_merge(existing, value));
                    }
                    _ => {
                        merged.insert(key.clone(), value.clone());
                    }
                }
            }
            Value::Object(merged)
        }
        _ => overlay.clone(),
    }
}

/// File-backed settings document with a write-through read cache.
pub struct SettingsStore {
    path: PathBuf,
    ttl: Duration,
    cache: Mutex<Option<(Value, Instant)>>,
    write_lock: tokio::sync::Mutex<()>,
}

impl SettingsStore {
    /// Create a store backed by `path` with the default cache TTL.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_ttl(path, CACHE_TTL)
    }

    /// Create a store with an explicit cache TTL (used by tests).
    pub fn with_ttl(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
            cache: Mutex::new(None),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Return the merged settings document.
    ///
    /// Serves the cached copy when younger than the TTL unless
    /// `bypass_cache` is set; otherwise reads storage (creating the file
    /// with defaults on first access, substituting defaults for a corrupt
    /// file), merges onto the defaults, and refreshes the cache. The
    /// returned value is a clone: callers cannot mutate the cached copy.
    pub fn load(&self, bypass_cache: bool) -> Value {
        if !bypass_cache {
            let cache = self.lock_cache();
            if let Some((doc, refreshed_at)) = &*cache {
                if refreshed_at.elapsed() < self.ttl {
                    return doc.clone();
                }
            }
        }

        let merged = self.read_merged();
        *self.lock_cache() = Some((merged.clone(), Instant::now()));
        merged
    }

    /// Persist `document` and write-through the merged result to the cache.
    pub async fn save(&self, document: &Value) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.save_inner(document)
    }

    /// Get a value by dot-separated path, falling back to `default` on a
    /// missing segment or a non-object intermediate.
    pub fn get(&self, dotted_path: &str, default: Value) -> Value {
        let settings = self.load(false);
        let mut current = &settings;
        for segment in dotted_path.split('.') {
            match current.get(segment) {
                Some(next) => current = next,
                None => return default,
            }
        }
        current.clone()
    }

    /// Set a value by dot-separated path, creating intermediate objects
    /// as needed. The full load+mutate+save cycle runs under the write
    /// lock, so concurrent `set` calls cannot interleave.
    pub async fn set(&self, dotted_path: &str, value: Value) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut settings = self.read_merged();

        let segments: Vec<&str> = dotted_path.split('.').collect();
        let mut current = &mut settings;
        for segment in &segments[..segments.len() - 1] {
            if !current.get(*segment).map(Value::is_object).unwrap_or(false) {
                current[*segment] = json!({});
            }
            current = &mut current[*segment];
        }
        if let Some(last) = segments.last() {
            current[*last] = value;
        }

        self.save_inner(&settings)
    }

    /// Drop the cached document; the next read reloads from storage.
    pub fn invalidate(&self) {
        *self.lock_cache() = None;
    }

    /// Configuration for one widget, defaulting to disabled at the end of
    /// the display order.
    pub fn widget_config(&self, widget_name: &str) -> Value {
        self.get(
            &format!("widgets.{widget_name}"),
            json!({ "enabled": false, "position": 99 }),
        )
    }

    /// Names of enabled widgets sorted by display position.
    pub fn enabled_widgets(&self) -> Vec<String> {
        let widgets = self.get("widgets", json!({}));
        let Some(map) = widgets.as_object() else {
            return Vec::new();
        };
        let mut enabled: Vec<(String, i64)> = map
            .iter()
            .filter(|(_, cfg)| cfg.get("enabled").and_then(Value::as_bool).unwrap_or(true))
            .map(|(name, cfg)| {
                let position = cfg.get("position").and_then(Value::as_i64).unwrap_or(99);
                (name.clone(), position)
            })
            .collect();
        enabled.sort_by_key(|(_, position)| *position);
        enabled.into_iter().map(|(name, _)| name).collect()
    }

    /// Connection config for one integration, if present.
    pub fn integration_config(&self, integration_name: &str) -> Option<Value> {
        let config = self.get(&format!("integrations.{integration_name}"), Value::Null);
        if config.is_null() {
            None
        } else {
            Some(config)
        }
    }

    /// Merge `config` keys into one integration's configuration.
    pub async fn update_integration(&self, integration_name: &str, config: Value) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut settings = self.read_merged();

        let existing = settings
            .get("integrations")
            .and_then(|i| i.get(integration_name))
            .cloned()
            .unwrap_or_else(|| json!({}));
        settings["integrations"][integration_name] = deep_merge(&existing, &config);

        self.save_inner(&settings)
    }

    /// Appearance section of the document.
    pub fn appearance(&self) -> Value {
        self.get("appearance", default_settings()["appearance"].clone())
    }

    /// Dashboard feature toggles.
    pub fn dashboard(&self) -> Value {
        self.get("dashboard", default_settings()["dashboard"].clone())
    }

    fn save_inner(&self, document: &Value) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_string_pretty(document)?;
        std::fs::write(&self.path, body)?;

        let merged = deep_merge(&default_settings(), document);
        *self.lock_cache() = Some((merged, Instant::now()));
        Ok(())
    }

    fn read_merged(&self) -> Value {
        if !self.path.exists() {
            if let Err(err) = self.write_defaults() {
                tracing::warn!(path = %self.path.display(), error = %err, "could not seed settings file");
            }
            return default_settings();
        }

        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "settings file unreadable, using defaults");
                return default_settings();
            }
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(saved) => deep_merge(&default_settings(), &saved),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "settings file malformed, using defaults");
                default_settings()
            }
        }
    }

    fn write_defaults(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_string_pretty(&default_settings())?;
        std::fs::write(&self.path, body)?;
        Ok(())
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, Option<(Value, Instant)>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_file, temp_dir, test_settings_store};

    #[test]
    fn test_deep_merge_recurses_into_objects() {
        let base = json!({ "a": { "x": 1, "y": 2 }, "b": 3 });
        let overlay = json!({ "a": { "y": 20 } });
        let merged = deep_merge(&base, &overlay);
        assert_eq!(merged, json!({ "a": { "x": 1, "y": 20 }, "b": 3 }));
    }

    #[test]
    fn test_deep_merge_replaces_non_objects_wholesale() {
        let base = json!({ "list": [1, 2, 3] });
        let overlay = json!({ "list": [9] });
        assert_eq!(deep_merge(&base, &overlay), json!({ "list": [9] }));
    }

    #[test]
    fn test_first_load_seeds_file_with_defaults() {
        let dir = temp_dir();
        let store = test_settings_store(&dir);
        let doc = store.load(false);
        assert_eq!(doc["appearance"]["theme"], "dark");
        assert!(dir.path().join("settings.json").exists());
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = temp_dir();
        create_test_file(&dir, "settings.json", "{{{");
        let doc = test_settings_store(&dir).load(false);
        assert_eq!(doc["location"]["units"], "imperial");
    }

    #[test]
    fn test_saved_keys_win_but_missing_keys_come_from_defaults() {
        let dir = temp_dir();
        create_test_file(&dir, "settings.json", r#"{ "appearance": { "theme": "nord" } }"#);
        let doc = test_settings_store(&dir).load(false);
        assert_eq!(doc["appearance"]["theme"], "nord");
        // Untouched sibling and section come from the defaults.
        assert_eq!(doc["appearance"]["animations_enabled"], true);
        assert_eq!(doc["widgets"]["weather"]["enabled"], true);
    }

    #[tokio::test]
    async fn test_set_then_get_is_write_through() {
        let dir = temp_dir();
        let store = test_settings_store(&dir);

        // Warm the cache first so a stale cached copy would be visible.
        store.load(false);
        store.set("widgets.weather.enabled", json!(false)).await.unwrap();
        assert_eq!(store.get("widgets.weather.enabled", json!(true)), json!(false));
    }

    #[tokio::test]
    async fn test_get_missing_path_returns_default() {
        let dir = temp_dir();
        let store = test_settings_store(&dir);
        assert_eq!(
            store.get("nonexistent.path", json!("fallback")),
            json!("fallback")
        );
    }

    #[tokio::test]
    async fn test_set_creates_intermediate_objects() {
        let dir = temp_dir();
        let store = test_settings_store(&dir);
        store.set("brand.new.leaf", json!(5)).await.unwrap();
        assert_eq!(store.get("brand.new.leaf", json!(0)), json!(5));
    }

    #[tokio::test]
    async fn test_invalidate_forces_storage_round_trip() {
        let dir = temp_dir();
        let store = test_settings_store(&dir);
        store.load(false);

        // Mutate the file behind the store's back.
        create_test_file(&dir, "settings.json", r#"{ "appearance": { "theme": "matrix" } }"#);
        // Cached copy still serves the old value.
        assert_eq!(store.get("appearance.theme", json!("")), json!("dark"));

        store.invalidate();
        assert_eq!(store.get("appearance.theme", json!("")), json!("matrix"));
    }

    #[tokio::test]
    async fn test_update_integration_merges_partial_config() {
        let dir = temp_dir();
        let store = test_settings_store(&dir);
        store
            .update_integration("pihole", json!({ "enabled": true, "url": "http://pi.hole" }))
            .await
            .unwrap();

        let config = store.integration_config("pihole").unwrap();
        assert_eq!(config["enabled"], true);
        assert_eq!(config["url"], "http://pi.hole");
        // Key not in the patch survives from the defaults.
        assert_eq!(config["api_key"], "");
    }

    #[tokio::test]
    async fn test_enabled_widgets_sorted_by_position() {
        let dir = temp_dir();
        let store = test_settings_store(&dir);
        store.set("widgets.crypto.enabled", json!(false)).await.unwrap();

        let enabled = store.enabled_widgets();
        assert!(!enabled.contains(&"crypto".to_string()));
        assert_eq!(enabled.first().map(String::as_str), Some("weather"));
        assert_eq!(enabled.last().map(String::as_str), Some("docker"));
    }

    #[test]
    fn test_widget_config_for_unknown_widget_is_disabled() {
        let dir = temp_dir();
        let config = test_settings_store(&dir).widget_config("ghost");
        assert_eq!(config["enabled"], false);
        assert_eq!(config["position"], 99);
    }
}
