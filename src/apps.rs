//! Bookmark app store
//!
//! Persists the ordered list of service bookmarks to `apps.json` and
//! enriches reads with live status. Names are unique within the store and
//! list order is display order. All mutations serialize through a single
//! fair write lock wrapping the load→mutate→persist cycle, so concurrent
//! callers can never interleave read-modify-write on the backing file.
//!
//! A missing or unreadable file reads as an empty list: availability is
//! preferred over failing hard on a corrupt data directory.

use std::path::PathBuf;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::Result;
use crate::probe::{normalize_url, Prober};

/// Upper bound on concurrent liveness probes during a status read.
pub const MAX_PROBE_WORKERS: usize = 8;

/// A persisted service bookmark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkApp {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub icon: String,
}

/// A bookmark annotated with per-read liveness. Never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct AppWithStatus {
    #[serde(flatten)]
    pub app: BookmarkApp,
    pub online: bool,
    pub response_time: u64,
}

/// Partial update for [`AppStore::update`]; unset fields are kept.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppPatch {
    pub name: Option<String>,
    pub url: Option<String>,
    pub icon: Option<String>,
}

/// Where to reinsert the moved entry relative to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Before,
    After,
}

/// File-backed bookmark registry with serialized writes.
pub struct AppStore {
    path: PathBuf,
    write_lock: Mutex<()>,
    prober: Prober,
}

impl AppStore {
    /// Create a store backed by `path` (conventionally `<data>/apps.json`).
    pub fn new(path: impl Into<PathBuf>, prober: Prober) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
            prober,
        }
    }

    /// Load the persisted list. Absence or corruption reads as empty.
    pub fn list(&self) -> Vec<BookmarkApp> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_str(&raw) {
            Ok(apps) => apps,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "apps file unreadable, treating as empty");
                Vec::new()
            }
        }
    }

    /// Look up a single bookmark by name.
    pub fn get(&self, name: &str) -> Option<BookmarkApp> {
        self.list().into_iter().find(|a| a.name == name)
    }

    /// Add a bookmark, replacing any existing entry with the same name.
    ///
    /// The URL is normalized to carry a scheme. Idempotent per name.
    pub async fn add(&self, name: &str, url: &str, icon: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut apps = self.list();
        apps.retain(|a| a.name != name);
        apps.push(BookmarkApp {
            name: name.to_string(),
            url: normalize_url(url),
            icon: icon.to_string(),
        });
        self.persist(&apps)
    }

    /// Remove a bookmark by name. Returns whether anything was removed.
    pub async fn delete(&self, name: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut apps = self.list();
        let before = apps.len();
        apps.retain(|a| a.name != name);
        if apps.len() < before {
            self.persist(&apps)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Empty the store.
    pub async fn delete_all(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.persist(&[])
    }

    /// Apply a partial update to the entry named `original_name`.
    ///
    /// Renaming onto a name held by a *different* entry is a conflict:
    /// the call returns `false` and nothing is written. Position in the
    /// list is preserved.
    pub async fn update(&self, original_name: &str, patch: AppPatch) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut apps = self.list();

        let Some(idx) = apps.iter().position(|a| a.name == original_name) else {
            return Ok(false);
        };

        if let Some(new_name) = &patch.name {
            let collides = apps
                .iter()
                .enumerate()
                .any(|(i, a)| i != idx && a.name == *new_name);
            if collides {
                return Ok(false);
            }
        }

        let app = &mut apps[idx];
        if let Some(name) = patch.name {
            app.name = name;
        }
        if let Some(url) = patch.url {
            app.url = normalize_url(&url);
        }
        if let Some(icon) = patch.icon {
            app.icon = icon;
        }

        self.persist(&apps)?;
        Ok(true)
    }

    /// Move `from_name` immediately before or after `to_name`.
    ///
    /// Returns `false` when either name is absent. Moving an entry
    /// relative to itself is an explicit no-op that reports success.
    pub async fn reorder(&self, from_name: &str, to_name: &str, position: Position) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut apps = self.list();

        let from_idx = apps.iter().position(|a| a.name == from_name);
        let to_idx = apps.iter().position(|a| a.name == to_name);
        let (Some(from_idx), Some(_)) = (from_idx, to_idx) else {
            return Ok(false);
        };

        if from_name == to_name {
            return Ok(true);
        }

        let moved = apps.remove(from_idx);
        // Recompute after removal; the target is still present because
        // from != to.
        let Some(to_idx) = apps.iter().position(|a| a.name == to_name) else {
            return Ok(false);
        };
        let insert_at = match position {
            Position::Before => to_idx,
            Position::After => to_idx + 1,
        };
        apps.insert(insert_at, moved);

        self.persist(&apps)?;
        Ok(true)
    }

    /// Rebuild the full list in the requested name order.
    ///
    /// Repeated names are de-duplicated, unknown names are silently
    /// dropped, and existing entries omitted from the request are
    /// appended at the end — a reorder request can never lose entries.
    /// An empty request returns `false` without writing.
    pub async fn apply_order(&self, order: &[String]) -> Result<bool> {
        if order.is_empty() {
            return Ok(false);
        }

        let _guard = self.write_lock.lock().await;
        let apps = self.list();

        let mut reordered = Vec::with_capacity(apps.len());
        let mut seen: Vec<&str> = Vec::new();
        for name in order {
            if seen.contains(&name.as_str()) {
                continue;
            }
            seen.push(name);
            if let Some(app) = apps.iter().find(|a| a.name == *name) {
                reordered.push(app.clone());
            }
        }
        for app in &apps {
            if !order.contains(&app.name) {
                reordered.push(app.clone());
            }
        }

        if reordered.is_empty() {
            return Ok(false);
        }
        self.persist(&reordered)?;
        Ok(true)
    }

    /// Merge externally discovered candidates into the store.
    ///
    /// A candidate is skipped when its normalized URL or its name
    /// (case-insensitively) already exists. Returns the number of
    /// entries appended.
    pub async fn merge(&self, candidates: Vec<BookmarkApp>) -> Result<usize> {
        let _guard = self.write_lock.lock().await;
        let mut apps = self.list();
        let mut appended = 0;

        for candidate in candidates {
            let url = normalize_url(&candidate.url);
            let name_taken = apps
                .iter()
                .any(|a| a.name.eq_ignore_ascii_case(&candidate.name));
            let url_taken = apps.iter().any(|a| normalize_url(&a.url) == url);
            if name_taken || url_taken {
                continue;
            }
            apps.push(BookmarkApp {
                name: candidate.name,
                url,
                icon: candidate.icon,
            });
            appended += 1;
        }

        if appended > 0 {
            self.persist(&apps)?;
        }
        Ok(appended)
    }

    /// Load the list and annotate every entry with live status.
    ///
    /// Probes fan out with bounded parallelism (`min(8, len)`) and fan
    /// back in before returning; persisted order is preserved. A probe
    /// failure affects only its own entry, which defaults to offline
    /// with zero latency.
    pub async fn list_with_status(&self) -> Vec<AppWithStatus> {
        let apps = self.list();
        if apps.is_empty() {
            return Vec::new();
        }

        let workers = MAX_PROBE_WORKERS.min(apps.len());
        stream::iter(apps)
            .map(|app| {
                let prober = self.prober.clone();
                async move {
                    let result = prober.probe(&app.url).await;
                    AppWithStatus {
                        app,
                        online: result.online,
                        response_time: result.latency_ms,
                    }
                }
            })
            .buffered(workers)
            .collect()
            .await
    }

    fn persist(&self, apps: &[BookmarkApp]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_string_pretty(apps)?;
        std::fs::write(&self.path, body)?;
        Ok(())
    }
}
