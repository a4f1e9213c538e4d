//! labdash - self-hosted homelab dashboard library
//!
//! This library provides the core functionality for the labdash server:
//! a bookmark app store with live status probing, a settings store,
//! public-API widgets, homelab service integrations, and a browser
//! terminal bridge, all behind one axum HTTP API.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `cache`: bounded TTL/LRU memoization for upstream responses
//! - `probe`: HEAD-then-GET liveness probing for bookmarks
//! - `apps`: the persistent bookmark store
//! - `settings`: settings document store, defaults, and themes
//! - `widgets`: public-API widgets (weather, crypto, news, earthquakes)
//! - `integrations`: user-configured homelab services (Pi-hole, Proxmox, ...)
//! - `terminal`: shell transports and the WebSocket frame protocol
//! - `server`: axum router and route handlers
//! - `config` / `cli` / `error`: configuration, CLI, and error types
//!
//! # Example
//!
//! ```no_run
//! use labdash::cli::Cli;
//! use labdash::config::AppConfig;
//!
//! let config = AppConfig::load(&Cli::default());
//! config.validate().expect("invalid configuration");
//! ```

pub mod apps;
pub mod cache;
pub mod cli;
pub mod config;
pub mod containers;
pub mod error;
pub mod icons;
pub mod integrations;
pub mod net;
pub mod probe;
pub mod server;
pub mod settings;
pub mod system;
pub mod terminal;
pub mod widgets;

// Re-export commonly used types
pub use apps::{AppStore, BookmarkApp};
pub use cache::ResponseCache;
pub use config::AppConfig;
pub use error::{DashboardError, Result};
pub use probe::{normalize_url, Prober};
pub use settings::SettingsStore;

#[cfg(test)]
pub mod test_utils;
