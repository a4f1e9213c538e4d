//! Configuration management for labdash
//!
//! This module builds the runtime [`AppConfig`] from serde defaults, the
//! `VERIFY_TLS` environment variable, and CLI overrides, then validates
//! the result before the server starts.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::error::{DashboardError, Result};

/// Main configuration structure for labdash
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Port the HTTP server listens on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding `apps.json` and `settings.json`
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Verify upstream TLS certificates (off by default; most homelab
    /// services run self-signed)
    #[serde(default)]
    pub verify_tls: bool,

    /// Upper bound on cached widget responses
    #[serde(default = "default_cache_entries")]
    pub cache_max_entries: usize,

    /// Seconds the settings read cache stays fresh
    #[serde(default = "default_settings_ttl")]
    pub settings_ttl_seconds: u64,
}

fn default_port() -> u16 {
    5050
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_cache_entries() -> usize {
    crate::cache::DEFAULT_MAX_ENTRIES
}

fn default_settings_ttl() -> u64 {
    60
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            data_dir: default_data_dir(),
            verify_tls: false,
            cache_max_entries: default_cache_entries(),
            settings_ttl_seconds: default_settings_ttl(),
        }
    }
}

impl AppConfig {
    /// Build the effective configuration from defaults, the environment,
    /// and CLI overrides (CLI wins).
    pub fn load(cli: &Cli) -> Self {
        let mut config = Self {
            verify_tls: crate::net::verify_tls_from_env(),
            ..Self::default()
        };
        if let Some(port) = cli.port {
            config.port = port;
        }
        if let Some(data_dir) = &cli.data_dir {
            config.data_dir = data_dir.clone();
        }
        config
    }

    /// Check the configuration for values the server cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Config`] describing the first invalid
    /// field found.
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(DashboardError::Config("port must be non-zero".into()).into());
        }
        if self.data_dir.as_os_str().is_empty() {
            return Err(DashboardError::Config("data_dir must not be empty".into()).into());
        }
        if self.cache_max_entries == 0 {
            return Err(
                DashboardError::Config("cache_max_entries must be at least 1".into()).into(),
            );
        }
        Ok(())
    }

    /// Path of the bookmark store file.
    pub fn apps_path(&self) -> PathBuf {
        self.data_dir.join("apps.json")
    }

    /// Path of the settings document.
    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join("settings.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.port, 5050);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert!(!config.verify_tls);
        assert_eq!(config.cache_max_entries, 50);
        assert_eq!(config.settings_ttl_seconds, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_overrides_win() {
        let cli = Cli {
            port: Some(9090),
            data_dir: Some(PathBuf::from("/srv/dash")),
            ..Cli::default()
        };
        let config = AppConfig::load(&cli);
        assert_eq!(config.port, 9090);
        assert_eq!(config.apps_path(), PathBuf::from("/srv/dash/apps.json"));
        assert_eq!(
            config.settings_path(),
            PathBuf::from("/srv/dash/settings.json")
        );
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let config = AppConfig {
            port: 0,
            ..AppConfig::default()
        };
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("port"));
    }

    #[test]
    fn test_validate_rejects_empty_data_dir() {
        let config = AppConfig {
            data_dir: PathBuf::new(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.port, 5050);
        assert_eq!(config.cache_max_entries, 50);
    }
}
