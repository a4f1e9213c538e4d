//! Homelab service integrations
//!
//! Each integration wraps one user-configured service API (Pi-hole,
//! Portainer, Proxmox, Uptime Kuma, speedtest tracker, Audiobookshelf).
//! Unlike the public-API widgets, failures here are typed so callers can
//! tell "the user turned this off" from "the user misconfigured it" from
//! "the service is down" without reading logs.

pub mod audiobookshelf;
pub mod pihole;
pub mod portainer;
pub mod proxmox;
pub mod speedtest;
pub mod uptime_kuma;

use serde_json::Value;
use thiserror::Error;

use crate::settings::SettingsStore;

/// Why an integration fetch produced no data.
#[derive(Error, Debug)]
pub enum IntegrationError {
    /// The integration is switched off in settings.
    #[error("integration disabled")]
    Disabled,

    /// The integration is enabled but missing required connection config.
    #[error("integration not configured")]
    NotConfigured,

    /// The service was contacted but did not answer usefully.
    #[error("upstream error: {0}")]
    Upstream(String),
}

impl From<reqwest::Error> for IntegrationError {
    fn from(err: reqwest::Error) -> Self {
        IntegrationError::Upstream(err.to_string())
    }
}

/// Result of one integration fetch.
pub type IntegrationResult = std::result::Result<Value, IntegrationError>;

/// Load the connection config for `name`, enforcing the enabled flag.
pub(crate) fn connection(
    settings: &SettingsStore,
    name: &str,
) -> std::result::Result<Value, IntegrationError> {
    let config = settings
        .integration_config(name)
        .ok_or(IntegrationError::Disabled)?;
    if !config["enabled"].as_bool().unwrap_or(false) {
        return Err(IntegrationError::Disabled);
    }
    Ok(config)
}

/// Pull a non-empty string field out of an integration config.
pub(crate) fn required_field(
    config: &Value,
    field: &str,
) -> std::result::Result<String, IntegrationError> {
    match config[field].as_str() {
        Some(value) if !value.is_empty() => Ok(value.trim_end_matches('/').to_string()),
        _ => Err(IntegrationError::NotConfigured),
    }
}

/// Fetch stats for the named integration.
pub async fn fetch_stats(
    name: &str,
    client: &reqwest::Client,
    settings: &SettingsStore,
) -> IntegrationResult {
    match name {
        "pihole" => pihole::fetch_stats(client, settings).await,
        "portainer" => portainer::fetch_stats(client, settings).await,
        "proxmox" => proxmox::fetch_stats(client, settings).await,
        "uptime_kuma" => uptime_kuma::fetch_stats(client, settings).await,
        "speedtest" => speedtest::fetch_stats(client, settings).await,
        "audiobookshelf" => audiobookshelf::fetch_stats(client, settings).await,
        other => Err(IntegrationError::Upstream(format!(
            "unknown integration: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_connection_requires_enabled_flag() {
        let dir = TempDir::new().unwrap();
        let settings = SettingsStore::new(dir.path().join("settings.json"));

        // Default config exists but is disabled.
        assert!(matches!(
            connection(&settings, "pihole"),
            Err(IntegrationError::Disabled)
        ));

        settings
            .set("integrations.pihole.enabled", json!(true))
            .await
            .unwrap();
        assert!(connection(&settings, "pihole").is_ok());
    }

    #[test]
    fn test_required_field_rejects_empty_and_trims_slash() {
        let config = json!({ "url": "http://pi.hole/", "api_key": "" });
        assert_eq!(required_field(&config, "url").unwrap(), "http://pi.hole");
        assert!(matches!(
            required_field(&config, "api_key"),
            Err(IntegrationError::NotConfigured)
        ));
        assert!(matches!(
            required_field(&config, "missing"),
            Err(IntegrationError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_unknown_integration_is_an_upstream_error() {
        let dir = TempDir::new().unwrap();
        let settings = SettingsStore::new(dir.path().join("settings.json"));
        let result = fetch_stats("ghost", &reqwest::Client::new(), &settings).await;
        assert!(matches!(result, Err(IntegrationError::Upstream(_))));
    }
}
