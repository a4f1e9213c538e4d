//! Uptime Kuma monitor statistics via the public status-page API

use std::time::Duration;

use serde_json::{json, Value};

use super::{connection, required_field, IntegrationResult};
use crate::settings::SettingsStore;

const TIMEOUT: Duration = Duration::from_secs(5);

/// Summarize monitor health from a status page's public group list.
pub async fn fetch_stats(client: &reqwest::Client, settings: &SettingsStore) -> IntegrationResult {
    let config = connection(settings, "uptime_kuma")?;
    let base_url = required_field(&config, "url")?;
    let slug = config["slug"].as_str().unwrap_or("default");

    let data: Value = client
        .get(format!("{base_url}/api/status-page/{slug}"))
        .timeout(TIMEOUT)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let mut monitors = Vec::new();
    let mut up = 0usize;
    let mut down = 0usize;
    let mut paused = 0usize;

    if let Some(groups) = data["publicGroupList"].as_array() {
        for group in groups {
            let Some(list) = group["monitorList"].as_array() else {
                continue;
            };
            for monitor in list {
                let status_text = match monitor["status"].as_i64() {
                    Some(1) => {
                        up += 1;
                        "up"
                    }
                    Some(0) => {
                        down += 1;
                        "down"
                    }
                    _ => {
                        paused += 1;
                        "paused"
                    }
                };
                monitors.push(json!({
                    "name": monitor["name"].as_str().unwrap_or("Unknown"),
                    "status": status_text,
                    "uptime_24h": monitor["uptime24"].as_f64().unwrap_or(0.0),
                }));
            }
        }
    }

    let total = monitors.len();
    let health = if total > 0 {
        (up as f64 / total as f64 * 1000.0).round() / 10.0
    } else {
        0.0
    };

    Ok(json!({
        "total_monitors": total,
        "up": up,
        "down": down,
        "paused": paused,
        "health": health,
        "monitors": monitors,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_counts_monitor_states() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/status-page/homelab"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "publicGroupList": [
                    { "monitorList": [
                        { "name": "plex", "status": 1, "uptime24": 100.0 },
                        { "name": "nas", "status": 0, "uptime24": 42.0 },
                    ] },
                    { "monitorList": [
                        { "name": "backup", "status": 2 },
                    ] },
                ]
            })))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let settings = SettingsStore::new(dir.path().join("settings.json"));
        settings
            .update_integration(
                "uptime_kuma",
                json!({ "enabled": true, "url": server.uri(), "slug": "homelab" }),
            )
            .await
            .unwrap();

        let stats = fetch_stats(&reqwest::Client::new(), &settings)
            .await
            .unwrap();
        assert_eq!(stats["total_monitors"], 3);
        assert_eq!(stats["up"], 1);
        assert_eq!(stats["down"], 1);
        assert_eq!(stats["paused"], 1);
        assert_eq!(stats["health"], 33.3);
    }
}
