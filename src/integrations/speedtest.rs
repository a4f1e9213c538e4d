//! Speedtest Tracker latest-result integration

use std::time::Duration;

use serde_json::{json, Value};

use super::{connection, required_field, IntegrationResult};
use crate::settings::SettingsStore;

const TIMEOUT: Duration = Duration::from_secs(5);

/// Fetch the most recent speedtest. Older trackers report raw bps, newer
/// ones Mbps; anything above a million is normalized down.
pub async fn fetch_stats(client: &reqwest::Client, settings: &SettingsStore) -> IntegrationResult {
    let config = connection(settings, "speedtest")?;
    let base_url = required_field(&config, "url")?;
    let api_key = config["api_key"].as_str().unwrap_or("");

    let mut request = client
        .get(format!("{base_url}/api/speedtest/latest"))
        .timeout(TIMEOUT);
    if !api_key.is_empty() {
        request = request.bearer_auth(api_key);
    }

    let body: Value = request
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    let data = &body["data"];

    Ok(json!({
        "download_mbps": to_mbps(data["download"].as_f64().unwrap_or(0.0)),
        "upload_mbps": to_mbps(data["upload"].as_f64().unwrap_or(0.0)),
        "ping_ms": (data["ping"].as_f64().unwrap_or(0.0) * 10.0).round() / 10.0,
        "server": data["server_name"].as_str().unwrap_or("Unknown"),
        "isp": data["isp"].as_str().unwrap_or("Unknown"),
        "tested_at": data["created_at"].as_str().unwrap_or(""),
        "status": "connected",
    }))
}

fn to_mbps(value: f64) -> f64 {
    let mbps = if value > 1_000_000.0 {
        value / 1_000_000.0
    } else {
        value
    };
    (mbps * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_to_mbps_normalizes_bps() {
        assert_eq!(to_mbps(940_000_000.0), 940.0);
        assert_eq!(to_mbps(250.5), 250.5);
    }

    #[tokio::test]
    async fn test_latest_result_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/speedtest/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "download": 500_000_000.0,
                    "upload": 40.25,
                    "ping": 8.44,
                    "server_name": "near-by",
                    "isp": "FiberCo",
                    "created_at": "2026-08-01T00:00:00Z"
                }
            })))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let settings = SettingsStore::new(dir.path().join("settings.json"));
        settings
            .update_integration(
                "speedtest",
                json!({ "enabled": true, "url": server.uri() }),
            )
            .await
            .unwrap();

        let stats = fetch_stats(&reqwest::Client::new(), &settings)
            .await
            .unwrap();
        assert_eq!(stats["download_mbps"], 500.0);
        assert_eq!(stats["upload_mbps"], 40.25);
        assert_eq!(stats["ping_ms"], 8.4);
        assert_eq!(stats["isp"], "FiberCo");
    }
}
