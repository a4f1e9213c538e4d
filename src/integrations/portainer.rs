//! Portainer container-management statistics

use std::time::Duration;

use serde_json::{json, Value};

use super::{connection, required_field, IntegrationResult};
use crate::settings::SettingsStore;

const TIMEOUT: Duration = Duration::from_secs(5);

/// Aggregate container/stack/volume counts across all Portainer
/// environments, read from the endpoint snapshots.
pub async fn fetch_stats(client: &reqwest::Client, settings: &SettingsStore) -> IntegrationResult {
    let config = connection(settings, "portainer")?;
    let base_url = required_field(&config, "url")?;
    let api_key = required_field(&config, "api_key")?;

    let endpoints: Vec<Value> = client
        .get(format!("{base_url}/api/endpoints"))
        .header("X-API-Key", api_key)
        .timeout(TIMEOUT)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let mut running = 0i64;
    let mut stopped = 0i64;
    let mut stacks = 0i64;
    let mut volumes = 0i64;
    let mut images = 0i64;

    for endpoint in &endpoints {
        let Some(snapshot) = endpoint["Snapshots"].as_array().and_then(|s| s.first()) else {
            continue;
        };
        running += snapshot["RunningContainerCount"].as_i64().unwrap_or(0);
        stopped += snapshot["StoppedContainerCount"].as_i64().unwrap_or(0);
        stacks += snapshot["StackCount"].as_i64().unwrap_or(0);
        volumes += snapshot["VolumeCount"].as_i64().unwrap_or(0);
        images += snapshot["ImageCount"].as_i64().unwrap_or(0);
    }

    Ok(json!({
        "endpoints": endpoints.len(),
        "total_containers": running + stopped,
        "running_containers": running,
        "stopped_containers": stopped,
        "stacks": stacks,
        "volumes": volumes,
        "images": images,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_aggregates_across_endpoints() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/endpoints"))
            .and(header("X-API-Key", "key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "Snapshots": [{ "RunningContainerCount": 3, "StoppedContainerCount": 1,
                                  "StackCount": 2, "VolumeCount": 5, "ImageCount": 9 }] },
                { "Snapshots": [{ "RunningContainerCount": 2, "StoppedContainerCount": 0,
                                  "StackCount": 1, "VolumeCount": 2, "ImageCount": 4 }] },
                { "Snapshots": [] },
            ])))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let settings = SettingsStore::new(dir.path().join("settings.json"));
        settings
            .update_integration(
                "portainer",
                json!({ "enabled": true, "url": server.uri(), "api_key": "key" }),
            )
            .await
            .unwrap();

        let stats = fetch_stats(&reqwest::Client::new(), &settings)
            .await
            .unwrap();
        assert_eq!(stats["endpoints"], 3);
        assert_eq!(stats["running_containers"], 5);
        assert_eq!(stats["total_containers"], 6);
        assert_eq!(stats["images"], 13);
    }
}
