//! Audiobookshelf media-server library statistics

use std::time::Duration;

use serde_json::{json, Value};

use super::{connection, required_field, IntegrationResult};
use crate::settings::SettingsStore;

const TIMEOUT: Duration = Duration::from_secs(5);

/// Count libraries by media type using an API token.
pub async fn fetch_stats(client: &reqwest::Client, settings: &SettingsStore) -> IntegrationResult {
    let config = connection(settings, "audiobookshelf")?;
    let base_url = required_field(&config, "url")?;
    let api_key = required_field(&config, "api_key")?;

    let body: Value = client
        .get(format!("{base_url}/api/libraries"))
        .bearer_auth(api_key)
        .timeout(TIMEOUT)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let libraries = body["libraries"].as_array().cloned().unwrap_or_default();
    let book_libraries = libraries
        .iter()
        .filter(|lib| lib["mediaType"].as_str() == Some("book"))
        .count();
    let podcast_libraries = libraries
        .iter()
        .filter(|lib| lib["mediaType"].as_str() == Some("podcast"))
        .count();

    Ok(json!({
        "libraries": libraries.len(),
        "book_libraries": book_libraries,
        "podcast_libraries": podcast_libraries,
        "library_names": libraries
            .iter()
            .filter_map(|lib| lib["name"].as_str())
            .collect::<Vec<_>>(),
        "status": "connected",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_counts_libraries_by_media_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/libraries"))
            .and(header("Authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "libraries": [
                    { "name": "Audiobooks", "mediaType": "book" },
                    { "name": "Fiction", "mediaType": "book" },
                    { "name": "Podcasts", "mediaType": "podcast" },
                ]
            })))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let settings = SettingsStore::new(dir.path().join("settings.json"));
        settings
            .update_integration(
                "audiobookshelf",
                json!({ "enabled": true, "url": server.uri(), "api_key": "tok" }),
            )
            .await
            .unwrap();

        let stats = fetch_stats(&reqwest::Client::new(), &settings)
            .await
            .unwrap();
        assert_eq!(stats["libraries"], 3);
        assert_eq!(stats["book_libraries"], 2);
        assert_eq!(stats["podcast_libraries"], 1);
        assert_eq!(stats["library_names"][0], "Audiobooks");
    }
}
