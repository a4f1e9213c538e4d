//! Widget and integration route handlers
//!
//! Widget fetches never fail the request: a dead upstream yields a `null`
//! body with 200 so the frontend renders an empty panel. Integration
//! errors stay typed -- disabled is a normal answer, misconfiguration is
//! the caller's fault, and an unreachable service is a gateway problem.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::integrations::{self, IntegrationError};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    city: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// Current conditions; query params win, then the saved manual location.
pub async fn weather(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WeatherQuery>,
) -> Json<Value> {
    let mut city = query.city;
    let mut lat = query.lat;
    let mut lon = query.lon;

    if city.is_none() && lat.is_none() && lon.is_none() {
        let location = state.settings.get("location", json!({}));
        if !location["use_auto"].as_bool().unwrap_or(true) {
            city = location["city"]
                .as_str()
                .filter(|c| !c.is_empty())
                .map(str::to_string);
            lat = location["latitude"].as_str().and_then(|v| v.parse().ok());
            lon = location["longitude"].as_str().and_then(|v| v.parse().ok());
        }
    }

    Json(
        state
            .widgets
            .weather(city.as_deref(), lat, lon)
            .await
            .unwrap_or(Value::Null),
    )
}

pub async fn crypto(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(state.widgets.crypto().await.unwrap_or(Value::Null))
}

pub async fn crypto_bar(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(state.widgets.crypto_bar().await.unwrap_or(Value::Null))
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    limit: Option<usize>,
}

pub async fn news(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> Json<Value> {
    let limit = query.limit.unwrap_or(5).min(30);
    Json(state.widgets.hacker_news(limit).await.unwrap_or(Value::Null))
}

#[derive(Debug, Deserialize)]
pub struct RedditQuery {
    sub: Option<String>,
    limit: Option<usize>,
}

pub async fn reddit(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RedditQuery>,
) -> Json<Value> {
    let subreddit = query.sub.as_deref().unwrap_or("technology");
    let limit = query.limit.unwrap_or(5).min(30);
    Json(
        state
            .widgets
            .reddit(subreddit, limit)
            .await
            .unwrap_or(Value::Null),
    )
}

pub async fn headlines(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> Json<Value> {
    let limit = query.limit.unwrap_or(10).min(30);
    Json(state.widgets.headlines(limit).await.unwrap_or(Value::Null))
}

pub async fn threats(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(state.widgets.threat_status().await.unwrap_or(Value::Null))
}

#[derive(Debug, Deserialize)]
pub struct QuakeQuery {
    min_mag: Option<f64>,
}

pub async fn earthquakes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QuakeQuery>,
) -> Json<Value> {
    let min_mag = query.min_mag.unwrap_or(4.5);
    Json(
        state
            .widgets
            .earthquakes(min_mag)
            .await
            .unwrap_or(Value::Null),
    )
}

/// Stats from one configured integration, by name.
pub async fn integration(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Response {
    match integrations::fetch_stats(&name, &state.client, &state.settings).await {
        Ok(stats) => Json(stats).into_response(),
        Err(IntegrationError::Disabled) => {
            Json(json!({ "status": "disabled" })).into_response()
        }
        Err(IntegrationError::NotConfigured) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "integration not configured" })),
        )
            .into_response(),
        Err(IntegrationError::Upstream(message)) => {
            tracing::warn!(integration = %name, error = %message, "integration fetch failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": message })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::tests::test_state;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_disabled_integration_is_a_normal_answer() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);
        let response = integration(State(state), Path("pihole".into())).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_enabled_but_unconfigured_integration_is_bad_request() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);
        state
            .settings
            .set("integrations.pihole.enabled", json!(true))
            .await
            .unwrap();
        let response = integration(State(state), Path("pihole".into())).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
