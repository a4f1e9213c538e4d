//! Settings and theme route handlers

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::integrations;
use crate::settings::{deep_merge, themes};

use super::AppState;

/// The full merged settings document.
pub async fn get_settings(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(state.settings.load(false))
}

/// Deep-merge a partial document into the saved settings.
pub async fn put_settings(
    State(state): State<Arc<AppState>>,
    Json(partial): Json<Value>,
) -> Response {
    if !partial.is_object() {
        return error(StatusCode::BAD_REQUEST, "expected a settings object");
    }
    let merged = deep_merge(&state.settings.load(true), &partial);
    match state.settings.save(&merged).await {
        Ok(()) => Json(json!({ "status": "ok" })).into_response(),
        Err(e) => internal(e),
    }
}

pub async fn list_themes() -> Json<Value> {
    Json(themes::themes())
}

/// Theme palette lookup; unknown names fall back to the default theme.
pub async fn theme_colors(Path(name): Path<String>) -> Json<Value> {
    Json(themes::theme_colors(&name))
}

#[derive(Debug, Deserialize)]
pub struct ThemeBody {
    theme: String,
}

pub async fn set_theme(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ThemeBody>,
) -> Response {
    if !themes::is_known_theme(&body.theme) {
        return error(StatusCode::BAD_REQUEST, "unknown theme");
    }
    match state
        .settings
        .set("appearance.theme", json!(body.theme))
        .await
    {
        Ok(()) => Json(json!({ "status": "ok", "theme": body.theme })).into_response(),
        Err(e) => internal(e),
    }
}

pub async fn get_location(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(state.settings.get("location", json!({})))
}

#[derive(Debug, Deserialize)]
pub struct LocationBody {
    #[serde(default)]
    city: String,
    #[serde(default)]
    latitude: String,
    #[serde(default)]
    longitude: String,
    #[serde(default)]
    use_auto: bool,
}

/// Update the location fields the form edits; keys it does not carry
/// (timezone, units) keep their saved values.
pub async fn set_location(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LocationBody>,
) -> Response {
    let current = state.settings.get("location", json!({}));
    let patch = json!({
        "city": body.city,
        "latitude": body.latitude,
        "longitude": body.longitude,
        "use_auto": body.use_auto,
    });
    let location = deep_merge(&current, &patch);
    match state.settings.set("location", location).await {
        Ok(()) => Json(json!({ "status": "ok" })).into_response(),
        Err(e) => internal(e),
    }
}

/// Flip a widget's enabled flag.
pub async fn toggle_widget(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Response {
    let current = state.settings.widget_config(&name)["enabled"]
        .as_bool()
        .unwrap_or(true);
    match state
        .settings
        .set(&format!("widgets.{name}.enabled"), json!(!current))
        .await
    {
        Ok(()) => Json(json!({ "status": "ok", "widget": name, "enabled": !current }))
            .into_response(),
        Err(e) => internal(e),
    }
}

/// Flip an integration's enabled flag.
pub async fn toggle_integration(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Response {
    let enabled = state
        .settings
        .integration_config(&name)
        .map(|config| config["enabled"].as_bool().unwrap_or(false))
        .unwrap_or(false);
    match state
        .settings
        .update_integration(&name, json!({ "enabled": !enabled }))
        .await
    {
        Ok(()) => Json(json!({ "status": "ok", "integration": name, "enabled": !enabled }))
            .into_response(),
        Err(e) => internal(e),
    }
}

/// Connection fields accepted when saving an integration's config.
const CONNECTION_KEYS: [&str; 6] = ["url", "api_key", "user", "token_name", "token_secret", "slug"];

pub async fn save_integration(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut config = serde_json::Map::new();
    for key in CONNECTION_KEYS {
        if let Some(value) = body.get(key) {
            config.insert(key.to_string(), value.clone());
        }
    }
    match state
        .settings
        .update_integration(&name, Value::Object(config))
        .await
    {
        Ok(()) => Json(json!({ "status": "ok", "integration": name })).into_response(),
        Err(e) => internal(e),
    }
}

/// Probe an integration with its saved config and report reachability.
pub async fn test_integration(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Response {
    match integrations::fetch_stats(&name, &state.client, &state.settings).await {
        Ok(_) => Json(json!({ "status": "ok", "message": "connection successful" })).into_response(),
        Err(e) => error(StatusCode::BAD_REQUEST, &e.to_string()),
    }
}

#[derive(Debug, Deserialize)]
pub struct ValueBody {
    value: Value,
}

/// Set one `section.key` setting.
pub async fn set_value(
    State(state): State<Arc<AppState>>,
    Path((section, key)): Path<(String, String)>,
    Json(body): Json<ValueBody>,
) -> Response {
    if body.value.is_null() {
        return error(StatusCode::BAD_REQUEST, "value is required");
    }
    match state
        .settings
        .set(&format!("{section}.{key}"), body.value.clone())
        .await
    {
        Ok(()) => Json(json!({ "status": "ok", "setting": format!("{section}.{key}") }))
            .into_response(),
        Err(e) => internal(e),
    }
}

/// Flip one boolean `section.key` setting.
pub async fn toggle_value(
    State(state): State<Arc<AppState>>,
    Path((section, key)): Path<(String, String)>,
) -> Response {
    let path = format!("{section}.{key}");
    let current = state.settings.get(&path, json!(true)).as_bool().unwrap_or(true);
    match state.settings.set(&path, json!(!current)).await {
        Ok(()) => Json(json!({ "status": "ok", "setting": path, "value": !current }))
            .into_response(),
        Err(e) => internal(e),
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn internal(err: anyhow::Error) -> Response {
    tracing::error!(error = %err, "settings operation failed");
    error(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
}
