//! Bookmark and icon route handlers

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::apps::{AppPatch, BookmarkApp, Position};
use crate::containers;
use crate::icons::DEFAULT_ICON;

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct NewApp {
    #[serde(default)]
    name: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    icon: String,
}

/// All bookmarks with live status, probed concurrently.
pub async fn list_apps(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!(state.apps.list_with_status().await))
}

pub async fn add_app(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewApp>,
) -> Response {
    let name = body.name.trim();
    let url = body.url.trim();
    if name.is_empty() || url.is_empty() {
        return error(StatusCode::BAD_REQUEST, "name and url are required");
    }
    let icon = match body.icon.trim() {
        "" => DEFAULT_ICON,
        icon => icon,
    };

    match state.apps.add(name, url, icon).await {
        Ok(()) => (StatusCode::CREATED, Json(json!({ "status": "ok", "name": name }))).into_response(),
        Err(e) => internal(e),
    }
}

pub async fn get_app(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Response {
    match state.apps.get(&name) {
        Some(app) => Json(json!(app)).into_response(),
        None => error(StatusCode::NOT_FOUND, "not found"),
    }
}

pub async fn update_app(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(patch): Json<AppPatch>,
) -> Response {
    match state.apps.update(&name, patch).await {
        Ok(true) => Json(json!({ "status": "ok", "name": name })).into_response(),
        Ok(false) => error(StatusCode::BAD_REQUEST, "update failed or name conflict"),
        Err(e) => internal(e),
    }
}

pub async fn delete_app(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Response {
    match state.apps.delete(&name).await {
        Ok(true) => Json(json!({ "status": "ok" })).into_response(),
        Ok(false) => error(StatusCode::NOT_FOUND, "not found"),
        Err(e) => internal(e),
    }
}

pub async fn delete_all_apps(State(state): State<Arc<AppState>>) -> Response {
    match state.apps.delete_all().await {
        Ok(()) => Json(json!({ "status": "ok" })).into_response(),
        Err(e) => internal(e),
    }
}

/// Reorder request: either a full explicit order or a single drag move.
#[derive(Debug, Deserialize)]
pub struct ReorderBody {
    #[serde(default)]
    order: Option<Vec<String>>,
    #[serde(default)]
    from: Option<String>,
    #[serde(default)]
    to: Option<String>,
    #[serde(default = "default_position")]
    position: Position,
}

fn default_position() -> Position {
    Position::Before
}

pub async fn reorder_apps(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ReorderBody>,
) -> Response {
    if let Some(order) = body.order.filter(|o| !o.is_empty()) {
        return match state.apps.apply_order(&order).await {
            Ok(_) => Json(json!({ "status": "ok" })).into_response(),
            Err(e) => internal(e),
        };
    }

    match (body.from, body.to) {
        (Some(from), Some(to)) => match state.apps.reorder(&from, &to, body.position).await {
            Ok(true) => Json(json!({ "status": "ok" })).into_response(),
            Ok(false) => error(StatusCode::NOT_FOUND, "unknown app name"),
            Err(e) => internal(e),
        },
        _ => error(StatusCode::BAD_REQUEST, "expected order or from/to"),
    }
}

/// Bookmark candidates derived from running containers' published ports.
pub async fn autodiscover() -> Json<Vec<BookmarkApp>> {
    Json(containers::scan_candidates().await)
}

pub async fn import_apps(
    State(state): State<Arc<AppState>>,
    Json(candidates): Json<Vec<BookmarkApp>>,
) -> Response {
    if candidates.is_empty() {
        return error(StatusCode::BAD_REQUEST, "nothing to import");
    }
    match state.apps.merge(candidates).await {
        Ok(count) => Json(json!({ "status": "ok", "imported": count })).into_response(),
        Err(e) => internal(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct IconQuery {
    #[serde(default)]
    q: String,
}

pub async fn search_icons(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IconQuery>,
) -> Json<Vec<Value>> {
    let query = query.q.trim().to_lowercase();
    let query = if query.is_empty() {
        None
    } else {
        Some(query.as_str())
    };
    Json(state.icons.search(query, 50).await)
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn internal(err: anyhow::Error) -> Response {
    tracing::error!(error = %err, "store operation failed");
    error(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
}
