//! HTTP API server
//!
//! This module wires every subsystem into one axum [`Router`] behind a
//! shared [`AppState`]. Route handlers live in submodules:
//!
//! - [`apps_routes`] -- bookmark CRUD, reordering, Docker import, icon
//!   search.
//! - [`settings_routes`] -- settings document, themes, widget and
//!   integration toggles.
//! - [`widget_routes`] -- public-API widgets and homelab integrations.
//! - [`terminal_ws`] -- the interactive terminal WebSocket.
//!
//! # Error mapping
//!
//! Widget fetches degrade to `null` bodies with a 200 status so the
//! frontend can render an empty panel instead of an error state. Store
//! operations map conflicts to 400 and missing entries to 404.

pub mod apps_routes;
pub mod settings_routes;
pub mod terminal_ws;
pub mod widget_routes;

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::apps::AppStore;
use crate::containers;
use crate::error::Result;
use crate::icons::IconService;
use crate::settings::SettingsStore;
use crate::system::SystemMonitor;
use crate::widgets::WidgetHub;

/// Everything a request handler can reach.
pub struct AppState {
    pub apps: AppStore,
    pub settings: SettingsStore,
    pub widgets: WidgetHub,
    pub icons: IconService,
    pub monitor: SystemMonitor,
    pub client: reqwest::Client,
}

/// Build the full API router over a shared state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/stats", get(stats))
        .route("/api/system-info", get(system_info))
        // Bookmarks
        .route(
            "/api/apps",
            get(apps_routes::list_apps)
                .post(apps_routes::add_app)
                .delete(apps_routes::delete_all_apps),
        )
        .route(
            "/api/apps/:name",
            get(apps_routes::get_app)
                .put(apps_routes::update_app)
                .delete(apps_routes::delete_app),
        )
        .route("/api/apps/reorder", post(apps_routes::reorder_apps))
        .route("/api/apps/autodiscover", get(apps_routes::autodiscover))
        .route("/api/apps/import", post(apps_routes::import_apps))
        .route("/api/icons/search", get(apps_routes::search_icons))
        // Widgets and integrations
        .route("/api/widgets/weather", get(widget_routes::weather))
        .route("/api/widgets/crypto", get(widget_routes::crypto))
        .route("/api/widgets/crypto-bar", get(widget_routes::crypto_bar))
        .route("/api/widgets/news", get(widget_routes::news))
        .route("/api/widgets/reddit", get(widget_routes::reddit))
        .route("/api/widgets/headlines", get(widget_routes::headlines))
        .route("/api/widgets/threats", get(widget_routes::threats))
        .route("/api/widgets/earthquakes", get(widget_routes::earthquakes))
        .route("/api/integrations/:name", get(widget_routes::integration))
        // Settings and themes
        .route(
            "/api/settings",
            get(settings_routes::get_settings).put(settings_routes::put_settings),
        )
        .route("/api/settings/theme", post(settings_routes::set_theme))
        .route(
            "/api/settings/location",
            get(settings_routes::get_location).post(settings_routes::set_location),
        )
        .route(
            "/api/settings/widget/:name/toggle",
            post(settings_routes::toggle_widget),
        )
        .route(
            "/api/settings/integration/:name",
            post(settings_routes::save_integration),
        )
        .route(
            "/api/settings/integration/:name/toggle",
            post(settings_routes::toggle_integration),
        )
        .route(
            "/api/settings/integration/:name/test",
            post(settings_routes::test_integration),
        )
        .route(
            "/api/settings/:section/:key",
            post(settings_routes::set_value),
        )
        .route(
            "/api/settings/:section/:key/toggle",
            post(settings_routes::toggle_value),
        )
        .route("/api/themes", get(settings_routes::list_themes))
        .route("/api/theme/:name", get(settings_routes::theme_colors))
        // Terminal
        .route("/terminal", get(terminal_ws::terminal_ws))
        .with_state(state)
}

/// Bind and serve until ctrl-c.
///
/// # Errors
///
/// Returns an error if the listen address cannot be bound.
pub async fn serve(state: Arc<AppState>, port: u16) -> Result<()> {
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "dashboard listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to install ctrl-c handler");
        return;
    }
    tracing::info!("shutdown requested");
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

/// System load plus the local container list, one payload per poll.
async fn stats(State(state): State<Arc<AppState>>) -> Json<Value> {
    let (containers, docker_error) = containers::fetch_containers().await;
    let stats = state.monitor.stats();
    Json(json!({
        "system": stats,
        "containers": containers,
        "docker_error": docker_error,
        "updated_at": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Host identity payload for the loading screen.
async fn system_info(State(state): State<Arc<AppState>>) -> Json<Value> {
    let (containers, _) = containers::fetch_containers().await;
    let running = containers
        .iter()
        .filter(|c| c.status.starts_with("Up"))
        .count();

    let mut info = state.monitor.info();
    info["containers_total"] = json!(containers.len());
    info["containers_running"] = json!(running);
    Json(info)
}
