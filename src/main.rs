//! labdash - self-hosted homelab dashboard
//!
#![doc = "labdash - self-hosted homelab dashboard"]
#![doc = "Main entry point for the dashboard server."]

use std::sync::Arc;

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use labdash::apps::AppStore;
use labdash::cli::Cli;
use labdash::config::AppConfig;
use labdash::icons::IconService;
use labdash::net;
use labdash::probe::Prober;
use labdash::server::{self, AppState};
use labdash::settings::SettingsStore;
use labdash::system::SystemMonitor;
use labdash::widgets::WidgetHub;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(&cli);

    // Load and validate configuration
    let config = AppConfig::load(&cli);
    config.validate()?;

    std::fs::create_dir_all(&config.data_dir)?;
    tracing::info!(data_dir = %config.data_dir.display(), "data directory ready");

    let client = net::build_client(config.verify_tls)?;

    let state = Arc::new(AppState {
        apps: AppStore::new(config.apps_path(), Prober::new(client.clone())),
        settings: SettingsStore::with_ttl(
            config.settings_path(),
            std::time::Duration::from_secs(config.settings_ttl_seconds),
        ),
        widgets: WidgetHub::with_capacity(client.clone(), config.cache_max_entries),
        icons: IconService::new(client.clone()),
        monitor: SystemMonitor::new(),
        client,
    });

    server::serve(state, config.port).await
}

fn init_tracing(cli: &Cli) {
    let default_filter = if cli.verbose {
        "labdash=debug"
    } else {
        "labdash=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    if cli.log_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
