//! Pi-hole DNS statistics (v6 API with v5 fallback)

use std::time::Duration;

use serde_json::{json, Value};

use super::{connection, required_field, IntegrationError, IntegrationResult};
use crate::settings::SettingsStore;

const TIMEOUT: Duration = Duration::from_secs(5);

/// Fetch query statistics, trying the v6 session API first and falling
/// back to the v5 token API.
pub async fn fetch_stats(client: &reqwest::Client, settings: &SettingsStore) -> IntegrationResult {
    let config = connection(settings, "pihole")?;
    let base_url = required_field(&config, "url")?;
    let api_key = config["api_key"].as_str().unwrap_or("").to_string();

    match try_v6(client, &base_url, &api_key).await {
        Ok(stats) => Ok(stats),
        Err(v6_err) => {
            tracing::debug!(error = %v6_err, "pihole v6 API unavailable, trying v5");
            try_v5(client, &base_url, &api_key).await
        }
    }
}

async fn try_v6(
    client: &reqwest::Client,
    base_url: &str,
    password: &str,
) -> IntegrationResult {
    let auth_resp = client
        .post(format!("{base_url}/api/auth"))
        .json(&json!({ "password": password }))
        .timeout(TIMEOUT)
        .send()
        .await?;
    if !auth_resp.status().is_success() {
        return Err(IntegrationError::Upstream(format!(
            "auth returned {}",
            auth_resp.status()
        )));
    }

    let auth: Value = auth_resp.json().await?;
    let session = &auth["session"];
    if !session["valid"].as_bool().unwrap_or(false) {
        return Err(IntegrationError::Upstream("session rejected".into()));
    }
    let sid = session["sid"].as_str().unwrap_or("");

    let summary: Value = client
        .get(format!("{base_url}/api/stats/summary"))
        .header("X-FTL-SID", sid)
        .timeout(TIMEOUT)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let gravity: Value = client
        .get(format!("{base_url}/api/info/gravity"))
        .header("X-FTL-SID", sid)
        .timeout(TIMEOUT)
        .send()
        .await?
        .json()
        .await
        .unwrap_or_else(|_| json!({}));

    let queries = &summary["queries"];
    Ok(json!({
        "status": "enabled",
        "api_version": "v6",
        "queries_today": queries["total"].as_i64().unwrap_or(0),
        "blocked_today": queries["blocked"].as_i64().unwrap_or(0),
        "percent_blocked": queries["percent_blocked"].as_f64().unwrap_or(0.0),
        "domains_on_list": gravity["gravity"]["domains_being_blocked"].as_i64().unwrap_or(0),
    }))
}

async fn try_v5(
    client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
) -> IntegrationResult {
    let summary: Value = client
        .get(format!(
            "{base_url}/admin/api.php?summaryRaw&auth={api_key}"
        ))
        .timeout(TIMEOUT)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(json!({
        "status": summary["status"].as_str().unwrap_or("unknown"),
        "api_version": "v5",
        "queries_today": summary["dns_queries_today"].as_i64().unwrap_or(0),
        "blocked_today": summary["ads_blocked_today"].as_i64().unwrap_or(0),
        "percent_blocked": summary["ads_percentage_today"].as_f64().unwrap_or(0.0),
        "domains_on_list": summary["domains_being_blocked"].as_i64().unwrap_or(0),
    }))
}
