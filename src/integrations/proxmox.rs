//! Proxmox VE virtualization statistics

use std::time::Duration;

use serde_json::{json, Value};

use super::{connection, required_field, IntegrationResult};
use crate::settings::SettingsStore;

const NODES_TIMEOUT: Duration = Duration::from_secs(10);
const GUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Count VMs and LXC containers and sum node resource usage across the
/// cluster, using an API token (`PVEAPIToken=user!name=secret`).
pub async fn fetch_stats(client: &reqwest::Client, settings: &SettingsStore) -> IntegrationResult {
    let config = connection(settings, "proxmox")?;
    let base_url = required_field(&config, "url")?;
    let user = required_field(&config, "user")?;
    let token_name = required_field(&config, "token_name")?;
    let token_secret = required_field(&config, "token_secret")?;
    let auth = format!("PVEAPIToken={user}!{token_name}={token_secret}");

    let nodes: Vec<Value> = client
        .get(format!("{base_url}/api2/json/nodes"))
        .header("Authorization", &auth)
        .timeout(NODES_TIMEOUT)
        .send()
        .await?
        .error_for_status()?
        .json::<Value>()
        .await?["data"]
        .as_array()
        .cloned()
        .unwrap_or_default();

    let mut total_vms = 0usize;
    let mut running_vms = 0usize;
    let mut total_lxc = 0usize;
    let mut running_lxc = 0usize;
    let mut cpu_sum = 0.0f64;
    let mut mem_used = 0i64;
    let mut mem_total = 0i64;

    for node in &nodes {
        cpu_sum += node["cpu"].as_f64().unwrap_or(0.0);
        mem_used += node["mem"].as_i64().unwrap_or(0);
        mem_total += node["maxmem"].as_i64().unwrap_or(0);

        let Some(name) = node["node"].as_str() else {
            continue;
        };
        let (vms, vms_up) = count_guests(client, &base_url, &auth, name, "qemu").await;
        total_vms += vms;
        running_vms += vms_up;
        let (lxc, lxc_up) = count_guests(client, &base_url, &auth, name, "lxc").await;
        total_lxc += lxc;
        running_lxc += lxc_up;
    }

    let node_count = nodes.len().max(1);
    Ok(json!({
        "nodes": nodes.len(),
        "total_vms": total_vms,
        "running_vms": running_vms,
        "total_containers": total_lxc,
        "running_containers": running_lxc,
        "cpu_percent": (cpu_sum / node_count as f64 * 1000.0).round() / 10.0,
        "mem_percent": if mem_total > 0 {
            (mem_used as f64 / mem_total as f64 * 1000.0).round() / 10.0
        } else {
            0.0
        },
    }))
}

/// Count (total, running) guests of one type on one node; an unreachable
/// node contributes zeros rather than failing the whole fetch.
async fn count_guests(
    client: &reqwest::Client,
    base_url: &str,
    auth: &str,
    node: &str,
    kind: &str,
) -> (usize, usize) {
    let resp = client
        .get(format!("{base_url}/api2/json/nodes/{node}/{kind}"))
        .header("Authorization", auth)
        .timeout(GUEST_TIMEOUT)
        .send()
        .await;

    let guests = match resp {
        Ok(resp) if resp.status().is_success() => match resp.json::<Value>().await {
            Ok(body) => body["data"].as_array().cloned().unwrap_or_default(),
            Err(_) => return (0, 0),
        },
        _ => return (0, 0),
    };

    let running = guests
        .iter()
        .filter(|g| g["status"].as_str() == Some("running"))
        .count();
    (guests.len(), running)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_counts_guests_per_node() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api2/json/nodes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "node": "pve1", "cpu": 0.25, "mem": 50, "maxmem": 100 }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api2/json/nodes/pve1/qemu"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "status": "running" }, { "status": "stopped" }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api2/json/nodes/pve1/lxc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "status": "running" }]
            })))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let settings = SettingsStore::new(dir.path().join("settings.json"));
        settings
            .update_integration(
                "proxmox",
                json!({
                    "enabled": true, "url": server.uri(), "user": "root@pam",
                    "token_name": "dash", "token_secret": "s3cret"
                }),
            )
            .await
            .unwrap();

        let stats = fetch_stats(&reqwest::Client::new(), &settings)
            .await
            .unwrap();
        assert_eq!(stats["nodes"], 1);
        assert_eq!(stats["total_vms"], 2);
        assert_eq!(stats["running_vms"], 1);
        assert_eq!(stats["running_containers"], 1);
        assert_eq!(stats["cpu_percent"], 25.0);
        assert_eq!(stats["mem_percent"], 50.0);
    }
}
