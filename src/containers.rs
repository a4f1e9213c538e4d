//! Container runtime collaborator
//!
//! Lists containers by shelling out to the docker CLI rather than
//! speaking to the daemon socket directly; the dashboard only needs
//! id/name/status/image. An unreachable daemon is reported as a
//! human-readable message next to an empty list, never as an error.

use serde::{Deserialize, Serialize};
use tokio::process::Command;

use crate::apps::BookmarkApp;

/// One row in the container status panel.
#[derive(Debug, Clone, Serialize)]
pub struct ContainerInfo {
    pub id: String,
    pub name: String,
    pub status: String,
    pub image: String,
}

#[derive(Debug, Deserialize)]
struct DockerPsLine {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Names")]
    names: String,
    #[serde(rename = "Status")]
    status: String,
    #[serde(rename = "Image")]
    image: String,
    #[serde(rename = "Ports", default)]
    ports: String,
}

/// List all containers (running and stopped).
///
/// Returns the list alongside an optional error message for display;
/// the message is set when the docker CLI is missing or the daemon is
/// unreachable.
pub async fn fetch_containers() -> (Vec<ContainerInfo>, Option<String>) {
    match run_docker_ps(true).await {
        Ok(lines) => {
            let containers = lines
                .into_iter()
                .map(|line| ContainerInfo {
                    id: short_id(&line.id),
                    name: line.names,
                    status: line.status,
                    image: line.image,
                })
                .collect();
            (containers, None)
        }
        Err(message) => (Vec::new(), Some(message)),
    }
}

/// Derive bookmark candidates from running containers' published ports.
///
/// Used by the autodiscover/import flow; containers without a published
/// host port are skipped.
pub async fn scan_candidates() -> Vec<BookmarkApp> {
    let lines = match run_docker_ps(false).await {
        Ok(lines) => lines,
        Err(message) => {
            tracing::debug!(error = %message, "container scan unavailable");
            return Vec::new();
        }
    };

    lines
        .into_iter()
        .filter_map(|line| {
            let port = first_published_port(&line.ports)?;
            Some(BookmarkApp {
                name: line.names,
                url: format!("http://localhost:{port}"),
                icon: String::new(),
            })
        })
        .collect()
}

async fn run_docker_ps(include_stopped: bool) -> std::result::Result<Vec<DockerPsLine>, String> {
    let mut cmd = Command::new("docker");
    cmd.arg("ps");
    if include_stopped {
        cmd.arg("-a");
    }
    cmd.args(["--format", "{{json .}}"]);

    let output = cmd.output().await.map_err(|_| {
        "Docker CLI not available. Install docker or mount /var/run/docker.sock.".to_string()
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "Unable to communicate with Docker: {}",
            stderr.trim()
        ));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout
        .lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|l| serde_json::from_str::<DockerPsLine>(l).ok())
        .collect())
}

fn short_id(id: &str) -> String {
    id.chars().take(12).collect()
}

/// Extract the first host port from a docker `Ports` column, e.g.
/// `0.0.0.0:8080->80/tcp, :::8080->80/tcp` yields `8080`.
fn first_published_port(ports: &str) -> Option<u16> {
    for mapping in ports.split(',') {
        let mapping = mapping.trim();
        let Some((host_side, _)) = mapping.split_once("->") else {
            continue;
        };
        if let Some(port) = host_side.rsplit(':').next() {
            if let Ok(port) = port.parse::<u16>() {
                return Some(port);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_published_port_parses_ipv4_mapping() {
        assert_eq!(
            first_published_port("0.0.0.0:8080->80/tcp, :::8080->80/tcp"),
            Some(8080)
        );
    }

    #[test]
    fn test_first_published_port_skips_unpublished() {
        assert_eq!(first_published_port("80/tcp"), None);
        assert_eq!(first_published_port(""), None);
    }

    #[test]
    fn test_short_id_truncates_to_twelve() {
        assert_eq!(
            short_id("0123456789abcdef0123456789abcdef"),
            "0123456789ab"
        );
    }

    #[test]
    fn test_ps_line_parses_docker_json_format() {
        let line = r#"{"ID":"abc123","Names":"plex","Status":"Up 2 hours","Image":"plexinc/pms-docker","Ports":"0.0.0.0:32400->32400/tcp"}"#;
        let parsed: DockerPsLine = serde_json::from_str(line).unwrap();
        assert_eq!(parsed.names, "plex");
        assert_eq!(first_published_port(&parsed.ports), Some(32400));
    }
}
