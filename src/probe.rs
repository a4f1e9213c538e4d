//! Liveness probing for bookmarked services
//!
//! Determines whether a URL is reachable and how long it took to answer,
//! using a fast HEAD-then-GET strategy: a cheap HEAD with a short timeout
//! first, and on failure a GET with a slightly longer timeout whose body
//! is never awaited. Probes never return errors; an unreachable target is
//! simply `(online: false, latency: 0)`.

use std::time::{Duration, Instant};

use serde::Serialize;

/// Timeout for the initial HEAD attempt.
pub const HEAD_TIMEOUT: Duration = Duration::from_secs(2);
/// Timeout for the follow-up GET attempt.
pub const GET_TIMEOUT: Duration = Duration::from_secs(3);

/// Outcome of a single liveness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    /// Whether the target answered with a sub-400 status.
    pub online: bool,
    /// Round-trip time in milliseconds. An error status still carries the
    /// measured time; 0 means the target never answered.
    pub latency_ms: u64,
}

impl ProbeResult {
    /// The result reported for empty or unreachable targets.
    pub const OFFLINE: ProbeResult = ProbeResult {
        online: false,
        latency_ms: 0,
    };
}

/// Prepend `http://` when a URL carries no scheme. Empty input stays empty.
pub fn normalize_url(url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }
    format!("http://{url}")
}

/// Issues liveness probes over the shared HTTP client.
#[derive(Clone)]
pub struct Prober {
    client: reqwest::Client,
}

impl Prober {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Probe `url` for reachability.
    ///
    /// The first attempt is a HEAD with a 2 s timeout; a sub-400 status
    /// reports online with the measured latency. Anything else falls
    /// through to a GET with a 3 s timeout whose response body is left
    /// unread — only the status line matters. A transport error on the
    /// GET reports offline with zero latency. Worst case the probe
    /// returns within roughly the sum of both timeouts.
    pub async fn probe(&self, url: &str) -> ProbeResult {
        let target = normalize_url(url);
        if target.is_empty() {
            return ProbeResult::OFFLINE;
        }

        let start = Instant::now();
        match self
            .client
            .head(&target)
            .timeout(HEAD_TIMEOUT)
            .send()
            .await
        {
            Ok(resp) if resp.status().as_u16() < 400 => {
                return ProbeResult {
                    online: true,
                    latency_ms: start.elapsed().as_millis() as u64,
                };
            }
            Ok(_) | Err(_) => {}
        }

        let start = Instant::now();
        match self.client.get(&target).timeout(GET_TIMEOUT).send().await {
            Ok(resp) => ProbeResult {
                online: resp.status().as_u16() < 400,
                latency_ms: start.elapsed().as_millis() as u64,
            },
            Err(err) => {
                tracing::debug!(url = %target, error = %err, "probe failed");
                ProbeResult::OFFLINE
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_adds_default_scheme() {
        assert_eq!(normalize_url("192.168.1.5"), "http://192.168.1.5");
        assert_eq!(normalize_url("nas.local:5000"), "http://nas.local:5000");
    }

    #[test]
    fn test_normalize_keeps_existing_scheme() {
        assert_eq!(normalize_url("http://a.local"), "http://a.local");
        assert_eq!(normalize_url("https://a.local"), "https://a.local");
    }

    #[test]
    fn test_normalize_empty_stays_empty() {
        assert_eq!(normalize_url(""), "");
    }

    #[tokio::test]
    async fn test_empty_url_is_offline_without_network() {
        let prober = Prober::new(reqwest::Client::new());
        assert_eq!(prober.probe("").await, ProbeResult::OFFLINE);
    }
}
