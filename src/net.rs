//! Shared HTTP client construction
//!
//! All outbound requests (widgets, integrations, liveness probes) go
//! through one `reqwest::Client`. TLS certificate verification is off by
//! default: homelab services overwhelmingly run self-signed certificates
//! and refusing them would make most integrations unusable. This is a
//! deliberate, logged security tradeoff; set `VERIFY_TLS=true` to restore
//! verification.

use std::time::Duration;

use crate::error::Result;

/// User-Agent sent on all outbound requests.
pub const USER_AGENT: &str = concat!("labdash/", env!("CARGO_PKG_VERSION"));

/// Build the process-wide HTTP client.
///
/// Redirects are followed (bounded at 10 hops) and a generous overall
/// timeout is set; individual fetchers layer shorter per-request timeouts
/// on top.
///
/// # Errors
///
/// Returns an error if the underlying TLS backend fails to initialize.
pub fn build_client(verify_tls: bool) -> Result<reqwest::Client> {
    if !verify_tls {
        tracing::warn!(
            "TLS certificate verification is DISABLED; self-signed homelab certs will be accepted"
        );
    }

    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .danger_accept_invalid_certs(!verify_tls)
        .redirect(reqwest::redirect::Policy::limited(10))
        .timeout(Duration::from_secs(30))
        .build()?;
    Ok(client)
}

/// Read the `VERIFY_TLS` environment toggle (default: off).
pub fn verify_tls_from_env() -> bool {
    std::env::var("VERIFY_TLS")
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_client_succeeds_in_both_modes() {
        assert!(build_client(true).is_ok());
        assert!(build_client(false).is_ok());
    }

    #[test]
    fn test_user_agent_carries_version() {
        assert!(USER_AGENT.starts_with("labdash/"));
    }

    #[test]
    #[serial_test::serial]
    fn test_verify_tls_env_parsing() {
        std::env::remove_var("VERIFY_TLS");
        assert!(!verify_tls_from_env());

        for enabled in ["true", "1", "YES"] {
            std::env::set_var("VERIFY_TLS", enabled);
            assert!(verify_tls_from_env(), "{enabled} should enable");
        }
        std::env::set_var("VERIFY_TLS", "false");
        assert!(!verify_tls_from_env());
        std::env::remove_var("VERIFY_TLS");
    }
}
