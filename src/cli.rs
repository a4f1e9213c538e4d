//! Command-line interface definition for labdash
//!
//! This module defines the CLI structure using clap's derive API. The
//! dashboard is a single long-running server, so there are no subcommands;
//! every flag also reads from a `LABDASH_*` environment variable for
//! container deployments.

use clap::Parser;
use std::path::PathBuf;

/// labdash - self-hosted homelab dashboard server
#[derive(Parser, Debug, Clone)]
#[command(name = "labdash")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Port to listen on
    #[arg(short, long, env = "LABDASH_PORT")]
    pub port: Option<u16>,

    /// Directory for apps.json and settings.json
    #[arg(short, long, env = "LABDASH_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Emit logs as JSON instead of human-readable lines
    #[arg(long, env = "LABDASH_LOG_JSON")]
    pub log_json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            port: None,
            data_dir: None,
            log_json: false,
            verbose: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert!(cli.port.is_none());
        assert!(cli.data_dir.is_none());
        assert!(!cli.log_json);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_parse_bare() {
        let cli = Cli::parse_from(["labdash"]);
        assert!(cli.port.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_parse_port_and_data_dir() {
        let cli = Cli::parse_from(["labdash", "--port", "9090", "--data-dir", "/srv/dash"]);
        assert_eq!(cli.port, Some(9090));
        assert_eq!(cli.data_dir, Some(PathBuf::from("/srv/dash")));
    }

    #[test]
    fn test_cli_parse_log_flags() {
        let cli = Cli::parse_from(["labdash", "--log-json", "-v"]);
        assert!(cli.log_json);
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_rejects_non_numeric_port() {
        assert!(Cli::try_parse_from(["labdash", "--port", "eighty"]).is_err());
    }
}
