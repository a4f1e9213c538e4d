//! Test utilities for labdash
//!
//! This module provides common test helpers: temporary data directories
//! and store constructors wired to them.

use std::path::PathBuf;

use tempfile::TempDir;

use crate::apps::AppStore;
use crate::probe::Prober;
use crate::settings::SettingsStore;

/// Create a temporary data directory for testing
///
/// # Returns
///
/// Returns a TempDir that will be cleaned up when dropped
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// An [`AppStore`] backed by a file inside `dir`.
pub fn test_app_store(dir: &TempDir) -> AppStore {
    AppStore::new(
        dir.path().join("apps.json"),
        Prober::new(reqwest::Client::new()),
    )
}

/// A [`SettingsStore`] backed by a file inside `dir`.
pub fn test_settings_store(dir: &TempDir) -> SettingsStore {
    SettingsStore::new(dir.path().join("settings.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_file_writes_content() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "sample.json", "[]");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "[]");
    }
}
