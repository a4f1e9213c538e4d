//! Host CPU and memory metrics
//!
//! Thin collaborator around `sysinfo`. The monitor keeps one `System`
//! instance alive between polls so CPU usage is computed from the delta
//! since the previous refresh, matching the client's periodic poll cycle.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use serde_json::{json, Value};
use sysinfo::System;

/// A point-in-time snapshot of host load.
#[derive(Debug, Clone, Serialize)]
pub struct SystemStats {
    pub cpu_percent: f64,
    pub mem_percent: f64,
    pub mem_used: u64,
    pub mem_total: u64,
}

/// Stateful host metrics prober.
pub struct SystemMonitor {
    sys: Mutex<System>,
}

impl SystemMonitor {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu();
        sys.refresh_memory();
        Self {
            sys: Mutex::new(sys),
        }
    }

    /// Current CPU and memory usage, rounded to a tenth.
    pub fn stats(&self) -> SystemStats {
        let mut sys = self.lock();
        sys.refresh_cpu();
        sys.refresh_memory();

        let cpu_percent = f64::from(sys.global_cpu_info().cpu_usage());
        let mem_total = sys.total_memory();
        let mem_used = sys.used_memory();
        let mem_percent = if mem_total > 0 {
            mem_used as f64 / mem_total as f64 * 100.0
        } else {
            0.0
        };

        SystemStats {
            cpu_percent: round1(cpu_percent),
            mem_percent: round1(mem_percent),
            mem_used,
            mem_total,
        }
    }

    /// Host identity payload for the loading screen.
    pub fn info(&self) -> Value {
        let stats = self.stats();
        json!({
            "hostname": System::host_name().unwrap_or_else(|| "unknown".into()),
            "os": System::name().unwrap_or_else(|| "unknown".into()),
            "kernel": System::kernel_version().unwrap_or_else(|| "unknown".into()),
            "uptime_seconds": System::uptime(),
            "cpu_percent": stats.cpu_percent,
            "mem_percent": stats.mem_percent,
            "mem_used_human": human_bytes(stats.mem_used),
            "mem_total_human": human_bytes(stats.mem_total),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, System> {
        self.sys.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new()
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Format a byte count with 1024-based units, one decimal place.
pub fn human_bytes(num: u64) -> String {
    const STEP: f64 = 1024.0;
    let mut value = num as f64;
    for unit in ["B", "KB", "MB", "GB", "TB", "PB"] {
        if value < STEP {
            return format!("{value:.1} {unit}");
        }
        value /= STEP;
    }
    format!("{value:.1} EB")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_bytes_units() {
        assert_eq!(human_bytes(512), "512.0 B");
        assert_eq!(human_bytes(2048), "2.0 KB");
        assert_eq!(human_bytes(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(human_bytes(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[test]
    fn test_stats_are_within_sane_bounds() {
        let monitor = SystemMonitor::new();
        let stats = monitor.stats();
        assert!(stats.mem_total > 0);
        assert!(stats.mem_used <= stats.mem_total);
        assert!((0.0..=100.0).contains(&stats.mem_percent));
    }

    #[test]
    fn test_info_contains_hostname_and_uptime() {
        let info = SystemMonitor::new().info();
        assert!(info.get("hostname").is_some());
        assert!(info["uptime_seconds"].as_u64().is_some());
    }
}
