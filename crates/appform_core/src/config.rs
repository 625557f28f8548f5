//! Runtime configuration.
//!
//! # Responsibility
//! - Collect process settings with build-mode aware defaults.
//!
//! # Invariants
//! - `AppConfig::default()` matches the reference deployment: 500 ms service
//!   latency, record 0, file logging off.

use crate::logging::default_log_level;
use crate::model::app::AppId;
use std::time::Duration;

/// Artificial delay applied by the simulated service to every call.
pub const DEFAULT_SERVICE_LATENCY: Duration = Duration::from_millis(500);
/// Record shown when no id is configured.
pub const DEFAULT_RECORD_ID: AppId = 0;

/// Process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute log directory. File logging stays off when `None`.
    pub log_dir: Option<String>,
    pub service_latency: Duration,
    pub record_id: AppId,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level().to_string(),
            log_dir: None,
            service_latency: DEFAULT_SERVICE_LATENCY,
            record_id: DEFAULT_RECORD_ID,
        }
    }
}
