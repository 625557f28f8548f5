//! Core of the app form editor.
//! Owns the observable app record, its load and its auto-save pipeline.

pub mod config;
pub mod logging;
pub mod model;
pub mod persist;
pub mod reactive;
pub mod service;
pub mod store;

pub use config::{AppConfig, DEFAULT_RECORD_ID, DEFAULT_SERVICE_LATENCY};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::app::{AppData, AppId};
pub use model::command::{CommandParseError, EditCommand};
pub use model::record::{AppRecord, RecordField};
pub use persist::{AutoSave, LogSaveObserver, SaveError, SaveLedger, SaveObserver, SaveReport};
pub use service::app_service::{AppService, TransportError};
pub use service::in_memory::{example_apps, FaultMode, InMemoryAppService};
pub use store::{AppStore, LoadState, StoreError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
