//! Simulated remote app service.
//!
//! # Responsibility
//! - Stand in for the remote backend with a fixed artificial latency.
//! - Offer fault injection so failure paths can be exercised.
//!
//! # Invariants
//! - Fetch looks the record up when called and resolves after the delay.
//! - Save applies its write only after the delay elapses.
//! - Save for an unknown id acknowledges `false` and writes nothing.

use crate::config::DEFAULT_SERVICE_LATENCY;
use crate::model::app::{AppData, AppId};
use crate::service::app_service::{AppService, TransportError};
use async_trait::async_trait;
use log::debug;
use std::cell::{Cell, RefCell};
use std::time::Duration;

/// Failure behaviour of the simulated service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FaultMode {
    /// Calls behave normally.
    #[default]
    None,
    /// Saves resolve with a negative acknowledgement.
    RejectSaves,
    /// Every call fails with a transport error after the delay.
    TransportDown,
}

/// In-process app service with artificial latency.
#[derive(Debug)]
pub struct InMemoryAppService {
    apps: RefCell<Vec<AppData>>,
    latency: Duration,
    fault: Cell<FaultMode>,
    fetch_count: Cell<u64>,
    save_count: Cell<u64>,
}

impl Default for InMemoryAppService {
    fn default() -> Self {
        Self::new(Vec::new(), DEFAULT_SERVICE_LATENCY)
    }
}

impl InMemoryAppService {
    pub fn new(apps: Vec<AppData>, latency: Duration) -> Self {
        Self {
            apps: RefCell::new(apps),
            latency,
            fault: Cell::new(FaultMode::None),
            fetch_count: Cell::new(0),
            save_count: Cell::new(0),
        }
    }

    /// Creates a service holding the two example apps.
    pub fn with_examples(latency: Duration) -> Self {
        Self::new(example_apps(), latency)
    }

    pub fn set_fault_mode(&self, mode: FaultMode) {
        self.fault.set(mode);
    }

    /// Returns the currently stored record for `id`.
    pub fn stored(&self, id: AppId) -> Option<AppData> {
        self.apps.borrow().iter().find(|app| app.id == id).cloned()
    }

    pub fn fetch_count(&self) -> u64 {
        self.fetch_count.get()
    }

    pub fn save_count(&self) -> u64 {
        self.save_count.get()
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait(?Send)]
impl AppService for InMemoryAppService {
    async fn fetch_by_id(&self, id: AppId) -> Result<Option<AppData>, TransportError> {
        self.fetch_count.set(self.fetch_count.get() + 1);
        let fault = self.fault.get();
        let found = self.stored(id);
        self.delay().await;

        if fault == FaultMode::TransportDown {
            return Err(TransportError::new(format!("fetch of app {id} failed")));
        }
        debug!("event=service_fetch module=service status=ok id={} found={}", id, found.is_some());
        Ok(found)
    }

    async fn save(&self, app: AppData) -> Result<bool, TransportError> {
        self.save_count.set(self.save_count.get() + 1);
        let fault = self.fault.get();
        self.delay().await;

        match fault {
            FaultMode::TransportDown => {
                return Err(TransportError::new(format!("save of app {} failed", app.id)));
            }
            FaultMode::RejectSaves => return Ok(false),
            FaultMode::None => {}
        }

        let mut apps = self.apps.borrow_mut();
        let Some(slot) = apps.iter_mut().find(|stored| stored.id == app.id) else {
            debug!("event=service_save module=service status=unknown_id id={}", app.id);
            return Ok(false);
        };
        *slot = app;
        debug!("event=service_save module=service status=ok id={}", slot.id);
        Ok(true)
    }
}

/// Records served by the demo backend.
pub fn example_apps() -> Vec<AppData> {
    vec![
        AppData::new(0, "App 1", "this is app 1", false),
        AppData::new(1, "App 2", "this is app 2", false),
    ]
}
