//! App store: one record, its load and its auto-save.
//!
//! # Responsibility
//! - Build the placeholder record with auto-save attached before anything
//!   else can touch it.
//! - Load the requested record from the service and apply it in one batch.
//! - Keep load failures local: log them and expose them as `LoadState`.
//!
//! # Invariants
//! - A failed load leaves every field exactly as it was before the load.
//! - The requested id never changes for the lifetime of a store.
//! - Nothing here retries or cancels service calls.

use crate::model::app::{AppData, AppId};
use crate::model::command::EditCommand;
use crate::model::record::AppRecord;
use crate::persist::{AutoSave, LogSaveObserver, SaveObserver};
use crate::service::app_service::{AppService, TransportError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use tokio::sync::watch;

/// Store-level load errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The service has no record with this id.
    NotFound(AppId),
    Transport(TransportError),
    /// The load task ended without reporting, e.g. its runtime shut down.
    LoadAbandoned(AppId),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "app not found: {id}"),
            Self::Transport(err) => write!(f, "{err}"),
            Self::LoadAbandoned(id) => write!(f, "load of app {id} was abandoned"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            Self::NotFound(_) | Self::LoadAbandoned(_) => None,
        }
    }
}

impl From<TransportError> for StoreError {
    fn from(value: TransportError) -> Self {
        Self::Transport(value)
    }
}

/// Progress of the initial load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Pending,
    Loaded,
    Failed(StoreError),
}

impl LoadState {
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Owns one observable app record and wires its load and auto-save.
pub struct AppStore {
    requested_id: AppId,
    record: Rc<AppRecord>,
    auto_save: AutoSave,
    load_state: watch::Receiver<LoadState>,
}

impl AppStore {
    /// Creates the store and starts loading `id`.
    ///
    /// The record and its auto-save exist before this returns; the fetch
    /// runs as a local task, so this must be called inside a tokio
    /// `LocalSet`.
    pub fn new(
        service: Rc<dyn AppService>,
        id: AppId,
        observer: Rc<dyn SaveObserver>,
    ) -> Self {
        let record = Rc::new(AppRecord::placeholder());
        let auto_save = AutoSave::attach(Rc::clone(&record), Rc::clone(&service), observer);
        let (state_tx, load_state) = watch::channel(LoadState::Pending);

        let target = Rc::clone(&record);
        tokio::task::spawn_local(async move {
            let state = match load_into(&*service, &target, id).await {
                Ok(()) => LoadState::Loaded,
                Err(err) => {
                    error!(
                        "event=store_load module=store status=error id={} error={}",
                        id, err
                    );
                    LoadState::Failed(err)
                }
            };
            state_tx.send_replace(state);
        });

        Self {
            requested_id: id,
            record,
            auto_save,
            load_state,
        }
    }

    /// Creates a store whose save outcomes are only logged.
    pub fn with_defaults(service: Rc<dyn AppService>, id: AppId) -> Self {
        Self::new(service, id, Rc::new(LogSaveObserver))
    }

    pub fn requested_id(&self) -> AppId {
        self.requested_id
    }

    /// The live record for presentation reads and edits.
    pub fn record(&self) -> &AppRecord {
        &self.record
    }

    pub fn snapshot(&self) -> AppData {
        self.record.snapshot()
    }

    /// Applies one presentation edit. Returns whether any field changed.
    pub fn apply(&self, command: &EditCommand) -> bool {
        self.record.apply(command)
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state.borrow().clone()
    }

    /// Waits for the initial load to settle.
    pub async fn wait_loaded(&self) -> Result<(), StoreError> {
        let mut receiver = self.load_state.clone();
        let settled = receiver
            .wait_for(LoadState::is_settled)
            .await
            .map(|state| (*state).clone())
            .map_err(|_| StoreError::LoadAbandoned(self.requested_id))?;
        match settled {
            LoadState::Failed(err) => Err(err),
            _ => Ok(()),
        }
    }

    /// Waits until every save issued so far has settled.
    pub async fn flush_saves(&self) {
        self.auto_save.flush().await;
    }

    pub fn saves_issued(&self) -> u64 {
        self.auto_save.issued_count()
    }

    pub fn saves_in_flight(&self) -> usize {
        self.auto_save.in_flight()
    }
}

async fn load_into(
    service: &dyn AppService,
    record: &AppRecord,
    id: AppId,
) -> Result<(), StoreError> {
    let data = service
        .fetch_by_id(id)
        .await?
        .ok_or(StoreError::NotFound(id))?;

    if data.id != id {
        warn!(
            "event=store_load module=store status=id_mismatch requested={} received={}",
            id, data.id
        );
    }
    record.update_from_data(&data);
    info!("event=store_load module=store status=ok id={}", data.id);
    Ok(())
}
