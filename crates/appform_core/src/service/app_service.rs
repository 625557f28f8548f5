//! Remote app service capability.
//!
//! # Responsibility
//! - Define the async fetch/save contract the store depends on.
//! - Separate transport faults from "no such record" and negative acks.
//!
//! # Invariants
//! - Implementations run on a single thread; futures are not `Send`.
//! - No ordering is promised between concurrent calls.

use crate::model::app::{AppData, AppId};
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Network-level failure reported by a service implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "transport fault: {}", self.message)
    }
}

impl Error for TransportError {}

/// Async capability for loading and persisting app records.
#[async_trait(?Send)]
pub trait AppService {
    /// Resolves to the stored record, or `None` when no record has `id`.
    async fn fetch_by_id(&self, id: AppId) -> Result<Option<AppData>, TransportError>;

    /// Persists `app`. Resolves to the service acknowledgement.
    async fn save(&self, app: AppData) -> Result<bool, TransportError>;
}
