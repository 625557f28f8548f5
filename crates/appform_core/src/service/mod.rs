//! Remote service boundary.
//!
//! # Responsibility
//! - Define the capability the store uses to load and persist records.
//! - Provide the simulated backend used by the CLI and tests.

pub mod app_service;
pub mod in_memory;
