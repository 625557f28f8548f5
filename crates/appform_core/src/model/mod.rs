//! App record model.
//!
//! # Responsibility
//! - Define the wire shape of one persisted app record.
//! - Hold the live, observable form of that record for editing.
//! - Describe presentation edits as explicit commands.
//!
//! # Invariants
//! - `AppRecord::snapshot()` always equals the current field values.
//! - `id` changes only through a bulk `update_from_data`.

pub mod app;
pub mod command;
pub mod record;
