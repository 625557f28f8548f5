//! Single-threaded publish/subscribe primitives.
//!
//! # Responsibility
//! - Hold mutable values in observable cells with synchronous listeners.
//! - Defer and order notifications through a shared `ChangeScope`.
//! - Run value-based reactions over derived expressions.
//!
//! # Invariants
//! - Writing a value equal to the current one notifies nobody.
//! - Listeners never run while a cell is mutably borrowed.
//! - Notifications raised inside a batch run once the outermost batch ends,
//!   in the order they were raised.
//! - All types here are `!Send`; they live on one logical thread.

mod observable;
mod reaction;
mod scope;
mod subscription;

pub use observable::Observable;
pub use reaction::{Reaction, ReactionOptions};
pub use scope::ChangeScope;
pub use subscription::Subscription;
