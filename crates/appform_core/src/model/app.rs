//! App wire model.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Identifier used to correlate fetch and save calls for one app.
pub type AppId = u64;

/// Lower bound of the provisional id range used by placeholders.
///
/// Service-assigned ids are small; keeping provisional ids far above them
/// avoids a placeholder save landing on a real record.
pub const PROVISIONAL_ID_FLOOR: AppId = 1 << 32;

/// Plain persisted shape of one app record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppData {
    pub title: String,
    pub headline: String,
    /// Visibility flag. `false` renders as public.
    pub private: bool,
    pub id: AppId,
}

impl AppData {
    pub fn new(
        id: AppId,
        title: impl Into<String>,
        headline: impl Into<String>,
        private: bool,
    ) -> Self {
        Self {
            title: title.into(),
            headline: headline.into(),
            private,
            id,
        }
    }

    /// Blank record shown before the real one arrives.
    ///
    /// Strings are empty, `private` is `false` and `id` is a random
    /// provisional value at or above [`PROVISIONAL_ID_FLOOR`].
    pub fn placeholder() -> Self {
        let id = rand::thread_rng().gen_range(PROVISIONAL_ID_FLOOR..AppId::MAX);
        Self::new(id, "", "", false)
    }

    /// Returns whether this record carries a provisional placeholder id.
    pub fn has_provisional_id(&self) -> bool {
        self.id >= PROVISIONAL_ID_FLOOR
    }

    pub fn visibility_label(&self) -> &'static str {
        if self.private {
            "PRIVATE"
        } else {
            "PUBLIC"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AppData, PROVISIONAL_ID_FLOOR};

    #[test]
    fn placeholder_is_blank_with_provisional_id() {
        let placeholder = AppData::placeholder();
        assert!(placeholder.title.is_empty());
        assert!(placeholder.headline.is_empty());
        assert!(!placeholder.private);
        assert!(placeholder.id >= PROVISIONAL_ID_FLOOR);
        assert!(placeholder.has_provisional_id());
    }

    #[test]
    fn service_ids_are_not_provisional() {
        let app = AppData::new(0, "App 1", "this is app 1", false);
        assert!(!app.has_provisional_id());
        assert_eq!(app.visibility_label(), "PUBLIC");
    }
}
