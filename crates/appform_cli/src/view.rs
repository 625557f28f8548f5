//! Text rendering of an app record.
//!
//! Mirrors the viewer panel: a heading with the visibility label, then the
//! headline on its own line.

use appform_core::AppData;

/// Renders the viewer panel for `app`.
pub fn render(app: &AppData) -> String {
    format!(
        "{} ({})\n{}",
        app.title,
        app.visibility_label(),
        app.headline
    )
}

#[cfg(test)]
mod tests {
    use super::render;
    use appform_core::AppData;

    #[test]
    fn renders_public_record() {
        let app = AppData::new(0, "App 1", "this is app 1", false);
        assert_eq!(render(&app), "App 1 (PUBLIC)\nthis is app 1");
    }

    #[test]
    fn renders_private_placeholder() {
        let mut app = AppData::placeholder();
        app.private = true;
        assert_eq!(render(&app), " (PRIVATE)\n");
    }
}
