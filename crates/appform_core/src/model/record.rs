//! Live, observable app record.
//!
//! # Responsibility
//! - Hold the four app fields as independently observable cells.
//! - Project the cells into an always-current `AppData` snapshot.
//! - Apply bulk loads without exposing half-written states.
//!
//! # Invariants
//! - `snapshot()` is computed from the cells on every call, never cached.
//! - `update_from_data` writes all fields inside one batch; listeners only
//!   run after every field holds its new value.
//! - Single-field setters change exactly one field.

use crate::model::app::{AppData, AppId};
use crate::model::command::EditCommand;
use crate::reactive::{ChangeScope, Observable, Subscription};
use std::rc::Rc;

/// Field selector for per-field subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    Title,
    Headline,
    Private,
    Id,
}

impl RecordField {
    pub const ALL: [RecordField; 4] = [Self::Title, Self::Headline, Self::Private, Self::Id];

    /// Stable name used in logs and wire payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Headline => "headline",
            Self::Private => "private",
            Self::Id => "id",
        }
    }
}

/// Observable form of one app record.
#[derive(Debug)]
pub struct AppRecord {
    scope: Rc<ChangeScope>,
    title: Observable<String>,
    headline: Observable<String>,
    private: Observable<bool>,
    id: Observable<AppId>,
}

impl AppRecord {
    /// Creates a record seeded from `data`.
    pub fn new(data: &AppData) -> Self {
        let scope = ChangeScope::new();
        Self {
            title: Observable::new(Rc::clone(&scope), data.title.clone()),
            headline: Observable::new(Rc::clone(&scope), data.headline.clone()),
            private: Observable::new(Rc::clone(&scope), data.private),
            id: Observable::new(Rc::clone(&scope), data.id),
            scope,
        }
    }

    /// Creates a record seeded with [`AppData::placeholder`].
    pub fn placeholder() -> Self {
        Self::new(&AppData::placeholder())
    }

    pub fn title(&self) -> String {
        self.title.get()
    }

    pub fn headline(&self) -> String {
        self.headline.get()
    }

    pub fn is_private(&self) -> bool {
        self.private.get()
    }

    pub fn id(&self) -> AppId {
        self.id.get()
    }

    /// Returns whether the title changed.
    pub fn set_title(&self, title: impl Into<String>) -> bool {
        self.title.set(title.into())
    }

    /// Returns whether the headline changed.
    pub fn set_headline(&self, headline: impl Into<String>) -> bool {
        self.headline.set(headline.into())
    }

    /// Returns whether the visibility flag changed.
    pub fn set_private(&self, private: bool) -> bool {
        self.private.set(private)
    }

    /// Flips the visibility flag and returns its new value.
    pub fn toggle_private(&self) -> bool {
        let next = !self.private.get();
        self.private.set(next);
        next
    }

    /// Applies one presentation edit. Returns whether any field changed.
    pub fn apply(&self, command: &EditCommand) -> bool {
        match command {
            EditCommand::SetTitle(title) => self.set_title(title.as_str()),
            EditCommand::SetHeadline(headline) => self.set_headline(headline.as_str()),
            EditCommand::SetPrivate(private) => self.set_private(*private),
            EditCommand::TogglePrivate => {
                self.toggle_private();
                true
            }
        }
    }

    /// Overwrites every field from `data` as one change.
    pub fn update_from_data(&self, data: &AppData) {
        self.scope.batch(|| {
            self.title.set(data.title.clone());
            self.headline.set(data.headline.clone());
            self.private.set(data.private);
            self.id.set(data.id);
        });
    }

    /// Current values of all fields.
    pub fn snapshot(&self) -> AppData {
        AppData {
            title: self.title.get(),
            headline: self.headline.get(),
            private: self.private.get(),
            id: self.id.get(),
        }
    }

    /// Subscribes to changes of one field.
    pub fn watch(
        &self,
        field: RecordField,
        listener: impl Fn(RecordField) + 'static,
    ) -> Subscription {
        match field {
            RecordField::Title => self.title.subscribe(move |_| listener(field)),
            RecordField::Headline => self.headline.subscribe(move |_| listener(field)),
            RecordField::Private => self.private.subscribe(move |_| listener(field)),
            RecordField::Id => self.id.subscribe(move |_| listener(field)),
        }
    }

    /// Subscribes to changes of any field.
    pub fn watch_all(&self, listener: impl Fn(RecordField) + 'static) -> Subscription {
        let listener: Rc<dyn Fn(RecordField)> = Rc::new(listener);
        let subscriptions = RecordField::ALL
            .iter()
            .map(|field| {
                let listener = Rc::clone(&listener);
                self.watch(*field, move |changed| listener(changed))
            })
            .collect();
        Subscription::all(subscriptions)
    }
}

#[cfg(test)]
mod tests {
    use super::{AppRecord, RecordField};
    use crate::model::app::AppData;
    use crate::reactive::{Reaction, ReactionOptions};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn app_one() -> AppData {
        AppData::new(0, "App 1", "this is app 1", false)
    }

    #[test]
    fn setters_change_exactly_one_field() {
        let record = AppRecord::new(&app_one());

        assert!(record.set_title("Renamed"));
        assert_eq!(
            record.snapshot(),
            AppData::new(0, "Renamed", "this is app 1", false)
        );

        assert!(record.set_headline("new headline"));
        assert!(record.set_private(true));
        assert_eq!(
            record.snapshot(),
            AppData::new(0, "Renamed", "new headline", true)
        );
    }

    #[test]
    fn watch_reports_only_the_selected_field() {
        let record = AppRecord::new(&app_one());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _subscription = record.watch(RecordField::Private, move |field| {
            sink.borrow_mut().push(field)
        });

        record.set_title("Renamed");
        record.toggle_private();

        assert_eq!(*seen.borrow(), vec![RecordField::Private]);
    }

    #[test]
    fn update_from_data_is_invisible_until_complete() {
        let record = Rc::new(AppRecord::placeholder());
        let observed = Rc::new(RefCell::new(Vec::new()));
        let reader = Rc::clone(&record);
        let sink = Rc::clone(&observed);
        let _subscription =
            record.watch_all(move |_| sink.borrow_mut().push(reader.snapshot()));

        record.update_from_data(&app_one());

        // `private` already matched the placeholder, so three fields changed.
        assert_eq!(observed.borrow().len(), 3);
        assert!(observed.borrow().iter().all(|snapshot| *snapshot == app_one()));
    }

    #[test]
    fn snapshot_reaction_sees_bulk_load_as_one_change() {
        let record = Rc::new(AppRecord::placeholder());
        let fired = Rc::new(RefCell::new(Vec::new()));
        let reader = Rc::clone(&record);
        let sink = Rc::clone(&fired);
        let reaction = Reaction::new(
            move || reader.snapshot(),
            move |snapshot| sink.borrow_mut().push(snapshot),
            ReactionOptions::default(),
        );
        let trigger = reaction.trigger();
        reaction.bind(record.watch_all(move |_| trigger()));

        record.update_from_data(&app_one());

        assert_eq!(*fired.borrow(), vec![app_one()]);
    }

    #[test]
    fn apply_routes_commands_to_setters() {
        use crate::model::command::EditCommand;

        let record = AppRecord::new(&app_one());
        assert!(record.apply(&EditCommand::SetTitle("Renamed".to_string())));
        assert!(!record.apply(&EditCommand::SetTitle("Renamed".to_string())));
        assert!(record.apply(&EditCommand::TogglePrivate));
        assert!(record.is_private());
        assert!(!record.apply(&EditCommand::SetPrivate(true)));
        assert_eq!(record.title(), "Renamed");
    }
}
