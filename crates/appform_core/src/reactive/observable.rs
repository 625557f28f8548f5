//! Observable value cell.

use crate::reactive::scope::ChangeScope;
use crate::reactive::subscription::Subscription;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

type Listener<T> = Rc<dyn Fn(&T)>;

/// One mutable value plus the listeners interested in it.
///
/// # Invariants
/// - `set` with a value equal to the current one is a no-op.
/// - Listeners receive the value that was written by the triggering `set`.
pub struct Observable<T> {
    scope: Rc<ChangeScope>,
    value: RefCell<T>,
    listeners: Rc<ListenerSet<T>>,
}

impl<T> Observable<T>
where
    T: Clone + PartialEq + 'static,
{
    /// Creates a cell whose notifications are ordered by `scope`.
    pub fn new(scope: Rc<ChangeScope>, value: T) -> Self {
        Self {
            scope,
            value: RefCell::new(value),
            listeners: Rc::new(ListenerSet::default()),
        }
    }

    /// Returns a clone of the current value.
    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// Writes a new value and notifies listeners.
    ///
    /// Returns `false` without notifying when `value` equals the current one.
    pub fn set(&self, value: T) -> bool {
        {
            let mut current = self.value.borrow_mut();
            if *current == value {
                return false;
            }
            *current = value.clone();
        }

        let listeners = Rc::downgrade(&self.listeners);
        self.scope.schedule(move || {
            if let Some(listeners) = listeners.upgrade() {
                listeners.notify(&value);
            }
        });
        true
    }

    /// Registers a listener invoked with every distinct new value.
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        let id = self.listeners.insert(Rc::new(listener));
        let listeners = Rc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(listeners) = listeners.upgrade() {
                listeners.remove(id);
            }
        })
    }

    /// Number of currently registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.entries.borrow().len()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.value.borrow())
            .field("listeners", &self.listeners.entries.borrow().len())
            .finish()
    }
}

struct ListenerSet<T> {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(u64, Listener<T>)>>,
}

impl<T> Default for ListenerSet<T> {
    fn default() -> Self {
        Self {
            next_id: Cell::new(0),
            entries: RefCell::new(Vec::new()),
        }
    }
}

impl<T> ListenerSet<T> {
    fn insert(&self, listener: Listener<T>) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.entries.borrow_mut().push((id, listener));
        id
    }

    fn remove(&self, id: u64) {
        self.entries.borrow_mut().retain(|(entry_id, _)| *entry_id != id);
    }

    fn notify(&self, value: &T) {
        // Listeners may subscribe or unsubscribe while running.
        let current: Vec<Listener<T>> = self
            .entries
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in current {
            listener(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Observable;
    use crate::reactive::ChangeScope;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder<T: Clone + 'static>() -> (Rc<RefCell<Vec<T>>>, impl Fn(&T) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, move |value: &T| sink.borrow_mut().push(value.clone()))
    }

    #[test]
    fn set_notifies_with_new_value() {
        let cell = Observable::new(ChangeScope::new(), String::new());
        let (seen, listener) = recorder::<String>();
        let _subscription = cell.subscribe(listener);

        assert!(cell.set("hello".to_string()));
        assert_eq!(cell.get(), "hello");
        assert_eq!(*seen.borrow(), vec!["hello".to_string()]);
    }

    #[test]
    fn set_to_current_value_is_silent() {
        let cell = Observable::new(ChangeScope::new(), false);
        let (seen, listener) = recorder::<bool>();
        let _subscription = cell.subscribe(listener);

        assert!(!cell.set(false));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn dropping_subscription_unregisters_listener() {
        let cell = Observable::new(ChangeScope::new(), 0_u64);
        let (seen, listener) = recorder::<u64>();
        let subscription = cell.subscribe(listener);
        assert_eq!(cell.listener_count(), 1);

        drop(subscription);
        assert_eq!(cell.listener_count(), 0);
        cell.set(7);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn detached_subscription_keeps_listening() {
        let cell = Observable::new(ChangeScope::new(), 0_u64);
        let (seen, listener) = recorder::<u64>();
        cell.subscribe(listener).detach();

        cell.set(1);
        cell.set(2);
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn listener_can_read_the_cell_it_observes() {
        let cell = Rc::new(Observable::new(ChangeScope::new(), 1_u64));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let reader = Rc::clone(&cell);
        let sink = Rc::clone(&seen);
        let _subscription = cell.subscribe(move |_| sink.borrow_mut().push(reader.get()));

        cell.set(5);
        assert_eq!(*seen.borrow(), vec![5]);
    }

    #[test]
    fn batched_writes_deliver_each_written_value() {
        let scope = ChangeScope::new();
        let cell = Observable::new(Rc::clone(&scope), 0_u64);
        let (seen, listener) = recorder::<u64>();
        let _subscription = cell.subscribe(listener);

        scope.batch(|| {
            cell.set(1);
            cell.set(2);
        });
        assert_eq!(cell.get(), 2);
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }
}
