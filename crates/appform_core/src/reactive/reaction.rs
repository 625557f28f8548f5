//! Value-based reactions over derived expressions.

use crate::reactive::subscription::Subscription;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Reaction construction options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReactionOptions {
    /// Run the effect once with the initial value at construction.
    pub fire_immediately: bool,
}

/// Re-evaluates an expression when triggered and runs an effect only when
/// the result differs from the value the reaction last acted on.
///
/// A reaction owns the subscriptions bound to it; dropping the reaction
/// disconnects it from every source.
pub struct Reaction<T> {
    inner: Rc<ReactionInner<T>>,
    subscriptions: RefCell<Vec<Subscription>>,
}

struct ReactionInner<T> {
    expression: Box<dyn Fn() -> T>,
    effect: Box<dyn Fn(T)>,
    last: RefCell<Option<T>>,
    fires: Cell<u64>,
}

impl<T> Reaction<T>
where
    T: Clone + PartialEq + 'static,
{
    /// Creates a reaction and evaluates its expression once as the baseline.
    pub fn new(
        expression: impl Fn() -> T + 'static,
        effect: impl Fn(T) + 'static,
        options: ReactionOptions,
    ) -> Self {
        let inner = Rc::new(ReactionInner {
            expression: Box::new(expression),
            effect: Box::new(effect),
            last: RefCell::new(None),
            fires: Cell::new(0),
        });

        let initial = (inner.expression)();
        *inner.last.borrow_mut() = Some(initial.clone());
        if options.fire_immediately {
            inner.run_effect(initial);
        }

        Self {
            inner,
            subscriptions: RefCell::new(Vec::new()),
        }
    }

    /// Re-evaluates the expression, running the effect on a changed value.
    ///
    /// Returns whether the effect ran.
    pub fn check(&self) -> bool {
        self.inner.check()
    }

    /// Returns a callback that checks this reaction while it is alive.
    pub fn trigger(&self) -> impl Fn() + 'static {
        let inner: Weak<ReactionInner<T>> = Rc::downgrade(&self.inner);
        move || {
            if let Some(inner) = inner.upgrade() {
                inner.check();
            }
        }
    }

    /// Ties a source subscription to this reaction's lifetime.
    pub fn bind(&self, subscription: Subscription) {
        self.subscriptions.borrow_mut().push(subscription);
    }

    /// Number of times the effect has run.
    pub fn fire_count(&self) -> u64 {
        self.inner.fires.get()
    }

    /// The value the effect last ran with, or the baseline.
    pub fn last_value(&self) -> Option<T> {
        self.inner.last.borrow().clone()
    }
}

impl<T> ReactionInner<T>
where
    T: Clone + PartialEq,
{
    fn check(&self) -> bool {
        let next = (self.expression)();
        {
            let mut last = self.last.borrow_mut();
            if last.as_ref() == Some(&next) {
                return false;
            }
            *last = Some(next.clone());
        }
        self.run_effect(next);
        true
    }

    fn run_effect(&self, value: T) {
        self.fires.set(self.fires.get() + 1);
        (self.effect)(value);
    }
}

#[cfg(test)]
mod tests {
    use super::{Reaction, ReactionOptions};
    use crate::reactive::{ChangeScope, Observable};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn counter_reaction(
        source: &Rc<Observable<i64>>,
        options: ReactionOptions,
    ) -> (Reaction<i64>, Rc<RefCell<Vec<i64>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let reader = Rc::clone(source);
        let sink = Rc::clone(&seen);
        let reaction = Reaction::new(
            move || reader.get() / 10,
            move |value| sink.borrow_mut().push(value),
            options,
        );
        let trigger = reaction.trigger();
        reaction.bind(source.subscribe(move |_| trigger()));
        (reaction, seen)
    }

    #[test]
    fn fires_only_when_derived_value_changes() {
        let source = Rc::new(Observable::new(ChangeScope::new(), 0_i64));
        let (reaction, seen) = counter_reaction(&source, ReactionOptions::default());

        source.set(3);
        source.set(9);
        source.set(12);
        source.set(15);
        source.set(20);

        assert_eq!(*seen.borrow(), vec![1, 2]);
        assert_eq!(reaction.fire_count(), 2);
        assert_eq!(reaction.last_value(), Some(2));
    }

    #[test]
    fn fire_immediately_runs_with_baseline() {
        let source = Rc::new(Observable::new(ChangeScope::new(), 40_i64));
        let (reaction, seen) = counter_reaction(
            &source,
            ReactionOptions {
                fire_immediately: true,
            },
        );

        assert_eq!(*seen.borrow(), vec![4]);
        assert_eq!(reaction.fire_count(), 1);
    }

    #[test]
    fn dropped_reaction_stops_listening() {
        let source = Rc::new(Observable::new(ChangeScope::new(), 0_i64));
        let (reaction, seen) = counter_reaction(&source, ReactionOptions::default());
        assert_eq!(source.listener_count(), 1);

        drop(reaction);
        assert_eq!(source.listener_count(), 0);
        source.set(100);
        assert!(seen.borrow().is_empty());
    }
}
