//! Notification scheduling shared by a group of observable cells.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

type Job = Box<dyn FnOnce()>;

/// Orders change notifications for every cell created with the same scope.
///
/// Outside a batch, a scheduled job runs before `schedule` returns. Inside a
/// batch, or while another job is running, it is queued and runs when the
/// scope becomes idle again. Either way, nothing is left queued once the
/// outermost call returns.
#[derive(Default)]
pub struct ChangeScope {
    depth: Cell<u32>,
    queue: RefCell<VecDeque<Job>>,
}

impl ChangeScope {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Queues one notification job and drains the queue when idle.
    pub fn schedule(&self, job: impl FnOnce() + 'static) {
        self.queue.borrow_mut().push_back(Box::new(job));
        if self.depth.get() == 0 {
            self.drain();
        }
    }

    /// Runs `f` with notifications deferred until the outermost batch ends.
    pub fn batch<R>(&self, f: impl FnOnce() -> R) -> R {
        let result = {
            let _guard = DepthGuard::enter(&self.depth);
            f()
        };
        if self.depth.get() == 0 {
            self.drain();
        }
        result
    }

    /// Returns whether notifications are currently being deferred.
    pub fn is_deferring(&self) -> bool {
        self.depth.get() > 0
    }

    /// Number of jobs waiting to run.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    fn drain(&self) {
        let _guard = DepthGuard::enter(&self.depth);
        loop {
            let next = self.queue.borrow_mut().pop_front();
            match next {
                Some(job) => job(),
                None => break,
            }
        }
    }
}

impl std::fmt::Debug for ChangeScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeScope")
            .field("depth", &self.depth.get())
            .field("pending", &self.pending())
            .finish()
    }
}

// Restores the depth counter even when a job panics.
struct DepthGuard<'a> {
    depth: &'a Cell<u32>,
}

impl<'a> DepthGuard<'a> {
    fn enter(depth: &'a Cell<u32>) -> Self {
        depth.set(depth.get() + 1);
        Self { depth }
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get() - 1);
    }
}

#[cfg(test)]
mod tests {
    use super::ChangeScope;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn schedule_runs_immediately_when_idle() {
        let scope = ChangeScope::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        scope.schedule(move || sink.borrow_mut().push("ran"));
        assert_eq!(*log.borrow(), vec!["ran"]);
        assert!(!scope.is_deferring());
    }

    #[test]
    fn batch_defers_jobs_until_outermost_exit() {
        let scope = ChangeScope::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let outer_scope = Rc::clone(&scope);
        let outer_log = Rc::clone(&log);
        scope.batch(move || {
            let sink = Rc::clone(&outer_log);
            outer_scope.schedule(move || sink.borrow_mut().push(1));
            let inner_scope = Rc::clone(&outer_scope);
            let inner_log = Rc::clone(&outer_log);
            outer_scope.batch(move || {
                let sink = Rc::clone(&inner_log);
                inner_scope.schedule(move || sink.borrow_mut().push(2));
            });
            assert!(outer_log.borrow().is_empty());
            assert_eq!(outer_scope.pending(), 2);
        });

        assert_eq!(*log.borrow(), vec![1, 2]);
        assert_eq!(scope.pending(), 0);
    }

    #[test]
    fn jobs_scheduled_from_a_job_run_after_it() {
        let scope = ChangeScope::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let nested_scope = Rc::clone(&scope);
        let sink = Rc::clone(&log);
        scope.schedule(move || {
            let inner_sink = Rc::clone(&sink);
            nested_scope.schedule(move || inner_sink.borrow_mut().push("nested"));
            sink.borrow_mut().push("outer");
        });

        assert_eq!(*log.borrow(), vec!["outer", "nested"]);
    }
}
