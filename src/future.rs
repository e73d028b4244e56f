use std::fmt::{self, Debug};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::{Error, Outcome};

/// Bound shared by every value carried through the combinators: outcomes are
/// handed to several subscribers, possibly on other threads.
pub trait Payload: Clone + Send + Sync + 'static {}

impl<P: Clone + Send + Sync + 'static> Payload for P {}

pub(crate) type Continuation<T, E> = Box<dyn FnOnce(&Outcome<T, E>) + Send>;

/// A shared handle to a single-assignment outcome.
///
/// Cloning the handle is cheap; every clone observes the same resolution.
/// A future built from a known value or error is born resolved and never
/// takes a lock. A future handed out by [`Promise::new`](crate::Promise::new)
/// starts pending and is resolved at most once; later resolutions are
/// ignored.
///
/// Continuations run inline on the thread that resolves the future, in the
/// order they were attached, while the future's lock is held. A continuation
/// must therefore never attach to the very future it is running inside: the
/// lock is not reentrant and the thread deadlocks.
///
/// # Examples
///
/// ```
/// use promise_join::{Future, Outcome, Promise};
///
/// let (promise, future) = Promise::<i32>::new();
/// let doubled = future.map(|v| v * 2);
/// assert!(!doubled.is_resolved());
///
/// promise.fulfill(21);
/// assert_eq!(doubled.peek(), Some(Outcome::Success(42)));
/// let eager = Future::<i32>::from_value(1).map(|v| v + 1);
/// assert_eq!(eager.peek(), Some(Outcome::Success(2)));
/// ```
pub struct Future<T, E = Error> {
    inner: Arc<Inner<T, E>>,
}

enum Inner<T, E> {
    /// Born resolved; immutable for its whole life.
    Settled(Outcome<T, E>),
    /// `outcome` is only written with `continuations` locked, so a holder of
    /// the lock that finds it unset owns a live queue.
    Deferred {
        outcome: OnceLock<Outcome<T, E>>,
        continuations: Mutex<Vec<Continuation<T, E>>>,
    },
}

impl<T, E> Clone for Future<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, E> Future<T, E> {
    pub fn from_value(value: T) -> Self {
        Self::from_outcome(Outcome::Success(value))
    }

    pub fn from_error(err: E) -> Self {
        Self::from_outcome(Outcome::Failure(err))
    }

    pub fn from_outcome(outcome: Outcome<T, E>) -> Self {
        Self {
            inner: Arc::new(Inner::Settled(outcome)),
        }
    }

    /// Runs `f` right away and captures its result. An `Err` becomes the
    /// failure of the returned future.
    pub fn from_fn<F: FnOnce() -> Result<T, E>>(f: F) -> Self {
        Self::from_outcome(f().into())
    }

    pub(crate) fn pending() -> Self {
        Self {
            inner: Arc::new(Inner::Deferred {
                outcome: OnceLock::new(),
                continuations: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved().is_some()
    }

    /// Returns `true` if both handles point at the same resolution cell.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// The stored outcome, read without taking the lock. Set as soon as
    /// resolution starts, possibly before every continuation has run.
    pub(crate) fn resolved(&self) -> Option<&Outcome<T, E>> {
        match &*self.inner {
            Inner::Settled(outcome) => Some(outcome),
            Inner::Deferred { outcome, .. } => outcome.get(),
        }
    }

    /// Registers `continuation` to receive the outcome.
    ///
    /// Runs it immediately if the future is already resolved, otherwise
    /// queues it behind every continuation registered before it.
    pub(crate) fn add_continuation<F>(&self, continuation: F)
    where
        F: FnOnce(&Outcome<T, E>) + Send + 'static,
    {
        match &*self.inner {
            Inner::Settled(outcome) => continuation(outcome),
            Inner::Deferred {
                outcome,
                continuations,
            } => {
                let mut queue = continuations.lock();
                match outcome.get() {
                    Some(outcome) => continuation(outcome),
                    None => queue.push(Box::new(continuation)),
                }
            }
        }
    }

    /// Stores `outcome` and flushes the queue. First writer wins; returns
    /// `false` when the future was already resolved.
    ///
    /// A panicking continuation does not stop the flush: the remaining ones
    /// still run, then the first panic is resumed on the resolving thread.
    pub(crate) fn set_outcome(&self, outcome: Outcome<T, E>) -> bool {
        let kind = outcome.kind();
        let (cell, continuations) = match &*self.inner {
            Inner::Settled(_) => {
                debug!(outcome = kind, "ignoring resolution of a born-resolved future");
                return false;
            }
            Inner::Deferred {
                outcome: cell,
                continuations,
            } => (cell, continuations),
        };

        // Checked before locking so that a continuation resolving its own
        // future again is a no-op rather than a deadlock.
        if cell.get().is_some() {
            debug!(outcome = kind, "ignoring repeat resolution");
            return false;
        }

        let mut queue = continuations.lock();
        let mut won = false;
        let stored = cell.get_or_init(|| {
            won = true;
            outcome
        });
        if !won {
            debug!(outcome = kind, "ignoring repeat resolution");
            return false;
        }

        let pending = std::mem::take(&mut *queue);
        trace!(outcome = kind, continuations = pending.len(), "future resolved");
        let mut first_panic = None;
        for continuation in pending {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| continuation(stored))) {
                warn!(outcome = kind, "continuation panicked, flushing the rest");
                first_panic.get_or_insert(payload);
            }
        }
        drop(queue);

        if let Some(payload) = first_panic {
            panic::resume_unwind(payload);
        }
        true
    }

    /// Calls `f` with the success payload once resolved. Failures are skipped.
    pub fn on_success<F>(&self, f: F) -> &Self
    where
        F: FnOnce(&T) + Send + 'static,
    {
        self.add_continuation(move |outcome| {
            if let Outcome::Success(value) = outcome {
                f(value)
            }
        });
        self
    }

    /// Calls `f` with the failure once resolved. Successes are skipped.
    pub fn on_failure<F>(&self, f: F) -> &Self
    where
        F: FnOnce(&E) + Send + 'static,
    {
        self.add_continuation(move |outcome| {
            if let Outcome::Failure(err) = outcome {
                f(err)
            }
        });
        self
    }

    pub fn on_outcome<F>(&self, f: F) -> &Self
    where
        F: FnOnce(&Outcome<T, E>) + Send + 'static,
    {
        self.add_continuation(f);
        self
    }

    /// Calls `f` once resolved, whatever the outcome.
    pub fn on_complete<F>(&self, f: F) -> &Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.add_continuation(move |_| f());
        self
    }
}

impl<T: Clone, E: Clone> Future<T, E> {
    /// A copy of the outcome, or `None` while pending.
    pub fn peek(&self) -> Option<Outcome<T, E>> {
        self.resolved().cloned()
    }
}

impl<T: Debug, E: Debug> Debug for Future<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("Future");
        out.field("outcome", &self.resolved());
        // try_lock keeps formatting from a continuation of this future safe.
        if let Inner::Deferred { continuations, .. } = &*self.inner {
            match continuations.try_lock() {
                Some(queue) => out.field("continuations", &queue.len()),
                None => out.field("continuations", &"<locked>"),
            };
        }
        out.finish()
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::Future;
    use crate::{Error, Outcome};

    #[test]
    fn test_born_resolved_runs_continuation_inline() {
        let future = Future::<i32>::from_value(5);
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        future.on_success(move |v| *sink.lock().unwrap() = Some(*v));
        assert_eq!(*seen.lock().unwrap(), Some(5));
        assert!(future.is_resolved());
    }

    #[test]
    fn test_from_fn_captures_err() {
        let future = Future::<i32>::from_fn(|| Err(Error::producer("disk on fire")));
        assert_eq!(future.peek(), Some(Outcome::Failure(Error::producer("disk on fire"))));
        let future = Future::<i32>::from_fn(|| Ok(9));
        assert_eq!(future.peek(), Some(Outcome::Success(9)));
    }

    #[test]
    fn test_continuations_fire_in_registration_order() {
        let future = Future::<&'static str>::pending();
        let order = Arc::new(Mutex::new(Vec::new()));
        for id in 1..=3 {
            let order = order.clone();
            future.on_outcome(move |_| order.lock().unwrap().push(id));
        }
        assert!(order.lock().unwrap().is_empty());

        assert!(future.set_outcome(Outcome::Success("done")));
        assert_eq!(*order.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_first_writer_wins() {
        let future = Future::<i32>::pending();
        let calls = Arc::new(Mutex::new(0));
        let counter = calls.clone();
        future.on_complete(move || *counter.lock().unwrap() += 1);

        assert!(future.set_outcome(Outcome::Success(1)));
        assert!(!future.set_outcome(Outcome::Success(2)));
        assert!(!future.set_outcome(Outcome::Failure(Error::producer("late"))));

        assert_eq!(future.peek(), Some(Outcome::Success(1)));
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[test]
    fn test_born_resolved_ignores_set_outcome() {
        let future = Future::<i32>::from_error(Error::producer("early"));
        assert!(!future.set_outcome(Outcome::Success(3)));
        assert!(future.peek().is_some_and(|o| o.is_failure()));
    }

    #[test]
    fn test_terminal_attachments_filter_by_outcome() {
        let future = Future::<i32>::pending();
        let log = Arc::new(Mutex::new(Vec::new()));
        let (a, b, c) = (log.clone(), log.clone(), log.clone());
        future
            .on_success(move |_| a.lock().unwrap().push("success"))
            .on_failure(move |_| b.lock().unwrap().push("failure"))
            .on_complete(move || c.lock().unwrap().push("complete"));

        future.set_outcome(Outcome::Failure(Error::producer("nope")));
        assert_eq!(*log.lock().unwrap(), vec!["failure", "complete"]);
    }

    #[test]
    fn test_attach_after_resolution_runs_immediately() {
        let future = Future::<i32>::pending();
        future.set_outcome(Outcome::Success(8));
        let seen = Arc::new(Mutex::new(0));
        let sink = seen.clone();
        future.on_success(move |v| *sink.lock().unwrap() = *v);
        assert_eq!(*seen.lock().unwrap(), 8);
    }

    #[test]
    fn test_clones_share_resolution() {
        let future = Future::<i32>::pending();
        let other = future.clone();
        assert!(future.ptr_eq(&other));
        future.set_outcome(Outcome::Success(4));
        assert_eq!(other.peek(), Some(Outcome::Success(4)));
    }

    #[test]
    fn test_debug_shows_pending_queue() {
        let future = Future::<i32>::pending();
        future.on_complete(|| {});
        assert_eq!(format!("{future:?}"), "Future { outcome: None, continuations: 1 }");
    }

    #[test]
    fn test_panicking_continuation_does_not_drop_later_ones() {
        let future = Future::<i32>::pending();
        let later_calls = Arc::new(AtomicUsize::new(0));
        let counter = later_calls.clone();
        let mapped = future.map(|_| -> i32 { panic!("transform blew up") });
        future.on_success(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let resolving =
            panic::catch_unwind(AssertUnwindSafe(|| future.set_outcome(Outcome::Success(1))));
        assert!(resolving.is_err());
        assert!(future.is_resolved());
        assert!(!mapped.is_resolved());
        assert_eq!(later_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_resolving_from_own_continuation_is_ignored() {
        let future = Future::<i32>::pending();
        let handle = future.clone();
        let nested = Arc::new(Mutex::new(None));
        let sink = nested.clone();
        future.on_complete(move || {
            *sink.lock().unwrap() = Some(handle.set_outcome(Outcome::Success(2)));
        });

        assert!(future.set_outcome(Outcome::Success(1)));
        assert_eq!(*nested.lock().unwrap(), Some(false));
        assert_eq!(future.peek(), Some(Outcome::Success(1)));
    }
}
