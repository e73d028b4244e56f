use crate::{Error, Future, Outcome};

/// The producer side of a [`Future`]. Resolves it exactly once; every later
/// call is silently ignored.
///
/// A `Promise` can be cloned and handed to several producers racing to
/// complete the same future. Dropping every clone without resolving leaves
/// the future pending for good, along with anything attached to it.
///
/// # Examples
///
/// ```
/// use promise_join::{Outcome, Promise};
/// use std::thread;
///
/// let (promise, future) = Promise::<String>::new();
/// let task = thread::spawn(move || promise.fulfill("Hi".into()));
/// task.join().expect("The producer thread has panicked");
/// assert_eq!(future.peek(), Some(Outcome::Success("Hi".to_string())));
/// ```
#[derive(Debug)]
pub struct Promise<T, E = Error> {
    future: Future<T, E>,
}

impl<T, E> Clone for Promise<T, E> {
    fn clone(&self) -> Self {
        Self {
            future: self.future.clone(),
        }
    }
}

impl<T, E> Promise<T, E> {
    /// Creates a pending future together with the promise controlling it.
    pub fn new() -> (Self, Future<T, E>) {
        let future = Future::pending();
        (
            Self {
                future: future.clone(),
            },
            future,
        )
    }

    /// Another handle to the future this promise resolves.
    pub fn future(&self) -> Future<T, E> {
        self.future.clone()
    }

    pub fn is_resolved(&self) -> bool {
        self.future.is_resolved()
    }

    pub fn fulfill(&self, value: T) {
        self.complete(Outcome::Success(value));
    }

    pub fn reject(&self, err: E) {
        self.complete(Outcome::Failure(err));
    }

    pub fn complete(&self, outcome: Outcome<T, E>) {
        self.future.set_outcome(outcome);
    }

    /// Like [`fulfill`](Self::fulfill), but reports a lost race.
    ///
    /// # Errors
    ///
    /// [`Error::AlreadyResolved`] if the future had already been resolved.
    pub fn try_fulfill(&self, value: T) -> Result<(), Error> {
        self.try_complete(Outcome::Success(value))
    }

    /// Like [`reject`](Self::reject), but reports a lost race.
    ///
    /// # Errors
    ///
    /// [`Error::AlreadyResolved`] if the future had already been resolved.
    pub fn try_reject(&self, err: E) -> Result<(), Error> {
        self.try_complete(Outcome::Failure(err))
    }

    fn try_complete(&self, outcome: Outcome<T, E>) -> Result<(), Error> {
        if self.future.set_outcome(outcome) {
            Ok(())
        } else {
            Err(Error::AlreadyResolved)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::thread;

    use super::Promise;
    use crate::{Error, Outcome};

    #[test]
    fn test_promise_fulfill() {
        let (promise, future) = Promise::<String>::new();
        assert!(!promise.is_resolved());
        promise.fulfill("🍓".into());
        assert!(promise.is_resolved());
        assert_eq!(future.peek(), Some(Outcome::Success("🍓".to_string())));
    }

    #[test]
    fn test_promise_reject() {
        let (promise, future) = Promise::<String>::new();
        promise.reject(Error::producer("reject!!"));
        assert_eq!(future.peek(), Some(Outcome::Failure(Error::producer("reject!!"))));
    }

    #[test]
    fn test_promise_resolve_twice() {
        let (promise, future) = Promise::<String>::new();
        let calls = Arc::new(Mutex::new(0));
        let counter = calls.clone();
        future.on_complete(move || *counter.lock().unwrap() += 1);

        promise.fulfill("hi".into());
        promise.fulfill("again".into());
        promise.reject(Error::producer("too late"));

        assert_eq!(future.peek(), Some(Outcome::Success("hi".to_string())));
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[test]
    fn test_promise_try_fulfill_reports_repeat() {
        let (promise, _future) = Promise::<u8>::new();
        assert_eq!(promise.try_fulfill(1), Ok(()));
        assert_eq!(promise.try_fulfill(2), Err(Error::AlreadyResolved));
        assert_eq!(promise.try_reject(Error::producer("x")), Err(Error::AlreadyResolved));
    }

    #[test]
    fn test_promise_racing_producers() {
        let (promise, future) = Promise::<usize>::new();
        let tasks: Vec<_> = (0..8)
            .map(|id| {
                let promise = promise.clone();
                thread::spawn(move || promise.try_fulfill(id).is_ok())
            })
            .collect();
        let winners = tasks
            .into_iter()
            .map(|task| task.join().expect("The producer thread has panicked"))
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
        assert!(future.peek().is_some_and(|o| o.is_success()));
    }

    #[test]
    fn test_promise_never_resolved_stays_pending() {
        let (promise, future) = Promise::<String>::new();
        future.on_complete(|| panic!("must not fire"));
        drop(promise);
        assert!(!future.is_resolved());
    }
}
