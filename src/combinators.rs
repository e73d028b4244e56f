//! Single-input transforms.
//!
//! Each combinator applies its function on the spot when the source is
//! already resolved, and otherwise returns a pending future that is resolved
//! from a continuation on the source. Success-oriented combinators skip
//! failures; failure-oriented ones skip successes.

use crate::{Future, Outcome, Payload, Promise};

impl<T: Payload, E: Payload> Future<T, E> {
    /// Transforms the success payload.
    pub fn map<U, F>(&self, f: F) -> Future<U, E>
    where
        U: Payload,
        F: FnOnce(T) -> U + Send + 'static,
    {
        self.try_map(move |value| Ok(f(value)))
    }

    /// Transforms the success payload with a fallible function; an `Err`
    /// becomes the failure of the result.
    pub fn try_map<U, F>(&self, f: F) -> Future<U, E>
    where
        U: Payload,
        F: FnOnce(T) -> Result<U, E> + Send + 'static,
    {
        if let Some(outcome) = self.peek() {
            return Future::from_outcome(outcome.and_then(f));
        }
        let (promise, future) = Promise::new();
        self.add_continuation(move |outcome| promise.complete(outcome.clone().and_then(f)));
        future
    }

    /// Chains a dependent asynchronous step. The future returned by `f`
    /// replaces the success payload.
    ///
    /// When `self` is pending, `f` runs inside `self`'s continuation, with
    /// `self`'s lock held. It may return `self` (or any handle to it), but
    /// must not attach to `self`; see [`Future`] on reentrancy.
    pub fn flat_map<U, F>(&self, f: F) -> Future<U, E>
    where
        U: Payload,
        F: FnOnce(T) -> Future<U, E> + Send + 'static,
    {
        match self.peek() {
            Some(Outcome::Success(value)) => f(value),
            Some(Outcome::Failure(err)) => Future::from_error(err),
            None => {
                let (promise, future) = Promise::new();
                self.add_continuation(move |outcome| match outcome {
                    Outcome::Success(value) => f(value.clone()).forward_to(promise),
                    Outcome::Failure(err) => promise.reject(err.clone()),
                });
                future
            }
        }
    }

    /// Transforms the failure, possibly into another error type.
    pub fn map_failure<E2, F>(&self, f: F) -> Future<T, E2>
    where
        E2: Payload,
        F: FnOnce(E) -> E2 + Send + 'static,
    {
        if let Some(outcome) = self.peek() {
            return Future::from_outcome(outcome.map_failure(f));
        }
        let (promise, future) = Promise::new();
        self.add_continuation(move |outcome| promise.complete(outcome.clone().map_failure(f)));
        future
    }

    /// Replaces a failure with the eventual outcome of the future returned
    /// by `f`.
    ///
    /// Like [`flat_map`](Self::flat_map), `f` may run with `self`'s lock
    /// held: returning a handle to `self` is fine, attaching to it is not.
    pub fn flat_map_recover<E2, F>(&self, f: F) -> Future<T, E2>
    where
        E2: Payload,
        F: FnOnce(E) -> Future<T, E2> + Send + 'static,
    {
        match self.peek() {
            Some(Outcome::Success(value)) => Future::from_value(value),
            Some(Outcome::Failure(err)) => f(err),
            None => {
                let (promise, future) = Promise::new();
                self.add_continuation(move |outcome| match outcome {
                    Outcome::Success(value) => promise.fulfill(value.clone()),
                    Outcome::Failure(err) => f(err.clone()).forward_to(promise),
                });
                future
            }
        }
    }

    /// Turns a failure into a success value.
    pub fn recover<F>(&self, f: F) -> Future<T, E>
    where
        F: FnOnce(E) -> T + Send + 'static,
    {
        self.try_recover(move |err| Ok(f(err)))
    }

    /// Gives a failure the chance to turn into a success; an `Err` from `f`
    /// replaces the original failure.
    pub fn try_recover<F>(&self, f: F) -> Future<T, E>
    where
        F: FnOnce(E) -> Result<T, E> + Send + 'static,
    {
        if let Some(outcome) = self.peek() {
            return Future::from_outcome(outcome.or_else(f));
        }
        let (promise, future) = Promise::new();
        self.add_continuation(move |outcome| promise.complete(outcome.clone().or_else(f)));
        future
    }

    /// Resolves `promise` with whatever this future resolves to.
    ///
    /// A stored outcome is read without the lock, so forwarding from a
    /// future that is still flushing its queue (such as the source of a
    /// `flat_map` whose step returned the source itself) cannot deadlock.
    pub(crate) fn forward_to(&self, promise: Promise<T, E>) {
        match self.resolved() {
            Some(outcome) => promise.complete(outcome.clone()),
            None => self.add_continuation(move |outcome| promise.complete(outcome.clone())),
        }
    }
}
