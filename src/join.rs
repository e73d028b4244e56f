//! Pairwise join of two independently resolving futures.
//!
//! Each side reports into a rendezvous slot guarded by a lock of its own.
//! Whichever side arrives second finds its partner in the slot and resolves
//! the joined future; a failure on either side resolves it straight away.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::{Future, Outcome, Payload, Promise};

/// Which side, if any, has reported a success so far.
enum Rendezvous<T, U> {
    Empty,
    Left(T),
    Right(U),
    /// Settled by a pair or a failure; late arrivals are dropped.
    Closed,
}

impl<T, U> Rendezvous<T, U> {
    fn arrive_left(&mut self, value: T) -> Option<(T, U)> {
        match std::mem::replace(self, Self::Closed) {
            Self::Empty => {
                *self = Self::Left(value);
                None
            }
            Self::Right(partner) => Some((value, partner)),
            state @ (Self::Left(_) | Self::Closed) => {
                *self = state;
                None
            }
        }
    }

    fn arrive_right(&mut self, value: U) -> Option<(T, U)> {
        match std::mem::replace(self, Self::Closed) {
            Self::Empty => {
                *self = Self::Right(value);
                None
            }
            Self::Left(partner) => Some((partner, value)),
            state @ (Self::Right(_) | Self::Closed) => {
                *self = state;
                None
            }
        }
    }

    fn close(&mut self) {
        *self = Self::Closed;
    }
}

impl<T: Payload, E: Payload> Future<T, E> {
    /// Joins `other` onto this future, yielding both payloads as a pair.
    ///
    /// Resolves once both sides succeed, or as soon as either side fails
    /// (first failure wins). A side that fails early leaves the other future
    /// untouched; it keeps resolving for its own subscribers.
    ///
    /// # Examples
    ///
    /// ```
    /// use promise_join::{Outcome, Promise};
    ///
    /// let (pa, a) = Promise::<i32>::new();
    /// let (pb, b) = Promise::<&str>::new();
    /// let joined = a.append(&b);
    ///
    /// pb.fulfill("x");
    /// pa.fulfill(1);
    /// assert_eq!(joined.peek(), Some(Outcome::Success((1, "x"))));
    /// ```
    pub fn append<U: Payload>(&self, other: &Future<U, E>) -> Future<(T, U), E> {
        let left = match self.peek() {
            Some(Outcome::Failure(err)) => return Future::from_error(err),
            Some(Outcome::Success(value)) => Some(value),
            None => None,
        };
        match other.peek() {
            Some(Outcome::Failure(err)) => return Future::from_error(err),
            Some(Outcome::Success(partner)) => {
                if let Some(value) = left {
                    return Future::from_value((value, partner));
                }
            }
            None => {}
        }

        let slot: Arc<Mutex<Rendezvous<T, U>>> = Arc::new(Mutex::new(Rendezvous::Empty));
        let (promise, joined) = Promise::<(T, U), E>::new();

        let (left_slot, left_promise) = (Arc::clone(&slot), promise.clone());
        self.add_continuation(move |outcome| match outcome {
            Outcome::Success(value) => {
                let pair = left_slot.lock().arrive_left(value.clone());
                if let Some(pair) = pair {
                    trace!("join settled by left side");
                    left_promise.fulfill(pair);
                }
            }
            Outcome::Failure(err) => {
                left_slot.lock().close();
                left_promise.reject(err.clone());
            }
        });

        other.add_continuation(move |outcome| match outcome {
            Outcome::Success(value) => {
                let pair = slot.lock().arrive_right(value.clone());
                if let Some(pair) = pair {
                    trace!("join settled by right side");
                    promise.fulfill(pair);
                }
            }
            Outcome::Failure(err) => {
                slot.lock().close();
                promise.reject(err.clone());
            }
        });

        joined
    }

    /// [`append`](Self::append) with the roles swapped: `other`'s payload
    /// comes first in the pair.
    pub fn prepend<U: Payload>(&self, other: &Future<U, E>) -> Future<(U, T), E> {
        other.append(self)
    }

    /// Pairs the success payload with a constant.
    pub fn append_value<U: Payload>(&self, value: U) -> Future<(T, U), E> {
        self.map(move |own| (own, value))
    }

    /// Pairs a constant with the success payload.
    pub fn prepend_value<U: Payload>(&self, value: U) -> Future<(U, T), E> {
        self.map(move |own| (value, own))
    }
}
