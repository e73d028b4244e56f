//! Awaiting a [`Future`] from async code.
//!
//! Nothing here drives execution: the waker is simply woken from the
//! continuation that receives the outcome, on whichever thread resolves it.

use std::future::{Future as StdFuture, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

use parking_lot::Mutex;

use crate::{Error, Future, Outcome, Payload};

/// Resolves to a copy of the outcome of the future it was created from.
///
/// # Examples
///
/// ```
/// use promise_join::{Outcome, Promise};
/// use futures::executor::block_on;
/// use std::thread;
///
/// let (promise, future) = Promise::<String>::new();
/// let task = thread::spawn(move || block_on(future.map(|s| s.len()).settled()));
/// promise.fulfill("four".into());
/// assert_eq!(task.join().expect("The waiting thread has panicked"), Outcome::Success(4));
/// ```
#[derive(Debug)]
pub struct Settled<T, E = Error> {
    slot: Arc<Mutex<Slot<T, E>>>,
}

#[derive(Debug)]
struct Slot<T, E> {
    outcome: Option<Outcome<T, E>>,
    waker: Option<Waker>,
}

impl<T: Payload, E: Payload> Future<T, E> {
    pub fn settled(&self) -> Settled<T, E> {
        let slot = Arc::new(Mutex::new(Slot {
            outcome: None,
            waker: None,
        }));
        let target = Arc::clone(&slot);
        self.add_continuation(move |outcome| {
            let waker = {
                let mut slot = target.lock();
                slot.outcome = Some(outcome.clone());
                slot.waker.take()
            };
            if let Some(waker) = waker {
                waker.wake()
            }
        });
        Settled { slot }
    }
}

impl<T, E> StdFuture for Settled<T, E> {
    type Output = Outcome<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut slot = self.slot.lock();
        match slot.outcome.take() {
            Some(outcome) => Poll::Ready(outcome),
            None => {
                slot.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

impl<T: Payload, E: Payload> IntoFuture for Future<T, E> {
    type Output = Outcome<T, E>;
    type IntoFuture = Settled<T, E>;

    fn into_future(self) -> Self::IntoFuture {
        self.settled()
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use std::thread;

    use crate::{Error, Future, Outcome, Promise};

    #[test]
    fn test_settled_resolved_future() {
        let outcome = block_on(Future::<i32>::from_value(3).settled());
        assert_eq!(outcome, Outcome::Success(3));
    }

    #[test]
    fn test_settled_wakes_across_threads() {
        let (op, op_a) = Promise::<String>::new();
        let task1 = thread::spawn(move || block_on(async { op_a.await }));
        let task2 = thread::spawn(move || op.fulfill(String::from("🍓")));
        task2.join().expect("The task2 thread has panicked");
        assert_eq!(
            task1.join().expect("The task1 thread has panicked"),
            Outcome::Success(String::from("🍓"))
        );
    }

    #[test]
    fn test_settled_failure() {
        let (op, op_a) = Promise::<String>::new();
        let task1 = thread::spawn(move || block_on(op_a.settled()));
        op.reject(Error::producer("reject!!"));
        assert_eq!(
            task1.join().expect("The task1 thread has panicked"),
            Outcome::Failure(Error::producer("reject!!"))
        );
    }

    #[test]
    fn test_many_waiters() {
        let (op, op_a) = Promise::<u32>::new();
        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let future = op_a.clone();
                thread::spawn(move || block_on(future.settled()))
            })
            .collect();
        op.fulfill(7);
        for waiter in waiters {
            assert_eq!(waiter.join().expect("A waiter thread has panicked"), Outcome::Success(7));
        }
    }
}
