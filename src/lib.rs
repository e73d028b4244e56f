//! Single-shot futures and promises, composed with callbacks instead of
//! locks.
//!
//! A [`Promise`] resolves its [`Future`] once; consumers derive new futures
//! with [`map`](Future::map), [`flat_map`](Future::flat_map),
//! [`recover`](Future::recover) and friends, and combine independent ones
//! with [`append`](Future::append). Nothing here spawns or schedules work:
//! every continuation runs inline on the thread that resolves its source.
//!
//! ```
//! use promise_join::{Error, Outcome, Promise};
//! use std::thread;
//!
//! let (pa, a) = Promise::<i32>::new();
//! let (pb, b) = Promise::<String>::new();
//! let total = a
//!     .append(&b)
//!     .map(|(n, s)| n + s.len() as i32)
//!     .recover(|_: Error| -1);
//!
//! let task = thread::spawn(move || pb.fulfill("abc".into()));
//! pa.fulfill(1);
//! task.join().expect("The producer thread has panicked");
//! assert_eq!(total.peek(), Some(Outcome::Success(4)));
//! ```

mod combinators;
mod future;
mod join;
mod outcome;
mod promise;
pub mod settled;
pub mod tuple;

pub use future::{Future, Payload};
pub use outcome::Outcome;
pub use promise::Promise;
pub use settled::Settled;
pub use tuple::{join, join3, join4, join5, join6, TupleAppend, TuplePrepend};

/// The default failure type carried by a [`Future`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A producer rejected its promise.
    #[error("producer failed: {0}")]
    Producer(String),
    /// A user-supplied transform reported a failure.
    #[error("transform failed: {0}")]
    Transform(String),
    /// A strict resolution lost the race to an earlier one.
    #[error("future already resolved")]
    AlreadyResolved,
}

impl Error {
    /// Shorthand for [`Error::Producer`].
    pub fn producer(reason: impl Into<String>) -> Self {
        Self::Producer(reason.into())
    }

    /// Shorthand for [`Error::Transform`].
    pub fn transform(reason: impl Into<String>) -> Self {
        Self::Transform(reason.into())
    }
}
