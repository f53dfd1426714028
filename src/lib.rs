//! Single-assignment promises with chained continuations.
//!
//! A [`Promise`] is settled exactly once, either resolved with a value or
//! rejected with a [`Rejection`]. Reactions registered with [`Promise::then`]
//! and [`Promise::fail`] run exactly once, in registration order, whether they
//! were attached before or after the settlement. Continuations run
//! synchronously on whichever thread settles the promise, or on the thread
//! that registers them if the promise has already settled.
//!
//! ```
//! use promise_chain::{Promise, Rejection};
//! use futures::executor::block_on;
//! use std::thread;
//!
//! let promise = Promise::<i32>::new();
//! let next = promise
//!     .then(|x| Ok(x + 1))
//!     .then(|x| if *x > 0 { Ok(x * 10) } else { Err(Rejection::msg("negative")) });
//!
//! let producer = promise.clone();
//! thread::spawn(move || producer.resolve(5)).join().expect("producer panicked");
//!
//! assert_eq!(block_on(next.waiter()).unwrap(), 60);
//! ```
//!
//! Combinators [`all`] and [`any`] derive one promise from many.

mod combinator;
mod factory;
mod invoke;
mod promise;
mod rejection;
mod state;
mod storage;
mod wait;

pub use combinator::{all, any};
pub use factory::{
    make_promise, make_promise_with, make_rejected_promise, make_resolved_promise, Rejector,
    Resolver,
};
pub use promise::Promise;
pub use rejection::Rejection;
pub use state::Status;
pub use wait::Waiter;

/// Errors reported by this crate, either returned directly or carried inside
/// a [`Rejection`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `any` needs at least one promise to race.
    #[error("at least one input promise must be provided to `any`")]
    EmptyAny,
    /// A callback panicked; the payload message is kept when it is a string.
    #[error("callback panicked: {0}")]
    Panicked(String),
    /// Every handle of a pending promise was dropped, so it can never settle.
    #[error("promise was dropped before it settled")]
    Abandoned,
    /// The awaited promise was rejected.
    #[error("promise rejected: {0}")]
    Rejected(Rejection),
}
