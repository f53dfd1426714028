use crate::invoke;
use crate::promise::Promise;
use crate::rejection::Rejection;

/// Resolving half handed to a [`make_promise_with`] executor.
#[derive(Debug)]
pub struct Resolver<T> {
    promise: Promise<T>,
}

/// Rejecting half handed to a [`make_promise_with`] executor.
#[derive(Debug)]
pub struct Rejector<T> {
    promise: Promise<T>,
}

impl<T> Clone for Resolver<T> {
    fn clone(&self) -> Self {
        Self {
            promise: self.promise.clone(),
        }
    }
}

impl<T> Clone for Rejector<T> {
    fn clone(&self) -> Self {
        Self {
            promise: self.promise.clone(),
        }
    }
}

impl<T: Send + Sync + 'static> Resolver<T> {
    /// Same as [`Promise::resolve`].
    pub fn resolve(&self, value: T) -> bool {
        self.promise.resolve(value)
    }
}

impl<T: Send + Sync + 'static> Rejector<T> {
    /// Same as [`Promise::reject`].
    pub fn reject(&self, error: impl Into<Rejection>) -> bool {
        self.promise.reject(error)
    }
}

pub fn make_promise<T: Send + Sync + 'static>() -> Promise<T> {
    Promise::new()
}

/// Creates a promise and hands its resolving and rejecting halves to
/// `executor`, which runs before this function returns.
///
/// An executor that returns `Err` or panics rejects the promise, unless it
/// already settled it.
///
/// # Examples
///
/// ```
/// use promise_chain::make_promise_with;
/// use futures::executor::block_on;
/// use std::thread;
///
/// let promise = make_promise_with(|resolve, _reject| {
///     thread::spawn(move || resolve.resolve(String::from("Hi")));
///     Ok(())
/// });
/// assert_eq!(block_on(promise.waiter()).unwrap(), "Hi");
/// ```
pub fn make_promise_with<T, F>(executor: F) -> Promise<T>
where
    T: Send + Sync + 'static,
    F: FnOnce(Resolver<T>, Rejector<T>) -> Result<(), Rejection>,
{
    let promise = Promise::new();
    let resolver = Resolver {
        promise: promise.clone(),
    };
    let rejector = Rejector {
        promise: promise.clone(),
    };
    if let Err(error) = invoke::guarded(|| executor(resolver, rejector)) {
        promise.reject(error);
    }
    promise
}

pub fn make_resolved_promise<T: Send + Sync + 'static>(value: T) -> Promise<T> {
    let promise = Promise::new();
    promise.resolve(value);
    promise
}

pub fn make_rejected_promise<T: Send + Sync + 'static>(error: impl Into<Rejection>) -> Promise<T> {
    let promise = Promise::new();
    promise.reject(error);
    promise
}
