use std::fmt;
use std::future::IntoFuture;
use std::sync::Arc;

use crate::combinator::{all, any};
use crate::invoke;
use crate::rejection::Rejection;
use crate::state::{Outcome, State, Status};
use crate::wait::Waiter;
use crate::Error;

/// A single-assignment value that is resolved or rejected exactly once.
///
/// Cloning a `Promise` is cheap and every clone refers to the same
/// settlement. Continuations receive the value by reference; each one
/// returns a new promise for its own result.
///
/// # Examples
///
/// ```
/// use promise_chain::Promise;
/// use futures::executor::block_on;
/// use std::thread;
///
/// let promise = Promise::<String>::new();
/// let length = promise.then(|text| Ok(text.len()));
///
/// let producer = promise.clone();
/// let task = thread::spawn(move || producer.resolve(String::from("🍓")));
/// assert!(task.join().expect("The producer thread has panicked"));
///
/// assert_eq!(block_on(length.waiter()).unwrap(), 4);
/// ```
pub struct Promise<T> {
    state: Arc<State<T>>,
}

/// What a continuation hands to the downstream promise.
enum Next<R> {
    Value(R),
    Promise(Promise<R>),
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<T> Default for Promise<T> {
    fn default() -> Self {
        Self {
            state: Arc::new(State::new()),
        }
    }
}

impl<T> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("status", &self.state.status())
            .finish()
    }
}

impl<T: Send + Sync + 'static> Promise<T> {
    /// A pending promise.
    pub fn new() -> Self {
        Self::default()
    }

    /// Where the promise is in its lifecycle.
    pub fn status(&self) -> Status {
        self.state.status()
    }

    /// Resolves the promise and runs every queued continuation on this
    /// thread before returning.
    ///
    /// Returns `false`, and does nothing, if the promise had already settled.
    /// If a continuation panics, the rest still run and the first panic is
    /// resumed once the queue is drained.
    pub fn resolve(&self, value: T) -> bool {
        self.state.resolve(value)
    }

    /// Rejects the promise; see [`resolve`](Self::resolve).
    pub fn reject(&self, error: impl Into<Rejection>) -> bool {
        self.state.reject(error.into())
    }

    /// The settlement so far, `None` while pending.
    pub fn peek(&self) -> Option<Result<T, Rejection>>
    where
        T: Clone,
    {
        self.state.peek()
    }

    /// A future that completes when this promise settles.
    pub fn waiter(&self) -> Waiter<T>
    where
        T: Clone,
    {
        Waiter::new(&self.state)
    }
}

impl<T: Clone + Send + Sync + 'static> Promise<T> {
    /// Chains a continuation on the resolved value.
    ///
    /// Returning `Err` rejects the returned promise. A rejection of `self`
    /// skips `on_value` and is forwarded unchanged.
    pub fn then<R, F>(&self, on_value: F) -> Promise<R>
    where
        R: Clone + Send + Sync + 'static,
        F: FnOnce(&T) -> Result<R, Rejection> + Send + 'static,
    {
        self.chain(move |value| on_value(value).map(Next::Value), |_| Ok(()))
    }

    /// Chains a continuation for each outcome.
    ///
    /// `on_error` runs when `self` is rejected or when `on_value` fails. It
    /// can observe the error or replace it by returning `Err`, but the
    /// returned promise is rejected either way.
    ///
    /// ```
    /// use promise_chain::{make_rejected_promise, Rejection, Status};
    /// use std::sync::{Arc, Mutex};
    ///
    /// let seen = Arc::new(Mutex::new(None));
    /// let log = seen.clone();
    /// let next = make_rejected_promise::<i32>(Rejection::msg("boom")).then_with(
    ///     |x| Ok(x + 1),
    ///     move |error| {
    ///         *log.lock().unwrap() = Some(error.to_string());
    ///         Ok(())
    ///     },
    /// );
    /// assert_eq!(seen.lock().unwrap().as_deref(), Some("boom"));
    /// assert_eq!(next.status(), Status::Rejected);
    /// ```
    pub fn then_with<R, F, G>(&self, on_value: F, on_error: G) -> Promise<R>
    where
        R: Clone + Send + Sync + 'static,
        F: FnOnce(&T) -> Result<R, Rejection> + Send + 'static,
        G: FnOnce(&Rejection) -> Result<(), Rejection> + Send + 'static,
    {
        self.chain(move |value| on_value(value).map(Next::Value), on_error)
    }

    /// Chains a continuation that itself produces a promise; the returned
    /// promise follows that inner promise.
    pub fn then_promise<R, F>(&self, on_value: F) -> Promise<R>
    where
        R: Clone + Send + Sync + 'static,
        F: FnOnce(&T) -> Result<Promise<R>, Rejection> + Send + 'static,
    {
        self.chain(move |value| on_value(value).map(Next::Promise), |_| Ok(()))
    }

    /// Reacts to a rejection while passing a resolved value through.
    pub fn fail<G>(&self, on_error: G) -> Promise<T>
    where
        G: FnOnce(&Rejection) -> Result<(), Rejection> + Send + 'static,
    {
        self.chain(|value| Ok(Next::Value(value.clone())), on_error)
    }

    /// Maps the value to a batch of promises and waits for all of them,
    /// see [`all`].
    pub fn then_all<V, I, F>(&self, on_value: F) -> Promise<Vec<V>>
    where
        V: Clone + Send + Sync + 'static,
        I: IntoIterator<Item = Promise<V>>,
        F: FnOnce(&T) -> Result<I, Rejection> + Send + 'static,
    {
        self.then_promise(move |value| Ok(all(on_value(value)?)))
    }

    /// Maps the value to a batch of promises and follows the first to
    /// settle, see [`any`]. An empty batch rejects the returned promise.
    pub fn then_any<V, I, F>(&self, on_value: F) -> Promise<V>
    where
        V: Clone + Send + Sync + 'static,
        I: IntoIterator<Item = Promise<V>>,
        F: FnOnce(&T) -> Result<I, Rejection> + Send + 'static,
    {
        self.then_promise(move |value| Ok(any(on_value(value)?)?))
    }

    fn chain<R, F, G>(&self, on_value: F, on_error: G) -> Promise<R>
    where
        R: Clone + Send + Sync + 'static,
        F: FnOnce(&T) -> Result<Next<R>, Rejection> + Send + 'static,
        G: FnOnce(&Rejection) -> Result<(), Rejection> + Send + 'static,
    {
        let next = Promise::new();
        let downstream = next.clone();
        self.state.attach(move |outcome: Outcome<'_, T>| {
            let error = match outcome {
                Outcome::Resolved(value) => match invoke::guarded(|| on_value(value)) {
                    Ok(Next::Value(result)) => {
                        downstream.resolve(result);
                        return;
                    }
                    Ok(Next::Promise(inner)) => {
                        inner.forward(downstream);
                        return;
                    }
                    Err(raised) => raised,
                },
                Outcome::Rejected(error) => error.clone(),
            };
            let error = match invoke::guarded(|| on_error(&error)) {
                Ok(()) => error,
                Err(replaced) => replaced,
            };
            downstream.reject(error);
        });
        next
    }

    /// Settles `downstream` the same way `self` settles.
    fn forward(&self, downstream: Promise<T>) {
        self.state.attach(move |outcome: Outcome<'_, T>| match outcome {
            Outcome::Resolved(value) => {
                downstream.resolve(value.clone());
            }
            Outcome::Rejected(error) => {
                downstream.reject(error.clone());
            }
        });
    }
}

impl<T: Clone + Send + Sync + 'static> IntoFuture for Promise<T> {
    type Output = Result<T, Error>;
    type IntoFuture = Waiter<T>;

    fn into_future(self) -> Waiter<T> {
        self.waiter()
    }
}
