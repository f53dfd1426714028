use parking_lot::Mutex;
use std::sync::Arc;
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll, Waker},
};
use tracing::debug;

use crate::state::{Outcome, State};
use crate::Error;

/// A future over the settlement of a [`Promise`](crate::Promise).
///
/// The waiter registers one reaction when it is created and only wakes the
/// task polling it; it never drives an executor of its own. If every handle
/// of a still-pending promise is dropped, the waiter completes with
/// [`Error::Abandoned`].
///
/// # Examples
///
/// ```
/// use promise_chain::{Error, Promise, Rejection};
/// use futures::executor::block_on;
/// use std::thread;
///
/// let promise = Promise::<String>::new();
/// let waiter = promise.waiter();
/// let task = thread::spawn(move || block_on(waiter));
/// promise.reject(Rejection::msg("💥"));
///
/// let outcome = task.join().expect("The waiting thread has panicked");
/// assert!(matches!(outcome, Err(Error::Rejected(e)) if e.to_string() == "💥"));
/// ```
#[derive(Debug)]
pub struct Waiter<T> {
    shared: Arc<Mutex<Inner<T>>>,
}

#[derive(Debug)]
enum WakerState {
    Fresh,
    Tainted,
}

#[derive(Debug)]
struct Inner<T> {
    value: Option<Result<T, Error>>,
    waker: Result<Waker, WakerState>,
}

/// Held by the reaction; dropping it unfired means the promise is gone.
struct Notifier<T> {
    shared: Arc<Mutex<Inner<T>>>,
    fired: bool,
}

impl<T> Waiter<T>
where
    T: Clone + Send + 'static,
{
    pub(crate) fn new(state: &State<T>) -> Self {
        let shared = Arc::new(Mutex::new(Inner {
            value: None,
            waker: Err(WakerState::Fresh),
        }));
        let notifier = Notifier {
            shared: shared.clone(),
            fired: false,
        };
        state.attach(move |outcome: Outcome<'_, T>| {
            let value = match outcome {
                Outcome::Resolved(value) => Ok(value.clone()),
                Outcome::Rejected(error) => Err(Error::Rejected(error.clone())),
            };
            notifier.settle(value);
        });
        Self { shared }
    }
}

impl<T> Notifier<T> {
    fn settle(mut self, value: Result<T, Error>) {
        self.fired = true;
        let waker = {
            let mut inner = self.shared.lock();
            inner.value = Some(value);
            std::mem::replace(&mut inner.waker, Err(WakerState::Fresh))
        };
        if let Ok(waker) = waker {
            waker.wake()
        }
    }
}

impl<T> Drop for Notifier<T> {
    fn drop(&mut self) {
        if self.fired {
            return;
        }
        debug!("promise dropped before it settled; waking abandoned waiter");
        let waker = std::mem::replace(&mut self.shared.lock().waker, Err(WakerState::Tainted));
        if let Ok(waker) = waker {
            waker.wake()
        }
    }
}

impl<T> Future for Waiter<T> {
    type Output = Result<T, Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut inner = self.shared.lock();
        match inner.value.take() {
            Some(value) => Poll::Ready(value),
            None => match std::mem::replace(&mut inner.waker, Ok(cx.waker().clone())) {
                Err(WakerState::Tainted) => {
                    inner.waker = Err(WakerState::Tainted);
                    Poll::Ready(Err(Error::Abandoned))
                }
                _ => Poll::Pending,
            },
        }
    }
}
