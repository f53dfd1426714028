use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, trace, warn};

use crate::rejection::Rejection;
use crate::storage::Storage;

/// Where a promise is in its one-way lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Pending,
    Resolved,
    Rejected,
}

/// The settlement a reaction is called with.
pub(crate) enum Outcome<'a, T> {
    Resolved(&'a T),
    Rejected(&'a Rejection),
}

/// Value and error reactions of one registration, boxed together so that
/// they are queued as a unit and exactly one arm runs.
type Reaction<T> = Box<dyn for<'a> FnOnce(Outcome<'a, T>) + Send>;

struct Inner<T> {
    status: Status,
    // Set from settlement until the queue has been fully delivered.
    delivering: bool,
    reactions: Vec<Reaction<T>>,
}

/// Shared settlement cell behind every clone of a [`Promise`](crate::Promise).
///
/// Status and the reaction queue live under one lock. The value and the error
/// are written once, under that lock, and read without it afterwards.
/// Reactions always run with the lock released: a reaction may settle or
/// attach to the promise it was registered on.
pub(crate) struct State<T> {
    inner: Mutex<Inner<T>>,
    value: Storage<T>,
    error: Storage<Rejection>,
}

impl<T> State<T> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                status: Status::Pending,
                delivering: false,
                reactions: Vec::new(),
            }),
            value: Storage::new(),
            error: Storage::new(),
        }
    }

    pub(crate) fn status(&self) -> Status {
        self.inner.lock().status
    }

    pub(crate) fn resolve(&self, value: T) -> bool {
        {
            let mut inner = self.inner.lock();
            if inner.status != Status::Pending {
                debug!(status = ?inner.status, "ignoring resolve of a settled promise");
                return false;
            }
            self.value.set(value);
            inner.status = Status::Resolved;
            inner.delivering = true;
        }
        self.deliver(Status::Resolved);
        true
    }

    pub(crate) fn reject(&self, error: Rejection) -> bool {
        {
            let mut inner = self.inner.lock();
            if inner.status != Status::Pending {
                debug!(status = ?inner.status, %error, "ignoring reject of a settled promise");
                return false;
            }
            self.error.set(error);
            inner.status = Status::Rejected;
            inner.delivering = true;
        }
        self.deliver(Status::Rejected);
        true
    }

    /// Registers a reaction, or runs it right away when the promise has
    /// settled and finished delivering.
    pub(crate) fn attach<F>(&self, reaction: F)
    where
        F: for<'a> FnOnce(Outcome<'a, T>) + Send + 'static,
    {
        let status = {
            let mut inner = self.inner.lock();
            if inner.status == Status::Pending || inner.delivering {
                inner.reactions.push(Box::new(reaction));
                return;
            }
            inner.status
        };
        trace!(?status, "reacting to a settled promise");
        reaction(self.outcome(status));
    }

    /// Snapshot of the settlement, `None` while pending.
    pub(crate) fn peek(&self) -> Option<Result<T, Rejection>>
    where
        T: Clone,
    {
        match self.status() {
            Status::Pending => None,
            Status::Resolved => self.value.get().cloned().map(Ok),
            Status::Rejected => self.error.get().cloned().map(Err),
        }
    }

    /// Runs queued reactions until the queue stays empty.
    ///
    /// A panicking reaction does not stop the others: the first panic is
    /// held until the queue is drained and `delivering` is cleared, then
    /// resumed on the settling thread.
    fn deliver(&self, status: Status) {
        let mut delivered = 0;
        let mut panicked = None;
        loop {
            let batch = {
                let mut inner = self.inner.lock();
                if inner.reactions.is_empty() {
                    inner.delivering = false;
                    break;
                }
                std::mem::take(&mut inner.reactions)
            };
            delivered += batch.len();
            for reaction in batch {
                let outcome = self.outcome(status);
                if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| reaction(outcome))) {
                    warn!(?status, "promise reaction panicked");
                    panicked.get_or_insert(payload);
                }
            }
        }
        trace!(?status, delivered, "promise settled");
        if let Some(payload) = panicked {
            panic::resume_unwind(payload);
        }
    }

    fn outcome(&self, status: Status) -> Outcome<'_, T> {
        match status {
            Status::Resolved => Outcome::Resolved(self.value.value()),
            Status::Rejected => Outcome::Rejected(self.error.value()),
            Status::Pending => unreachable!("pending promises have no outcome"),
        }
    }
}
