use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::warn;

use crate::rejection::Rejection;
use crate::Error;

/// Runs a user callback, turning a panic into a rejection.
///
/// Every callback the crate dispatches (continuations, error reactions,
/// executors) goes through here, so a callback that panics behaves exactly
/// like one that returned `Err`.
pub(crate) fn guarded<R, F>(callback: F) -> Result<R, Rejection>
where
    F: FnOnce() -> Result<R, Rejection>,
{
    match panic::catch_unwind(AssertUnwindSafe(callback)) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(%message, "callback panicked; rejecting downstream promise");
            Err(Rejection::new(Error::Panicked(message)))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("non-string panic payload")
    }
}
