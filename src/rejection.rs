use std::error::Error as StdError;
use std::fmt::{self, Debug, Display};
use std::sync::Arc;

/// The error a promise is rejected with.
///
/// A `Rejection` erases the type of whatever was raised so that every link of
/// a chain carries the same token. Clones share the captured error, and
/// [`same_as`](Self::same_as) tells whether two tokens came from the same
/// raise.
///
/// Any `std::error::Error + Send + Sync` converts into a `Rejection`, so `?`
/// works inside continuations:
///
/// ```
/// use promise_chain::{make_resolved_promise, Status};
///
/// let parsed = make_resolved_promise(String::from("forty-two"))
///     .then(|text| Ok(text.parse::<i32>()?));
/// assert_eq!(parsed.status(), Status::Rejected);
/// ```
#[derive(Clone)]
pub struct Rejection {
    inner: Arc<dyn StdError + Send + Sync + 'static>,
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct Message(String);

impl Rejection {
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(error),
        }
    }

    /// Rejection carrying nothing but a message.
    pub fn msg(message: impl Display) -> Self {
        Self::new(Message(message.to_string()))
    }

    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        self.inner.downcast_ref::<E>()
    }

    pub fn is<E>(&self) -> bool
    where
        E: StdError + 'static,
    {
        self.inner.is::<E>()
    }

    /// `true` when both tokens were cloned from the same rejection.
    pub fn same_as(&self, other: &Rejection) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<E> From<E> for Rejection
where
    E: StdError + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Self::new(error)
    }
}

impl Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&*self.inner, f)
    }
}

impl Debug for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Rejection").field(&self.inner).finish()
    }
}
