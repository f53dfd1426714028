use std::sync::OnceLock;

/// Single-assignment slot for a settled value.
///
/// Writing twice or reading before the write are caller bugs and panic.
/// Once written, the value can be read from any thread without further
/// locking.
#[derive(Debug)]
pub(crate) struct Storage<T> {
    slot: OnceLock<T>,
}

impl<T> Storage<T> {
    pub(crate) fn new() -> Self {
        Self {
            slot: OnceLock::new(),
        }
    }

    pub(crate) fn set(&self, value: T) {
        assert!(self.slot.set(value).is_ok(), "storage assigned twice");
    }

    /// The value, or `None` before `set`.
    pub(crate) fn get(&self) -> Option<&T> {
        self.slot.get()
    }

    pub(crate) fn value(&self) -> &T {
        match self.slot.get() {
            Some(value) => value,
            None => panic!("storage read before it was set"),
        }
    }
}
