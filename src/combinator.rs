use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::factory::{make_promise_with, make_resolved_promise};
use crate::promise::Promise;
use crate::Error;

/// Per-index results of an [`all`] in flight.
struct Gather<V> {
    slots: Mutex<Vec<Option<V>>>,
    completed: AtomicUsize,
}

impl<V> Gather<V> {
    fn new(count: usize) -> Self {
        Self {
            slots: Mutex::new((0..count).map(|_| None).collect()),
            completed: AtomicUsize::new(0),
        }
    }

    /// Stores one result; `true` for the last one to arrive.
    fn apply(&self, index: usize, value: V) -> bool {
        let count = {
            let mut slots = self.slots.lock();
            slots[index] = Some(value);
            slots.len()
        };
        self.completed.fetch_add(1, Ordering::AcqRel) + 1 == count
    }

    fn take(&self) -> Vec<V> {
        self.slots.lock().iter_mut().filter_map(Option::take).collect()
    }
}

/// Waits for every promise and resolves with their values in input order.
///
/// Rejects with the first rejection among the inputs; the other inputs keep
/// running and their outcomes are ignored. No input resolves to an empty
/// `Vec` right away.
///
/// # Examples
///
/// ```
/// use promise_chain::{all, Promise};
///
/// let inputs: Vec<Promise<i32>> = (0..3).map(|_| Promise::new()).collect();
/// let joined = all(inputs.clone());
/// inputs[2].resolve(3);
/// inputs[0].resolve(1);
/// inputs[1].resolve(2);
/// assert_eq!(joined.peek().and_then(|r| r.ok()), Some(vec![1, 2, 3]));
/// ```
pub fn all<V, I>(promises: I) -> Promise<Vec<V>>
where
    V: Clone + Send + Sync + 'static,
    I: IntoIterator<Item = Promise<V>>,
{
    let promises: Vec<_> = promises.into_iter().collect();
    if promises.is_empty() {
        return make_resolved_promise(Vec::new());
    }
    make_promise_with(move |resolver, rejector| {
        let gather = Arc::new(Gather::new(promises.len()));
        for (index, child) in promises.iter().enumerate() {
            let gather = gather.clone();
            let resolver = resolver.clone();
            let rejector = rejector.clone();
            child.then_with(
                move |value| {
                    if gather.apply(index, value.clone()) {
                        resolver.resolve(gather.take());
                    }
                    Ok(())
                },
                move |error| {
                    rejector.reject(error.clone());
                    Ok(())
                },
            );
        }
        Ok(())
    })
}

/// Follows whichever promise settles first, resolved or rejected.
///
/// Later settlements of the other inputs are ignored. An empty input is a
/// usage error and no promise is created.
///
/// ```
/// use promise_chain::{any, Error, Promise, Rejection};
///
/// let slow = Promise::<&str>::new();
/// let fast = Promise::<&str>::new();
/// let first = any([slow.clone(), fast.clone()]).unwrap();
/// fast.reject(Rejection::msg("fast failed"));
/// slow.resolve("slow");
/// assert_eq!(first.peek().and_then(|r| r.err()).map(|e| e.to_string()).as_deref(), Some("fast failed"));
///
/// assert!(matches!(any(Vec::<Promise<i32>>::new()), Err(Error::EmptyAny)));
/// ```
pub fn any<V, I>(promises: I) -> Result<Promise<V>, Error>
where
    V: Clone + Send + Sync + 'static,
    I: IntoIterator<Item = Promise<V>>,
{
    let promises: Vec<_> = promises.into_iter().collect();
    if promises.is_empty() {
        return Err(Error::EmptyAny);
    }
    Ok(make_promise_with(move |resolver, rejector| {
        for child in &promises {
            let resolver = resolver.clone();
            let rejector = rejector.clone();
            child.then_with(
                move |value| {
                    resolver.resolve(value.clone());
                    Ok(())
                },
                move |error| {
                    rejector.reject(error.clone());
                    Ok(())
                },
            );
        }
        Ok(())
    }))
}
