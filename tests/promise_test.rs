#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use promise_chain::{
        all, any, make_promise, make_promise_with, make_rejected_promise, make_resolved_promise,
        Error, Promise, Rejection, Status,
    };
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::{thread, time::Duration};

    #[test]
    fn test_then_increments_resolved_value() {
        let p = Promise::<i32>::new();
        let f = p.then(|x| Ok(x + 1));
        p.resolve(5);
        assert_eq!(block_on(f.waiter()).unwrap(), 6);
    }

    #[test]
    fn test_rejection_reaches_terminal_fail() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        let p = Promise::<i32>::new();
        p.reject(Rejection::msg("boom"));
        let f = p.then(|x| Ok(*x)).fail(move |e| {
            sink.lock().unwrap().push(e.to_string());
            Ok(())
        });
        assert_eq!(*log.lock().unwrap(), vec!["boom"]);
        let outcome = block_on(f.waiter());
        assert!(matches!(outcome, Err(Error::Rejected(e)) if e.to_string() == "boom"));
    }

    #[test]
    fn test_resolve_from_another_thread() {
        let promise = make_promise::<i32>();
        let producer = promise.clone();
        let result = promise.then(|x| Ok(x * 2)).then(|x| Ok(format!("{x}")));

        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            producer.resolve(21);
        });

        assert_eq!(block_on(result.waiter()).unwrap(), "42");
    }

    #[test]
    fn test_each_handler_runs_exactly_once_under_races() {
        for _ in 0..50 {
            let calls = Arc::new(AtomicUsize::new(0));
            let promise = Promise::<u32>::new();
            let registrars: Vec<_> = (0..4)
                .map(|_| {
                    let promise = promise.clone();
                    let calls = calls.clone();
                    thread::spawn(move || {
                        for _ in 0..8 {
                            let calls = calls.clone();
                            promise.then(move |_| {
                                calls.fetch_add(1, Ordering::SeqCst);
                                Ok(())
                            });
                        }
                    })
                })
                .collect();
            let settlers: Vec<_> = (0..3)
                .map(|n| {
                    let promise = promise.clone();
                    thread::spawn(move || promise.resolve(n))
                })
                .collect();
            for registrar in registrars {
                registrar.join().expect("The registering thread has panicked");
            }
            let wins = settlers
                .into_iter()
                .map(|s| s.join().expect("The settling thread has panicked"))
                .filter(|won| *won)
                .count();
            assert_eq!(wins, 1);
            assert_eq!(calls.load(Ordering::SeqCst), 32);
        }
    }

    #[test]
    fn test_then_all_gathers_fanned_out_work() {
        let ids = Promise::<Vec<u32>>::new();
        let squares = ids.then_all(|ids| {
            Ok(ids
                .iter()
                .map(|&id| {
                    make_promise_with(move |resolve, _| {
                        thread::spawn(move || resolve.resolve(id * id));
                        Ok(())
                    })
                })
                .collect::<Vec<_>>())
        });
        ids.resolve(vec![1, 2, 3, 4]);
        assert_eq!(block_on(squares.waiter()).unwrap(), vec![1, 4, 9, 16]);
    }

    #[test]
    fn test_then_all_forwards_child_rejection() {
        let start = make_resolved_promise(());
        let joined = start.then_all(|_| {
            Ok(vec![
                make_resolved_promise(1),
                make_rejected_promise(Rejection::msg("child failed")),
            ])
        });
        let outcome = block_on(joined.waiter());
        assert!(matches!(outcome, Err(Error::Rejected(e)) if e.to_string() == "child failed"));
    }

    #[test]
    fn test_then_any_follows_first_settlement() {
        let slow = Promise::<&str>::new();
        let racers = slow.clone();
        let winner = make_resolved_promise(()).then_any(move |_| Ok([racers, make_resolved_promise("fast")]));
        slow.resolve("slow");
        assert_eq!(block_on(winner.waiter()).unwrap(), "fast");
    }

    #[test]
    fn test_then_any_with_no_promises_rejects() {
        let winner = make_resolved_promise(()).then_any(|_| Ok(Vec::<Promise<i32>>::new()));
        let error = winner.peek().and_then(|r| r.err()).expect("empty any should reject");
        assert!(matches!(error.downcast_ref::<Error>(), Some(Error::EmptyAny)));
    }

    #[test]
    fn test_upstream_rejection_skips_then_all() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let upstream = make_rejected_promise::<()>(Rejection::msg("upstream"));
        let joined = upstream.then_all(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::<Promise<i32>>::new())
        });
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(joined.status(), Status::Rejected);
    }

    #[test]
    fn test_error_replaced_midway_through_chain() {
        let p = Promise::<i32>::new();
        let end = p
            .then(|x| Ok(x + 1))
            .fail(|e| Err(Rejection::msg(format!("wrapped: {e}"))))
            .then(|x| Ok(x + 1))
            .fail(|_| Ok(()));
        p.reject(Rejection::msg("root cause"));
        let outcome = block_on(end.waiter());
        assert!(matches!(outcome, Err(Error::Rejected(e)) if e.to_string() == "wrapped: root cause"));
    }

    #[test]
    fn test_nested_any_and_all() {
        let a = Promise::<i32>::new();
        let b = Promise::<i32>::new();
        let c = Promise::<i32>::new();
        let first = any([a.clone(), b.clone()]).unwrap();
        let both = all([first, c.clone()]);
        b.resolve(2);
        c.resolve(3);
        a.resolve(1);
        assert_eq!(block_on(both.waiter()).unwrap(), vec![2, 3]);
    }

    #[test]
    fn test_dropped_chain_abandons_waiter() {
        let p = Promise::<i32>::new();
        let waiter = p.then(|x| Ok(x + 1)).waiter();
        drop(p);
        assert!(matches!(block_on(waiter), Err(Error::Abandoned)));
    }

    #[derive(Debug)]
    struct Fragile {
        id: i32,
        armed: Arc<AtomicBool>,
    }

    impl Clone for Fragile {
        fn clone(&self) -> Self {
            if self.armed.swap(false, Ordering::SeqCst) {
                panic!("clone exploded");
            }
            Self {
                id: self.id,
                armed: self.armed.clone(),
            }
        }
    }

    #[test]
    fn test_panicking_clone_does_not_stall_later_handlers() {
        let p = Promise::<Fragile>::new();
        let _waiter = p.waiter();
        let queued = p.then(|fragile| Ok(fragile.id));

        let value = Fragile {
            id: 1,
            armed: Arc::new(AtomicBool::new(true)),
        };
        let settled = panic::catch_unwind(AssertUnwindSafe(|| p.resolve(value)));
        assert!(settled.is_err());
        assert_eq!(p.status(), Status::Resolved);
        assert_eq!(queued.peek().and_then(|r| r.ok()), Some(1));

        let late = p.then(|fragile| Ok(fragile.id + 1));
        assert_eq!(late.peek().and_then(|r| r.ok()), Some(2));
    }
}
