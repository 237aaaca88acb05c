#[cfg(test)]
mod tests {
    use crate::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn recorder<T: Clone + 'static>() -> (Rc<RefCell<Vec<T>>>, impl FnMut(&T) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |v: &T| sink.borrow_mut().push(v.clone()))
    }

    #[test]
    fn test_signal_basic() {
        let sig = signal(42);
        assert_eq!(sig.get(), 42);

        sig.set(100);
        assert_eq!(sig.get(), 100);

        sig.update(|v| *v += 1);
        assert_eq!(sig.get(), 101);
        assert_eq!(sig.version(), 2);
    }

    #[test]
    fn test_signal_subscription() {
        let sig = signal(0);
        let called = Rc::new(RefCell::new(Vec::new()));

        let called_clone = called.clone();
        let id = sig.subscribe(move |v, change| {
            called_clone.borrow_mut().push((*v, change));
        });

        sig.set(42);
        sig.update(|v| *v += 1);
        assert_eq!(
            *called.borrow(),
            vec![(42, Change::Set), (43, Change::Mutated)]
        );

        assert!(sig.unsubscribe(id));
        assert!(!sig.unsubscribe(id));
        sig.set(7);
        assert_eq!(called.borrow().len(), 2);
    }

    #[test]
    fn test_listener_removed_mid_round_is_skipped() {
        let sig = signal(0);
        let second_calls = Rc::new(Cell::new(0));
        let second_id = Rc::new(Cell::new(usize::MAX));

        sig.subscribe({
            let sig = sig.clone();
            let second_id = second_id.clone();
            move |_, _| {
                sig.unsubscribe(second_id.get());
            }
        });
        second_id.set(sig.subscribe({
            let second_calls = second_calls.clone();
            move |_, _| second_calls.set(second_calls.get() + 1)
        }));

        sig.set(1);
        assert_eq!(second_calls.get(), 0);
        assert_eq!(sig.subscriber_count(), 1);
    }

    #[test]
    fn test_scope_drop_runs_disposers() {
        let cleaned_up = Rc::new(Cell::new(false));

        {
            let scope = Scope::new();
            let cleaned_up_clone = cleaned_up.clone();
            scope.add_disposer(move || cleaned_up_clone.set(true));

            assert!(!cleaned_up.get());
        } // last handle drops here

        assert!(cleaned_up.get());
    }

    #[test]
    fn test_scope_explicit_dispose() {
        let order = Rc::new(RefCell::new(Vec::new()));

        let scope = Scope::new();
        let child = scope.child();
        scope.add_disposer({
            let order = order.clone();
            move || order.borrow_mut().push("parent")
        });
        child.add_disposer({
            let order = order.clone();
            move || order.borrow_mut().push("child")
        });

        scope.dispose();
        scope.dispose();
        assert_eq!(*order.borrow(), vec!["child", "parent"]);
        assert!(child.is_disposed());
    }

    #[test]
    fn test_disposed_children_leave_parent() {
        let root = Scope::new();
        for _ in 0..100 {
            let child = root.child();
            child.dispose();
        }
        assert_eq!(root.child_count(), 0);

        let kept = root.child();
        let grandchild = kept.child();
        grandchild.dispose();
        assert_eq!(root.child_count(), 1);
        assert_eq!(kept.child_count(), 0);

        root.dispose();
        assert!(kept.is_disposed());
        assert_eq!(root.child_count(), 0);
    }

    #[test]
    fn test_on_scope_dispose_needs_scope() {
        assert!(!on_scope_dispose(|| {}));

        let ran = Rc::new(Cell::new(false));
        let scope = Scope::new();
        let registered = scope.run(|| {
            let ran = ran.clone();
            on_scope_dispose(move || ran.set(true))
        });
        assert!(registered);
        assert!(current_scope().is_none());
        scope.dispose();
        assert!(ran.get());
    }

    #[test]
    fn test_inject_sees_ancestors_not_self() {
        const NAME: InjectionKey<String> = InjectionKey::new("name");

        let root = Scope::new();
        root.provide(&NAME, "root".to_string());
        assert_eq!(root.inject(&NAME), None);

        let child = root.child();
        let grandchild = child.child();
        assert_eq!(grandchild.inject(&NAME), Some("root".to_string()));

        child.provide(&NAME, "child".to_string());
        assert_eq!(grandchild.inject(&NAME), Some("child".to_string()));
    }

    #[test]
    fn test_injection_key_is_typed() {
        const AS_STR: InjectionKey<&'static str> = InjectionKey::new("value");
        const AS_INT: InjectionKey<i32> = InjectionKey::new("value");

        let root = Scope::new();
        root.provide(&AS_INT, 3);
        let child = root.child();
        assert_eq!(child.inject(&AS_INT), Some(3));
        assert_eq!(child.inject(&AS_STR), None);
    }

    #[test]
    fn test_provide_outside_scope_fails() {
        const KEY: InjectionKey<u8> = InjectionKey::new("k");
        assert_eq!(provide(&KEY, 1), Err(Error::NoScope("provide")));
        assert_eq!(inject(&KEY), Err(Error::NoScope("inject")));
    }

    #[test]
    fn test_dispose_runs_once() {
        let count = Rc::new(Cell::new(0));
        let d = Dispose::new({
            let count = count.clone();
            move || count.set(count.get() + 1)
        });
        let d2 = d.clone();
        d.run();
        d2.run();
        assert_eq!(count.get(), 1);
        assert!(d2.is_done());
    }

    #[test]
    fn test_watch_sync_shallow_fires_on_distinct_values() {
        let sig = signal(vec![1]);
        let (seen, cb) = recorder::<Vec<i32>>();
        let handle = watch(&Source::from(&sig), cb, WatchOptions::default());

        sig.update(|v| v.push(2));
        sig.set(vec![1, 2]);
        sig.update(|v| v.retain(|x| *x != 99));
        sig.set(vec![3]);
        assert_eq!(*seen.borrow(), vec![vec![1, 2], vec![3]]);

        handle.stop();
        assert!(handle.is_stopped());
        assert_eq!(sig.subscriber_count(), 0);
    }

    #[test]
    fn test_watch_shallow_sees_scalar_updates() {
        let count = signal(0);
        let (seen, cb) = recorder::<i32>();
        let _handle = watch(&Source::from(&count), cb, WatchOptions::default());

        count.update(|v| *v += 1);
        count.update(|v| *v += 0);
        count.update(|v| *v += 1);
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_watch_deep_sees_mutations() {
        let sig = signal(vec![1]);
        let (seen, cb) = recorder::<Vec<i32>>();
        let _handle = watch(&Source::from(&sig), cb, WatchOptions::default().deep(true));

        sig.update(|v| v.push(2));
        sig.set(vec![1, 2]);
        assert_eq!(*seen.borrow(), vec![vec![1, 2], vec![1, 2]]);
    }

    #[test]
    fn test_watch_immediate() {
        let sig = signal(5);
        let (seen, cb) = recorder::<i32>();
        let _handle = watch(&Source::from(&sig), cb, WatchOptions::default().immediate(true));
        sig.set(6);
        assert_eq!(*seen.borrow(), vec![5, 6]);
    }

    #[test]
    fn test_watch_deferred_coalesces() {
        let sig = signal(0);
        let (seen, cb) = recorder::<i32>();
        let _handle = watch(
            &Source::from(&sig),
            cb,
            WatchOptions::default().flush(Flush::Deferred),
        );

        sig.set(1);
        sig.set(2);
        sig.set(3);
        assert!(seen.borrow().is_empty());
        assert!(scheduler::has_pending());

        assert_eq!(flush(), 1);
        assert_eq!(*seen.borrow(), vec![3]);
        assert_eq!(flush(), 0);
    }

    #[test]
    fn test_watch_deferred_back_to_same_value_is_quiet() {
        let sig = signal(0);
        let (seen, cb) = recorder::<i32>();
        let _handle = watch(
            &Source::from(&sig),
            cb,
            WatchOptions::default().flush(Flush::Deferred),
        );

        sig.set(1);
        sig.set(0);
        flush();
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_watch_deferred_stopped_before_flush() {
        let sig = signal(0);
        let (seen, cb) = recorder::<i32>();
        let handle = watch(
            &Source::from(&sig),
            cb,
            WatchOptions::default().flush(Flush::Deferred),
        );
        sig.set(1);
        handle.stop();
        flush();
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_watch_getter_tracks_dependencies() {
        let a = signal(1);
        let b = signal(10);
        let sum = Source::getter({
            let (a, b) = (a.clone(), b.clone());
            move || a.get() + b.get()
        });
        let (seen, cb) = recorder::<i32>();
        let before = reactive::observer_count();
        let handle = watch(&sum, cb, WatchOptions::default());
        assert_eq!(reactive::observer_count(), before + 1);

        a.set(2);
        b.set(10);
        b.set(20);
        assert_eq!(*seen.borrow(), vec![12, 22]);

        handle.stop();
        assert_eq!(reactive::observer_count(), before);
        a.set(5);
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_watch_zip_fires_on_either_side() {
        let a = signal(1);
        let b = signal(2);
        let pair = Source::from(&a).zip(&Source::from(&b));
        let (seen, cb) = recorder::<(i32, i32)>();
        let _handle = watch(&pair, cb, WatchOptions::default());

        a.set(2);
        b.set(3);
        assert_eq!(*seen.borrow(), vec![(2, 2), (2, 3)]);
    }

    #[test]
    fn test_watch_plain_value_only_immediate() {
        let (seen, cb) = recorder::<&str>();
        let handle = watch(
            &Source::value("static"),
            cb,
            WatchOptions::default().immediate(true),
        );
        assert_eq!(*seen.borrow(), vec!["static"]);
        handle.stop();
        assert!(handle.is_stopped());
    }

    #[test]
    fn test_watch_reentrant_write_is_skipped() {
        let sig = signal(0);
        let calls = Rc::new(Cell::new(0));
        let _handle = watch(
            &Source::from(&sig),
            {
                let sig = sig.clone();
                let calls = calls.clone();
                move |v: &i32| {
                    calls.set(calls.get() + 1);
                    if *v < 10 {
                        sig.set(v + 10);
                    }
                }
            },
            WatchOptions::default(),
        );
        sig.set(1);
        assert_eq!(calls.get(), 1);
        assert_eq!(sig.get(), 11);
    }

    #[test]
    fn test_post_flush_runs_after_jobs() {
        let order = Rc::new(RefCell::new(Vec::new()));
        scheduler::queue_post_flush({
            let order = order.clone();
            move || order.borrow_mut().push("post")
        });
        scheduler::queue_job(None, {
            let order = order.clone();
            move || order.borrow_mut().push("job")
        });
        assert_eq!(flush(), 2);
        assert_eq!(*order.borrow(), vec!["job", "post"]);
    }

    #[test]
    fn test_keyed_jobs_dedupe() {
        let count = Rc::new(Cell::new(0));
        let key = scheduler::new_job_key();
        for _ in 0..3 {
            let count = count.clone();
            scheduler::queue_job(Some(key), move || count.set(count.get() + 1));
        }
        flush();
        assert_eq!(count.get(), 1);
    }
}
