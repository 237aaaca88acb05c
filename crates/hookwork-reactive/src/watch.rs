//! # Watching sources
//!
//! [`watch`] turns any [`Source`] into change callbacks:
//!
//! - `Source::Value` never changes; watching it installs nothing.
//! - `Source::Signal` subscribes to the signal directly.
//! - `Source::Getter` runs the getter as a dependency-tracked observer and
//!   re-evaluates it whenever a signal it read is written.
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use hookwork_reactive::*;
//!
//! let count = signal(0);
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let handle = watch(&Source::from(&count), {
//!     let seen = seen.clone();
//!     move |v: &i32| seen.borrow_mut().push(*v)
//! }, WatchOptions::default());
//!
//! count.set(1);
//! count.set(1); // equal value: shallow watchers stay quiet
//! count.set(2);
//! handle.stop();
//! count.set(3);
//! assert_eq!(*seen.borrow(), vec![1, 2]);
//! ```

use std::cell::{Cell, OnceCell, RefCell};
use std::rc::Rc;

use crate::effects::Dispose;
use crate::reactive;
use crate::scheduler::{self, JobKey};
use crate::signal::Signal;

/// When a watcher's callback runs relative to the write that triggered it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Flush {
    /// Inside the write, in emission order.
    #[default]
    Sync,
    /// On the next scheduler flush; writes in between coalesce into one
    /// callback carrying the latest value.
    Deferred,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WatchOptions {
    pub flush: Flush,
    /// Fire on every write, including writes of an equal value. Shallow
    /// watchers fire when a write, `set` or `update`, leaves a value that
    /// differs from the last one seen.
    pub deep: bool,
    /// Run the callback with the current value before `watch` returns.
    pub immediate: bool,
}

impl WatchOptions {
    pub fn flush(mut self, flush: Flush) -> Self {
        self.flush = flush;
        self
    }

    pub fn deep(mut self, deep: bool) -> Self {
        self.deep = deep;
        self
    }

    pub fn immediate(mut self, immediate: bool) -> Self {
        self.immediate = immediate;
        self
    }
}

/// Something a watcher can observe.
pub enum Source<T: 'static> {
    Value(T),
    Getter(Rc<dyn Fn() -> T>),
    Signal(Signal<T>),
}

impl<T: Clone + 'static> Clone for Source<T> {
    fn clone(&self) -> Self {
        match self {
            Source::Value(v) => Source::Value(v.clone()),
            Source::Getter(f) => Source::Getter(f.clone()),
            Source::Signal(s) => Source::Signal(s.clone()),
        }
    }
}

impl<T: 'static> From<Signal<T>> for Source<T> {
    fn from(s: Signal<T>) -> Self {
        Source::Signal(s)
    }
}

impl<T: 'static> From<&Signal<T>> for Source<T> {
    fn from(s: &Signal<T>) -> Self {
        Source::Signal(s.clone())
    }
}

impl<T: Clone + 'static> Source<T> {
    pub fn value(v: T) -> Self {
        Source::Value(v)
    }

    pub fn getter(f: impl Fn() -> T + 'static) -> Self {
        Source::Getter(Rc::new(f))
    }

    /// Current value, read without registering a dependency.
    pub fn current(&self) -> T {
        reactive::untracked(|| self.tracked())
    }

    /// Current value, registering a dependency when called inside an observer.
    pub fn tracked(&self) -> T {
        match self {
            Source::Value(v) => v.clone(),
            Source::Getter(f) => f(),
            Source::Signal(s) => s.get(),
        }
    }

    pub fn is_reactive(&self) -> bool {
        !matches!(self, Source::Value(_))
    }

    /// Joins two sources into one that changes when either side does.
    pub fn zip<U: Clone + 'static>(&self, other: &Source<U>) -> Source<(T, U)> {
        match (self, other) {
            (Source::Value(a), Source::Value(b)) => Source::Value((a.clone(), b.clone())),
            _ => {
                let (a, b) = (self.clone(), other.clone());
                Source::getter(move || (a.tracked(), b.tracked()))
            }
        }
    }
}

impl<T: std::fmt::Debug + Clone + 'static> std::fmt::Debug for Source<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Source::Getter(_) => f.write_str("Getter(..)"),
            Source::Signal(s) => f.debug_tuple("Signal").field(s).finish(),
        }
    }
}

/// Stops a watcher. Clones share the same registration; stopping twice is a
/// no-op.
#[derive(Clone, Debug)]
pub struct WatchHandle(Dispose);

impl WatchHandle {
    pub fn stop(&self) {
        self.0.run();
    }

    pub fn is_stopped(&self) -> bool {
        self.0.is_done()
    }
}

struct Watcher<T: 'static> {
    last: RefCell<T>,
    callback: RefCell<Box<dyn FnMut(&T)>>,
    pending: RefCell<Option<T>>,
    stopped: Cell<bool>,
    options: WatchOptions,
    job: JobKey,
}

impl<T: Clone + PartialEq + 'static> Watcher<T> {
    fn new(initial: T, callback: Box<dyn FnMut(&T)>, options: WatchOptions) -> Rc<Self> {
        Rc::new(Self {
            last: RefCell::new(initial),
            callback: RefCell::new(callback),
            pending: RefCell::new(None),
            stopped: Cell::new(false),
            options,
            job: scheduler::new_job_key(),
        })
    }

    fn deliver(self: &Rc<Self>, v: &T) {
        if self.stopped.get() {
            return;
        }
        match self.options.flush {
            Flush::Sync => self.settle(v.clone()),
            Flush::Deferred => {
                *self.pending.borrow_mut() = Some(v.clone());
                let this = Rc::clone(self);
                scheduler::queue_job(Some(self.job), move || this.flush_pending());
            }
        }
    }

    fn flush_pending(&self) {
        let pending = self.pending.borrow_mut().take();
        if let Some(v) = pending
            && !self.stopped.get()
        {
            self.settle(v);
        }
    }

    // `last` tracks every value seen, fired or not.
    fn settle(&self, v: T) {
        let fire = self.options.deep || *self.last.borrow() != v;
        *self.last.borrow_mut() = v.clone();
        if fire {
            self.fire(&v);
        }
    }

    fn fire(&self, v: &T) {
        match self.callback.try_borrow_mut() {
            Ok(mut cb) => cb(v),
            Err(_) => {
                log::warn!("watch: callback re-entered through its own source; notification skipped")
            }
        }
    }
}

/// Calls `callback` when `source` changes, according to `options`.
pub fn watch<T: Clone + PartialEq + 'static>(
    source: &Source<T>,
    callback: impl FnMut(&T) + 'static,
    options: WatchOptions,
) -> WatchHandle {
    let callback: Box<dyn FnMut(&T)> = Box::new(callback);
    let (watcher, dispose) = match source {
        Source::Value(v) => {
            let watcher = Watcher::new(v.clone(), callback, options);
            let dispose = Dispose::new({
                let watcher = watcher.clone();
                move || watcher.stopped.set(true)
            });
            (watcher, dispose)
        }
        Source::Signal(sig) => {
            let watcher = Watcher::new(sig.get_untracked(), callback, options);
            let id = sig.subscribe({
                let watcher = watcher.clone();
                move |v, _| watcher.deliver(v)
            });
            let dispose = Dispose::new({
                let watcher = watcher.clone();
                let sig = sig.clone();
                move || {
                    watcher.stopped.set(true);
                    sig.unsubscribe(id);
                    log::trace!("watch: stopped signal watcher");
                }
            });
            (watcher, dispose)
        }
        Source::Getter(getter) => {
            let slot: Rc<OnceCell<Rc<Watcher<T>>>> = Rc::new(OnceCell::new());
            let first: Rc<RefCell<Option<T>>> = Rc::new(RefCell::new(None));
            let obs = reactive::new_observer({
                let getter = getter.clone();
                let slot = slot.clone();
                let first = first.clone();
                move || {
                    let v = getter();
                    match slot.get() {
                        Some(watcher) => {
                            reactive::untracked(|| watcher.deliver(&v))
                        }
                        None => *first.borrow_mut() = Some(v),
                    }
                }
            });
            reactive::run_observer_now(obs);
            let initial = first
                .borrow_mut()
                .take()
                .unwrap_or_else(|| reactive::untracked(|| getter()));
            let watcher = Watcher::new(initial, callback, options);
            let _ = slot.set(watcher.clone());
            let dispose = Dispose::new({
                let watcher = watcher.clone();
                move || {
                    watcher.stopped.set(true);
                    reactive::remove_observer(obs);
                    log::trace!("watch: stopped getter watcher");
                }
            });
            (watcher, dispose)
        }
    };
    log::debug!(
        "watch: started (reactive={}, flush={:?}, deep={})",
        source.is_reactive(),
        options.flush,
        options.deep
    );

    if options.immediate {
        let current = watcher.last.borrow().clone();
        reactive::untracked(|| watcher.fire(&current));
    }
    WatchHandle(dispose)
}
