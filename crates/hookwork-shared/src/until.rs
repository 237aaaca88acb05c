//! # Until
//!
//! One-shot, awaitable watch: wait until a source satisfies a condition.
//!
//! ```rust,no_run
//! use hookwork_reactive::signal;
//! use hookwork_shared::{UntilOptions, until};
//!
//! # async fn demo() -> hookwork_reactive::Result<()> {
//! let count = signal(0);
//!
//! let larger = until(&count).to_match(|v| *v > 7, UntilOptions::default())?;
//! count.set(8);
//! assert_eq!(larger.await?, 8);
//! # Ok(())
//! # }
//! ```
//!
//! Every matcher subscribes immediately and checks the current value before
//! any write, so a condition that already holds settles without waiting.
//! The returned [`Wait`] owns the subscription: it is released exactly once,
//! whether the wait matches, times out, or is dropped unfinished.

use std::cell::RefCell;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};
use std::time::Duration;

use hookwork_reactive::{
    Flush, Result, Signal, Source, WatchHandle, WatchOptions, scheduler, watch,
};

use crate::timeout::{Timeout, promise_timeout};
use crate::value::{NotANumber, Sequence, Truthy};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UntilOptions {
    /// Give up after this long. `None` waits forever.
    pub timeout: Option<Duration>,
    /// On timeout fail with `Error::Timeout` instead of resolving with the
    /// current value.
    pub throw_on_timeout: bool,
    pub flush: Flush,
    pub deep: bool,
}

impl UntilOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn throw_on_timeout(mut self, throw: bool) -> Self {
        self.throw_on_timeout = throw;
        self
    }

    pub fn flush(mut self, flush: Flush) -> Self {
        self.flush = flush;
        self
    }

    pub fn deep(mut self, deep: bool) -> Self {
        self.deep = deep;
        self
    }

    fn watch_options(&self) -> WatchOptions {
        WatchOptions {
            flush: self.flush,
            deep: self.deep,
            immediate: true,
        }
    }
}

/// Marker: the builder still offers `not()`.
#[derive(Clone, Copy, Debug)]
pub struct Negatable;

/// Marker: the builder came from `not()` and cannot be negated again.
#[derive(Clone, Copy, Debug)]
pub struct Negated;

/// Matcher builder returned by [`until`].
pub struct Until<T: 'static, N = Negatable> {
    source: Source<T>,
    is_not: bool,
    _polarity: PhantomData<N>,
}

/// Starts building a wait on `source`.
pub fn until<T: Clone + PartialEq + 'static>(source: impl Into<Source<T>>) -> Until<T> {
    Until {
        source: source.into(),
        is_not: false,
        _polarity: PhantomData,
    }
}

impl<T: Clone + PartialEq + 'static> Until<T, Negatable> {
    /// A fresh builder with the opposite polarity.
    #[allow(clippy::should_implement_trait)]
    pub fn not(&self) -> Until<T, Negated> {
        self.flipped()
    }
}

impl<T: Clone + PartialEq + 'static, N> Until<T, N> {
    pub fn is_negated(&self) -> bool {
        self.is_not
    }

    pub fn source(&self) -> &Source<T> {
        &self.source
    }

    pub(crate) fn flipped<M>(&self) -> Until<T, M> {
        Until {
            source: self.source.clone(),
            is_not: !self.is_not,
            _polarity: PhantomData,
        }
    }

    pub fn to_match(
        &self,
        mut condition: impl FnMut(&T) -> bool + 'static,
        options: UntilOptions,
    ) -> Result<Wait<T>> {
        let is_not = self.is_not;
        start(
            &self.source,
            self.source.clone(),
            move |v: &T| (condition(v) != is_not).then(|| v.clone()),
            options,
        )
    }

    pub fn to_be(&self, value: T, options: UntilOptions) -> Result<Wait<T>> {
        self.to_match(move |v| *v == value, options)
    }

    /// Waits until the source equals `target`, re-checking when either side
    /// changes.
    pub fn to_be_source(
        &self,
        target: impl Into<Source<T>>,
        options: UntilOptions,
    ) -> Result<Wait<T>> {
        let target = target.into();
        if !target.is_reactive() {
            return self.to_be(target.current(), options);
        }
        let is_not = self.is_not;
        start(
            &self.source.zip(&target),
            self.source.clone(),
            move |(a, b): &(T, T)| ((a == b) != is_not).then(|| a.clone()),
            options,
        )
    }

    pub fn to_be_signal(&self, target: &Signal<T>, options: UntilOptions) -> Result<Wait<T>> {
        self.to_be_source(target, options)
    }

    pub fn changed(&self, options: UntilOptions) -> Result<Wait<T>> {
        self.changed_times(1, options)
    }

    /// Settles on the `n`th notification after the call.
    pub fn changed_times(&self, n: usize, options: UntilOptions) -> Result<Wait<T>> {
        // The immediate check is not a change.
        let mut seen: Option<usize> = None;
        self.to_match(
            move |_| {
                let changes = seen.map_or(0, |c| c.saturating_add(1));
                seen = Some(changes);
                changes >= n
            },
            options,
        )
    }
}

impl<T: Truthy + Clone + PartialEq + 'static, N> Until<T, N> {
    pub fn to_be_truthy(&self, options: UntilOptions) -> Result<Wait<T>> {
        self.to_match(Truthy::is_truthy, options)
    }
}

impl<U: Clone + PartialEq + 'static, N> Until<Option<U>, N> {
    pub fn to_be_none(&self, options: UntilOptions) -> Result<Wait<Option<U>>> {
        self.to_match(Option::is_none, options)
    }
}

impl<T: NotANumber + Clone + PartialEq + 'static, N> Until<T, N> {
    pub fn to_be_nan(&self, options: UntilOptions) -> Result<Wait<T>> {
        self.to_match(NotANumber::is_not_a_number, options)
    }
}

impl<T, N> Until<T, N>
where
    T: Sequence + Clone + PartialEq + 'static,
    T::Item: Clone + PartialEq + 'static,
{
    pub fn to_contains(&self, item: T::Item, options: UntilOptions) -> Result<Wait<T>> {
        self.to_match(move |seq| seq.contains_item(&item), options)
    }

    /// Waits until the sequence contains the target's value at the time of
    /// each check. Writes to the target alone do not trigger a check.
    pub fn to_contains_source(
        &self,
        target: impl Into<Source<T::Item>>,
        options: UntilOptions,
    ) -> Result<Wait<T>> {
        let target = target.into();
        self.to_match(move |seq| seq.contains_item(&target.current()), options)
    }
}

/// Where a [`Wait`] is in its life.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Watching,
    Matched,
    TimedOut,
}

struct Shared<T> {
    phase: Phase,
    value: Option<T>,
    waker: Option<Waker>,
}

type HandleSlot = Rc<RefCell<Option<WatchHandle>>>;

/// Future returned by the matchers. Resolves with the matching value, or on
/// timeout with the source's value at that moment (or `Error::Timeout` when
/// configured to throw).
#[must_use = "futures do nothing unless awaited"]
pub struct Wait<T: 'static> {
    shared: Rc<RefCell<Shared<T>>>,
    source: Source<T>,
    handle: HandleSlot,
    timer: Timeout,
    // Only deferred waits settle from a scheduler flush.
    deferred: bool,
}

// Nothing in a `Wait` is ever pinned structurally.
impl<T: 'static> Unpin for Wait<T> {}

fn start<W, T>(
    watched: &Source<W>,
    source: Source<T>,
    mut matcher: impl FnMut(&W) -> Option<T> + 'static,
    options: UntilOptions,
) -> Result<Wait<T>>
where
    W: Clone + PartialEq + 'static,
    T: Clone + 'static,
{
    // Misuse fails here, before anything is subscribed.
    let timer = match options.timeout {
        Some(d) => promise_timeout(d, options.throw_on_timeout)?,
        None => Timeout::never(),
    };

    let shared = Rc::new(RefCell::new(Shared {
        phase: Phase::Watching,
        value: None,
        waker: None,
    }));
    let slot: HandleSlot = Rc::new(RefCell::new(None));

    let handle = watch(
        watched,
        {
            let shared = shared.clone();
            let slot = slot.clone();
            move |v: &W| {
                if shared.borrow().phase != Phase::Watching {
                    return;
                }
                let Some(out) = matcher(v) else {
                    return;
                };
                let waker = {
                    let mut s = shared.borrow_mut();
                    s.phase = Phase::Matched;
                    s.value = Some(out);
                    s.waker.take()
                };
                log::debug!("until: matched");
                release_from_callback(&slot);
                if let Some(w) = waker {
                    w.wake();
                }
            }
        },
        options.watch_options(),
    );
    *slot.borrow_mut() = Some(handle);

    Ok(Wait {
        shared,
        source,
        handle: slot,
        timer,
        deferred: options.flush == Flush::Deferred,
    })
}

// A match found by the immediate check happens inside `watch` itself, before
// the handle exists; the release then waits for the next scheduler flush.
fn release_from_callback(slot: &HandleSlot) {
    let handle = slot.borrow_mut().take();
    match handle {
        Some(h) => h.stop(),
        None => {
            let slot = slot.clone();
            scheduler::queue_post_flush(move || {
                let handle = slot.borrow_mut().take();
                if let Some(h) = handle {
                    h.stop();
                }
            });
        }
    }
}

impl<T: 'static> Wait<T> {
    pub fn phase(&self) -> Phase {
        self.shared.borrow().phase
    }

    pub fn is_settled(&self) -> bool {
        self.phase() != Phase::Watching
    }

    /// True while the underlying watcher is still registered.
    pub fn is_subscribed(&self) -> bool {
        self.handle
            .borrow()
            .as_ref()
            .is_some_and(|h| !h.is_stopped())
    }

    fn release(&mut self) {
        let handle = self.handle.borrow_mut().take();
        if let Some(h) = handle {
            h.stop();
        }
        self.timer.disarm();
    }
}

impl<T: Clone + 'static> Future for Wait<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        scheduler::flush();
        let this = &mut *self;

        let phase = this.shared.borrow().phase;
        match phase {
            Phase::Matched => {
                let value = this.shared.borrow_mut().value.take();
                this.release();
                return match value {
                    Some(v) => Poll::Ready(Ok(v)),
                    None => Poll::Pending,
                };
            }
            Phase::TimedOut => return Poll::Pending,
            Phase::Watching => {}
        }

        if let Poll::Ready(elapsed) = Pin::new(&mut this.timer).poll(cx) {
            this.shared.borrow_mut().phase = Phase::TimedOut;
            this.release();
            log::debug!("until: timed out (throw={})", elapsed.is_err());
            return Poll::Ready(elapsed.map(|()| this.source.current()));
        }

        this.shared.borrow_mut().waker = Some(cx.waker().clone());
        if this.deferred {
            scheduler::register_waker(cx.waker());
        }
        Poll::Pending
    }
}

impl<T: 'static> Drop for Wait<T> {
    fn drop(&mut self) {
        if self.is_subscribed() {
            log::trace!("until: dropped while watching; releasing watcher");
        }
        self.release();
    }
}

impl<T: 'static> std::fmt::Debug for Wait<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wait")
            .field("phase", &self.phase())
            .field("subscribed", &self.is_subscribed())
            .field("timer", &self.timer)
            .finish()
    }
}
