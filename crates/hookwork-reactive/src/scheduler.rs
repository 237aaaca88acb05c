//! # Scheduler
//!
//! A per-thread job queue that stands in for the host's task queue.
//!
//! Deferred watchers queue their work here instead of running inside the
//! mutation; work queued for "the next tick" lands here too. Nothing runs the
//! queue on its own: it is drained by [`flush`], by [`next_tick`], and by the
//! futures in this workspace, which flush before inspecting their state.
//! Queuing a job wakes every task that registered interest through
//! [`register_waker`], so a pending future is polled (and flushes) soon after.

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, Waker};

/// Identifies a keyed job so that repeated queuing before a flush coalesces.
pub type JobKey = u64;

thread_local! {
    static QUEUE: RefCell<JobQueue> = RefCell::new(JobQueue::default());
}

#[derive(Default)]
struct JobQueue {
    jobs: VecDeque<(Option<JobKey>, Box<dyn FnOnce()>)>,
    queued: HashSet<JobKey>,
    post_flush: Vec<Box<dyn FnOnce()>>,
    wakers: Vec<Waker>,
    next_key: JobKey,
    flushing: bool,
}

/// Hands out a key unique to this thread.
pub fn new_job_key() -> JobKey {
    QUEUE.with(|q| {
        let mut q = q.borrow_mut();
        q.next_key += 1;
        q.next_key
    })
}

/// Queues `job`. A keyed job already waiting in the queue is not queued again.
pub fn queue_job(key: Option<JobKey>, job: impl FnOnce() + 'static) {
    let wakers = QUEUE.with(|q| {
        let mut q = q.borrow_mut();
        if let Some(k) = key
            && !q.queued.insert(k)
        {
            return Vec::new();
        }
        q.jobs.push_back((key, Box::new(job)));
        std::mem::take(&mut q.wakers)
    });
    wakers.into_iter().for_each(Waker::wake);
}

/// Runs `job` after the regular jobs of the next flush.
pub fn queue_post_flush(job: impl FnOnce() + 'static) {
    let wakers = QUEUE.with(|q| {
        let mut q = q.borrow_mut();
        q.post_flush.push(Box::new(job));
        std::mem::take(&mut q.wakers)
    });
    wakers.into_iter().for_each(Waker::wake);
}

pub fn register_waker(waker: &Waker) {
    QUEUE.with(|q| {
        let mut q = q.borrow_mut();
        if !q.wakers.iter().any(|w| w.will_wake(waker)) {
            q.wakers.push(waker.clone());
        }
    });
}

/// Wakers waiting for the next queued job.
pub fn waker_count() -> usize {
    QUEUE.with(|q| q.borrow().wakers.len())
}

pub fn has_pending() -> bool {
    QUEUE.with(|q| {
        let q = q.borrow();
        !q.jobs.is_empty() || !q.post_flush.is_empty()
    })
}

/// Drains the queue, including jobs queued while draining. Returns how many
/// jobs ran. Nested calls from inside a job are no-ops.
pub fn flush() -> usize {
    let entered = QUEUE.with(|q| {
        let mut q = q.borrow_mut();
        !std::mem::replace(&mut q.flushing, true)
    });
    if !entered {
        return 0;
    }

    struct Reset;
    impl Drop for Reset {
        fn drop(&mut self) {
            QUEUE.with(|q| q.borrow_mut().flushing = false);
        }
    }
    let _reset = Reset;

    let mut ran = 0;
    loop {
        let job = QUEUE.with(|q| {
            let mut q = q.borrow_mut();
            match q.jobs.pop_front() {
                Some((key, job)) => {
                    if let Some(k) = key {
                        q.queued.remove(&k);
                    }
                    Some(job)
                }
                None => {
                    let post = std::mem::take(&mut q.post_flush);
                    if post.is_empty() {
                        None
                    } else {
                        q.jobs.extend(post.into_iter().map(|j| (None, j)));
                        q.jobs.pop_front().map(|(_, j)| j)
                    }
                }
            }
        });
        let Some(job) = job else {
            break;
        };
        job();
        ran += 1;
    }
    if ran > 0 {
        log::trace!("scheduler: flushed {ran} job(s)");
    }
    ran
}

/// Yields to the executor once, then flushes the queue.
pub fn next_tick() -> NextTick {
    NextTick { yielded: false }
}

#[derive(Debug)]
#[must_use = "futures do nothing unless awaited"]
pub struct NextTick {
    yielded: bool,
}

impl Future for NextTick {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if !self.yielded {
            self.yielded = true;
            cx.waker().wake_by_ref();
            return Poll::Pending;
        }
        flush();
        Poll::Ready(())
    }
}
