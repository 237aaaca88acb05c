use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use hookwork_reactive::{Error, Result};
use tokio::time::Sleep;

/// A delay that either resolves or fails once it elapses. Dropping it cancels
/// the underlying timer.
#[must_use = "futures do nothing unless awaited"]
pub struct Timeout {
    sleep: Option<Pin<Box<Sleep>>>,
    duration: Duration,
    throw_on_timeout: bool,
}

impl Timeout {
    /// A timeout that never elapses.
    pub fn never() -> Self {
        Self {
            sleep: None,
            duration: Duration::MAX,
            throw_on_timeout: false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.sleep.is_some()
    }

    pub fn duration(&self) -> Option<Duration> {
        self.sleep.as_ref().map(|_| self.duration)
    }

    /// Drops the timer; the future will never complete afterwards.
    pub fn disarm(&mut self) {
        self.sleep = None;
    }
}

/// Starts a `duration` timer.
///
/// Fails with [`Error::NoTimerRuntime`] when called outside a tokio runtime,
/// before any timer is created.
pub fn promise_timeout(duration: Duration, throw_on_timeout: bool) -> Result<Timeout> {
    tokio::runtime::Handle::try_current().map_err(|_| Error::NoTimerRuntime)?;
    Ok(Timeout {
        sleep: Some(Box::pin(tokio::time::sleep(duration))),
        duration,
        throw_on_timeout,
    })
}

impl Future for Timeout {
    type Output = Result<()>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let Some(sleep) = self.sleep.as_mut() else {
            return Poll::Pending;
        };
        if sleep.as_mut().poll(cx).is_pending() {
            return Poll::Pending;
        }
        self.sleep = None;
        if self.throw_on_timeout {
            Poll::Ready(Err(Error::Timeout(self.duration)))
        } else {
            Poll::Ready(Ok(()))
        }
    }
}

impl std::fmt::Debug for Timeout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timeout")
            .field("armed", &self.is_armed())
            .field("duration", &self.duration)
            .field("throw_on_timeout", &self.throw_on_timeout)
            .finish()
    }
}
