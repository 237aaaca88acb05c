use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A wait configured with `throw_on_timeout` ran out of time.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// A timeout was requested but no tokio runtime is running on this thread.
    #[error("a timeout needs a running tokio runtime on the current thread")]
    NoTimerRuntime,

    /// A scope-bound function was called with no current scope.
    #[error("`{0}` must be called inside a scope")]
    NoScope(&'static str),
}

impl Error {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
