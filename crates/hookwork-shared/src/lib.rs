//! # Shared composables
//!
//! Building blocks on top of `hookwork-reactive`:
//!
//! - [`until`] — await a source until it satisfies a condition, with
//!   optional timeout and negation.
//! - [`promise_timeout`] — cancellable delay used by `until`'s timeout race.
//! - [`create_global_state`] — lazily created state shared by every caller.
//! - [`provide_local`] / [`inject_local`] — provide/inject that also works
//!   within the providing scope.
//!
//! Timeouts use tokio's timer, so waits with a timeout must be created and
//! polled inside a tokio runtime (a current-thread runtime is enough; the
//! futures here are `!Send`).

pub mod global_state;
pub mod inject_local;
pub mod timeout;
pub mod until;
pub mod value;

pub use global_state::*;
pub use inject_local::*;
pub use timeout::*;
pub use until::*;
pub use value::*;
