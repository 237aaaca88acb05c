//! # Signals, watchers and scopes
//!
//! Hookwork's reactive runtime is small and single-threaded. There are four
//! pieces:
//!
//! - `Signal<T>` — observable value cell with listeners.
//! - `watch` — turns a `Source` (plain value, getter, or signal) into change
//!   callbacks with a flush policy.
//! - `Scope` — owner of cleanups, plus provide/inject of typed values.
//! - `scheduler` — per-thread job queue used by deferred watchers and
//!   "next tick" work.
//!
//! ## Signals
//!
//! ```rust
//! use hookwork_reactive::*;
//!
//! let count = signal(0);
//! count.set(1);
//! count.update(|v| *v += 1);
//! assert_eq!(count.get(), 2);
//! ```
//!
//! `get()` participates in dependency tracking: a getter source that reads a
//! signal is re-evaluated when that signal is written.
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use hookwork_reactive::*;
//!
//! let first = signal("Jane".to_string());
//! let last = signal("Doe".to_string());
//! let full = Source::getter({
//!     let (first, last) = (first.clone(), last.clone());
//!     move || format!("{} {}", first.get(), last.get())
//! });
//!
//! let hits = Rc::new(Cell::new(0));
//! let _handle = watch(&full, {
//!     let hits = hits.clone();
//!     move |_: &String| hits.set(hits.get() + 1)
//! }, WatchOptions::default());
//!
//! last.set("Roe".to_string());
//! assert_eq!(hits.get(), 1);
//! assert_eq!(full.current(), "Jane Roe");
//! ```
//!
//! ## Scopes
//!
//! Work that must be undone later registers a disposer on the current scope
//! (`on_scope_dispose`). Disposing a scope runs its children's disposers,
//! then its own.
//!
//! Everything here is `!Send`; state lives on the thread that created it.

pub mod effects;
pub mod error;
pub mod provide;
pub mod reactive;
pub mod scheduler;
pub mod scope;
pub mod signal;
pub mod tests;
pub mod watch;

pub use effects::*;
pub use error::*;
pub use provide::*;
pub use scheduler::{NextTick, flush, next_tick};
pub use scope::*;
pub use signal::*;
pub use watch::*;
