//! # Input composables
//!
//! Reactive views over input state. [`use_key_modifier`] exposes whether a
//! modifier key is held as a `Signal<Option<bool>>`, updated from the events
//! an [`EventTarget`] dispatches:
//!
//! ```rust
//! use hookwork_core::*;
//!
//! let target = EventTarget::new();
//! let ctrl = use_key_modifier(
//!     KeyModifier::Control,
//!     UseModifierOptions::default().target(Some(target.clone())),
//! );
//!
//! target.dispatch(&InputEvent::new(EventKind::KeyDown, ModifierState::CONTROL));
//! assert_eq!(ctrl.get(), Some(true));
//! ```
//!
//! The returned signal can be handed to `hookwork_shared::until` like any
//! other source.

pub mod events;
pub mod key_modifier;

pub use events::*;
pub use key_modifier::*;
