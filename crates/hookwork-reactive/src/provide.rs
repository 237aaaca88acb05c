//! # Provide / inject
//!
//! Values provided on a [`Scope`] are visible to its descendants, looked up
//! by a typed [`InjectionKey`]. A scope does not see its own provides through
//! [`inject`]; `hookwork-shared`'s `inject_local` adds that.
//!
//! ```rust
//! use hookwork_reactive::*;
//!
//! const THEME: InjectionKey<&'static str> = InjectionKey::new("theme");
//!
//! let root = Scope::new();
//! root.run(|| provide(&THEME, "dark")).unwrap();
//!
//! let child = root.child();
//! let theme = child.run(|| inject(&THEME)).unwrap();
//! assert_eq!(theme, Some("dark"));
//! ```

use std::any::{Any, TypeId};
use std::marker::PhantomData;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::scope::{Scope, current_scope};

/// Typed key for provide/inject. Two keys match when both the name and the
/// value type agree.
pub struct InjectionKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> InjectionKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for InjectionKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for InjectionKey<T> {}

impl<T> std::fmt::Debug for InjectionKey<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InjectionKey({:?})", self.name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct ProvideKey {
    name: &'static str,
    ty: TypeId,
}

impl<T: 'static> InjectionKey<T> {
    pub(crate) fn erased(&self) -> ProvideKey {
        ProvideKey {
            name: self.name,
            ty: TypeId::of::<T>(),
        }
    }
}

fn downcast<T: Clone + 'static>(key: &InjectionKey<T>, value: &Rc<dyn Any>) -> Option<T> {
    let v = value.downcast_ref::<T>().cloned();
    if v.is_none() {
        log::warn!("inject: key '{}' holds a value of another type", key.name);
    }
    v
}

impl Scope {
    /// Makes `value` visible to descendants of this scope.
    pub fn provide<T: 'static>(&self, key: &InjectionKey<T>, value: T) {
        self.inner()
            .provides
            .borrow_mut()
            .insert(key.erased(), Rc::new(value));
    }

    /// Resolves `key` from the nearest ancestor that provides it.
    pub fn inject<T: Clone + 'static>(&self, key: &InjectionKey<T>) -> Option<T> {
        let erased = key.erased();
        let mut cursor = self.parent();
        while let Some(scope) = cursor {
            if let Some(v) = scope.inner().provides.borrow().get(&erased) {
                return downcast(key, v);
            }
            cursor = scope.parent();
        }
        None
    }

    /// Stores a value only this scope can read back through [`Scope::local`].
    pub fn set_local<T: 'static>(&self, key: &InjectionKey<T>, value: T) {
        self.inner()
            .locals
            .borrow_mut()
            .insert(key.erased(), Rc::new(value));
    }

    pub fn local<T: Clone + 'static>(&self, key: &InjectionKey<T>) -> Option<T> {
        self.inner()
            .locals
            .borrow()
            .get(&key.erased())
            .and_then(|v| downcast(key, v))
    }
}

/// Provides `value` on the current scope.
pub fn provide<T: 'static>(key: &InjectionKey<T>, value: T) -> Result<()> {
    let scope = current_scope().ok_or(Error::NoScope("provide"))?;
    scope.provide(key, value);
    Ok(())
}

/// Injects `key` from the ancestors of the current scope.
pub fn inject<T: Clone + 'static>(key: &InjectionKey<T>) -> Result<Option<T>> {
    let scope = current_scope().ok_or(Error::NoScope("inject"))?;
    Ok(scope.inject(key))
}
