//! `inject` that also sees values provided on the current scope.
//!
//! Plain [`inject`](hookwork_reactive::inject) only looks at ancestors, so a
//! scope cannot read back what it just provided. [`provide_local`] records
//! the value for the providing scope as well, and [`inject_local`] checks that
//! record first.
//!
//! ```rust
//! use hookwork_reactive::{InjectionKey, Scope};
//! use hookwork_shared::{inject_local, provide_local};
//!
//! const KEY: InjectionKey<i32> = InjectionKey::new("MyInjectionKey");
//!
//! let scope = Scope::new();
//! let v = scope.run(|| {
//!     provide_local(&KEY, 1)?;
//!     inject_local(&KEY)
//! });
//! assert_eq!(v, Ok(Some(1)));
//! ```

use hookwork_reactive::{Error, InjectionKey, Result, current_scope};

/// Provides `value` to descendants and to [`inject_local`] calls in the
/// current scope.
pub fn provide_local<T: Clone + 'static>(key: &InjectionKey<T>, value: T) -> Result<()> {
    let scope = current_scope().ok_or(Error::NoScope("provide_local"))?;
    scope.set_local(key, value.clone());
    scope.provide(key, value);
    Ok(())
}

/// Resolves `key` from the current scope's local provides, then from its
/// ancestors.
pub fn inject_local<T: Clone + 'static>(key: &InjectionKey<T>) -> Result<Option<T>> {
    let scope = current_scope().ok_or(Error::NoScope("inject_local"))?;
    if let Some(v) = scope.local(key) {
        return Ok(Some(v));
    }
    Ok(scope.inject(key))
}

/// [`inject_local`] with a fallback for keys nobody provided.
pub fn inject_local_or<T: Clone + 'static>(key: &InjectionKey<T>, default: T) -> Result<T> {
    Ok(inject_local(key)?.unwrap_or(default))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookwork_reactive::{Scope, inject, provide};

    const COLOR: InjectionKey<&'static str> = InjectionKey::new("color");

    #[test]
    fn plain_inject_misses_own_provide() {
        let scope = Scope::new();
        scope.run(|| {
            provide(&COLOR, "red").unwrap();
            assert_eq!(inject(&COLOR).unwrap(), None);
            assert_eq!(inject_local(&COLOR).unwrap(), None);
        });
    }

    #[test]
    fn local_provide_is_visible_to_self_and_children() {
        let scope = Scope::new();
        scope.run(|| provide_local(&COLOR, "red")).unwrap();
        assert_eq!(scope.run(|| inject_local(&COLOR)), Ok(Some("red")));

        let child = scope.child();
        assert_eq!(child.run(|| inject_local(&COLOR)), Ok(Some("red")));
        assert_eq!(child.run(|| inject(&COLOR)), Ok(Some("red")));
    }

    #[test]
    fn local_value_shadows_ancestors() {
        let root = Scope::new();
        root.provide(&COLOR, "red");
        let child = root.child();
        child.run(|| {
            assert_eq!(inject_local(&COLOR), Ok(Some("red")));
            provide_local(&COLOR, "blue").unwrap();
            assert_eq!(inject_local(&COLOR), Ok(Some("blue")));
        });
    }

    #[test]
    fn fallback_when_missing() {
        let scope = Scope::new();
        assert_eq!(scope.run(|| inject_local_or(&COLOR, "none")), Ok("none"));
    }

    #[test]
    fn fails_outside_scope() {
        assert_eq!(inject_local(&COLOR), Err(Error::NoScope("inject_local")));
        assert_eq!(
            provide_local(&COLOR, "red"),
            Err(Error::NoScope("provide_local"))
        );
    }
}
