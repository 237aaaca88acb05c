use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::provide::ProvideKey;

thread_local! {
    static CURRENT_SCOPE: RefCell<Option<Weak<ScopeInner>>> = const { RefCell::new(None) };
}

/// Owner of effect lifetimes. Disposers registered on a scope run when it is
/// disposed, children first.
pub struct Scope {
    inner: Rc<ScopeInner>,
}

pub(crate) struct ScopeInner {
    parent: Option<Weak<ScopeInner>>,
    disposers: RefCell<Vec<Box<dyn FnOnce()>>>,
    children: RefCell<Vec<Scope>>,
    pub(crate) provides: RefCell<HashMap<ProvideKey, Rc<dyn Any>>>,
    pub(crate) locals: RefCell<HashMap<ProvideKey, Rc<dyn Any>>>,
    disposed: Cell<bool>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope {
    /// A detached scope: it has no parent and is only disposed explicitly.
    pub fn new() -> Self {
        Self::with_parent(None)
    }

    fn with_parent(parent: Option<Weak<ScopeInner>>) -> Self {
        Self {
            inner: Rc::new(ScopeInner {
                parent,
                disposers: RefCell::new(Vec::new()),
                children: RefCell::new(Vec::new()),
                provides: RefCell::new(HashMap::new()),
                locals: RefCell::new(HashMap::new()),
                disposed: Cell::new(false),
            }),
        }
    }

    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        // Restores the previous scope on unwind too.
        struct Guard(Option<Weak<ScopeInner>>);
        impl Drop for Guard {
            fn drop(&mut self) {
                let prev = self.0.take();
                CURRENT_SCOPE.with(|current| *current.borrow_mut() = prev);
            }
        }
        let prev = CURRENT_SCOPE.with(|current| {
            current
                .borrow_mut()
                .replace(Rc::downgrade(&self.inner))
        });
        let _guard = Guard(prev);
        f()
    }

    pub fn add_disposer(&self, disposer: impl FnOnce() + 'static) {
        if self.inner.disposed.get() {
            log::warn!("Scope::add_disposer: scope already disposed; running disposer now");
            disposer();
            return;
        }
        self.inner.disposers.borrow_mut().push(Box::new(disposer));
    }

    /// A child scope, disposed together with this one.
    pub fn child(&self) -> Scope {
        let child = Scope::with_parent(Some(Rc::downgrade(&self.inner)));
        self.inner.children.borrow_mut().push(child.clone());
        child
    }

    pub fn parent(&self) -> Option<Scope> {
        self.inner
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|inner| Scope { inner })
    }

    /// Children still alive under this scope. Disposed children are removed.
    pub fn child_count(&self) -> usize {
        self.inner.children.borrow().len()
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    pub fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        if let Some(parent) = self.inner.parent.as_ref().and_then(Weak::upgrade) {
            parent
                .children
                .borrow_mut()
                .retain(|c| !Rc::ptr_eq(&c.inner, &self.inner));
        }
        let children = std::mem::take(&mut *self.inner.children.borrow_mut());
        for child in children {
            child.dispose();
        }

        let disposers = std::mem::take(&mut *self.inner.disposers.borrow_mut());
        log::trace!("scope: disposing with {} disposer(s)", disposers.len());
        for disposer in disposers {
            disposer();
        }
        self.inner.provides.borrow_mut().clear();
        self.inner.locals.borrow_mut().clear();
    }

    pub fn ptr_eq(&self, other: &Scope) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn inner(&self) -> &ScopeInner {
        &self.inner
    }
}

impl Clone for Scope {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("disposed", &self.inner.disposed.get())
            .field("disposers", &self.inner.disposers.borrow().len())
            .field("children", &self.inner.children.borrow().len())
            .finish()
    }
}

pub fn current_scope() -> Option<Scope> {
    CURRENT_SCOPE.with(|current| {
        current
            .borrow()
            .as_ref()
            .and_then(|weak| weak.upgrade().map(|inner| Scope { inner }))
    })
}

/// Registers `f` on the current scope. Returns false when there is none, in
/// which case `f` is dropped without running.
pub fn on_scope_dispose(f: impl FnOnce() + 'static) -> bool {
    match current_scope() {
        Some(scope) => {
            scope.add_disposer(f);
            true
        }
        None => false,
    }
}

impl Drop for ScopeInner {
    fn drop(&mut self) {
        if self.disposed.get() {
            return;
        }
        let children = std::mem::take(&mut *self.children.borrow_mut());
        for child in children {
            child.dispose();
        }

        let disposers = std::mem::take(&mut *self.disposers.borrow_mut());
        for disposer in disposers {
            disposer();
        }
    }
}
