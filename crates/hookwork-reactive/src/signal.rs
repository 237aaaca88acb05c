use std::cell::RefCell;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::reactive::{self, SignalId};

pub type SubId = usize;

/// What kind of write produced a notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Change {
    /// The value was replaced through `set`.
    Set,
    /// The value was mutated in place through `update`.
    Mutated,
}

type Listener<T> = Rc<dyn Fn(&T, Change)>;

pub struct Signal<T: 'static>(Rc<RefCell<Inner<T>>>);

impl<T: 'static> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

struct Inner<T> {
    id: SignalId,
    value: T,
    version: u64,
    next_sub: SubId,
    subs: SmallVec<[(SubId, Listener<T>); 4]>,
}

impl<T: 'static> Signal<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(Inner {
            id: reactive::new_signal_id(),
            value,
            version: 0,
            next_sub: 0,
            subs: SmallVec::new(),
        })))
    }

    pub fn id(&self) -> SignalId {
        self.0.borrow().id
    }

    /// Tracked read: inside an observer the observer will re-run on writes.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        reactive::register_signal_read(self.id());
        self.get_untracked()
    }

    pub fn get_untracked(&self) -> T
    where
        T: Clone,
    {
        self.0.borrow().value.clone()
    }

    /// Tracked read by reference.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        reactive::register_signal_read(self.id());
        f(&self.0.borrow().value)
    }

    pub fn set(&self, v: T)
    where
        T: Clone,
    {
        {
            let mut inner = self.0.borrow_mut();
            inner.value = v;
            inner.version += 1;
        }
        self.notify(Change::Set);
    }

    pub fn update<F: FnOnce(&mut T)>(&self, f: F)
    where
        T: Clone,
    {
        {
            let mut inner = self.0.borrow_mut();
            f(&mut inner.value);
            inner.version += 1;
        }
        self.notify(Change::Mutated);
    }

    /// Number of writes since creation.
    pub fn version(&self) -> u64 {
        self.0.borrow().version
    }

    pub fn subscribe(&self, f: impl Fn(&T, Change) + 'static) -> SubId {
        let mut inner = self.0.borrow_mut();
        let id = inner.next_sub;
        inner.next_sub += 1;
        inner.subs.push((id, Rc::new(f)));
        id
    }

    /// Removes a listener. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubId) -> bool {
        let mut inner = self.0.borrow_mut();
        let before = inner.subs.len();
        inner.subs.retain(|(sid, _)| *sid != id);
        inner.subs.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.0.borrow().subs.len()
    }

    fn is_subscribed(&self, id: SubId) -> bool {
        self.0.borrow().subs.iter().any(|(sid, _)| *sid == id)
    }

    // Listeners run without the cell borrowed, so they may read the signal
    // and (un)subscribe. A listener removed mid-round is not called.
    fn notify(&self, change: Change)
    where
        T: Clone,
    {
        let (value, subs, id) = {
            let inner = self.0.borrow();
            let subs: SmallVec<[(SubId, Listener<T>); 4]> = inner.subs.iter().cloned().collect();
            (inner.value.clone(), subs, inner.id)
        };
        for (sid, s) in subs {
            if self.is_subscribed(sid) {
                s(&value, change);
            }
        }
        reactive::signal_changed(id);
    }
}

impl<T: std::fmt::Debug + 'static> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.0.borrow();
        f.debug_struct("Signal")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscribers", &inner.subs.len())
            .finish()
    }
}

pub fn signal<T: 'static>(t: T) -> Signal<T> {
    Signal::new(t)
}
