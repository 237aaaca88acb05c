use std::cell::RefCell;
use std::rc::Rc;

use bitflags::bitflags;

bitflags! {
    /// Modifier keys reported as held by an input event.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ModifierState: u16 {
        const ALT         = 1 << 0;
        const ALT_GRAPH   = 1 << 1;
        const CAPS_LOCK   = 1 << 2;
        const CONTROL     = 1 << 3;
        const FN          = 1 << 4;
        const FN_LOCK     = 1 << 5;
        const META        = 1 << 6;
        const NUM_LOCK    = 1 << 7;
        const SCROLL_LOCK = 1 << 8;
        const SHIFT       = 1 << 9;
        const SYMBOL      = 1 << 10;
        const SYMBOL_LOCK = 1 << 11;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    MouseDown,
    MouseUp,
    KeyDown,
    KeyUp,
    PointerMove,
    Wheel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputEvent {
    pub kind: EventKind,
    /// `None` for events that carry no modifier information.
    pub modifiers: Option<ModifierState>,
}

impl InputEvent {
    pub fn new(kind: EventKind, modifiers: ModifierState) -> Self {
        Self {
            kind,
            modifiers: Some(modifiers),
        }
    }

    pub fn without_modifiers(kind: EventKind) -> Self {
        Self {
            kind,
            modifiers: None,
        }
    }
}

pub type ListenerId = u64;

type Listener = Rc<dyn Fn(&InputEvent)>;

/// Dispatches input events to listeners registered per event kind. Clones
/// share the same listener table.
#[derive(Clone, Default)]
pub struct EventTarget {
    inner: Rc<RefCell<Listeners>>,
}

#[derive(Default)]
struct Listeners {
    next: ListenerId,
    entries: Vec<(ListenerId, EventKind, Listener)>,
}

impl EventTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&self, kind: EventKind, f: impl Fn(&InputEvent) + 'static) -> ListenerId {
        let mut inner = self.inner.borrow_mut();
        inner.next += 1;
        let id = inner.next;
        inner.entries.push((id, kind, Rc::new(f)));
        id
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.entries.len();
        inner.entries.retain(|(lid, _, _)| *lid != id);
        inner.entries.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// Calls every listener registered for `event.kind`, in registration
    /// order.
    pub fn dispatch(&self, event: &InputEvent) {
        let listeners: Vec<Listener> = self
            .inner
            .borrow()
            .entries
            .iter()
            .filter(|(_, kind, _)| *kind == event.kind)
            .map(|(_, _, f)| f.clone())
            .collect();
        for f in listeners {
            f(event);
        }
    }
}

impl std::fmt::Debug for EventTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventTarget")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
