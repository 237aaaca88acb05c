use hookwork_reactive::{Signal, on_scope_dispose, signal};

use crate::events::{EventKind, EventTarget, InputEvent, ModifierState};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyModifier {
    Alt,
    AltGraph,
    CapsLock,
    Control,
    Fn,
    FnLock,
    Meta,
    NumLock,
    ScrollLock,
    Shift,
    Symbol,
    SymbolLock,
}

impl KeyModifier {
    pub fn flag(self) -> ModifierState {
        match self {
            KeyModifier::Alt => ModifierState::ALT,
            KeyModifier::AltGraph => ModifierState::ALT_GRAPH,
            KeyModifier::CapsLock => ModifierState::CAPS_LOCK,
            KeyModifier::Control => ModifierState::CONTROL,
            KeyModifier::Fn => ModifierState::FN,
            KeyModifier::FnLock => ModifierState::FN_LOCK,
            KeyModifier::Meta => ModifierState::META,
            KeyModifier::NumLock => ModifierState::NUM_LOCK,
            KeyModifier::ScrollLock => ModifierState::SCROLL_LOCK,
            KeyModifier::Shift => ModifierState::SHIFT,
            KeyModifier::Symbol => ModifierState::SYMBOL,
            KeyModifier::SymbolLock => ModifierState::SYMBOL_LOCK,
        }
    }
}

thread_local! {
    static DEFAULT_TARGET: EventTarget = EventTarget::new();
}

/// The per-thread target platform glue dispatches window input to.
pub fn default_target() -> EventTarget {
    DEFAULT_TARGET.with(Clone::clone)
}

pub const DEFAULT_EVENTS: [EventKind; 4] = [
    EventKind::MouseDown,
    EventKind::MouseUp,
    EventKind::KeyDown,
    EventKind::KeyUp,
];

#[derive(Clone, Debug)]
pub struct UseModifierOptions {
    /// Events that refresh the modifier state.
    pub events: Vec<EventKind>,
    /// Where to listen. `None` leaves the state at `initial` forever.
    pub target: Option<EventTarget>,
    pub initial: Option<bool>,
}

impl Default for UseModifierOptions {
    fn default() -> Self {
        Self {
            events: DEFAULT_EVENTS.to_vec(),
            target: Some(default_target()),
            initial: None,
        }
    }
}

impl UseModifierOptions {
    pub fn events(mut self, events: impl IntoIterator<Item = EventKind>) -> Self {
        self.events = events.into_iter().collect();
        self
    }

    pub fn target(mut self, target: Option<EventTarget>) -> Self {
        self.target = target;
        self
    }

    pub fn initial(mut self, initial: bool) -> Self {
        self.initial = Some(initial);
        self
    }
}

/// Tracks whether `modifier` is held, as reported by the last matching event.
///
/// The state is `None` (or `options.initial`) until an event with modifier
/// information arrives. Listeners are removed when the current scope is
/// disposed; outside a scope they stay installed.
pub fn use_key_modifier(modifier: KeyModifier, options: UseModifierOptions) -> Signal<Option<bool>> {
    let state = signal(options.initial);
    let Some(target) = options.target else {
        return state;
    };

    let flag = modifier.flag();
    let ids: Vec<_> = options
        .events
        .iter()
        .map(|&kind| {
            let state = state.clone();
            target.add_listener(kind, move |evt: &InputEvent| {
                if let Some(mods) = evt.modifiers {
                    state.set(Some(mods.contains(flag)));
                }
            })
        })
        .collect();

    let registered = on_scope_dispose({
        let target = target.clone();
        move || {
            for id in ids {
                target.remove_listener(id);
            }
        }
    });
    if !registered {
        log::debug!("use_key_modifier({modifier:?}): no current scope; listeners stay installed");
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookwork_reactive::Scope;

    fn press(target: &EventTarget, kind: EventKind, mods: ModifierState) {
        target.dispatch(&InputEvent::new(kind, mods));
    }

    #[test]
    fn tracks_modifier_from_events() {
        let target = EventTarget::new();
        let scope = Scope::new();
        let shift = scope.run(|| {
            use_key_modifier(
                KeyModifier::Shift,
                UseModifierOptions::default().target(Some(target.clone())),
            )
        });
        assert_eq!(shift.get(), None);

        press(&target, EventKind::KeyDown, ModifierState::SHIFT | ModifierState::CONTROL);
        assert_eq!(shift.get(), Some(true));

        press(&target, EventKind::MouseUp, ModifierState::CONTROL);
        assert_eq!(shift.get(), Some(false));
    }

    #[test]
    fn ignores_other_events_and_missing_state() {
        let target = EventTarget::new();
        let caps = use_key_modifier(
            KeyModifier::CapsLock,
            UseModifierOptions::default()
                .target(Some(target.clone()))
                .events([EventKind::KeyUp])
                .initial(false),
        );
        assert_eq!(caps.get(), Some(false));

        press(&target, EventKind::KeyDown, ModifierState::CAPS_LOCK);
        assert_eq!(caps.get(), Some(false));

        target.dispatch(&InputEvent::without_modifiers(EventKind::KeyUp));
        assert_eq!(caps.get(), Some(false));

        press(&target, EventKind::KeyUp, ModifierState::CAPS_LOCK);
        assert_eq!(caps.get(), Some(true));
    }

    #[test]
    fn scope_dispose_removes_listeners() {
        let target = EventTarget::new();
        let scope = Scope::new();
        let meta = scope.run(|| {
            use_key_modifier(
                KeyModifier::Meta,
                UseModifierOptions::default().target(Some(target.clone())),
            )
        });
        assert_eq!(target.listener_count(), DEFAULT_EVENTS.len());

        scope.dispose();
        assert_eq!(target.listener_count(), 0);
        press(&target, EventKind::KeyDown, ModifierState::META);
        assert_eq!(meta.get(), None);
    }

    #[test]
    fn no_target_keeps_initial() {
        let alt = use_key_modifier(
            KeyModifier::Alt,
            UseModifierOptions::default().target(None).initial(true),
        );
        assert_eq!(alt.get(), Some(true));
    }

    #[test]
    fn default_target_is_shared_per_thread() {
        let scope = Scope::new();
        let fn_key = scope.run(|| use_key_modifier(KeyModifier::Fn, UseModifierOptions::default()));
        press(&default_target(), EventKind::MouseDown, ModifierState::FN);
        assert_eq!(fn_key.get(), Some(true));
        scope.dispose();
        assert_eq!(default_target().listener_count(), 0);
    }
}
