use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use slotmap::{SlotMap, new_key_type};

pub type SignalId = usize;

new_key_type! {
    pub struct ObserverId;
}

thread_local! {
    static CURRENT_OBSERVER: Cell<Option<ObserverId>> = const { Cell::new(None) };
    static NEXT_SIGNAL: Cell<SignalId> = const { Cell::new(0) };
    static GRAPH: RefCell<DepGraph> = RefCell::new(DepGraph::default());
}

#[derive(Default)]
struct DepGraph {
    // signal_id -> observers that depend on it
    edges: HashMap<SignalId, HashSet<ObserverId>>,
    // observer_id -> signals it depends on
    back: HashMap<ObserverId, HashSet<SignalId>>,
    // recompute closures
    observers: SlotMap<ObserverId, Rc<dyn Fn()>>,
    running: HashSet<ObserverId>,
}

impl DepGraph {
    fn remove_all_edges_for(&mut self, obs: ObserverId) {
        if let Some(signals) = self.back.remove(&obs) {
            for s in signals {
                if let Some(set) = self.edges.get_mut(&s) {
                    set.remove(&obs);
                    if set.is_empty() {
                        self.edges.remove(&s);
                    }
                }
            }
        }
    }

    fn remove_observer(&mut self, obs: ObserverId) {
        self.observers.remove(obs);
        self.remove_all_edges_for(obs);
        self.running.remove(&obs);
    }
}

/// Allocates a fresh id for a signal participating in dependency tracking.
pub fn new_signal_id() -> SignalId {
    NEXT_SIGNAL.with(|n| {
        let id = n.get();
        n.set(id + 1);
        id
    })
}

pub fn register_signal_read(sig: SignalId) {
    if let Some(obs) = CURRENT_OBSERVER.with(Cell::get) {
        GRAPH.with(|g| {
            let mut g = g.borrow_mut();
            // An observer removed while running must not pick up new edges.
            if !g.observers.contains_key(obs) {
                return;
            }
            g.edges.entry(sig).or_default().insert(obs);
            g.back.entry(obs).or_default().insert(sig);
        });
    }
}

/// Re-runs every observer that read `sig` during its last run.
pub fn signal_changed(sig: SignalId) {
    let mut queue: VecDeque<ObserverId> = GRAPH.with(|g| {
        g.borrow()
            .edges
            .get(&sig)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    });
    while let Some(obs) = queue.pop_front() {
        let skip = GRAPH.with(|g| {
            let g = g.borrow();
            g.running.contains(&obs) || !g.observers.contains_key(obs)
        });
        if skip {
            continue;
        }
        run_observer_now(obs);
    }
}

pub fn new_observer(f: impl Fn() + 'static) -> ObserverId {
    GRAPH.with(|g| g.borrow_mut().observers.insert(Rc::new(f)))
}

/// Remove an observer and all of its dependency edges.
pub fn remove_observer(id: ObserverId) {
    GRAPH.with(|g| g.borrow_mut().remove_observer(id));
}

pub fn observer_count() -> usize {
    GRAPH.with(|g| g.borrow().observers.len())
}

/// Runs the observer under tracking, replacing its previous dependencies.
pub fn run_observer_now(id: ObserverId) {
    let f = GRAPH.with(|g| {
        let mut g = g.borrow_mut();
        let f = g.observers.get(id).cloned()?;
        g.remove_all_edges_for(id);
        g.running.insert(id);
        Some(f)
    });
    let Some(f) = f else {
        return;
    };

    struct Restore(Option<ObserverId>, ObserverId);
    impl Drop for Restore {
        fn drop(&mut self) {
            CURRENT_OBSERVER.with(|co| co.set(self.0));
            GRAPH.with(|g| {
                g.borrow_mut().running.remove(&self.1);
            });
        }
    }
    let _restore = Restore(CURRENT_OBSERVER.with(|co| co.replace(Some(id))), id);
    f();
}

/// Runs `f` with dependency tracking suspended.
pub fn untracked<R>(f: impl FnOnce() -> R) -> R {
    struct Restore(Option<ObserverId>);
    impl Drop for Restore {
        fn drop(&mut self) {
            CURRENT_OBSERVER.with(|co| co.set(self.0));
        }
    }
    let _restore = Restore(CURRENT_OBSERVER.with(|co| co.replace(None)));
    f()
}

pub fn is_tracking() -> bool {
    CURRENT_OBSERVER.with(Cell::get).is_some()
}
