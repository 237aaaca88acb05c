use std::cell::{OnceCell, RefCell};

use hookwork_reactive::Scope;

/// State created once and shared by every caller.
///
/// The factory runs inside a detached [`Scope`] owned by the `GlobalState`,
/// so watchers and disposers it installs outlive whatever scope happened to
/// be current at the first call. State is per thread: keep the
/// `GlobalState` in a `thread_local!` to share it across a program.
///
/// ```rust
/// use hookwork_reactive::signal;
/// use hookwork_shared::create_global_state;
///
/// let counter = create_global_state(|| signal(0));
/// counter.get().set(3);
/// assert_eq!(counter.get().get(), 3);
/// ```
pub struct GlobalState<S, A = ()> {
    scope: Scope,
    factory: RefCell<Option<Box<dyn FnOnce(A) -> S>>>,
    state: OnceCell<S>,
}

pub fn create_global_state<S: Clone + 'static>(
    factory: impl FnOnce() -> S + 'static,
) -> GlobalState<S> {
    create_global_state_with(move |()| factory())
}

/// Like [`create_global_state`], for factories taking arguments. Only the
/// arguments of the first call reach the factory.
pub fn create_global_state_with<S: Clone + 'static, A: 'static>(
    factory: impl FnOnce(A) -> S + 'static,
) -> GlobalState<S, A> {
    GlobalState {
        scope: Scope::new(),
        factory: RefCell::new(Some(Box::new(factory))),
        state: OnceCell::new(),
    }
}

impl<S: Clone + 'static, A: 'static> GlobalState<S, A> {
    /// Returns the state, running the factory on the first call.
    ///
    /// # Panics
    ///
    /// Panics if the factory calls back into the same `GlobalState`.
    pub fn call(&self, args: A) -> S {
        if let Some(state) = self.state.get() {
            return state.clone();
        }
        let factory = self.factory.borrow_mut().take();
        match factory {
            Some(factory) => {
                log::debug!("create_global_state: initializing");
                let state = self.scope.run(|| factory(args));
                self.state.get_or_init(|| state).clone()
            }
            // Only reachable when the factory itself asks for the state.
            None => panic!("create_global_state: state requested while its factory is running"),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.state.get().is_some()
    }

    /// The scope the factory ran in.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Tears down everything the factory registered on its scope. The state
    /// itself stays cached.
    pub fn dispose(&self) {
        self.scope.dispose();
    }
}

impl<S: Clone + 'static> GlobalState<S, ()> {
    pub fn get(&self) -> S {
        self.call(())
    }
}
