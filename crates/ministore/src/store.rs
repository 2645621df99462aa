use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde_json::Value;

use crate::action::{bootstrap_action_type, Action, Dispatchable};
use crate::dispatch::Dispatch;
use crate::error::{Result, StoreError};
use crate::listeners::{Listener, ListenerRegistry, Unsubscribe};
use crate::middleware::{apply_middleware, Middleware};

/// Reducer - pure function that produces new state from current state + action.
///
/// The state is `None` only while a store without preloaded state is being
/// created; the reducer then returns its default.
pub type Reducer<S> = Rc<dyn Fn(Option<&S>, &Action) -> S>;

/// The store creation function as a value, handed to enhancers
pub type StoreCreator<S> = Rc<dyn Fn(Reducer<S>, Option<S>) -> Result<Store<S>>>;

/// Store enhancer - wraps the creation function to add cross-cutting features.
///
/// The enhancer receives the base creation function and may call it any
/// number of times; whatever store its returned creator produces is handed to
/// the caller as is.
pub struct Enhancer<S> {
    f: Rc<dyn Fn(StoreCreator<S>) -> StoreCreator<S>>,
}

impl<S> Clone for Enhancer<S> {
    fn clone(&self) -> Self {
        Self {
            f: Rc::clone(&self.f),
        }
    }
}

impl<S> Enhancer<S> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(StoreCreator<S>) -> StoreCreator<S> + 'static,
    {
        Self { f: Rc::new(f) }
    }

    pub fn apply(&self, create: StoreCreator<S>) -> StoreCreator<S> {
        (self.f)(create)
    }
}

/// Second argument of the two-argument creation form
pub enum StoreArg<S> {
    PreloadedState(S),
    Enhancer(Enhancer<S>),
}

/// State, current reducer and listeners of one store
struct Engine<S> {
    state: RefCell<Rc<S>>,
    reducer: RefCell<Reducer<S>>,
    listeners: Rc<ListenerRegistry>,
}

impl<S: 'static> Engine<S> {
    /// Validate, reduce, notify.
    ///
    /// No borrow is held while the reducer or a listener runs, so both may
    /// re-enter the store.
    fn dispatch(&self, action: Dispatchable<S>, _args: &[Value]) -> Result<Value> {
        let action = match action {
            Dispatchable::Value(value) => Action::try_from(value)?,
            Dispatchable::Thunk(_) => return Err(StoreError::InvalidAction),
        };
        log::trace!("Dispatching {}", action.kind());

        let reducer = Rc::clone(&self.reducer.borrow());
        let previous = Rc::clone(&self.state.borrow());
        let next = reducer(Some(&*previous), &action);
        *self.state.borrow_mut() = Rc::new(next);

        let listeners = self.listeners.snapshot();
        for listener in listeners.values() {
            listener();
        }

        Ok(action.into())
    }
}

/// Store - holds application state and manages the dispatch loop.
///
/// Cloning is cheap and every clone talks to the same state. `dispatch` may be
/// the raw store dispatch or a middleware chain in front of it.
pub struct Store<S> {
    engine: Rc<Engine<S>>,
    dispatch: Dispatch<S>,
}

impl<S> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            engine: Rc::clone(&self.engine),
            dispatch: self.dispatch.clone(),
        }
    }
}

impl<S: 'static> Store<S> {
    fn from_engine(engine: Engine<S>) -> Self {
        let engine = Rc::new(engine);
        let raw = Rc::clone(&engine);
        let dispatch = Dispatch::new(move |action, args| raw.dispatch(action, args));
        Self { engine, dispatch }
    }

    /// Get the current state
    pub fn get_state(&self) -> Rc<S> {
        Rc::clone(&self.engine.state.borrow())
    }

    /// Dispatch an action; returns whatever the outermost dispatch returns,
    /// the action itself for a store without middleware
    pub fn dispatch(&self, action: impl Into<Dispatchable<S>>) -> Result<Value> {
        self.dispatch.dispatch(action)
    }

    /// Dispatch an action with extra arguments for the middleware chain
    pub fn dispatch_with(&self, action: impl Into<Dispatchable<S>>, args: &[Value]) -> Result<Value> {
        self.dispatch.dispatch_with(action, args)
    }

    /// Get the dispatcher
    pub fn dispatcher(&self) -> Dispatch<S> {
        self.dispatch.clone()
    }

    /// The same store with `dispatch` replaced
    pub fn with_dispatch(self, dispatch: Dispatch<S>) -> Self {
        Self {
            engine: self.engine,
            dispatch,
        }
    }

    /// Register a listener called after every dispatch.
    ///
    /// A listener added while a dispatch is notifying is first called on the
    /// next dispatch.
    pub fn subscribe(&self, listener: impl Fn() + 'static) -> Unsubscribe {
        self.subscribe_listener(Rc::new(listener))
    }

    /// Register a listener that may be absent
    pub fn subscribe_opt(&self, listener: Option<Listener>) -> Result<Unsubscribe> {
        let listener = listener.ok_or(StoreError::InvalidListener)?;
        Ok(self.subscribe_listener(listener))
    }

    fn subscribe_listener(&self, listener: Listener) -> Unsubscribe {
        let id = self.engine.listeners.insert(listener);
        Unsubscribe::new(&self.engine.listeners, id)
    }

    /// Swap the reducer. State and listeners are left as they are; the new
    /// reducer sees the current state on the next dispatch.
    pub fn replace_reducer<F>(&self, next: F)
    where
        F: Fn(Option<&S>, &Action) -> S + 'static,
    {
        self.install_reducer(Rc::new(next));
    }

    /// Swap the reducer for one that may be absent
    pub fn replace_reducer_opt(&self, next: Option<Reducer<S>>) -> Result<()> {
        let next = next.ok_or(StoreError::InvalidReducer)?;
        self.install_reducer(next);
        Ok(())
    }

    fn install_reducer(&self, next: Reducer<S>) {
        log::debug!("Replacing reducer");
        *self.engine.reducer.borrow_mut() = next;
    }

    pub fn listener_count(&self) -> usize {
        self.engine.listeners.len()
    }

    pub(crate) fn downgrade_state(&self) -> StateRef<S> {
        StateRef {
            engine: Rc::downgrade(&self.engine),
        }
    }
}

/// Reads a store's state without keeping the store alive
pub(crate) struct StateRef<S> {
    engine: Weak<Engine<S>>,
}

impl<S> Clone for StateRef<S> {
    fn clone(&self) -> Self {
        Self {
            engine: Weak::clone(&self.engine),
        }
    }
}

impl<S> StateRef<S> {
    pub(crate) fn get(&self) -> Option<Rc<S>> {
        let engine = self.engine.upgrade()?;
        let state = Rc::clone(&engine.state.borrow());
        Some(state)
    }
}

/// Create a store.
///
/// With an enhancer, creation is handed over to it entirely:
/// `enhancer(create_store)(reducer, preloaded_state)`.
pub fn create_store<S, F>(
    reducer: F,
    preloaded_state: Option<S>,
    enhancer: Option<Enhancer<S>>,
) -> Result<Store<S>>
where
    S: 'static,
    F: Fn(Option<&S>, &Action) -> S + 'static,
{
    create_store_from(Rc::new(reducer), preloaded_state, enhancer)
}

/// Two-argument creation form: the second argument is either the preloaded
/// state or an enhancer, in which case there is no preloaded state.
pub fn create_store_with<S, F>(reducer: F, arg: StoreArg<S>) -> Result<Store<S>>
where
    S: 'static,
    F: Fn(Option<&S>, &Action) -> S + 'static,
{
    match arg {
        StoreArg::PreloadedState(state) => create_store(reducer, Some(state), None),
        StoreArg::Enhancer(enhancer) => create_store(reducer, None, Some(enhancer)),
    }
}

/// The creation function as a value, without enhancer
pub fn create_store_fn<S: 'static>() -> StoreCreator<S> {
    Rc::new(|reducer, preloaded_state| create_store_from(reducer, preloaded_state, None))
}

fn create_store_from<S: 'static>(
    reducer: Reducer<S>,
    preloaded_state: Option<S>,
    enhancer: Option<Enhancer<S>>,
) -> Result<Store<S>> {
    if let Some(enhancer) = enhancer {
        log::debug!("Creating store through enhancer");
        return enhancer.apply(create_store_fn())(reducer, preloaded_state);
    }

    // Bootstrap: nothing can be subscribed yet, so the initial dispatch is the
    // reducer applied to the preloaded state.
    let bootstrap = Action::new(bootstrap_action_type());
    let initial = reducer(preloaded_state.as_ref(), &bootstrap);
    log::debug!("Store created");

    Ok(Store::from_engine(Engine {
        state: RefCell::new(Rc::new(initial)),
        reducer: RefCell::new(reducer),
        listeners: Rc::new(ListenerRegistry::new()),
    }))
}

/// Builder for stores, for callers that assemble reducer, state and enhancer
/// in separate steps
pub struct StoreBuilder<S> {
    reducer: Option<Reducer<S>>,
    preloaded_state: Option<S>,
    enhancers: Vec<Enhancer<S>>,
}

impl<S> Default for StoreBuilder<S> {
    fn default() -> Self {
        Self {
            reducer: None,
            preloaded_state: None,
            enhancers: Vec::new(),
        }
    }
}

impl<S: 'static> StoreBuilder<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reducer<F>(mut self, reducer: F) -> Self
    where
        F: Fn(Option<&S>, &Action) -> S + 'static,
    {
        self.reducer = Some(Rc::new(reducer));
        self
    }

    pub fn preloaded_state(mut self, state: S) -> Self {
        self.preloaded_state = Some(state);
        self
    }

    pub fn enhancer(mut self, enhancer: Enhancer<S>) -> Self {
        self.enhancers.push(enhancer);
        self
    }

    /// Shorthand for `.enhancer(apply_middleware(middlewares))`
    pub fn middleware(self, middlewares: Vec<Box<dyn Middleware<S>>>) -> Self {
        self.enhancer(apply_middleware(middlewares))
    }

    /// Fails with `InvalidReducer` without a reducer and with
    /// `InvalidEnhancer` when more than one enhancer was given.
    pub fn build(self) -> Result<Store<S>> {
        let reducer = self.reducer.ok_or(StoreError::InvalidReducer)?;

        let mut enhancers = self.enhancers;
        if enhancers.len() > 1 {
            return Err(StoreError::InvalidEnhancer);
        }

        create_store_from(reducer, self.preloaded_state, enhancers.pop())
    }
}
