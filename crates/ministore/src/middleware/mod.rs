//! Middleware system
//!
//! Middleware sits between `dispatch` and the store, allowing side effects,
//! logging and other cross-cutting concerns to be handled in a composable way.
//!
//! ## Design
//!
//! ```text
//! dispatch → m1 → m2 → ... → mN → store dispatch → reducer → listeners
//! ```
//!
//! Each middleware is attached once per store and receives a
//! [`MiddlewareApi`] (`get_state` plus a `dispatch` that re-enters the full
//! chain). It returns a [`Layer`]: given the next dispatch in the chain, build
//! this middleware's dispatch. A layer can:
//! - Inspect actions and state
//! - Dispatch new actions
//! - Transform the action before forwarding it
//! - Block the action by not calling `next`
//! - Return a different value than `next` returns
//!
//! ## Example
//!
//! ```rust
//! use ministore::{apply_middleware, create_store, Action, Dispatch, Layer, MiddlewareApi, Middleware};
//!
//! fn counter(state: Option<&i64>, action: &Action) -> i64 {
//!     let state = state.copied().unwrap_or(0);
//!     if action.is("COUNT") { state + 1 } else { state }
//! }
//!
//! let audit = |_api: MiddlewareApi<i64>| -> ministore::Result<Layer<i64>> {
//!     Ok(Box::new(|next: Dispatch<i64>| {
//!         Dispatch::new(move |action, args| {
//!             log::info!("audit: {:?}", action);
//!             next.call(action, args)
//!         })
//!     }))
//! };
//!
//! let middlewares: Vec<Box<dyn Middleware<i64>>> = vec![Box::new(audit)];
//! let store = create_store(counter, None, Some(apply_middleware(middlewares))).unwrap();
//! store.dispatch(Action::new("COUNT")).unwrap();
//! assert_eq!(*store.get_state(), 1);
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde_json::Value;

use crate::action::Dispatchable;
use crate::compose::compose;
use crate::dispatch::{Dispatch, DispatchFn};
use crate::error::{Result, StoreError};
use crate::store::{Enhancer, Reducer, StateRef, Store, StoreCreator};

pub mod logging;
pub mod thunk;

pub use logging::LoggingMiddleware;
pub use thunk::{Thunk, ThunkMiddleware};

/// One stage of the chain: given `next`, build this middleware's dispatch
pub type Layer<S> = Box<dyn Fn(Dispatch<S>) -> Dispatch<S>>;

/// Middleware trait - intercepts actions before they reach the store
///
/// `attach` runs once when the store is created. Returning an error aborts
/// store creation with that error.
pub trait Middleware<S> {
    fn attach(&self, api: MiddlewareApi<S>) -> Result<Layer<S>>;
}

impl<S, F> Middleware<S> for F
where
    F: Fn(MiddlewareApi<S>) -> Result<Layer<S>>,
{
    fn attach(&self, api: MiddlewareApi<S>) -> Result<Layer<S>> {
        self(api)
    }
}

/// Where the api's `dispatch` currently points
enum Binding<S> {
    Constructing,
    Ready(Weak<DispatchFn<S>>),
}

/// The `{get_state, dispatch}` facade handed to every middleware.
///
/// All middleware of one store share the same binding, so `dispatch` always
/// goes through the complete chain once it exists. Before that it fails with
/// `DispatchDuringConstruction`.
///
/// The api does not keep the store alive. Once every handle to the finished
/// store is gone, `get_state` and `dispatch` both fail with `StoreDropped`.
pub struct MiddlewareApi<S> {
    state: StateRef<S>,
    binding: Rc<RefCell<Binding<S>>>,
}

impl<S> Clone for MiddlewareApi<S> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            binding: Rc::clone(&self.binding),
        }
    }
}

impl<S: 'static> MiddlewareApi<S> {
    /// Current state of the store; readable while middleware is attached
    pub fn get_state(&self) -> Result<Rc<S>> {
        if let Binding::Ready(chain) = &*self.binding.borrow() {
            if chain.strong_count() == 0 {
                return Err(StoreError::StoreDropped);
            }
        }
        self.state.get().ok_or(StoreError::StoreDropped)
    }

    pub fn dispatch(&self, action: impl Into<Dispatchable<S>>) -> Result<Value> {
        self.dispatch_with(action, &[])
    }

    pub fn dispatch_with(&self, action: impl Into<Dispatchable<S>>, args: &[Value]) -> Result<Value> {
        // Resolve first so the binding is not borrowed while the chain runs
        let target = match &*self.binding.borrow() {
            Binding::Constructing => return Err(StoreError::DispatchDuringConstruction),
            Binding::Ready(chain) => chain.upgrade().ok_or(StoreError::StoreDropped)?,
        };
        Dispatch::from_rc(target).call(action.into(), args)
    }
}

/// Build an enhancer that runs every dispatch through `middlewares`, first
/// to last, before it reaches the store.
pub fn apply_middleware<S: 'static>(middlewares: Vec<Box<dyn Middleware<S>>>) -> Enhancer<S> {
    let middlewares = Rc::new(middlewares);

    Enhancer::new(move |create: StoreCreator<S>| -> StoreCreator<S> {
        let middlewares = Rc::clone(&middlewares);
        Rc::new(move |reducer: Reducer<S>, preloaded_state: Option<S>| -> Result<Store<S>> {
            let store = create(reducer, preloaded_state)?;

            let binding = Rc::new(RefCell::new(Binding::Constructing));
            let api = MiddlewareApi {
                state: store.downgrade_state(),
                binding: Rc::clone(&binding),
            };

            let layers = middlewares
                .iter()
                .map(|middleware| middleware.attach(api.clone()))
                .collect::<Result<Vec<_>>>()?;
            log::debug!("Attached {} middleware", layers.len());

            let dispatch = compose(layers)(store.dispatcher());
            *binding.borrow_mut() = Binding::Ready(dispatch.downgrade());

            Ok(store.with_dispatch(dispatch))
        })
    })
}
