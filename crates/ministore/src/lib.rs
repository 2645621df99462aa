//! # ministore
//!
//! A minimal, synchronous state container.
//!
//! - One state value, replaced only by a pure reducer `(state, action) -> state`
//! - Listeners notified after every dispatch, safe to (un)subscribe and
//!   dispatch from inside a notification
//! - Enhancers that wrap store creation, and [`apply_middleware`] to put a
//!   middleware chain in front of `dispatch`
//! - [`compose`] for right-to-left function pipelines
//!
//! ```rust
//! use ministore::{create_store, Action};
//!
//! #[derive(Debug, Clone, Default, PartialEq)]
//! struct Counter {
//!     count: u32,
//! }
//!
//! fn counter(state: Option<&Counter>, action: &Action) -> Counter {
//!     let state = state.cloned().unwrap_or_default();
//!     match action.kind() {
//!         "COUNT" => Counter { count: state.count + 1 },
//!         _ => state,
//!     }
//! }
//!
//! let store = create_store(counter, None, None).unwrap();
//! store.subscribe(|| println!("state changed"));
//! store.dispatch(Action::new("COUNT")).unwrap();
//! store.dispatch(Action::new("COUNT")).unwrap();
//! assert_eq!(*store.get_state(), Counter { count: 2 });
//! ```

pub mod action;
pub mod compose;
pub mod dispatch;
pub mod error;
pub mod listeners;
pub mod middleware;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use action::{bootstrap_action_type, is_bootstrap_action, Action, Dispatchable};
pub use compose::{compose, compose_steps, compose_with, Func, Step};
pub use dispatch::Dispatch;
pub use error::{Result, StoreError};
pub use listeners::{Listener, Unsubscribe};
pub use middleware::{
    apply_middleware, Layer, LoggingMiddleware, Middleware, MiddlewareApi, Thunk, ThunkMiddleware,
};
pub use store::{
    create_store, create_store_fn, create_store_with, Enhancer, Reducer, Store, StoreArg,
    StoreBuilder, StoreCreator,
};
