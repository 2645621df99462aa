//! Thunks: dispatching a function instead of an action
//!
//! With [`ThunkMiddleware`] installed, dispatching a [`Thunk`] runs it with
//! the middleware api instead of forwarding it. The thunk can read state and
//! dispatch as many actions as it likes; whatever it returns becomes the result
//! of `dispatch`.

use std::rc::Rc;

use serde_json::Value;

use crate::action::Dispatchable;
use crate::dispatch::Dispatch;
use crate::error::Result;
use crate::middleware::{Layer, Middleware, MiddlewareApi};

/// A deferred unit of work dispatched through the store
pub struct Thunk<S> {
    f: Rc<dyn Fn(&MiddlewareApi<S>) -> Result<Value>>,
}

impl<S> Clone for Thunk<S> {
    fn clone(&self) -> Self {
        Self {
            f: Rc::clone(&self.f),
        }
    }
}

impl<S> Thunk<S> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&MiddlewareApi<S>) -> Result<Value> + 'static,
    {
        Self { f: Rc::new(f) }
    }

    pub fn run(&self, api: &MiddlewareApi<S>) -> Result<Value> {
        (self.f)(api)
    }
}

/// ThunkMiddleware - runs thunks, forwards everything else
#[derive(Debug, Default, Clone, Copy)]
pub struct ThunkMiddleware;

impl ThunkMiddleware {
    pub fn new() -> Self {
        Self
    }
}

impl<S: 'static> Middleware<S> for ThunkMiddleware {
    fn attach(&self, api: MiddlewareApi<S>) -> Result<Layer<S>> {
        Ok(Box::new(move |next: Dispatch<S>| {
            let api = api.clone();
            Dispatch::new(move |action, args| match action {
                Dispatchable::Thunk(thunk) => thunk.run(&api),
                other => next.call(other, args),
            })
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::error::StoreError;
    use crate::middleware::apply_middleware;
    use crate::store::create_store;
    use crate::test_support::{async_counter, count, counter, AsyncCounter, Counter, Status};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::cell::RefCell;

    #[test]
    fn test_runs_thunks_with_dispatch_and_state() {
        let store = create_store(
            async_counter,
            None,
            Some(apply_middleware(vec![Box::new(ThunkMiddleware::new())])),
        )
        .unwrap();

        // The second half is parked until the caller resumes it
        let pending: Rc<RefCell<Option<MiddlewareApi<AsyncCounter>>>> = Rc::new(RefCell::new(None));
        let parked = Rc::clone(&pending);
        let count_async = Thunk::new(move |api: &MiddlewareApi<AsyncCounter>| {
            api.dispatch(Action::new("START_ASYNC"))?;
            *parked.borrow_mut() = Some(api.clone());
            Ok(json!("started"))
        });

        assert_eq!(store.dispatch(count_async).unwrap(), json!("started"));
        assert_eq!(
            *store.get_state(),
            AsyncCounter {
                count: 0,
                status: Status::Pending,
            }
        );

        let api = pending.borrow_mut().take().unwrap();
        api.dispatch(Action::new("FINISH_ASYNC")).unwrap();
        assert_eq!(
            *store.get_state(),
            AsyncCounter {
                count: 1,
                status: Status::Fulfilled,
            }
        );
    }

    #[test]
    fn test_thunk_reads_state() {
        let store = create_store(
            counter,
            Some(Counter { count: 4 }),
            Some(apply_middleware(vec![Box::new(ThunkMiddleware)])),
        )
        .unwrap();

        let read = Thunk::new(|api: &MiddlewareApi<Counter>| Ok(json!(api.get_state()?.count)));
        assert_eq!(store.dispatch(read).unwrap(), json!(4));
    }

    #[test]
    fn test_plain_actions_pass_through() {
        let store = create_store(
            counter,
            None,
            Some(apply_middleware(vec![Box::new(ThunkMiddleware)])),
        )
        .unwrap();

        assert_eq!(store.dispatch(count()).unwrap(), json!({ "type": "COUNT" }));
        assert_eq!(*store.get_state(), Counter { count: 1 });
    }

    #[test]
    fn test_thunk_errors_propagate() {
        let store = create_store(
            counter,
            None,
            Some(apply_middleware(vec![Box::new(ThunkMiddleware)])),
        )
        .unwrap();

        let failing = Thunk::new(|api: &MiddlewareApi<Counter>| {
            api.dispatch(json!({ "type": 7 }))
        });
        assert!(matches!(
            store.dispatch(failing),
            Err(StoreError::InvalidActionType)
        ));
    }
}
