//! Shared fixtures for the unit tests

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::action::Action;
use crate::dispatch::Dispatch;
use crate::error::Result;
use crate::middleware::{Layer, Middleware, MiddlewareApi};

const COUNT: &str = "COUNT";
const START_ASYNC: &str = "START_ASYNC";
const FINISH_ASYNC: &str = "FINISH_ASYNC";
const UNKNOWN_ACTION: &str = "UNKNOWN_ACTION";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Counter {
    pub count: i64,
}

pub const INITIAL_COUNTER: Counter = Counter { count: 0 };

pub fn count() -> Action {
    Action::new(COUNT)
}

pub fn unknown_action() -> Action {
    Action::new(UNKNOWN_ACTION)
}

pub fn counter(state: Option<&Counter>, action: &Action) -> Counter {
    let state = state.cloned().unwrap_or(INITIAL_COUNTER);
    match action.kind() {
        COUNT => Counter {
            count: state.count + 1,
        },
        _ => state,
    }
}

pub fn counter_reverse(state: Option<&Counter>, action: &Action) -> Counter {
    let state = state.cloned().unwrap_or(INITIAL_COUNTER);
    match action.kind() {
        COUNT => Counter {
            count: state.count - 1,
        },
        _ => state,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Status {
    #[default]
    Fulfilled,
    Pending,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AsyncCounter {
    pub count: i64,
    pub status: Status,
}

pub fn async_counter(state: Option<&AsyncCounter>, action: &Action) -> AsyncCounter {
    let state = state.cloned().unwrap_or_default();
    match action.kind() {
        START_ASYNC => AsyncCounter {
            status: Status::Pending,
            ..state
        },
        FINISH_ASYNC => AsyncCounter {
            count: state.count + 1,
            status: Status::Fulfilled,
        },
        _ => state,
    }
}

/// A listener that counts its calls
pub fn spy() -> (Rc<Cell<usize>>, impl Fn() + 'static) {
    let calls = Rc::new(Cell::new(0));
    let counted = Rc::clone(&calls);
    (calls, move || counted.set(counted.get() + 1))
}

/// Middleware that records `"<name>:<type>"` for every action it forwards
pub fn recording_middleware(
    name: &'static str,
    seen: Rc<RefCell<Vec<String>>>,
) -> Box<dyn Middleware<Counter>> {
    Box::new(move |_api: MiddlewareApi<Counter>| -> Result<Layer<Counter>> {
        let seen = Rc::clone(&seen);
        Ok(Box::new(move |next: Dispatch<Counter>| {
            let seen = Rc::clone(&seen);
            Dispatch::new(move |action, args| {
                let kind = action.kind().unwrap_or("?").to_string();
                seen.borrow_mut().push(format!("{}:{}", name, kind));
                next.call(action, args)
            })
        }))
    })
}
