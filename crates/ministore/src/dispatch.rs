//! Dispatch handles
//!
//! A [`Dispatch`] is a cheap, cloneable handle to a dispatch function: the raw
//! store dispatch, or a middleware chain wrapped around it. Every layer of a
//! middleware chain receives the next layer as a `Dispatch` and returns a new
//! one.

use std::rc::{Rc, Weak};

use serde_json::Value;

use crate::action::Dispatchable;
use crate::error::Result;

pub(crate) type DispatchFn<S> = dyn Fn(Dispatchable<S>, &[Value]) -> Result<Value>;

/// Handle for sending actions through a dispatch function
pub struct Dispatch<S> {
    f: Rc<DispatchFn<S>>,
}

impl<S> Clone for Dispatch<S> {
    fn clone(&self) -> Self {
        Self {
            f: Rc::clone(&self.f),
        }
    }
}

impl<S> Dispatch<S> {
    /// Wrap a dispatch function.
    ///
    /// The function receives the dispatched value and any extra arguments
    /// passed alongside it.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Dispatchable<S>, &[Value]) -> Result<Value> + 'static,
    {
        Self { f: Rc::new(f) }
    }

    /// Dispatch an action with no extra arguments
    pub fn dispatch(&self, action: impl Into<Dispatchable<S>>) -> Result<Value> {
        (self.f)(action.into(), &[])
    }

    /// Dispatch an action together with extra arguments.
    ///
    /// Extra arguments are only meaningful to middleware; the store ignores them.
    pub fn dispatch_with(&self, action: impl Into<Dispatchable<S>>, args: &[Value]) -> Result<Value> {
        (self.f)(action.into(), args)
    }

    /// Forward an already-converted value, as middleware does with `next`
    pub fn call(&self, action: Dispatchable<S>, args: &[Value]) -> Result<Value> {
        (self.f)(action, args)
    }

    /// Whether both handles point at the same dispatch function
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.f, &other.f)
    }

    pub(crate) fn downgrade(&self) -> Weak<DispatchFn<S>> {
        Rc::downgrade(&self.f)
    }

    pub(crate) fn from_rc(f: Rc<DispatchFn<S>>) -> Self {
        Self { f }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use serde_json::json;
    use std::cell::RefCell;

    #[test]
    fn test_forwards_action_and_extra_args() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let recorder = Rc::clone(&seen);
        let dispatch: Dispatch<()> = Dispatch::new(move |action, args| {
            recorder.borrow_mut().push((format!("{:?}", action), args.to_vec()));
            Ok(json!("done"))
        });

        let result = dispatch
            .dispatch_with(Action::new("COUNT"), &[json!("foo"), json!("bar")])
            .unwrap();

        assert_eq!(result, json!("done"));
        let seen = seen.borrow();
        assert_eq!(seen[0].0, r#"{"type":"COUNT"}"#);
        assert_eq!(seen[0].1, vec![json!("foo"), json!("bar")]);
    }

    #[test]
    fn test_clones_share_the_function() {
        let dispatch: Dispatch<()> = Dispatch::new(|_, _| Ok(Value::Null));
        let other: Dispatch<()> = Dispatch::new(|_, _| Ok(Value::Null));
        assert!(dispatch.ptr_eq(&dispatch.clone()));
        assert!(!dispatch.ptr_eq(&other));
    }
}
