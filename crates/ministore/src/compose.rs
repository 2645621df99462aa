//! Right-to-left function composition
//!
//! `compose(vec![f, g, h])` builds `|x| f(g(h(x)))`. The store uses it to fold a
//! middleware chain around the raw dispatch.
//!
//! ```text
//! compose([f1, f2, ..., fn])(args) = f1(f2(...fn(args)))
//! ```

use serde_json::Value;

use crate::error::{Result, StoreError};

/// A boxed single-argument step of a pipeline
pub type Func<T> = Box<dyn Fn(T) -> T>;

/// Compose `fns` right to left.
///
/// With no functions the result is the identity; with one it behaves as that
/// function.
pub fn compose<T>(fns: Vec<Func<T>>) -> impl Fn(T) -> T {
    move |value| fns.iter().rev().fold(value, |acc, f| f(acc))
}

/// Compose `outer` right to left around `innermost`.
///
/// `innermost` receives the full argument list (use a tuple for several
/// arguments); each function in `outer` receives the single value returned by
/// its right neighbour.
pub fn compose_with<A, T, F>(outer: Vec<Func<T>>, innermost: F) -> impl Fn(A) -> T
where
    F: Fn(A) -> T,
{
    move |args| outer.iter().rev().fold(innermost(args), |acc, f| f(acc))
}

/// One element of a dynamically assembled pipeline
pub enum Step<T> {
    Func(Func<T>),
    /// A value sitting where a function was expected
    Value(Value),
}

impl<T> Step<T> {
    pub fn func(f: impl Fn(T) -> T + 'static) -> Self {
        Step::Func(Box::new(f))
    }
}

/// Checked variant of [`compose`].
///
/// Building never fails. Calling the result fails with
/// [`StoreError::InvalidArgument`] once evaluation reaches a step that is not a
/// function; steps to its right have already run by then.
pub fn compose_steps<T>(steps: Vec<Step<T>>) -> impl Fn(T) -> Result<T> {
    move |value| {
        steps
            .iter()
            .enumerate()
            .rev()
            .try_fold(value, |acc, (position, step)| match step {
                Step::Func(f) => Ok(f(acc)),
                Step::Value(found) => Err(StoreError::InvalidArgument {
                    position,
                    found: found.clone(),
                }),
            })
    }
}
