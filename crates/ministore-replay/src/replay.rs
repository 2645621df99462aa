//! Replaying an action log through a store

use std::cell::Cell;
use std::io::BufRead;
use std::rc::Rc;

use anyhow::{Context, Result};
use log::Level;
use ministore::{
    apply_middleware, create_store, Dispatch, Layer, LoggingMiddleware, Middleware, MiddlewareApi,
    Store,
};
use serde_json::Value;

use crate::config::Config;
use crate::tally::{self, Tally};

/// Counters reported after a replay
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub dispatched: usize,
    pub ignored: usize,
    pub rejected: usize,
    pub notifications: usize,
}

/// IgnoreTypesMiddleware - drops configured action types before the store.
///
/// A dropped action yields `null` instead of the action. Drops are counted in
/// [`IgnoreTypesMiddleware::dropped`].
pub struct IgnoreTypesMiddleware {
    types: Rc<Vec<String>>,
    dropped: Rc<Cell<usize>>,
}

impl IgnoreTypesMiddleware {
    pub fn new(types: Vec<String>) -> Self {
        Self {
            types: Rc::new(types),
            dropped: Rc::new(Cell::new(0)),
        }
    }

    /// Shared count of dropped actions
    pub fn dropped(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.dropped)
    }
}

impl Middleware<Tally> for IgnoreTypesMiddleware {
    fn attach(&self, _api: MiddlewareApi<Tally>) -> ministore::Result<Layer<Tally>> {
        let types = Rc::clone(&self.types);
        let dropped = Rc::clone(&self.dropped);
        Ok(Box::new(move |next: Dispatch<Tally>| {
            let types = Rc::clone(&types);
            let dropped = Rc::clone(&dropped);
            Dispatch::new(move |action, args| {
                if let Some(kind) = action.kind() {
                    if types.iter().any(|ignored| ignored == kind) {
                        log::debug!("Ignoring {}", kind);
                        dropped.set(dropped.get() + 1);
                        return Ok(Value::Null);
                    }
                }
                next.call(action, args)
            })
        }))
    }
}

/// The tally store together with the drop count of its ignore filter
pub struct Replayer {
    store: Store<Tally>,
    ignored: Rc<Cell<usize>>,
}

impl Replayer {
    /// Create the tally store with the middleware the config asks for
    pub fn new(config: &Config, preloaded_state: Option<Tally>) -> Result<Self> {
        let ignore = IgnoreTypesMiddleware::new(config.ignore_types.clone());
        let ignored = ignore.dropped();

        let mut middlewares: Vec<Box<dyn Middleware<Tally>>> = Vec::new();
        if config.log_actions {
            middlewares.push(Box::new(LoggingMiddleware::with_level(Level::Info)));
        }
        if !config.ignore_types.is_empty() {
            middlewares.push(Box::new(ignore));
        }

        let store = create_store(tally::reduce, preloaded_state, Some(apply_middleware(middlewares)))
            .context("Failed to create store")?;
        Ok(Self { store, ignored })
    }

    pub fn store(&self) -> &Store<Tally> {
        &self.store
    }

    /// Dispatch every JSON line of `input`.
    ///
    /// Blank lines and `#` comments are skipped. A line that is not JSON or
    /// not a valid action is counted as rejected, or aborts the replay when
    /// `strict`.
    pub fn replay<R: BufRead>(&self, input: R, strict: bool) -> Result<Summary> {
        let notifications = Rc::new(Cell::new(0));
        let counted = Rc::clone(&notifications);
        let unsubscribe = self.store.subscribe(move || counted.set(counted.get() + 1));
        let ignored_before = self.ignored.get();

        let outcome = self.replay_lines(input, strict);
        unsubscribe.unsubscribe();

        let mut summary = outcome?;
        summary.ignored = self.ignored.get() - ignored_before;
        summary.dispatched -= summary.ignored;
        summary.notifications = notifications.get();
        Ok(summary)
    }

    /// Counts every accepted line as dispatched; `replay` moves the ignored
    /// ones out afterwards
    fn replay_lines<R: BufRead>(&self, input: R, strict: bool) -> Result<Summary> {
        let mut summary = Summary::default();

        for (index, line) in input.lines().enumerate() {
            let line_no = index + 1;
            let line = line.with_context(|| format!("Failed to read line {}", line_no))?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match self.dispatch_line(line) {
                Ok(_) => summary.dispatched += 1,
                Err(e) if strict => return Err(e.context(format!("Line {} rejected", line_no))),
                Err(e) => {
                    log::warn!("Skipping line {}: {:#}", line_no, e);
                    summary.rejected += 1;
                }
            }
        }

        Ok(summary)
    }

    fn dispatch_line(&self, line: &str) -> Result<Value> {
        let value: Value = serde_json::from_str(line).context("Invalid JSON")?;
        Ok(self.store.dispatch(value)?)
    }
}
