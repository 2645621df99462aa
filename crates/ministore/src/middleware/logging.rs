use log::Level;

use crate::dispatch::Dispatch;
use crate::error::Result;
use crate::middleware::{Layer, Middleware, MiddlewareApi};

/// LoggingMiddleware - logs all actions passing through
#[derive(Debug, Clone, Copy)]
pub struct LoggingMiddleware {
    level: Level,
}

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self { level: Level::Debug }
    }

    pub fn with_level(level: Level) -> Self {
        Self { level }
    }

    pub fn level(&self) -> Level {
        self.level
    }
}

impl Default for LoggingMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: 'static> Middleware<S> for LoggingMiddleware {
    fn attach(&self, _api: MiddlewareApi<S>) -> Result<Layer<S>> {
        let level = self.level;
        Ok(Box::new(move |next: Dispatch<S>| {
            Dispatch::new(move |action, args| {
                if args.is_empty() {
                    log::log!(level, "Action: {:?}", action);
                } else {
                    log::log!(level, "Action: {:?} {:?}", action, args);
                }
                // Always pass action through
                next.call(action, args)
            })
        }))
    }
}
