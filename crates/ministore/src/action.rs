//! Actions and the values `dispatch` accepts
//!
//! An [`Action`] is a plain JSON record whose `type` field is a string. Anything
//! handed to `dispatch` is a [`Dispatchable`]: either a raw JSON value, which the
//! store validates into an `Action`, or a [`Thunk`] for middleware that knows how
//! to run it.

use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::StoreError;
use crate::middleware::thunk::Thunk;

/// Name of the field carrying the action type
pub const TYPE_KEY: &str = "type";

const BOOTSTRAP_PREFIX: &str = "@@ministore/INIT.";

static BOOTSTRAP_TYPE: OnceLock<String> = OnceLock::new();

/// Type of the synthetic action every store dispatches once while it is created.
///
/// Randomized once per process so it cannot collide with caller-defined types.
pub fn bootstrap_action_type() -> &'static str {
    BOOTSTRAP_TYPE.get_or_init(|| format!("{}{}", BOOTSTRAP_PREFIX, Uuid::new_v4().simple()))
}

/// Whether `action` is the store's bootstrap action
pub fn is_bootstrap_action(action: &Action) -> bool {
    action.kind() == bootstrap_action_type()
}

/// A validated action record.
///
/// Holds the full JSON object, `type` included, so it can be handed back to the
/// caller unchanged after dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Action {
    fields: Map<String, Value>,
}

impl Action {
    /// Create an action with the given type and no payload
    pub fn new(kind: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(TYPE_KEY.to_string(), Value::String(kind.into()));
        Self { fields }
    }

    /// Add a payload field. The `type` field is fixed by [`Action::new`] and
    /// is left untouched.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if key != TYPE_KEY {
            self.fields.insert(key, value.into());
        }
        self
    }

    /// The action type
    pub fn kind(&self) -> &str {
        match self.fields.get(TYPE_KEY) {
            Some(Value::String(kind)) => kind,
            _ => "",
        }
    }

    pub fn is(&self, kind: &str) -> bool {
        self.kind() == kind
    }

    /// Look up a payload field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl TryFrom<Value> for Action {
    type Error = StoreError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(fields) = value else {
            return Err(StoreError::InvalidAction);
        };

        match fields.get(TYPE_KEY) {
            None => Err(StoreError::MissingActionType),
            Some(Value::String(_)) => Ok(Self { fields }),
            Some(_) => Err(StoreError::InvalidActionType),
        }
    }
}

impl From<Action> for Value {
    fn from(action: Action) -> Self {
        Value::Object(action.fields)
    }
}

/// Anything that can be passed to `dispatch`.
///
/// The store itself only accepts plain records with a string `type`. Thunks are
/// for middleware such as [`ThunkMiddleware`](crate::middleware::ThunkMiddleware)
/// and are rejected as `InvalidAction` if they reach the store.
pub enum Dispatchable<S> {
    Value(Value),
    Thunk(Thunk<S>),
}

impl<S> Dispatchable<S> {
    pub fn is_thunk(&self) -> bool {
        matches!(self, Dispatchable::Thunk(_))
    }

    /// The action type, if this is a record with a string `type`
    pub fn kind(&self) -> Option<&str> {
        match self {
            Dispatchable::Value(value) => value.get(TYPE_KEY).and_then(Value::as_str),
            Dispatchable::Thunk(_) => None,
        }
    }
}

impl<S> Clone for Dispatchable<S> {
    fn clone(&self) -> Self {
        match self {
            Dispatchable::Value(value) => Dispatchable::Value(value.clone()),
            Dispatchable::Thunk(thunk) => Dispatchable::Thunk(thunk.clone()),
        }
    }
}

impl<S> fmt::Debug for Dispatchable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dispatchable::Value(value) => write!(f, "{}", value),
            Dispatchable::Thunk(_) => f.write_str("Thunk(..)"),
        }
    }
}

impl<S> From<Value> for Dispatchable<S> {
    fn from(value: Value) -> Self {
        Dispatchable::Value(value)
    }
}

impl<S> From<Action> for Dispatchable<S> {
    fn from(action: Action) -> Self {
        Dispatchable::Value(action.into())
    }
}

impl<S> From<Thunk<S>> for Dispatchable<S> {
    fn from(thunk: Thunk<S>) -> Self {
        Dispatchable::Thunk(thunk)
    }
}
