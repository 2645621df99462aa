use serde_json::Value;
use thiserror::Error;

/// Errors raised by the store, its dispatch chain and the composer.
///
/// Every condition is surfaced to the direct caller of the failing operation.
/// Nothing is retried or recovered internally.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Expected the reducer to be a function.")]
    InvalidReducer,

    #[error("Expected the enhancer to be a function.")]
    InvalidEnhancer,

    #[error("Expected the action to be a plain object.")]
    InvalidAction,

    #[error("Expected action.type to not be undefined.")]
    MissingActionType,

    #[error("Expected action.type to be a string.")]
    InvalidActionType,

    #[error("Expected the listener to be a function.")]
    InvalidListener,

    #[error("Can not dispatch while constructing middleware.")]
    DispatchDuringConstruction,

    /// A composed pipeline hit a step that is not a function
    #[error("Expected a function at position {position}, got {found}")]
    InvalidArgument { position: usize, found: Value },

    /// A middleware `dispatch` handle outlived the store it was built for
    #[error("The store behind this dispatch has been dropped.")]
    StoreDropped,

    /// A collaborator (middleware layer or thunk) failed with its own error
    #[error(transparent)]
    Middleware(#[from] anyhow::Error),
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
