//! Tally state and reducer
//!
//! Counts replayed actions per type. `RESET` clears the tally.

use std::collections::BTreeMap;

use ministore::{is_bootstrap_action, Action};
use serde::{Deserialize, Serialize};

pub const RESET: &str = "RESET";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tally {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub by_type: BTreeMap<String, u64>,
    #[serde(default)]
    pub last: Option<String>,
}

/// Reducer - pure function that produces new state from current state + action
pub fn reduce(state: Option<&Tally>, action: &Action) -> Tally {
    let mut state = state.cloned().unwrap_or_default();

    if is_bootstrap_action(action) {
        return state;
    }

    match action.kind() {
        RESET => Tally::default(),
        kind => {
            state.total += 1;
            *state.by_type.entry(kind.to_string()).or_insert(0) += 1;
            state.last = Some(kind.to_string());
            state
        }
    }
}
