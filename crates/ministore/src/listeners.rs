//! Listener registry
//!
//! Listeners live in a map keyed by a monotonically increasing id, so iteration
//! follows insertion order and removal by id never disturbs the others.
//!
//! The map sits behind an `Rc`. A notification pass clones the `Rc` and iterates
//! that snapshot; a (un)subscribe that happens while a snapshot is alive goes
//! through `Rc::make_mut`, which copies the map first. The running pass keeps
//! its frozen map and the change shows up from the next dispatch on.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

/// A change notification callback
pub type Listener = Rc<dyn Fn()>;

pub(crate) type ListenerMap = BTreeMap<u64, Listener>;

pub(crate) struct ListenerRegistry {
    // Ids are never reused, even after removal
    next_id: Cell<u64>,
    live: RefCell<Rc<ListenerMap>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(0),
            live: RefCell::new(Rc::new(BTreeMap::new())),
        }
    }

    pub fn insert(&self, listener: Listener) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let mut live = self.live.borrow_mut();
        Rc::make_mut(&mut live).insert(id, listener);
        log::trace!("Listener {} subscribed ({} active)", id, live.len());
        id
    }

    /// Remove a listener; returns `false` if it was already gone
    pub fn remove(&self, id: u64) -> bool {
        let mut live = self.live.borrow_mut();
        if !live.contains_key(&id) {
            return false;
        }

        Rc::make_mut(&mut live).remove(&id);
        log::trace!("Listener {} unsubscribed ({} active)", id, live.len());
        true
    }

    /// The registry as it stands right now. Later changes never show up in it.
    pub fn snapshot(&self) -> Rc<ListenerMap> {
        Rc::clone(&self.live.borrow())
    }

    pub fn len(&self) -> usize {
        self.live.borrow().len()
    }
}

/// Removes one listener from its store.
///
/// Calling [`Unsubscribe::unsubscribe`] more than once is harmless, and so is
/// calling it after the store is gone.
#[derive(Clone)]
pub struct Unsubscribe {
    registry: Weak<ListenerRegistry>,
    id: u64,
}

impl Unsubscribe {
    pub(crate) fn new(registry: &Rc<ListenerRegistry>, id: u64) -> Self {
        Self {
            registry: Rc::downgrade(registry),
            id,
        }
    }

    pub fn unsubscribe(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}
