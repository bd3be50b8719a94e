//! Global key handling as scoped subscriptions.
//!
//! A component that wants to react to a key holds a [`Subscription`] for as
//! long as it is mounted; dropping the guard unregisters the listener, so
//! repeated mounts can never stack duplicate listeners.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Enter,
    NumpadEnter,
    Escape,
    Other(String),
}

/// What a subscriber wants done when its key is pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listener {
    /// Enter / NumpadEnter: focus the search input and clear its text.
    FocusSearch,
    /// Escape: close the open detail view.
    CloseDetail,
}

impl Listener {
    pub fn reacts_to(self, key: &Key) -> bool {
        match self {
            Listener::FocusSearch => matches!(key, Key::Enter | Key::NumpadEnter),
            Listener::CloseDetail => matches!(key, Key::Escape),
        }
    }
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    active: Vec<(u64, Listener)>,
}

/// Shared listener registry. Clones refer to the same registry.
#[derive(Clone, Default)]
pub struct KeyListeners {
    registry: Rc<RefCell<Registry>>,
}

impl KeyListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: Listener) -> Subscription {
        let mut registry = self.registry.borrow_mut();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.active.push((id, listener));
        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Listeners that react to `key`, in subscription order.
    pub fn dispatch(&self, key: &Key) -> Vec<Listener> {
        self.registry
            .borrow()
            .active
            .iter()
            .map(|(_, listener)| *listener)
            .filter(|listener| listener.reacts_to(key))
            .collect()
    }

    pub fn count(&self, listener: Listener) -> usize {
        self.registry
            .borrow()
            .active
            .iter()
            .filter(|(_, l)| *l == listener)
            .count()
    }

    pub fn len(&self) -> usize {
        self.registry.borrow().active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// RAII guard for a registered listener.
#[must_use = "dropping this guard unsubscribes the listener"]
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().active.retain(|(id, _)| *id != self.id);
        }
    }
}
