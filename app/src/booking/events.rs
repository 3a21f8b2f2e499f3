//! Subscription-based bus for page level events.
//!
//! Browser listeners (visibility, focus, storage, script load) publish into an
//! [`EventBus`]; the booking form registers handlers at mount and the returned
//! [`Subscription`] guards deregister them when dropped. The bus is
//! single-threaded like the page it serves.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// The places script finished loading.
    ScriptLoaded,
    /// The places script failed to load.
    ScriptFailed(String),
    /// The document became visible again.
    Visible,
    /// The window regained focus.
    Focus,
    /// The booking form was mounted again over live state.
    Remounted,
    /// Another tab changed local storage. `key` is `None` when storage was cleared.
    StorageChanged {
        key: Option<String>,
        new_value: Option<String>,
    },
    /// The session store is ready to be read.
    SessionReady,
}

type Handler = Rc<dyn Fn(&PageEvent)>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: Vec<(u64, Handler)>,
}

#[derive(Clone, Default)]
pub struct EventBus {
    registry: Rc<RefCell<Registry>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` until the returned guard is dropped.
    #[must_use = "dropping the subscription unregisters the handler"]
    pub fn subscribe(&self, handler: impl Fn(&PageEvent) + 'static) -> Subscription {
        let mut registry = self.registry.borrow_mut();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.handlers.push((id, Rc::new(handler)));
        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Deliver `event` to every handler registered at the time of the call.
    /// Handlers may subscribe or unsubscribe while being called.
    pub fn publish(&self, event: &PageEvent) {
        let handlers: Vec<Handler> = self
            .registry
            .borrow()
            .handlers
            .iter()
            .map(|(_, h)| Rc::clone(h))
            .collect();
        for handler in handlers {
            handler(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.borrow().handlers.len()
    }

    /// Handle that does not keep the bus alive, for long-lived browser callbacks.
    pub fn downgrade(&self) -> WeakEventBus {
        WeakEventBus {
            registry: Rc::downgrade(&self.registry),
        }
    }
}

#[derive(Clone)]
pub struct WeakEventBus {
    registry: Weak<RefCell<Registry>>,
}

impl WeakEventBus {
    /// Publish if the bus still exists. Returns whether it did.
    pub fn publish(&self, event: &PageEvent) -> bool {
        match self.registry.upgrade() {
            Some(registry) => {
                EventBus { registry }.publish(event);
                true
            }
            None => false,
        }
    }
}

pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .borrow_mut()
                .handlers
                .retain(|(id, _)| *id != self.id);
        }
    }
}
