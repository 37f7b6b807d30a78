#![forbid(unsafe_code)]

//! Lifecycle event bus.
//!
//! Observers subscribe for [`LifecycleEvent`]s and receive them synchronously
//! when the modal crosses a lifecycle boundary. A [`Subscription`] is the
//! only handle to a registered callback; dropping it unregisters the
//! callback, so observers cannot outlive their owners.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::config::ButtonSpec;

/// A lifecycle notification.
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    /// Emitted before any mounting work when a show is accepted.
    BeforeShow,
    /// Emitted when the modal reaches its settled visible state.
    Show,
    /// Emitted before any teardown work when a hide is accepted.
    BeforeHide,
    /// Emitted when teardown completes and the modal is hidden again.
    Hide,
    /// Emitted when a dismiss control triggers the hide; carries the
    /// descriptor of the control (`None` for keyboard dismissal).
    Dismiss(Option<ButtonSpec>),
}

type Callback = Rc<dyn Fn(&LifecycleEvent)>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: Vec<(u64, Callback)>,
}

/// Registry of lifecycle observers.
///
/// # Invariants
/// - An entry stays registered exactly as long as its [`Subscription`]
///   is alive.
/// - Callbacks registered during an emit see only later events.
#[derive(Clone, Default)]
pub struct Hooks {
    registry: Rc<RefCell<Registry>>,
}

impl Hooks {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer. The returned [`Subscription`] must be held;
    /// dropping it removes the observer.
    #[must_use = "dropping the subscription unregisters the callback"]
    pub fn subscribe(&self, callback: impl Fn(&LifecycleEvent) + 'static) -> Subscription {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.entries.push((id, Rc::new(callback)));
        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Deliver `event` to every live observer, in registration order.
    pub fn emit(&self, event: &LifecycleEvent) {
        // Snapshot first so a callback may subscribe or drop subscriptions
        // without holding the borrow.
        let callbacks: Vec<Callback> = self
            .registry
            .borrow()
            .entries
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        for callback in callbacks {
            callback(event);
        }
    }

    /// Number of live observers.
    pub fn len(&self) -> usize {
        self.registry.borrow().entries.len()
    }

    /// Whether no observers are registered.
    pub fn is_empty(&self) -> bool {
        self.registry.borrow().entries.is_empty()
    }
}

/// Handle to a registered lifecycle observer.
///
/// Dropping the subscription unregisters the observer. Outliving the
/// [`Hooks`] registry is harmless; the drop becomes a no-op.
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl Subscription {
    /// Unregister explicitly. Equivalent to dropping.
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .borrow_mut()
                .entries
                .retain(|(id, _)| *id != self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
