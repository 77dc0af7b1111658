//! State subscriptions for the Store.
//!
//! Listeners are registered against a store and run synchronously after every
//! commit, while the store still holds its write lock. That gives each
//! listener every committed snapshot exactly once and in commit order.
//!
//! Listeners must not call back into the store or drop a [`Subscription`]
//! from inside the callback; both would wait on a lock the notifier holds.
//! A listener that panics is skipped for that commit only.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// A registered listener. Returns `true` when it actually fired.
pub(crate) type Listener<S> = Box<dyn FnMut(&S) -> bool + Send>;

struct Registry<S> {
    next_id: u64,
    listeners: Vec<(u64, Listener<S>)>,
}

/// Shared list of listeners owned by a store and all its clones.
pub(crate) struct SubscriberRegistry<S> {
    inner: Arc<Mutex<Registry<S>>>,
}

impl<S: 'static> SubscriberRegistry<S> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Registry {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Register a listener and hand back the guard that removes it.
    pub(crate) fn insert(&self, listener: Listener<S>) -> Subscription {
        let id = {
            let mut registry = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.listeners.push((id, listener));
            id
        };

        tracing::trace!(subscription_id = id, "Listener registered");

        let weak: Weak<Mutex<Registry<S>>> = Arc::downgrade(&self.inner);
        Subscription {
            id,
            remove: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    let mut registry = inner.lock().unwrap_or_else(PoisonError::into_inner);
                    registry.listeners.retain(|(existing, _)| *existing != id);
                }
            })),
        }
    }

    /// Run every listener against a freshly committed state.
    ///
    /// A panicking listener is logged and skipped; the remaining listeners
    /// still see the commit. Returns how many listeners fired.
    pub(crate) fn notify(&self, state: &S) -> usize {
        let mut registry = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        registry
            .listeners
            .iter_mut()
            .map(|(id, listener)| {
                panic::catch_unwind(AssertUnwindSafe(|| listener(state))).unwrap_or_else(|_| {
                    tracing::error!(subscription_id = *id, "Listener panicked");
                    metrics::counter!("store.subscribers.panicked").increment(1);
                    false
                })
            })
            .filter(|fired| *fired)
            .count()
    }

    pub(crate) fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .listeners
            .len()
    }
}

impl<S> Clone for SubscriberRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Guard for a state listener registered with `Store::subscribe`.
///
/// The listener stays registered until this guard is dropped or
/// [`Subscription::unsubscribe`] is called.
#[must_use = "dropping a Subscription immediately unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    remove: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Identifier of this subscription, unique per store
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Remove the listener now
    pub fn unsubscribe(mut self) {
        self.remove_listener();
    }

    fn remove_listener(&mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
            tracing::trace!(subscription_id = self.id, "Listener removed");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.remove_listener();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.remove.is_some())
            .finish()
    }
}

/// Build a listener that fires only when the selected slice changes.
pub(crate) fn selector_listener<S, T, Sel, L>(selector: Sel, initial: T, mut listener: L) -> Listener<S>
where
    S: 'static,
    Sel: Fn(&S) -> T + Send + 'static,
    T: PartialEq + Send + 'static,
    L: FnMut(&T) + Send + 'static,
{
    let mut last = initial;
    Box::new(move |state: &S| {
        let next = selector(state);
        if next == last {
            return false;
        }
        listener(&next);
        last = next;
        true
    })
}
