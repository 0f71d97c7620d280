//! Mutable state cell with replay-on-subscribe.

use super::sink::{Hub, Observer};
use crate::executor::Executor;
use crate::subscribable::Subscribable;
use crate::subscription::Subscription;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

struct Shared<T> {
    value: Mutex<T>,
    hub: Arc<Hub<T>>,
}

/// A mutable state cell.
///
/// Subscribing replays the current value through the observer's executor,
/// then delivers subsequent changes. Variables are cheap to clone; clones
/// share the same cell.
///
/// Lock order is value-then-observers; neither lock is held while an
/// observer runs.
pub struct Variable<T> {
    shared: Arc<Shared<T>>,
}

impl<T: Clone + Send + 'static> Variable<T> {
    /// Create a cell holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            shared: Arc::new(Shared {
                value: Mutex::new(value),
                hub: Arc::new(Hub::new()),
            }),
        }
    }

    /// The current value.
    pub fn value(&self) -> T {
        self.shared.value.lock().clone()
    }

    /// Replace the value and notify observers.
    pub fn set(&self, value: T) {
        *self.shared.value.lock() = value.clone();
        self.shared.hub.broadcast(value);
    }

    /// Apply `f` to the value in place and notify observers.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let value = {
            let mut guard = self.shared.value.lock();
            f(&mut guard);
            guard.clone()
        };
        self.shared.hub.broadcast(value);
    }
}

impl<T> Clone for Variable<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Clone + Send + 'static> Subscribable for Variable<T> {
    type Value = T;

    fn subscribe<F>(&self, executor: Executor, observer: F) -> Subscription
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        let observer: Observer<T> = Arc::new(observer);

        // Register and snapshot under the value lock so a concurrent `set`
        // is either included in the replayed value or broadcast to the
        // observer, never silently missed.
        let (subscription, initial) = {
            let guard = self.shared.value.lock();
            let subscription =
                Hub::subscribe(&self.shared.hub, executor.clone(), Arc::clone(&observer));
            (subscription, guard.clone())
        };

        executor.execute(move || observer(initial));
        subscription
    }
}

impl<T: fmt::Debug + Clone + Send + 'static> fmt::Debug for Variable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("value", &self.value())
            .finish()
    }
}
