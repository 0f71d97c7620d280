//! Immutable cell: observers receive the value once at subscription.

use crate::executor::Executor;
use crate::subscribable::Subscribable;
use crate::subscription::Subscription;
use std::fmt;

/// An immutable value cell.
///
/// Subscribing replays the value once through the observer's executor; the
/// returned subscription has nothing to tear down.
pub struct Constant<T> {
    value: T,
}

impl<T: Clone + Send + 'static> Constant<T> {
    /// Create a cell holding `value`.
    pub fn new(value: T) -> Self {
        Self { value }
    }

    /// The held value.
    pub fn value(&self) -> T {
        self.value.clone()
    }
}

impl<T: Clone + Send + 'static> Subscribable for Constant<T> {
    type Value = T;

    fn subscribe<F>(&self, executor: Executor, observer: F) -> Subscription
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        let value = self.value.clone();
        executor.execute(move || observer(value));
        Subscription::empty()
    }
}

impl<T: fmt::Debug> fmt::Debug for Constant<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constant")
            .field("value", &self.value)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_replays_value_once() {
        let constant = Constant::new(42);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        let subscription = constant.subscribe(Executor::immediate(), move |value| {
            sink_seen.lock().push(value);
        });

        assert_eq!(*seen.lock(), vec![42]);
        assert!(!subscription.is_unsubscribed());
        subscription.unsubscribe();
        assert!(subscription.is_unsubscribed());
    }
}
