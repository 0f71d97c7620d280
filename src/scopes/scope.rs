//! Subscription aggregation with cancel-on-drop.

use crate::subscription::Subscription;
use parking_lot::Mutex;
use std::fmt;
use tracing::debug;

enum State {
    Active(Vec<Subscription>),
    Cancelled,
}

/// Aggregates subscriptions into one cancellable unit.
///
/// A scope is either active or cancelled, and cancellation is permanent:
/// every owned subscription is unsubscribed, and a subscription added
/// afterwards is unsubscribed before [`add`](Self::add) returns and never
/// stored.
///
/// Dropping the scope cancels it.
pub struct SubscriptionScope {
    state: Mutex<State>,
}

impl SubscriptionScope {
    /// Create an active scope owning no subscriptions.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::Active(Vec::new())),
        }
    }

    /// Add a subscription to this scope.
    ///
    /// If the scope is already cancelled the subscription is unsubscribed
    /// synchronously and discarded.
    pub fn add(&self, subscription: Subscription) {
        {
            let mut state = self.state.lock();
            if let State::Active(subscriptions) = &mut *state {
                subscriptions.push(subscription);
                return;
            }
        }

        // Cancelled: unsubscribe outside the lock.
        subscription.unsubscribe();
    }

    /// Unsubscribe every owned subscription and mark the scope cancelled.
    ///
    /// Idempotent: concurrent or repeated calls unsubscribe each
    /// subscription once. Teardowns run outside the scope lock.
    pub fn unsubscribe_all(&self) {
        let drained = {
            let mut state = self.state.lock();
            match std::mem::replace(&mut *state, State::Cancelled) {
                State::Active(subscriptions) => subscriptions,
                State::Cancelled => Vec::new(),
            }
        };

        if !drained.is_empty() {
            debug!(count = drained.len(), "cancelling scoped subscriptions");
        }
        for subscription in drained {
            subscription.unsubscribe();
        }
    }

    /// Whether the scope has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(*self.state.lock(), State::Cancelled)
    }

    /// Number of subscriptions currently owned. Zero once cancelled.
    pub fn len(&self) -> usize {
        match &*self.state.lock() {
            State::Active(subscriptions) => subscriptions.len(),
            State::Cancelled => 0,
        }
    }

    /// Whether the scope owns no subscriptions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SubscriptionScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SubscriptionScope {
    fn drop(&mut self) {
        self.unsubscribe_all();
    }
}

impl fmt::Debug for SubscriptionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionScope")
            .field("cancelled", &self.is_cancelled())
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counted_subscription(count: &Arc<AtomicUsize>) -> Subscription {
        let counter = Arc::clone(count);
        Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_cancel_all_unsubscribes_everything() {
        let count = Arc::new(AtomicUsize::new(0));
        let scope = SubscriptionScope::new();

        let subs: Vec<Subscription> = (0..4).map(|_| counted_subscription(&count)).collect();
        for sub in &subs {
            scope.add(sub.clone());
        }
        assert_eq!(scope.len(), 4);

        scope.unsubscribe_all();

        assert!(scope.is_cancelled());
        assert_eq!(count.load(Ordering::SeqCst), 4);
        assert!(subs.iter().all(Subscription::is_unsubscribed));
    }

    #[test]
    fn test_add_after_cancel_unsubscribes_immediately() {
        let count = Arc::new(AtomicUsize::new(0));
        let scope = SubscriptionScope::new();
        scope.unsubscribe_all();

        let sub = counted_subscription(&count);
        scope.add(sub.clone());

        // Cancelled synchronously, never stored.
        assert!(sub.is_unsubscribed());
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(scope.len(), 0);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let count = Arc::new(AtomicUsize::new(0));
        let scope = SubscriptionScope::new();
        scope.add(counted_subscription(&count));

        scope.unsubscribe_all();
        scope.unsubscribe_all();
        scope.unsubscribe_all();

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_cancels() {
        let count = Arc::new(AtomicUsize::new(0));
        let sub = counted_subscription(&count);
        {
            let scope = SubscriptionScope::new();
            scope.add(sub.clone());
            assert_eq!(count.load(Ordering::SeqCst), 0);
        }

        assert!(sub.is_unsubscribed());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_early_unsubscribe_leaves_siblings_owned() {
        let count = Arc::new(AtomicUsize::new(0));
        let scope = SubscriptionScope::new();

        let first = counted_subscription(&count);
        let second = counted_subscription(&count);
        scope.add(first.clone());
        scope.add(second.clone());

        first.unsubscribe();
        assert!(!second.is_unsubscribed());
        assert_eq!(count.load(Ordering::SeqCst), 1);

        scope.unsubscribe_all();
        assert!(second.is_unsubscribed());
        // The early unsubscribe is not repeated by the scope.
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
