//! Hot stream pair: a `Sink` pushes values, its `Signal` exposes
//! subscription.

use crate::executor::Executor;
use crate::subscribable::Subscribable;
use crate::subscription::Subscription;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub(crate) type Observer<T> = Arc<dyn Fn(T) + Send + Sync>;

struct ObserverEntry<T> {
    token: u64,
    executor: Executor,
    observer: Observer<T>,
}

impl<T> Clone for ObserverEntry<T> {
    fn clone(&self) -> Self {
        Self {
            token: self.token,
            executor: self.executor.clone(),
            observer: Arc::clone(&self.observer),
        }
    }
}

/// Observer table shared by the stream types.
///
/// Observers are snapshotted under the table lock and invoked after it is
/// released, so an observer may freely subscribe or unsubscribe from
/// within its own callback.
pub(crate) struct Hub<T> {
    observers: Mutex<Vec<ObserverEntry<T>>>,
    next_token: AtomicU64,
}

impl<T: Clone + Send + 'static> Hub<T> {
    pub(crate) fn new() -> Self {
        Self {
            observers: Mutex::new(Vec::new()),
            next_token: AtomicU64::new(0),
        }
    }

    /// Register an observer; the returned subscription removes it again.
    ///
    /// The teardown holds only a weak reference to the table, so an
    /// outstanding subscription does not keep the stream alive.
    pub(crate) fn subscribe(
        hub: &Arc<Self>,
        executor: Executor,
        observer: Observer<T>,
    ) -> Subscription {
        let token = hub.next_token.fetch_add(1, Ordering::Relaxed);
        hub.observers.lock().push(ObserverEntry {
            token,
            executor,
            observer,
        });

        let hub = Arc::downgrade(hub);
        Subscription::new(move || {
            if let Some(hub) = hub.upgrade() {
                hub.observers.lock().retain(|entry| entry.token != token);
            }
        })
    }

    /// Deliver `value` to every current observer via its executor.
    pub(crate) fn broadcast(&self, value: T) {
        let snapshot: Vec<ObserverEntry<T>> = self.observers.lock().clone();
        for entry in snapshot {
            let observer = entry.observer;
            let value = value.clone();
            entry.executor.execute(move || observer(value));
        }
    }

    pub(crate) fn observer_count(&self) -> usize {
        self.observers.lock().len()
    }
}

/// The sending half of a hot stream.
pub struct Sink<T> {
    hub: Arc<Hub<T>>,
}

/// The subscribable half of a hot stream.
///
/// Signals are cheap to clone; clones subscribe to the same stream.
pub struct Signal<T> {
    hub: Arc<Hub<T>>,
}

impl<T: Clone + Send + 'static> Sink<T> {
    /// Create a sink with no observers.
    pub fn new() -> Self {
        Self {
            hub: Arc::new(Hub::new()),
        }
    }

    /// The signal observers subscribe through.
    pub fn signal(&self) -> Signal<T> {
        Signal {
            hub: Arc::clone(&self.hub),
        }
    }

    /// Deliver `value` to every current observer via its executor.
    pub fn send(&self, value: T) {
        self.hub.broadcast(value);
    }

    /// Number of currently subscribed observers.
    pub fn observer_count(&self) -> usize {
        self.hub.observer_count()
    }
}

impl<T: Clone + Send + 'static> Default for Sink<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            hub: Arc::clone(&self.hub),
        }
    }
}

impl<T: Clone + Send + 'static> Subscribable for Signal<T> {
    type Value = T;

    fn subscribe<F>(&self, executor: Executor, observer: F) -> Subscription
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Hub::subscribe(&self.hub, executor, Arc::new(observer))
    }
}

impl<T> fmt::Debug for Sink<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sink")
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signal")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collector() -> (Arc<Mutex<Vec<i32>>>, impl Fn(i32) + Send + Sync) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        (seen, move |value| sink_seen.lock().push(value))
    }

    #[test]
    fn test_send_reaches_all_observers() {
        let sink = Sink::new();
        let signal = sink.signal();

        let (first, observe_first) = collector();
        let (second, observe_second) = collector();
        signal.subscribe(Executor::immediate(), observe_first);
        signal.subscribe(Executor::immediate(), observe_second);

        sink.send(1);
        sink.send(2);

        assert_eq!(*first.lock(), vec![1, 2]);
        assert_eq!(*second.lock(), vec![1, 2]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let sink = Sink::new();
        let signal = sink.signal();

        let (seen, observe) = collector();
        let subscription = signal.subscribe(Executor::immediate(), observe);

        sink.send(1);
        subscription.unsubscribe();
        sink.send(2);

        assert_eq!(*seen.lock(), vec![1]);
        assert_eq!(sink.observer_count(), 0);
    }

    #[test]
    fn test_late_subscriber_misses_earlier_values() {
        let sink = Sink::new();
        let signal = sink.signal();

        sink.send(1);

        let (seen, observe) = collector();
        signal.subscribe(Executor::immediate(), observe);
        sink.send(2);

        assert_eq!(*seen.lock(), vec![2]);
    }

    #[test]
    fn test_observer_may_unsubscribe_itself() {
        let sink = Sink::new();
        let signal = sink.signal();

        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let (seen, observe) = collector();
        let inner_slot = Arc::clone(&slot);
        let subscription = signal.subscribe(Executor::immediate(), move |value| {
            observe(value);
            if let Some(sub) = inner_slot.lock().take() {
                sub.unsubscribe();
            }
        });
        *slot.lock() = Some(subscription);

        sink.send(1);
        sink.send(2);

        assert_eq!(*seen.lock(), vec![1]);
    }
}
