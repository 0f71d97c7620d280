//! Cancellable subscription handles.

use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type Teardown = Box<dyn FnOnce() + Send>;

/// A cancellable handle representing one observer's registration.
///
/// Cloning produces handles that share cancellation state: the first
/// `unsubscribe` on any clone runs the teardown, every later call is a
/// no-op.
#[derive(Clone)]
pub struct Subscription {
    inner: Arc<Inner>,
}

struct Inner {
    unsubscribed: AtomicBool,
    teardown: Mutex<Option<Teardown>>,
}

impl Subscription {
    /// Create a subscription that runs `teardown` when first unsubscribed.
    pub fn new(teardown: impl FnOnce() + Send + 'static) -> Self {
        Self {
            inner: Arc::new(Inner {
                unsubscribed: AtomicBool::new(false),
                teardown: Mutex::new(Some(Box::new(teardown))),
            }),
        }
    }

    /// A subscription with nothing to tear down.
    pub fn empty() -> Self {
        Self {
            inner: Arc::new(Inner {
                unsubscribed: AtomicBool::new(false),
                teardown: Mutex::new(None),
            }),
        }
    }

    /// Cancel the registration. Idempotent.
    pub fn unsubscribe(&self) {
        if self.inner.unsubscribed.swap(true, Ordering::AcqRel) {
            return;
        }

        // Take the teardown out before running it so a reentrant call
        // sees the flag and returns without touching the lock again.
        let teardown = self.inner.teardown.lock().take();
        if let Some(teardown) = teardown {
            teardown();
        }
    }

    /// Whether `unsubscribe` has been called on this handle or any clone.
    pub fn is_unsubscribed(&self) -> bool {
        self.inner.unsubscribed.load(Ordering::Acquire)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("unsubscribed", &self.is_unsubscribed())
            .finish()
    }
}
