//! Find-or-create association of scopes with `Arc` hosts.

use super::SubscriptionScope;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Identity of a host object: the address of its `Arc` allocation.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostId(usize);

impl HostId {
    /// Identity of the given host.
    pub fn of<T: ?Sized>(host: &Arc<T>) -> Self {
        HostId(Arc::as_ptr(host).cast::<()>() as usize)
    }
}

impl fmt::Debug for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostId({:#x})", self.0)
    }
}

struct Entry {
    /// Liveness probe for the host. The host's `Weak` is type-erased into
    /// the closure so entries for different host types share one table.
    alive: Box<dyn Fn() -> bool + Send + Sync>,
    scope: Arc<SubscriptionScope>,
}

/// Associates at most one [`SubscriptionScope`] with each live host.
///
/// The registry serves hosts that cannot embed a scope directly. Each entry
/// exclusively owns its scope; callers hold `Arc` clones of it. All
/// find-or-create traffic is serialized by the registry lock, so two
/// concurrent first subscriptions on the same host resolve to a single
/// scope.
///
/// Host death is detected by probing the host's weak count: a dead host's
/// scope is cancelled and evicted when `scope_for` next touches its slot or
/// when [`sweep`](Self::sweep) runs. Teardown at the exact moment the host
/// drops is the embedded-scope binding's territory; see the module docs.
pub struct ScopeRegistry {
    entries: Mutex<HashMap<HostId, Entry>>,
}

impl ScopeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the scope associated with `host`, creating it on first use.
    ///
    /// If the slot holds a scope whose host has died (the allocation was
    /// reused), the stale scope is cancelled and replaced.
    pub fn scope_for<T>(&self, host: &Arc<T>) -> Arc<SubscriptionScope>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let id = HostId::of(host);

        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get(&id) {
            if (entry.alive)() {
                return Arc::clone(&entry.scope);
            }
        }

        let stale = entries.remove(&id);
        let weak = Arc::downgrade(host);
        let scope = Arc::new(SubscriptionScope::new());
        entries.insert(
            id,
            Entry {
                alive: Box::new(move || weak.strong_count() > 0),
                scope: Arc::clone(&scope),
            },
        );
        drop(entries);

        if let Some(stale) = stale {
            debug!(host = ?id, "replacing scope left by a dead host");
            stale.scope.unsubscribe_all();
        }
        scope
    }

    /// Cancel and evict every entry whose host has been dropped.
    ///
    /// Returns the number of scopes released. Cancellation runs outside
    /// the registry lock.
    pub fn sweep(&self) -> usize {
        let dead: Vec<Entry> = {
            let mut entries = self.entries.lock();
            let dead_ids: Vec<HostId> = entries
                .iter()
                .filter(|(_, entry)| !(entry.alive)())
                .map(|(id, _)| *id)
                .collect();
            dead_ids
                .iter()
                .filter_map(|id| entries.remove(id))
                .collect()
        };

        for entry in &dead {
            entry.scope.unsubscribe_all();
        }
        if !dead.is_empty() {
            debug!(count = dead.len(), "swept scopes for dead hosts");
        }
        dead.len()
    }

    /// Number of registered scopes, including not-yet-swept dead hosts.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the registry holds no scopes.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for ScopeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ScopeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeRegistry")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription::Subscription;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_scope_for_is_stable() {
        let registry = ScopeRegistry::new();
        let host = Arc::new("host");

        let a = registry.scope_for(&host);
        let b = registry.scope_for(&host);

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_distinct_hosts_get_distinct_scopes() {
        let registry = ScopeRegistry::new();
        let first = Arc::new(1u32);
        let second = Arc::new(2u32);

        let a = registry.scope_for(&first);
        let b = registry.scope_for(&second);

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_sweep_cancels_scopes_of_dead_hosts() {
        let registry = ScopeRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));

        let host = Arc::new(());
        let scope = registry.scope_for(&host);
        let counter = Arc::clone(&count);
        scope.add(Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        // Host alive: sweep releases nothing.
        assert_eq!(registry.sweep(), 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);

        drop(host);
        assert_eq!(registry.sweep(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_scope_survives_while_host_lives() {
        let registry = ScopeRegistry::new();
        let host = Arc::new(());

        let scope = registry.scope_for(&host);
        drop(scope);

        // The entry owns the scope; dropping the caller's clone must not
        // cancel it.
        let scope = registry.scope_for(&host);
        assert!(!scope.is_cancelled());
    }

    #[test]
    fn test_trait_object_hosts() {
        let registry = ScopeRegistry::new();
        let host: Arc<dyn Fn() -> u8 + Send + Sync> = Arc::new(|| 7);

        let a = registry.scope_for(&host);
        let b = registry.scope_for(&host);
        assert!(Arc::ptr_eq(&a, &b));
    }
}
