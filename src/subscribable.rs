//! The subscription boundary: base subscribe plus scoped composition.

use crate::executor::Executor;
use crate::scopes::{ScopeRegistry, SubscriptionScope};
use crate::subscription::Subscription;
use std::sync::Arc;

/// A source of values that observers can subscribe to.
///
/// The base [`subscribe`](Self::subscribe) requires an explicit executor.
/// The scoped variants additionally bind the subscription's lifetime to a
/// [`SubscriptionScope`] and default the executor to
/// [`Executor::immediate`].
pub trait Subscribable {
    type Value;

    /// Register `observer` to receive values on `executor`.
    ///
    /// Returns a subscription to unsubscribe the observer.
    fn subscribe<F>(&self, executor: Executor, observer: F) -> Subscription
    where
        F: Fn(Self::Value) + Send + Sync + 'static;

    /// Subscribe on the immediate executor and bind the subscription's
    /// lifetime to `scope`.
    fn subscribe_scoped<F>(&self, scope: &SubscriptionScope, observer: F) -> Subscription
    where
        F: Fn(Self::Value) + Send + Sync + 'static,
    {
        self.subscribe_scoped_on(scope, Executor::immediate(), observer)
    }

    /// Subscribe on `executor` and bind the subscription's lifetime to
    /// `scope`.
    ///
    /// The subscription is returned so the caller may also unsubscribe
    /// early, independent of the scope's lifetime. It is cancelled no later
    /// than the scope itself.
    fn subscribe_scoped_on<F>(
        &self,
        scope: &SubscriptionScope,
        executor: Executor,
        observer: F,
    ) -> Subscription
    where
        F: Fn(Self::Value) + Send + Sync + 'static,
    {
        let subscription = self.subscribe(executor, observer);
        scope.add(subscription.clone());
        subscription
    }

    /// Subscribe and bind the subscription's lifetime to `host` through
    /// `registry`.
    ///
    /// The scope is resolved with [`ScopeRegistry::scope_for`], so every
    /// subscription bound to the same live host lands in the same scope.
    fn subscribe_bound<H, F>(
        &self,
        registry: &ScopeRegistry,
        host: &Arc<H>,
        executor: Executor,
        observer: F,
    ) -> Subscription
    where
        H: ?Sized + Send + Sync + 'static,
        F: Fn(Self::Value) + Send + Sync + 'static,
    {
        let scope = registry.scope_for(host);
        let subscription = self.subscribe(executor, observer);
        scope.add(subscription.clone());
        subscription
    }
}
