//! Scope-bound subscription lifetime management.
//!
//! A [`SubscriptionScope`] aggregates any number of subscriptions into one
//! cancellable unit. Dropping the scope cancels every subscription it owns,
//! so embedding a scope in a struct ties those subscriptions to the
//! struct's lifetime:
//!
//! ```ignore
//! struct ViewModel {
//!     scope: SubscriptionScope,
//! }
//!
//! let vm = ViewModel { scope: SubscriptionScope::new() };
//! signal.subscribe_scoped(&vm.scope, |value| update(value));
//! drop(vm); // every scoped subscription is now unsubscribed
//! ```
//!
//! For hosts that cannot embed a scope, a [`ScopeRegistry`] associates at
//! most one scope with each live `Arc` host, created on first use under the
//! registry lock.

mod registry;
mod scope;

pub use registry::{HostId, ScopeRegistry};
pub use scope::SubscriptionScope;
