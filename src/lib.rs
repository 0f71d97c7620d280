//! # Reflux
//!
//! Reactive state primitives with scope-bound subscriptions.
//!
//! ## Core Concepts
//!
//! - **Streams**: hot [`Sink`]/[`Signal`] pairs, mutable [`Variable`] cells,
//!   and immutable [`Constant`] cells
//! - **Subscriptions**: cancellable observer registrations
//! - **Scopes**: aggregate subscriptions and cancel them when a host
//!   object's lifetime ends
//! - **Executors**: where observer callbacks run
//!
//! ## Example
//!
//! ```ignore
//! use reflux::{Executor, Sink, Subscribable, SubscriptionScope};
//!
//! struct ViewModel {
//!     scope: SubscriptionScope,
//! }
//!
//! let sink = Sink::new();
//! let signal = sink.signal();
//!
//! let vm = ViewModel { scope: SubscriptionScope::new() };
//!
//! // Unsubscribed automatically when `vm` is dropped.
//! signal.subscribe_scoped(&vm.scope, |value: i32| {
//!     println!("got {value}");
//! });
//!
//! sink.send(1);
//! drop(vm);
//! sink.send(2); // not delivered
//! ```

pub mod error;
pub mod executor;
pub mod scopes;
pub mod stream;
pub mod subscribable;
pub mod subscription;

// Re-exports
pub use error::{FluxError, Result};
pub use executor::{Executor, Task};
pub use scopes::{HostId, ScopeRegistry, SubscriptionScope};
pub use stream::{Constant, Signal, Sink, Variable};
pub use subscribable::Subscribable;
pub use subscription::Subscription;
