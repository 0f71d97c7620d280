//! Value streams: hot sink/signal pairs and stateful cells.
//!
//! - [`Sink`] / [`Signal`]: a hot stream. Values pushed into the sink are
//!   delivered to every observer subscribed to the signal.
//! - [`Variable`]: a mutable state cell whose signal replays the current
//!   value to new observers.
//! - [`Constant`]: an immutable cell that replays its value once.
//!
//! Every observer invocation is dispatched through the executor the
//! observer was subscribed with; no delivery order is guaranteed between
//! distinct observers.

mod constant;
mod sink;
mod variable;

pub use constant::Constant;
pub use sink::{Signal, Sink};
pub use variable::Variable;
