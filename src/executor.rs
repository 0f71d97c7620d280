//! Execution contexts for observer callbacks.
//!
//! An [`Executor`] is an opaque scheduling context: `execute` hands a task
//! to that context and returns. The library never assumes where a task
//! runs; streams dispatch every observer invocation through the executor
//! the observer was subscribed with.

use crate::error::{FluxError, Result};
use crossbeam_channel::{unbounded, Sender};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use tracing::{error, warn};

/// A unit of work dispatched to an executor.
pub type Task = Box<dyn FnOnce() + Send>;

enum Dispatch {
    /// Run tasks inline on the calling thread.
    Immediate,
    /// Hand tasks to a caller-supplied scheduling function.
    Custom(Arc<dyn Fn(Task) + Send + Sync>),
    /// Queue tasks to a dedicated worker thread.
    Worker { name: String, sender: Sender<Task> },
}

/// Where and when an observer callback runs.
///
/// Executors are cheap to clone; clones share the same scheduling context.
#[derive(Clone)]
pub struct Executor {
    dispatch: Arc<Dispatch>,
}

impl Executor {
    /// An executor that runs tasks inline on the calling thread.
    pub fn immediate() -> Self {
        Self {
            dispatch: Arc::new(Dispatch::Immediate),
        }
    }

    /// Adapt a custom scheduling context.
    ///
    /// `f` receives each task and decides where to run it.
    pub fn new(f: impl Fn(Task) + Send + Sync + 'static) -> Self {
        Self {
            dispatch: Arc::new(Dispatch::Custom(Arc::new(f))),
        }
    }

    /// An executor that runs tasks in FIFO order on a dedicated named
    /// thread.
    ///
    /// The thread drains its queue and exits once every handle to this
    /// executor has been dropped. A panicking task terminates the worker;
    /// later dispatches report [`FluxError::ExecutorUnavailable`].
    pub fn worker(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let (sender, receiver) = unbounded::<Task>();

        let thread_name = name.clone();
        thread::Builder::new().name(name.clone()).spawn(move || {
            for task in receiver {
                if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
                    error!(worker = %thread_name, "task panicked, shutting down worker");
                    break;
                }
            }
        })?;

        Ok(Self {
            dispatch: Arc::new(Dispatch::Worker { name, sender }),
        })
    }

    /// Dispatch a task.
    ///
    /// A task sent to a worker that is no longer running is dropped with a
    /// warning; use [`try_execute`](Self::try_execute) to observe that.
    pub fn execute(&self, task: impl FnOnce() + Send + 'static) {
        if let Err(e) = self.try_execute(task) {
            warn!("dropping task: {e}");
        }
    }

    /// Dispatch a task, reporting an unavailable worker.
    pub fn try_execute(&self, task: impl FnOnce() + Send + 'static) -> Result<()> {
        match &*self.dispatch {
            Dispatch::Immediate => {
                task();
                Ok(())
            }
            Dispatch::Custom(f) => {
                f(Box::new(task));
                Ok(())
            }
            Dispatch::Worker { name, sender } => sender
                .send(Box::new(task))
                .map_err(|_| FluxError::ExecutorUnavailable(name.clone())),
        }
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::immediate()
    }
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.dispatch {
            Dispatch::Immediate => write!(f, "Executor::Immediate"),
            Dispatch::Custom(_) => write!(f, "Executor::Custom"),
            Dispatch::Worker { name, .. } => write!(f, "Executor::Worker({name})"),
        }
    }
}
