//! Background execution of import work handed off by the UI thread.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::trace;

/// A unit of fire-and-forget work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs jobs somewhere other than the calling thread.
///
/// `dispatch` must return promptly: it is called from inside the window
/// procedure.
pub trait Dispatcher: Send + Sync {
    fn dispatch(&self, job: Job);
}

/// Runs jobs on a tokio runtime's blocking pool.
#[derive(Debug, Clone)]
pub struct TokioDispatcher {
    handle: Handle,
}

impl TokioDispatcher {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }
}

impl Dispatcher for TokioDispatcher {
    fn dispatch(&self, job: Job) {
        trace!("dispatching background job");
        // Detached; the job owns its own error handling.
        drop(self.handle.spawn_blocking(job));
    }
}

/// Runs jobs immediately on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineDispatcher;

impl Dispatcher for InlineDispatcher {
    fn dispatch(&self, job: Job) {
        job();
    }
}

#[derive(Debug, Default)]
struct InFlight {
    count: Mutex<usize>,
    idle: Condvar,
}

/// Decrements the in-flight count when the job ends, panicking or not.
struct Completion(Arc<InFlight>);

impl Drop for Completion {
    fn drop(&mut self) {
        let mut count = self.0.count.lock();
        *count -= 1;
        if *count == 0 {
            self.0.idle.notify_all();
        }
    }
}

/// Wraps a dispatcher and counts jobs that have not finished yet.
#[derive(Debug)]
pub struct TrackedDispatcher<D> {
    inner: D,
    in_flight: Arc<InFlight>,
}

impl<D: Dispatcher> TrackedDispatcher<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            in_flight: Arc::new(InFlight::default()),
        }
    }

    /// Jobs dispatched and not yet finished.
    pub fn in_flight(&self) -> usize {
        *self.in_flight.count.lock()
    }

    /// Block until every dispatched job has finished, or `timeout` passes.
    /// Returns `true` if nothing is left running.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let mut count = self.in_flight.count.lock();
        self.in_flight
            .idle
            .wait_while_for(&mut count, |count| *count > 0, timeout);
        *count == 0
    }
}

impl<D: Dispatcher> Dispatcher for TrackedDispatcher<D> {
    fn dispatch(&self, job: Job) {
        *self.in_flight.count.lock() += 1;
        let completion = Completion(self.in_flight.clone());
        self.inner.dispatch(Box::new(move || {
            let _completion = completion;
            job();
        }));
    }
}
