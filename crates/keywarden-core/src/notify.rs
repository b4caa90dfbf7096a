//! Notification context for observable-state updates
//!
//! All presence-flag writes are funneled through one designated execution
//! context so observers never see a torn update from a foreign thread. A UI
//! host implements [`NotificationContext`] over its event loop; headless hosts
//! can use [`DispatchThread`]; tests pump a [`QueuedContext`] by hand.

use std::collections::VecDeque;
use std::sync::mpsc::{self, Sender};
use std::sync::{Mutex, PoisonError};
use std::thread::JoinHandle;
use tracing::debug;

/// A unit of work to run on the notification context
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Capability to run work on the designated notification thread, eventually
///
/// The only ordering guarantee is FIFO per caller. `schedule` never blocks on
/// the work itself and returns nothing.
pub trait NotificationContext: Send + Sync {
    /// Enqueue a unit of work for the notification thread
    fn schedule(&self, job: Job);
}

/// Deterministic notification context backed by a plain queue
///
/// Work only runs when the owner pumps it via [`QueuedContext::run_next`] or
/// [`QueuedContext::run_all`]. Useful in tests and in hosts that drive their
/// own loop.
#[derive(Default)]
pub struct QueuedContext {
    queue: Mutex<VecDeque<Job>>,
}

impl QueuedContext {
    /// Create an empty queue context
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the oldest pending unit of work, if any
    pub fn run_next(&self) -> bool {
        let job = self
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match job {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }

    /// Run all pending work in FIFO order, returning how many units ran
    ///
    /// Work scheduled by the work itself is run too.
    pub fn run_all(&self) -> usize {
        let mut ran = 0;
        while self.run_next() {
            ran += 1;
        }
        ran
    }

    /// Number of currently pending units of work
    pub fn pending(&self) -> usize {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl NotificationContext for QueuedContext {
    fn schedule(&self, job: Job) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(job);
    }
}

/// Notification context backed by one dedicated worker thread
///
/// Jobs run in submission order on the owned thread. Dropping the context
/// closes the channel, lets queued work drain, and joins the thread.
pub struct DispatchThread {
    tx: Mutex<Option<Sender<Job>>>,
    worker: Option<JoinHandle<()>>,
}

impl DispatchThread {
    /// Spawn the notification thread
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel::<Job>();
        let worker = std::thread::Builder::new()
            .name("keywarden-notify".to_string())
            .spawn(move || {
                while let Ok(job) = rx.recv() {
                    job();
                }
                debug!("Notification thread shutting down");
            })
            .ok();

        Self {
            tx: Mutex::new(Some(tx)),
            worker,
        }
    }
}

impl Default for DispatchThread {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationContext for DispatchThread {
    fn schedule(&self, job: Job) {
        let guard = self.tx.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(tx) = guard.as_ref() {
            // A send error means the worker is gone; the job is dropped, as
            // there is no thread left to observe its effect anyway.
            let _ = tx.send(job);
        }
    }
}

impl Drop for DispatchThread {
    fn drop(&mut self) {
        self.tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_queued_context_runs_in_fifo_order() {
        let ctx = QueuedContext::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let seen = seen.clone();
            ctx.schedule(Box::new(move || seen.lock().unwrap().push(i)));
        }

        assert_eq!(ctx.pending(), 3);
        assert_eq!(ctx.run_all(), 3);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
        assert_eq!(ctx.pending(), 0);
    }

    #[test]
    fn test_queued_context_run_next_on_empty() {
        let ctx = QueuedContext::new();
        assert!(!ctx.run_next());
    }

    #[test]
    fn test_dispatch_thread_executes_work() {
        let ctx = DispatchThread::new();
        let (tx, rx) = mpsc::channel();

        ctx.schedule(Box::new(move || {
            tx.send(42).unwrap();
        }));

        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 42);
    }

    #[test]
    fn test_dispatch_thread_drains_on_drop() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let ctx = DispatchThread::new();
            for _ in 0..10 {
                let counter = counter.clone();
                ctx.schedule(Box::new(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                }));
            }
        }
        // Drop joined the worker, so all queued work has run
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }
}
