//! Serialized deferred execution.
//!
//! A [`WorkQueue`] owns one tokio worker task that runs queued [`Work`] items
//! strictly one at a time, in submission order. Two items queued on the same
//! queue therefore never overlap, which is what lets the boost state machine
//! go without a lock.
//!
//! [`DelayedWork`] layers abortable timers on top: each arm spawns a sleeper
//! that queues the work when it wakes, and cancelling aborts every sleeper
//! that has not fired yet.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("work queue '{queue}' needs a running tokio runtime")]
    NoRuntime { queue: &'static str },
}

enum Job {
    Run(Arc<Work>),
    Barrier(oneshot::Sender<()>),
}

/// A reusable unit of work.
///
/// The pending flag makes queueing idempotent: an item that is already
/// waiting in a queue is not added twice. The flag drops just before the body
/// runs, so queueing from inside the body schedules a fresh run.
pub struct Work {
    name: &'static str,
    pending: AtomicBool,
    func: Box<dyn Fn() + Send + Sync>,
}

impl Work {
    pub fn new<F>(name: &'static str, func: F) -> Arc<Self>
    where
        F: Fn() + Send + Sync + 'static,
    {
        Arc::new(Self {
            name,
            pending: AtomicBool::new(false),
            func: Box::new(func),
        })
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Queued and not yet started.
    #[must_use]
    pub fn is_queued(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    fn run(&self) {
        self.pending.store(false, Ordering::Release);
        (self.func)();
    }
}

impl fmt::Debug for Work {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Work")
            .field("name", &self.name)
            .field("pending", &self.is_queued())
            .finish_non_exhaustive()
    }
}

/// Handle to a single-worker queue. Cloning shares the same worker.
#[derive(Clone)]
pub struct WorkQueue {
    name: &'static str,
    tx: mpsc::UnboundedSender<Job>,
    runtime: Handle,
}

impl WorkQueue {
    /// Spawn the worker on the current tokio runtime.
    ///
    /// The worker lives until every handle (and every [`DelayedWork`] built
    /// on it) is dropped.
    pub fn new(name: &'static str) -> Result<Self, QueueError> {
        let runtime = Handle::try_current().map_err(|_| QueueError::NoRuntime { queue: name })?;
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();

        runtime.spawn(async move {
            while let Some(job) = rx.recv().await {
                match job {
                    Job::Run(work) => {
                        tracing::trace!(queue = name, work = work.name(), "Running work");
                        work.run();
                    }
                    Job::Barrier(done) => {
                        let _ = done.send(());
                    }
                }
            }
            tracing::debug!(queue = name, "Work queue stopped");
        });

        tracing::debug!(queue = name, "Work queue started");
        Ok(Self { name, tx, runtime })
    }

    /// Queue `work` for immediate execution.
    ///
    /// Returns `false` if it was already waiting to run.
    pub fn queue(&self, work: &Arc<Work>) -> bool {
        if work.pending.swap(true, Ordering::AcqRel) {
            return false;
        }
        if self.tx.send(Job::Run(Arc::clone(work))).is_err() {
            work.pending.store(false, Ordering::Release);
            tracing::warn!(queue = self.name, work = work.name(), "Work queue is gone; dropping work");
            return false;
        }
        true
    }

    /// Wait until everything queued before this call has finished running.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Job::Barrier(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }
}

impl fmt::Debug for WorkQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkQueue")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct Timers {
    next_id: u64,
    armed: HashMap<u64, JoinHandle<()>>,
}

/// A [`Work`] item that can also be queued after a delay.
///
/// Every [`queue_after`](Self::queue_after) arms its own timer; earlier arms
/// are neither replaced nor extended.
pub struct DelayedWork {
    work: Arc<Work>,
    queue: WorkQueue,
    timers: Mutex<Timers>,
}

impl DelayedWork {
    pub fn new(queue: WorkQueue, work: Arc<Work>) -> Arc<Self> {
        Arc::new(Self {
            work,
            queue,
            timers: Mutex::new(Timers::default()),
        })
    }

    /// Queue the work once `delay` has elapsed. A zero delay queues now.
    pub fn queue_after(self: &Arc<Self>, delay: Duration) {
        if delay.is_zero() {
            self.queue.queue(&self.work);
            return;
        }

        let mut timers = self.lock_timers();
        let id = timers.next_id;
        timers.next_id += 1;

        // Deadline is fixed at arm time, not when the sleeper first gets polled.
        let deadline = Instant::now() + delay;
        let this: Weak<Self> = Arc::downgrade(self);
        let handle = self.queue.runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if let Some(this) = this.upgrade() {
                this.fire(id);
            }
        });
        timers.armed.insert(id, handle);
        tracing::trace!(
            work = self.work.name(),
            delay_ms = delay.as_millis() as u64,
            "Armed delayed work"
        );
    }

    /// At least one timer is armed and has not fired.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.lock_timers().armed.is_empty()
    }

    /// Abort every armed timer. Returns whether any was pending.
    pub fn cancel(&self) -> bool {
        let armed: Vec<JoinHandle<()>> = self.lock_timers().armed.drain().map(|(_, h)| h).collect();
        for handle in &armed {
            handle.abort();
        }
        !armed.is_empty()
    }

    /// Cancel pending timers and, if there were any, queue the work now.
    ///
    /// Returns whether the work was pulled forward.
    pub fn flush_now(&self) -> bool {
        if !self.cancel() {
            return false;
        }
        self.queue.queue(&self.work);
        true
    }

    fn fire(&self, id: u64) {
        // A cancel that raced the wakeup already removed the entry.
        if self.lock_timers().armed.remove(&id).is_some() {
            self.queue.queue(&self.work);
        }
    }

    fn lock_timers(&self) -> MutexGuard<'_, Timers> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for DelayedWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelayedWork")
            .field("work", &self.work)
            .field("pending", &self.is_pending())
            .finish_non_exhaustive()
    }
}
