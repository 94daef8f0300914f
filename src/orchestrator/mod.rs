//! Prompt submission gating.
//!
//! [`PromptOrchestrator`] wraps arbitrary asynchronous submissions. While the
//! cooldown engine is `Idle` a submission runs immediately; while it is
//! `Active` the submission is queued and replayed in FIFO order once the
//! engine reports `cooldown:ended`.
//!
//! # Drain contract
//!
//! - Items run one at a time, in submission order, never concurrently with
//!   each other.
//! - Before each dequeue the drainer re-checks the engine. If churn has put
//!   it back into `Active`, draining pauses and resumes at the next
//!   `cooldown:ended`. The item already started always runs to completion.
//! - An item's failure or panic reaches only its own caller.
//! - [`PromptOrchestrator::close`] detaches from the engine. A drain already
//!   under way keeps running until the queue is empty, still pausing on
//!   re-activation. If no drain has started, queued items stay queued.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::{Notify, broadcast, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::cooldown::CooldownEngine;
use crate::models::CooldownEvent;

/// The future returned by [`PromptOrchestrator::wrap_prompt`].
pub type PromptFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

type Job = Box<dyn FnOnce() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send>;

/// A deferred submission.
struct QueueItem {
    id: u64,
    job: Job,
}

struct Shared {
    engine: CooldownEngine,
    queue: Mutex<VecDeque<QueueItem>>,
    wake: Arc<Notify>,
    closed: AtomicBool,
    draining: AtomicBool,
    next_id: AtomicU64,
    drainer: Mutex<Option<JoinHandle<()>>>,
}

impl Shared {
    fn queue(&self) -> MutexGuard<'_, VecDeque<QueueItem>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Acquire)
    }

    /// Pops the next item unless the engine is active.
    #[allow(clippy::cast_precision_loss)]
    fn next_ready(&self) -> Option<QueueItem> {
        if self.engine.is_active() {
            let remaining = self.queue().len();
            if remaining > 0 {
                info!(remaining, "queue paused: cooldown active");
            }
            return None;
        }
        let mut queue = self.queue();
        let item = queue.pop_front();
        metrics::gauge!("prompt_queue_depth").set(queue.len() as f64);
        item
    }

    /// Runs queued items until the queue empties or cooldown re-activates.
    ///
    /// A pass that pauses leaves the drain marked as under way, so it resumes
    /// at the next `cooldown:ended` even after [`PromptOrchestrator::close`].
    async fn drain(&self) {
        while let Some(item) = self.next_ready() {
            self.draining.store(true, Ordering::Release);
            info!(queue_id = item.id, "retrying queued prompt");
            (item.job)().await;
        }
        if self.queue().is_empty() {
            self.draining.store(false, Ordering::Release);
        }
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let drainer = self
            .drainer
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = drainer {
            handle.abort();
        }
    }
}

/// Defers prompt submissions while the project is churning.
///
/// Cloning yields another handle to the same queue, so a running submission
/// can itself call [`wrap_prompt`](Self::wrap_prompt).
///
/// # Example
///
/// ```rust
/// use uado::cooldown::{CooldownConfig, CooldownEngine};
/// use uado::orchestrator::PromptOrchestrator;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let engine = CooldownEngine::new(CooldownConfig::default());
/// let orchestrator = PromptOrchestrator::new(engine);
///
/// let answer = orchestrator.wrap_prompt(|| async { 42 }).await;
/// assert_eq!(answer, 42);
/// orchestrator.close();
/// # }
/// ```
#[derive(Clone)]
pub struct PromptOrchestrator {
    shared: Arc<Shared>,
}

impl PromptOrchestrator {
    /// Creates an orchestrator listening to `engine`.
    ///
    /// Must be called within a Tokio runtime: the queue drainer runs as a
    /// background task.
    #[must_use]
    pub fn new(engine: CooldownEngine) -> Self {
        let events = engine.subscribe();
        let shared = Arc::new(Shared {
            engine,
            queue: Mutex::new(VecDeque::new()),
            wake: Arc::new(Notify::new()),
            closed: AtomicBool::new(false),
            draining: AtomicBool::new(false),
            next_id: AtomicU64::new(1),
            drainer: Mutex::new(None),
        });
        let handle = tokio::spawn(run_drainer(
            Arc::downgrade(&shared),
            Arc::clone(&shared.wake),
            events,
        ));
        *shared
            .drainer
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(handle);
        Self { shared }
    }

    /// Submits `operation`, deferring it while cooldown is active.
    ///
    /// The cooldown state is sampled when this method is called, not when the
    /// returned future is first polled. The future resolves to exactly what
    /// `operation` produces; errors are passed through untouched.
    ///
    /// A queued operation runs on its own task. If it panics, the panic is
    /// resumed in the caller awaiting this future and the rest of the queue
    /// is unaffected.
    ///
    /// If a queued item is never run (the orchestrator was closed before any
    /// drain started, or dropped), the returned future stays pending.
    pub fn wrap_prompt<F, Fut, T>(&self, operation: F) -> PromptFuture<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        if self.shared.is_closed() || !self.shared.engine.is_active() {
            debug!("prompt allowed");
            metrics::counter!("prompts_allowed_total").increment(1);
            return Box::pin(operation());
        }

        let (tx, rx) = oneshot::channel();
        let job: Job = Box::new(move || {
            Box::pin(async move {
                let outcome = tokio::spawn(operation()).await;
                // The caller may have stopped waiting.
                let _ = tx.send(outcome);
            })
        });
        self.enqueue(job);

        Box::pin(async move {
            match rx.await {
                Ok(Ok(value)) => value,
                Ok(Err(err)) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
                _ => std::future::pending().await,
            }
        })
    }

    #[allow(clippy::cast_precision_loss)]
    #[instrument(skip(self, job))]
    fn enqueue(&self, job: Job) {
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        let depth = {
            let mut queue = self.shared.queue();
            queue.push_back(QueueItem { id, job });
            queue.len()
        };
        info!(queue_id = id, depth, "prompt queued");
        metrics::counter!("prompts_queued_total").increment(1);
        metrics::gauge!("prompt_queue_depth").set(depth as f64);

        // Cooldown may have ended between the state check and the push.
        if !self.shared.engine.is_active() {
            self.shared.wake.notify_one();
        }
    }

    /// Returns the number of submissions waiting to be replayed.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.shared.queue().len()
    }

    /// Returns the engine this orchestrator listens to.
    #[must_use]
    pub fn engine(&self) -> &CooldownEngine {
        &self.shared.engine
    }

    /// Returns true once [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    /// Detaches from the engine.
    ///
    /// Nothing is cancelled. A drain already under way runs to an empty
    /// queue. Without one, queued items stay queued and unrun. Later calls to
    /// [`wrap_prompt`](Self::wrap_prompt) run immediately.
    pub fn close(&self) {
        if self.shared.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let pending = self.queue_len();
        if self.shared.is_draining() {
            debug!(pending, "orchestrator closed mid-drain; finishing queue");
        } else if pending > 0 {
            warn!(pending, "orchestrator closed with queued prompts");
        } else {
            debug!("orchestrator closed");
        }
        self.shared.wake.notify_one();
    }
}

impl std::fmt::Debug for PromptOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptOrchestrator")
            .field("queue_len", &self.queue_len())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

/// Listens for `cooldown:ended` (or an enqueue nudge) and drains the queue.
///
/// Holds the shared state weakly so dropping every orchestrator handle
/// stops the task.
async fn run_drainer(
    shared: Weak<Shared>,
    wake: Arc<Notify>,
    mut events: broadcast::Receiver<CooldownEvent>,
) {
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) if event.is_ended() => debug!("cooldown ended"),
                Ok(_) => {
                    debug!("cooldown active");
                    continue;
                },
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "cooldown events lagged; re-checking state");
                },
                Err(broadcast::error::RecvError::Closed) => break,
            },
            () = wake.notified() => {},
        }

        let Some(shared) = shared.upgrade() else {
            break;
        };
        // Once closed, only a drain that already started is carried on.
        if shared.is_closed() && !shared.is_draining() {
            break;
        }
        shared.drain().await;
        if shared.is_closed() && !shared.is_draining() {
            break;
        }
    }
    debug!("queue drainer stopped");
}
