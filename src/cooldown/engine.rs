//! Timer-driven cooldown engine.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use super::CooldownConfig;
use super::machine::{CooldownMachine, CooldownState, Input, Timer, TimerCommand};
use crate::models::{ChurnKind, CooldownEvent};
use crate::signals::SignalSink;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Infers "stable" vs "churning" from asynchronous signals.
///
/// A cheap, cloneable handle: clones share one state machine. Transitions
/// are published on a broadcast channel obtained through
/// [`CooldownEngine::subscribe`]; only `Idle → Active` and `Active → Idle`
/// edges are published.
///
/// The engine is bound to the Tokio runtime it was created in. Its timers run
/// there, so signals may be delivered from any thread, including a file
/// watcher's callback thread.
///
/// # Example
///
/// ```rust
/// use uado::cooldown::{CooldownConfig, CooldownEngine};
/// use uado::models::{ChurnKind, CooldownEvent};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let engine = CooldownEngine::new(CooldownConfig::from_millis(Some(100), Some(20)));
/// let mut events = engine.subscribe();
///
/// engine.churn_heavy(ChurnKind::FileChanged);
/// assert!(engine.is_active());
/// assert_eq!(events.recv().await.unwrap(), CooldownEvent::Active);
///
/// engine.stability_hint();
/// assert!(events.recv().await.unwrap().is_ended());
/// assert!(!engine.is_active());
/// # }
/// ```
#[derive(Clone)]
pub struct CooldownEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    config: CooldownConfig,
    runtime: Handle,
    driver: Mutex<Driver>,
    events: broadcast::Sender<CooldownEvent>,
}

struct Driver {
    machine: CooldownMachine,
    timer_task: Option<JoinHandle<()>>,
}

impl Driver {
    fn cancel_timer(&mut self) {
        if let Some(task) = self.timer_task.take() {
            task.abort();
        }
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

impl CooldownEngine {
    /// Creates an idle engine bound to the current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn new(config: CooldownConfig) -> Self {
        let (events, _receiver) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(EngineInner {
                config,
                runtime: Handle::current(),
                driver: Mutex::new(Driver {
                    machine: CooldownMachine::new(config),
                    timer_task: None,
                }),
                events,
            }),
        }
    }

    /// Returns the timing configuration.
    #[must_use]
    pub fn config(&self) -> CooldownConfig {
        self.inner.config
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> CooldownState {
        self.lock().machine.state()
    }

    /// Returns true while prompts should be deferred.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state() == CooldownState::Active
    }

    /// Subscribes to state transitions.
    ///
    /// Only transitions after the call are delivered.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CooldownEvent> {
        self.inner.events.subscribe()
    }

    /// Records a churn-heavy signal (file edit or language server busy).
    pub fn churn_heavy(&self, kind: ChurnKind) {
        debug!(kind = %kind, "churn signal");
        self.dispatch(Input::Churn);
    }

    /// Records a stability hint (language server ready).
    pub fn stability_hint(&self) {
        debug!("stability hint");
        self.dispatch(Input::StabilityHint);
    }

    fn lock(&self) -> MutexGuard<'_, Driver> {
        // The driver holds no invariant a panicking holder could break halfway.
        self.inner
            .driver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn dispatch(&self, input: Input) {
        // Signals from foreign threads read the runtime's clock.
        let _runtime = self.inner.runtime.enter();
        let mut driver = self.lock();
        let transition = driver.machine.apply(input, Instant::now());

        match transition.timer {
            TimerCommand::Keep => {},
            TimerCommand::Cancel => driver.cancel_timer(),
            TimerCommand::Arm(timer) => {
                driver.cancel_timer();
                driver.timer_task = Some(self.spawn_timer(timer));
            },
        }

        // Publish under the lock so subscribers see edges in order.
        if let Some(event) = transition.emit {
            match event {
                CooldownEvent::Active => info!(
                    timeout_ms = self.inner.config.timeout.as_millis(),
                    "cooldown:active"
                ),
                CooldownEvent::Ended { reason } => info!(reason = %reason, "cooldown:ended"),
            }
            metrics::counter!("cooldown_transitions_total", "event" => event.event_type())
                .increment(1);
            // No subscribers is fine.
            let _ = self.inner.events.send(event);
        }
    }

    fn spawn_timer(&self, timer: Timer) -> JoinHandle<()> {
        let engine: Weak<EngineInner> = Arc::downgrade(&self.inner);
        self.inner.runtime.spawn(async move {
            tokio::time::sleep_until(timer.deadline).await;
            if let Some(inner) = engine.upgrade() {
                debug!(kind = ?timer.kind, "cooldown timer fired");
                Self { inner }.dispatch(Input::TimerFired { epoch: timer.epoch });
            }
        })
    }
}

impl SignalSink for CooldownEngine {
    fn churn_heavy(&self, kind: ChurnKind) {
        Self::churn_heavy(self, kind);
    }

    fn stability_hint(&self) {
        Self::stability_hint(self);
    }
}

impl std::fmt::Debug for CooldownEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CooldownEngine")
            .field("config", &self.inner.config)
            .field("state", &self.state())
            .finish()
    }
}
