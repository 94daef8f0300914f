//! Cooldown state machine.
//!
//! Pure transition logic with no timers or I/O: the engine feeds inputs
//! and a clock reading, and carries out the returned [`Transition`].
//!
//! | State    | Input           | Next     | Effect                                          |
//! |----------|-----------------|----------|-------------------------------------------------|
//! | `Idle`   | churn           | `Active` | safety deadline = now + timeout, emit `Active`  |
//! | `Active` | churn           | `Active` | reset safety deadline, drop stability deadline  |
//! | `Active` | stability hint  | `Active` | stability deadline = now + window               |
//! | `Idle`   | stability hint  | `Idle`   | none                                            |
//! | `Active` | timer (current) | `Idle`   | clear deadlines, emit `Ended`                   |
//! | any      | timer (stale)   | same     | none                                            |
//!
//! Exactly one timer is pending while `Active`: it is armed for whichever
//! deadline comes first. Every arm bumps an epoch, and a timer whose epoch
//! no longer matches is ignored, so a superseded timer can never end a
//! later cooldown.

use std::time::Duration;
use tokio::time::Instant;

use super::CooldownConfig;
use crate::models::{CooldownEvent, EndReason};

/// The two cooldown states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CooldownState {
    /// Prompts run immediately.
    #[default]
    Idle,
    /// Prompts are deferred.
    Active,
}

impl CooldownState {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Active => "active",
        }
    }
}

/// An input to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// A churn-heavy signal.
    Churn,
    /// A stability hint.
    StabilityHint,
    /// The pending timer armed with `epoch` fired.
    TimerFired {
        /// Epoch the timer was armed with.
        epoch: u64,
    },
}

/// Which deadline a pending timer stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// The safety ceiling.
    Safety,
    /// The stability window.
    Stability,
}

impl TimerKind {
    const fn end_reason(self) -> EndReason {
        match self {
            Self::Safety => EndReason::Timeout,
            Self::Stability => EndReason::Stable,
        }
    }
}

/// A timer the engine must arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    /// Deadline kind.
    pub kind: TimerKind,
    /// When to fire.
    pub deadline: Instant,
    /// Epoch to report back in [`Input::TimerFired`].
    pub epoch: u64,
}

/// What the engine must do with its pending timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    /// Leave the pending timer (if any) alone.
    Keep,
    /// Replace the pending timer with this one.
    Arm(Timer),
    /// Drop the pending timer.
    Cancel,
}

/// The outcome of applying one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Event to publish, only on an edge.
    pub emit: Option<CooldownEvent>,
    /// Timer bookkeeping.
    pub timer: TimerCommand,
}

impl Transition {
    const NONE: Self = Self {
        emit: None,
        timer: TimerCommand::Keep,
    };
}

/// The cooldown automaton.
#[derive(Debug, Clone)]
pub struct CooldownMachine {
    state: CooldownState,
    timeout: Duration,
    stable_window: Duration,
    safety_deadline: Option<Instant>,
    stability_deadline: Option<Instant>,
    pending: Option<Timer>,
    epoch: u64,
}

impl CooldownMachine {
    /// Creates an idle machine.
    #[must_use]
    pub const fn new(config: CooldownConfig) -> Self {
        Self {
            state: CooldownState::Idle,
            timeout: config.timeout,
            stable_window: config.stable_window,
            safety_deadline: None,
            stability_deadline: None,
            pending: None,
            epoch: 0,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> CooldownState {
        self.state
    }

    /// Returns the timer that should currently be pending.
    #[must_use]
    pub const fn pending_timer(&self) -> Option<Timer> {
        self.pending
    }

    /// Returns the safety deadline while `Active`.
    #[must_use]
    pub const fn safety_deadline(&self) -> Option<Instant> {
        self.safety_deadline
    }

    /// Returns the stability deadline, if a stability hint is pending.
    #[must_use]
    pub const fn stability_deadline(&self) -> Option<Instant> {
        self.stability_deadline
    }

    /// Applies one input at time `now`.
    pub fn apply(&mut self, input: Input, now: Instant) -> Transition {
        match (self.state, input) {
            (CooldownState::Idle, Input::Churn) => {
                self.state = CooldownState::Active;
                self.safety_deadline = Some(now + self.timeout);
                self.stability_deadline = None;
                Transition {
                    emit: Some(CooldownEvent::Active),
                    timer: self.arm(),
                }
            },
            (CooldownState::Active, Input::Churn) => {
                self.safety_deadline = Some(now + self.timeout);
                self.stability_deadline = None;
                Transition {
                    emit: None,
                    timer: self.arm(),
                }
            },
            (CooldownState::Active, Input::StabilityHint) => {
                self.stability_deadline = Some(now + self.stable_window);
                Transition {
                    emit: None,
                    timer: self.arm(),
                }
            },
            (CooldownState::Active, Input::TimerFired { epoch }) => match self.pending {
                Some(timer) if timer.epoch == epoch => {
                    self.state = CooldownState::Idle;
                    self.safety_deadline = None;
                    self.stability_deadline = None;
                    self.pending = None;
                    Transition {
                        emit: Some(CooldownEvent::Ended {
                            reason: timer.kind.end_reason(),
                        }),
                        timer: TimerCommand::Cancel,
                    }
                },
                _ => Transition::NONE,
            },
            (CooldownState::Idle, Input::StabilityHint | Input::TimerFired { .. }) => {
                Transition::NONE
            },
        }
    }

    /// Arms a timer for the earliest outstanding deadline.
    fn arm(&mut self) -> TimerCommand {
        let next = match (self.safety_deadline, self.stability_deadline) {
            (Some(safety), Some(stable)) if stable < safety => {
                Some((TimerKind::Stability, stable))
            },
            (Some(safety), _) => Some((TimerKind::Safety, safety)),
            (None, Some(stable)) => Some((TimerKind::Stability, stable)),
            (None, None) => None,
        };

        match next {
            Some((kind, deadline)) => {
                self.epoch = self.epoch.wrapping_add(1);
                let timer = Timer {
                    kind,
                    deadline,
                    epoch: self.epoch,
                };
                self.pending = Some(timer);
                TimerCommand::Arm(timer)
            },
            None => {
                self.pending = None;
                TimerCommand::Cancel
            },
        }
    }
}
