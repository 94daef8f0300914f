//! Typed interfaces between churn sources and the cooldown engine.
//!
//! Sources push [`Signal`]s into a [`SignalSink`]. The engine is the sink in
//! production; tests substitute a recording sink.

pub mod lsp;

use tokio::sync::mpsc;
use tracing::debug;

use crate::models::{ChurnKind, Signal};

/// Receiver of churn and stability notifications.
///
/// Calls are fire-and-forget and must not block.
pub trait SignalSink: Send + Sync {
    /// The project is mid-change.
    fn churn_heavy(&self, kind: ChurnKind);

    /// A disruptive background process finished.
    fn stability_hint(&self);

    /// Routes a [`Signal`] to the matching method.
    fn dispatch(&self, signal: Signal) {
        match signal {
            Signal::Churn(kind) => self.churn_heavy(kind),
            Signal::StabilityHint => self.stability_hint(),
        }
    }
}

impl<S: SignalSink + ?Sized> SignalSink for std::sync::Arc<S> {
    fn churn_heavy(&self, kind: ChurnKind) {
        (**self).churn_heavy(kind);
    }

    fn stability_hint(&self) {
        (**self).stability_hint();
    }
}

/// Forwards signals from a channel-backed source until every sender is
/// dropped. Returns how many signals were forwarded.
pub async fn forward_signals<S: SignalSink + ?Sized>(
    mut source: mpsc::Receiver<Signal>,
    sink: &S,
) -> usize {
    let mut forwarded = 0;
    while let Some(signal) = source.recv().await {
        sink.dispatch(signal);
        forwarded += 1;
    }
    debug!(forwarded, "signal source closed");
    forwarded
}

/// A sink that records every signal, for tests and diagnostics.
#[derive(Debug, Default)]
pub struct RecordingSink {
    signals: std::sync::Mutex<Vec<Signal>>,
}

impl RecordingSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the signals received so far, in order.
    #[must_use]
    pub fn signals(&self) -> Vec<Signal> {
        self.signals
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    fn record(&self, signal: Signal) {
        if let Ok(mut signals) = self.signals.lock() {
            signals.push(signal);
        }
    }
}

impl SignalSink for RecordingSink {
    fn churn_heavy(&self, kind: ChurnKind) {
        self.record(Signal::Churn(kind));
    }

    fn stability_hint(&self) {
        self.record(Signal::StabilityHint);
    }
}
