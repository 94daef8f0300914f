//! Language server activity from tsserver logs.
//!
//! tsserver reports project-graph rebuilds as a pair of log lines. A start
//! line means the server is busy; the matching finish line is a stability
//! hint. Process management stays with the caller: anything that yields
//! lines (child stdout, a log file, stdin) can be scanned.

use regex::Regex;
use std::sync::LazyLock;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, trace};

use super::SignalSink;
use crate::models::{ChurnKind, Signal};
use crate::{Error, Result};

static GRAPH_WORKER_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Starting updateGraphWorker").unwrap_or_else(|_| unreachable!()));

static GRAPH_WORKER_FINISH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Finishing updateGraphWorker").unwrap_or_else(|_| unreachable!())
});

/// Maps one tsserver log line to a signal.
///
/// # Example
///
/// ```rust
/// use uado::models::{ChurnKind, Signal};
/// use uado::signals::lsp::classify_tsserver_line;
///
/// assert_eq!(
///     classify_tsserver_line("Info 12 [10:00:00.000] Starting updateGraphWorker: Project: /app"),
///     Some(Signal::Churn(ChurnKind::LspBusy))
/// );
/// assert_eq!(classify_tsserver_line("Info 13 request"), None);
/// ```
#[must_use]
pub fn classify_tsserver_line(line: &str) -> Option<Signal> {
    if GRAPH_WORKER_START.is_match(line) {
        Some(Signal::Churn(ChurnKind::LspBusy))
    } else if GRAPH_WORKER_FINISH.is_match(line) {
        Some(Signal::StabilityHint)
    } else {
        None
    }
}

/// Reads tsserver output line by line and dispatches classified signals.
///
/// Returns the number of signals dispatched once the reader hits EOF. Bytes
/// that are not valid UTF-8 are replaced rather than rejected.
///
/// # Errors
///
/// Returns an error if reading from the stream fails.
pub async fn scan_tsserver_output<R, S>(mut reader: R, sink: &S) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    S: SignalSink + ?Sized,
{
    let mut buf = Vec::new();
    let mut dispatched = 0;
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .await
            .map_err(|e| Error::OperationFailed {
                operation: "read_tsserver_output".to_string(),
                cause: e.to_string(),
            })?;
        if read == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        trace!(line, "tsserver output");
        if let Some(signal) = classify_tsserver_line(line) {
            debug!(?signal, "tsserver signal");
            sink.dispatch(signal);
            dispatched += 1;
        }
    }
    Ok(dispatched)
}
