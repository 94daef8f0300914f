//! Structured logging configuration.

use tracing_subscriber::EnvFilter;

use crate::config::LogLevel;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_FILTER_ENV: &str = "UADO_LOG";

/// Environment variable selecting the output format (`pretty` or `json`).
pub const LOG_FORMAT_ENV: &str = "UADO_LOG_FORMAT";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Parses a format string. Unknown values map to `Pretty`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// Logging configuration.
#[derive(Debug)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// Event filter.
    pub filter: EnvFilter,
}

impl LoggingConfig {
    /// Builds a configuration from the configured level.
    ///
    /// `verbose` raises the level to debug. `UADO_LOG` and `UADO_LOG_FORMAT`
    /// override both.
    #[must_use]
    pub fn from_level(level: LogLevel, verbose: bool) -> Self {
        let format = std::env::var(LOG_FORMAT_ENV)
            .map(|value| LogFormat::parse(&value))
            .unwrap_or_default();

        let filter = std::env::var(LOG_FILTER_ENV)
            .ok()
            .and_then(|directive| EnvFilter::try_new(directive).ok())
            .unwrap_or_else(|| EnvFilter::new(default_directive(level, verbose)));

        Self { format, filter }
    }
}

/// Maps a level to a filter directive for this crate.
fn default_directive(level: LogLevel, verbose: bool) -> &'static str {
    match (level, verbose) {
        (_, true) | (LogLevel::Debug, false) => "uado=debug",
        (LogLevel::Info, false) => "uado=info",
        (LogLevel::Silent, false) => "off",
    }
}
