//! Cooldown timing configuration.

use std::time::Duration;

/// Default safety ceiling for a cooldown period.
pub const DEFAULT_TIMEOUT_MS: u64 = 90_000;

/// Default quiet period required after a stability hint.
pub const DEFAULT_STABLE_WINDOW_MS: u64 = 5_000;

/// Largest accepted value for either setting (24 hours).
pub const MAX_DURATION_MS: u64 = 24 * 60 * 60 * 1000;

/// Timing configuration for the cooldown engine.
///
/// # Environment Variables
///
/// | Variable | Type | Default | Description |
/// |----------|------|---------|-------------|
/// | `UADO_COOLDOWN_MS` | u64 | `90000` | Safety ceiling |
/// | `UADO_STABLE_WINDOW_MS` | u64 | `5000` | Quiet period after a stability hint |
///
/// Missing, zero, unparsable, or out-of-range values silently fall back to
/// the defaults.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use uado::cooldown::CooldownConfig;
///
/// let config = CooldownConfig::from_millis(Some(100), Some(0));
/// assert_eq!(config.timeout, Duration::from_millis(100));
/// assert_eq!(config.stable_window, Duration::from_millis(5_000));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownConfig {
    /// Safety ceiling measured from the most recent churn signal.
    pub timeout: Duration,
    /// Quiet period after a stability hint before cooldown ends.
    pub stable_window: Duration,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            stable_window: Duration::from_millis(DEFAULT_STABLE_WINDOW_MS),
        }
    }
}

impl CooldownConfig {
    /// Builds a configuration from optional millisecond values.
    #[must_use]
    pub fn from_millis(timeout_ms: Option<u64>, stable_window_ms: Option<u64>) -> Self {
        Self {
            timeout: Duration::from_millis(sanitize(timeout_ms, DEFAULT_TIMEOUT_MS)),
            stable_window: Duration::from_millis(sanitize(
                stable_window_ms,
                DEFAULT_STABLE_WINDOW_MS,
            )),
        }
    }

    /// Creates a configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Applies `UADO_COOLDOWN_MS` / `UADO_STABLE_WINDOW_MS` when set and valid.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(ms) = parse_env_ms("UADO_COOLDOWN_MS") {
            self.timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_env_ms("UADO_STABLE_WINDOW_MS") {
            self.stable_window = Duration::from_millis(ms);
        }
        self
    }

    /// Builder method to set the safety ceiling. Invalid values keep the default.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = sanitize_duration(timeout, DEFAULT_TIMEOUT_MS);
        self
    }

    /// Builder method to set the stability window. Invalid values keep the default.
    #[must_use]
    pub fn with_stable_window(mut self, window: Duration) -> Self {
        self.stable_window = sanitize_duration(window, DEFAULT_STABLE_WINDOW_MS);
        self
    }
}

const fn in_range(ms: u64) -> bool {
    ms > 0 && ms <= MAX_DURATION_MS
}

fn sanitize(value: Option<u64>, default: u64) -> u64 {
    value.filter(|ms| in_range(*ms)).unwrap_or(default)
}

fn sanitize_duration(value: Duration, default: u64) -> Duration {
    let ms = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
    if in_range(ms) {
        value
    } else {
        Duration::from_millis(default)
    }
}

fn parse_env_ms(name: &str) -> Option<u64> {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .filter(|ms| in_range(*ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CooldownConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(90));
        assert_eq!(config.stable_window, Duration::from_secs(5));
    }

    #[test]
    fn test_from_millis_falls_back() {
        assert_eq!(CooldownConfig::from_millis(None, None), CooldownConfig::default());
        assert_eq!(
            CooldownConfig::from_millis(Some(0), Some(MAX_DURATION_MS + 1)),
            CooldownConfig::default()
        );
        let config = CooldownConfig::from_millis(Some(100), Some(20));
        assert_eq!(config.timeout, Duration::from_millis(100));
        assert_eq!(config.stable_window, Duration::from_millis(20));
    }

    #[test]
    fn test_builder_methods() {
        let config = CooldownConfig::default()
            .with_timeout(Duration::from_millis(250))
            .with_stable_window(Duration::ZERO);
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.stable_window, Duration::from_millis(DEFAULT_STABLE_WINDOW_MS));
    }

    #[test]
    fn test_sub_millisecond_duration_rejected() {
        let config = CooldownConfig::default().with_timeout(Duration::from_micros(10));
        assert_eq!(config.timeout, Duration::from_millis(DEFAULT_TIMEOUT_MS));
    }
}
