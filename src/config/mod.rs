//! Configuration management.
//!
//! Settings come from a JSON file (`.uadorc.json` in the working directory
//! unless a path is given), then environment overrides.

use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::cooldown::CooldownConfig;

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".uadorc.json";

/// Default pause after writing files when `cooldownAfterWrite` is enabled.
pub const DEFAULT_WRITE_COOLDOWN_MS: u64 = 60_000;

/// Default number of pattern examples injected into a prompt.
pub const DEFAULT_PATTERN_TOP_N: usize = 3;

/// Log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Informational output.
    #[default]
    Info,
    /// Debug output.
    Debug,
    /// No log output.
    Silent,
}

impl LogLevel {
    /// Parses a level string. Unknown values map to `Info`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "debug" | "trace" => Self::Debug,
            "silent" | "off" | "none" => Self::Silent,
            _ => Self::Info,
        }
    }

    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Silent => "silent",
        }
    }
}

/// How prompts are delivered to the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptMode {
    /// `OpenAI` API.
    #[default]
    OpenAi,
    /// Anthropic Claude API.
    Claude,
    /// Manual copy/paste.
    Manual,
}

impl PromptMode {
    /// Parses a mode string. Unknown values map to `OpenAi`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "claude" | "anthropic" => Self::Claude,
            "manual" => Self::Manual,
            _ => Self::OpenAi,
        }
    }

    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Claude => "claude",
            Self::Manual => "manual",
        }
    }
}

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UadoConfig {
    /// Cooldown timing.
    pub cooldown: CooldownConfig,
    /// Log verbosity.
    pub log_level: LogLevel,
    /// Prompt delivery mode.
    pub mode: PromptMode,
    /// Pause after writing files so linters can settle.
    pub cooldown_after_write: bool,
    /// Length of that pause.
    pub write_cooldown: Duration,
    /// Inject similar stored patterns into new prompts.
    pub enable_pattern_injection: bool,
    /// Number of patterns to inject.
    pub pattern_top_n: usize,
}

impl Default for UadoConfig {
    fn default() -> Self {
        Self {
            cooldown: CooldownConfig::default(),
            log_level: LogLevel::default(),
            mode: PromptMode::default(),
            cooldown_after_write: false,
            write_cooldown: Duration::from_millis(DEFAULT_WRITE_COOLDOWN_MS),
            enable_pattern_injection: false,
            pattern_top_n: DEFAULT_PATTERN_TOP_N,
        }
    }
}

/// Configuration file structure (for JSON parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    /// Cooldown safety ceiling in milliseconds.
    pub cooldown_duration_ms: Option<u64>,
    /// Stability window in milliseconds.
    pub stability_window_ms: Option<u64>,
    /// `info`, `debug` or `silent`.
    pub log_level: Option<String>,
    /// `openai`, `claude` or `manual`.
    pub mode: Option<String>,
    /// Pause after writing files.
    pub cooldown_after_write: Option<bool>,
    /// Pause length in milliseconds.
    pub write_cooldown_ms: Option<u64>,
    /// Inject stored patterns into prompts.
    pub enable_pattern_injection: Option<bool>,
    /// Number of patterns to inject.
    pub pattern_top_n: Option<usize>,
}

impl UadoConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> crate::Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| crate::Error::OperationFailed {
                operation: "read_config_file".to_string(),
                cause: format!("{}: {e}", path.display()),
            })?;

        let file: ConfigFile =
            serde_json::from_str(&contents).map_err(|e| crate::Error::OperationFailed {
                operation: "parse_config_file".to_string(),
                cause: format!("{}: {e}", path.display()),
            })?;

        Ok(Self::from_config_file(file))
    }

    /// Loads configuration, never failing.
    ///
    /// - `path` (or `./.uadorc.json`) is read if present
    /// - a missing file yields defaults in manual mode
    /// - an unreadable or invalid file yields defaults
    ///
    /// Environment overrides are applied last.
    #[must_use]
    pub fn load(path: Option<&Path>) -> Self {
        let resolved = path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), Path::to_path_buf);

        let config = match std::fs::metadata(&resolved) {
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %resolved.display(), "config file not found, defaulting to manual mode");
                Self {
                    mode: PromptMode::Manual,
                    ..Self::default()
                }
            },
            _ => match Self::load_from_file(&resolved) {
                Ok(config) => {
                    info!(path = %resolved.display(), "loaded config");
                    config
                },
                Err(e) => {
                    error!(path = %resolved.display(), error = %e, "failed to load config, using defaults");
                    Self::default()
                },
            },
        };

        config.with_env_overrides()
    }

    /// Applies `UADO_*` environment overrides.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        self.cooldown = self.cooldown.with_env_overrides();
        if let Ok(level) = std::env::var("UADO_LOG_LEVEL") {
            self.log_level = LogLevel::parse(&level);
        }
        if let Ok(mode) = std::env::var("UADO_MODE") {
            self.mode = PromptMode::parse(&mode);
        }
        self
    }

    /// Converts a `ConfigFile` to `UadoConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let defaults = Self::default();
        Self {
            cooldown: CooldownConfig::from_millis(file.cooldown_duration_ms, file.stability_window_ms),
            log_level: file
                .log_level
                .as_deref()
                .map_or(defaults.log_level, LogLevel::parse),
            mode: file.mode.as_deref().map_or(defaults.mode, PromptMode::parse),
            cooldown_after_write: file
                .cooldown_after_write
                .unwrap_or(defaults.cooldown_after_write),
            write_cooldown: file
                .write_cooldown_ms
                .map_or(defaults.write_cooldown, Duration::from_millis),
            enable_pattern_injection: file
                .enable_pattern_injection
                .unwrap_or(defaults.enable_pattern_injection),
            pattern_top_n: file
                .pattern_top_n
                .filter(|n| *n > 0)
                .unwrap_or(defaults.pattern_top_n),
        }
    }

    /// Returns how long to pause after writing project files, if at all.
    #[must_use]
    pub const fn write_pause(&self) -> Option<Duration> {
        if self.cooldown_after_write {
            Some(self.write_cooldown)
        } else {
            None
        }
    }

    /// Returns `(key, value, explanation)` rows for display.
    #[must_use]
    pub fn describe(&self) -> Vec<(&'static str, String, &'static str)> {
        vec![
            (
                "cooldownDurationMs",
                self.cooldown.timeout.as_millis().to_string(),
                "maximum time to stay in cooldown after a file change",
            ),
            (
                "stabilityWindowMs",
                self.cooldown.stable_window.as_millis().to_string(),
                "how long to wait after LSP reports ready",
            ),
            ("logLevel", self.log_level.as_str().to_string(), "info, debug, or silent"),
            ("mode", self.mode.as_str().to_string(), "openai, claude, or manual copy/paste mode"),
            (
                "cooldownAfterWrite",
                self.cooldown_after_write.to_string(),
                "enable a delay after writing files",
            ),
            (
                "writeCooldownMs",
                self.write_cooldown.as_millis().to_string(),
                "cooldown duration when cooldownAfterWrite is enabled",
            ),
            (
                "enablePatternInjection",
                self.enable_pattern_injection.to_string(),
                "inject examples from .uado/patterns.json",
            ),
            (
                "patternTopN",
                self.pattern_top_n.to_string(),
                "number of examples to inject",
            ),
        ]
    }
}
