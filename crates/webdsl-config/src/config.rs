use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Log verbosity level.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Most verbose.
    Trace,
    /// Message routing and analysis timings.
    Debug,
    /// Lifecycle transitions (default).
    #[default]
    Info,
    /// Rejected or malformed input.
    Warn,
    /// Errors only.
    Error,
}

impl LogLevel {
    /// The level name as used in filter directives.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log verbosity level.
    #[serde(default)]
    pub level: LogLevel,
    /// Log file path; the platform data directory is used when unset.
    pub file: Option<PathBuf>,
}

/// How the editor side locates and starts the language server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Command to run. May contain `${workspaceFolder}`,
    /// `${workspaceRoot}` and `${workspaceFolderBasename}`. When unset the
    /// bare `webdsl-ls` name is looked up on `PATH`.
    pub command: Option<String>,
    /// Extra command-line arguments.
    #[serde(default)]
    pub args: Vec<String>,
}

/// Diagnostics publication settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// `source` tag attached to every published diagnostic.
    #[serde(default = "default_source")]
    pub source: String,
    /// Column width of the placeholder range used for parse errors.
    #[serde(default = "default_parse_error_width")]
    pub parse_error_width: u32,
}

fn default_source() -> String {
    "webdsl".to_string()
}

fn default_parse_error_width() -> u32 {
    200
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            parse_error_width: default_parse_error_width(),
        }
    }
}

/// Top-level webdsl configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
    /// Server launch settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Diagnostics settings.
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}
