use thiserror::Error;

/// Errors raised while loading, validating or applying configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to create the default config file.
    #[error("failed to create default config: {0}")]
    CreateDefault(String),

    /// TOML parsing or re-serialization failed.
    #[error("TOML parse error: {0}")]
    Parse(String),

    /// A config value failed validation.
    #[error("validation error: {field}: {message}")]
    Validation {
        /// The dotted field path (e.g. `diagnostics.source`).
        field: String,
        /// Human-readable description of the violation.
        message: String,
    },

    /// The server command references a `${...}` variable we do not know.
    #[error("unknown variable '${{{0}}}' in server command")]
    UnknownVariable(String),

    /// An I/O error occurred while reading or writing config files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
