pub mod config;
pub mod error;
pub mod launcher;
pub mod load;
pub mod merge;
pub mod validate;

pub use config::{Config, DiagnosticsConfig, LogConfig, LogLevel, ServerConfig};
pub use error::ConfigError;
pub use launcher::{resolve_command, DEFAULT_SERVER_COMMAND};
pub use load::{default_config_dir, load_config, load_from_str};
