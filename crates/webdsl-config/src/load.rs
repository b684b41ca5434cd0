use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::ConfigError;
use crate::merge::merge_configs;
use crate::validate::{first_violation, validate};

/// Directory name searched upward from the project for a local config.
pub const PROJECT_CONFIG_DIR: &str = ".webdsl";

/// Content written into a newly-created global config file.
const DEFAULT_CONFIG_CONTENT: &str = r#"# webdsl language server configuration
# Uncomment and edit settings below to override defaults.

# [log]
# level = "info"
# file = "/path/to/webdsl-ls.log"

# [server]
# command = "${workspaceFolder}/bin/webdsl-ls"
# args = []

# [diagnostics]
# source = "webdsl"
# parse_error_width = 200
"#;

/// Default global config directory (`~/.config/webdsl` on Linux).
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("webdsl"))
}

/// Load and merge configuration.
///
/// `Config::default()` ← `config_dir/config.toml` ← the nearest
/// `.webdsl/config.toml` at or above `project_dir`. A missing global file
/// is created with commented-out defaults. The merged result is validated.
pub fn load_config(config_dir: &Path, project_dir: Option<&Path>) -> Result<Config, ConfigError> {
    let global_path = config_dir.join("config.toml");

    if !global_path.exists() {
        std::fs::create_dir_all(config_dir)
            .and_then(|_| std::fs::write(&global_path, DEFAULT_CONFIG_CONTENT))
            .map_err(|e| ConfigError::CreateDefault(e.to_string()))?;
        tracing::info!("created default config at {}", global_path.display());
    }

    let mut config = Config::default();

    let global_content = std::fs::read_to_string(&global_path)?;
    if has_settings(&global_content) {
        config = merge_configs(&config, &global_content)?;
    }

    if let Some(project_path) = project_dir.and_then(find_project_config) {
        tracing::debug!("merging project config {}", project_path.display());
        let project_content = std::fs::read_to_string(&project_path)?;
        config = merge_configs(&config, &project_content)?;
    }

    validate(&config).map_err(first_violation)?;
    Ok(config)
}

/// Parse a TOML string directly into a validated [`Config`].
pub fn load_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))?;
    validate(&config).map_err(first_violation)?;
    Ok(config)
}

/// Walk from `start` upward looking for `.webdsl/config.toml`.
fn find_project_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(PROJECT_CONFIG_DIR).join("config.toml"))
        .find(|candidate| candidate.is_file())
}

/// `true` when the content has at least one non-empty, non-comment line.
fn has_settings(content: &str) -> bool {
    content.lines().any(|l| {
        let trimmed = l.trim();
        !trimmed.is_empty() && !trimmed.starts_with('#')
    })
}
