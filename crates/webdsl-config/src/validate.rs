use crate::config::Config;
use crate::error::ConfigError;

/// Validate a [`Config`], returning all detected violations.
pub fn validate(config: &Config) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.diagnostics.source.trim().is_empty() {
        errors.push(ConfigError::Validation {
            field: "diagnostics.source".to_string(),
            message: "must not be empty".to_string(),
        });
    }

    if config.diagnostics.parse_error_width == 0 {
        errors.push(ConfigError::Validation {
            field: "diagnostics.parse_error_width".to_string(),
            message: "must be at least 1".to_string(),
        });
    }

    if let Some(command) = &config.server.command {
        if command.trim().is_empty() {
            errors.push(ConfigError::Validation {
                field: "server.command".to_string(),
                message: "must not be blank; remove the key to use the default".to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Collapse a validation result to its first error.
pub(crate) fn first_violation(errors: Vec<ConfigError>) -> ConfigError {
    errors
        .into_iter()
        .next()
        .unwrap_or_else(|| ConfigError::Validation {
            field: "unknown".to_string(),
            message: "validation failed".to_string(),
        })
}
