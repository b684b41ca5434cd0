use crate::config::Config;
use crate::error::ConfigError;

/// Layer a TOML fragment on top of `base`.
///
/// Keys present in `overlay_toml` win; everything else keeps its `base`
/// value. Both sides go through [`toml::Value`] so nested tables merge key
/// by key instead of being replaced wholesale.
pub fn merge_configs(base: &Config, overlay_toml: &str) -> Result<Config, ConfigError> {
    let mut merged = toml::Value::try_from(base).map_err(|e| ConfigError::Parse(e.to_string()))?;
    let overlay: toml::Value =
        toml::from_str(overlay_toml).map_err(|e| ConfigError::Parse(e.to_string()))?;

    overlay_value(&mut merged, overlay);

    merged
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::Parse(e.to_string()))
}

/// Tables merge recursively; scalars and arrays are replaced.
fn overlay_value(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => overlay_value(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
