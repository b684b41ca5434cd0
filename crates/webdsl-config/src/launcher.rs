use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Executable name used when no command is configured.
pub const DEFAULT_SERVER_COMMAND: &str = "webdsl-ls";

/// Resolve the configured backend command against a workspace root.
///
/// `${workspaceFolder}` and `${workspaceRoot}` expand to the root path,
/// `${workspaceFolderBasename}` to its last component. A relative result that
/// names a path (contains a separator) is joined under the root; a bare name
/// is left for the OS to find on `PATH`.
pub fn resolve_command(
    configured: Option<&str>,
    workspace_root: &Path,
) -> Result<PathBuf, ConfigError> {
    let raw = match configured.map(str::trim) {
        Some(cmd) if !cmd.is_empty() => cmd,
        _ => return Ok(PathBuf::from(DEFAULT_SERVER_COMMAND)),
    };

    let expanded = substitute_variables(raw, workspace_root)?;
    let path = PathBuf::from(&expanded);

    if path.is_absolute() || !has_separator(&expanded) {
        Ok(path)
    } else {
        Ok(workspace_root.join(path))
    }
}

fn substitute_variables(raw: &str, workspace_root: &Path) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            // Unterminated: keep the remainder literally.
            out.push_str(&rest[start..]);
            return Ok(out);
        };
        let name = &after[..end];
        match name {
            "workspaceFolder" | "workspaceRoot" => {
                out.push_str(&workspace_root.to_string_lossy());
            }
            "workspaceFolderBasename" => {
                let base = workspace_root
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                out.push_str(&base);
            }
            other => return Err(ConfigError::UnknownVariable(other.to_string())),
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn has_separator(s: &str) -> bool {
    s.contains('/') || s.contains(std::path::MAIN_SEPARATOR)
}
