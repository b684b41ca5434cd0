//! Log-file helpers for the language server.
//!
//! stdout carries the protocol, so the server always logs to a file. This
//! module resolves where that file lives, rotates it when it grows too
//! large and opens it for appending. The `tracing-subscriber` setup itself
//! lives in the binary crate.
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Maximum size of a single log file before rotation (10 MB).
pub const DEFAULT_MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Maximum number of rotated log files to retain.
pub const DEFAULT_MAX_LOG_FILES: u32 = 5;

const LOG_FILE_NAME: &str = "webdsl-ls.log";

/// Return the default log file path.
///
/// Lives under the platform's local data directory
/// (`~/.local/share/webdsl/` on Linux), or the temp directory when that
/// cannot be determined.
pub fn default_log_file_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("webdsl")
        .join(LOG_FILE_NAME)
}

/// Pick the configured log path, falling back to [`default_log_file_path`].
pub fn resolve_log_path(configured: Option<&Path>) -> PathBuf {
    match configured {
        Some(path) if !path.as_os_str().is_empty() => path.to_path_buf(),
        _ => default_log_file_path(),
    }
}

/// Create the parent directory, rotate if needed and open `path` for
/// appending.
pub fn open_log_file(path: &Path, max_size: u64, max_files: u32) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    rotate_log_files(path, max_size, max_files)?;
    OpenOptions::new().create(true).append(true).open(path)
}

/// Rotate `log_path` when it is at least `max_size` bytes.
///
/// `webdsl-ls.log` becomes `webdsl-ls.log.1`, existing numbered files
/// shift up by one and anything beyond `max_files` is deleted.
pub fn rotate_log_files(log_path: &Path, max_size: u64, max_files: u32) -> io::Result<()> {
    let len = match fs::metadata(log_path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };
    if len < max_size || max_files == 0 {
        return Ok(());
    }

    let oldest = numbered(log_path, max_files);
    if oldest.exists() {
        fs::remove_file(&oldest)?;
    }
    for i in (1..max_files).rev() {
        let from = numbered(log_path, i);
        if from.exists() {
            fs::rename(&from, numbered(log_path, i + 1))?;
        }
    }
    fs::rename(log_path, numbered(log_path, 1))
}

/// Map a configured level name to an `EnvFilter` directive.
///
/// Unknown names fall back to `"info"`.
pub fn level_directive(level: &str) -> &'static str {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" => "error",
        _ => "info",
    }
}

fn numbered(base: &Path, index: u32) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path_names_the_server() {
        let path = default_log_file_path();
        assert!(path.ends_with(Path::new("webdsl").join(LOG_FILE_NAME)));
    }

    #[test]
    fn resolve_prefers_configured_path() {
        let custom = Path::new("/var/log/custom.log");
        assert_eq!(resolve_log_path(Some(custom)), custom);
        assert_eq!(resolve_log_path(None), default_log_file_path());
        assert_eq!(resolve_log_path(Some(Path::new(""))), default_log_file_path());
    }

    #[test]
    fn numbered_appends_index() {
        let base = Path::new("/tmp/webdsl-ls.log");
        assert_eq!(numbered(base, 2), PathBuf::from("/tmp/webdsl-ls.log.2"));
    }

    #[test]
    fn rotate_missing_file_is_noop() {
        let dir = tempfile::TempDir::new().unwrap();
        let log = dir.path().join(LOG_FILE_NAME);
        rotate_log_files(&log, 10, 3).unwrap();
        assert!(!log.exists());
    }

    #[test]
    fn rotate_small_file_is_noop() {
        let dir = tempfile::TempDir::new().unwrap();
        let log = dir.path().join(LOG_FILE_NAME);
        fs::write(&log, "tiny").unwrap();
        rotate_log_files(&log, 1024, 3).unwrap();
        assert!(log.exists());
    }

    #[test]
    fn rotate_shifts_and_drops_oldest() {
        let dir = tempfile::TempDir::new().unwrap();
        let log = dir.path().join(LOG_FILE_NAME);
        fs::write(numbered(&log, 1), "gen1").unwrap();
        fs::write(numbered(&log, 2), "gen2").unwrap();
        fs::write(&log, "x".repeat(64)).unwrap();

        rotate_log_files(&log, 32, 2).unwrap();

        assert!(!log.exists());
        assert_eq!(fs::read_to_string(numbered(&log, 1)).unwrap(), "x".repeat(64));
        assert_eq!(fs::read_to_string(numbered(&log, 2)).unwrap(), "gen1");
        assert!(!numbered(&log, 3).exists());
    }

    #[test]
    fn open_log_file_creates_parents_and_appends() {
        use std::io::Write;

        let dir = tempfile::TempDir::new().unwrap();
        let log = dir.path().join("nested").join("deeper").join(LOG_FILE_NAME);
        {
            let mut file = open_log_file(&log, DEFAULT_MAX_LOG_SIZE, DEFAULT_MAX_LOG_FILES).unwrap();
            writeln!(file, "first").unwrap();
        }
        {
            let mut file = open_log_file(&log, DEFAULT_MAX_LOG_SIZE, DEFAULT_MAX_LOG_FILES).unwrap();
            writeln!(file, "second").unwrap();
        }
        assert_eq!(fs::read_to_string(&log).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn level_directive_known_and_unknown() {
        assert_eq!(level_directive("TRACE"), "trace");
        assert_eq!(level_directive(" debug "), "debug");
        assert_eq!(level_directive("Warning"), "warn");
        assert_eq!(level_directive("error"), "error");
        assert_eq!(level_directive("verbose"), "info");
        assert_eq!(level_directive(""), "info");
    }
}
