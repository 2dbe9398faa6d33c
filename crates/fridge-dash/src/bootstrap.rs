use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Root of the dashboard's state directory, `~/.fridge-dash/`.
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".fridge-dash")
}

/// Ensure `~/.fridge-dash/` and `~/.fridge-dash/logs/` exist.
pub fn ensure_directories() -> anyhow::Result<()> {
    let dir = app_dir();
    std::fs::create_dir_all(&dir)?;
    std::fs::create_dir_all(dir.join("logs"))?;
    Ok(())
}

/// Log file used while the TUI owns the terminal.
pub fn default_log_file() -> PathBuf {
    app_dir().join("logs").join("fridge-dash.log")
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a CLI level name (`DEBUG`, `INFO`, `WARNING`, `ERROR`, `CRITICAL`) to
/// an [`EnvFilter`] directive.
pub fn filter_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.to_lowercase(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Output goes to `log_file` when given. Otherwise it goes to stderr when
/// `to_stderr` is set (JSON mode) and to [`default_log_file`] when the TUI
/// will draw on the terminal.
pub fn setup_logging(log_level: &str, log_file: Option<&Path>, to_stderr: bool) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(filter_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let target = match log_file {
        Some(path) => Some(path.to_path_buf()),
        None if to_stderr => None,
        None => Some(default_log_file()),
    };

    match target {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            let layer = fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            tracing_subscriber::registry().with(filter).with(layer).try_init()?;
        }
        None => {
            let layer = fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry().with(filter).with(layer).try_init()?;
        }
    }

    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // ── test_ensure_directories ───────────────────────────────────────────────

    #[test]
    fn test_ensure_directories() {
        let tmp = TempDir::new().expect("tempdir");

        // Override HOME so that dirs::home_dir() resolves to our temp dir.
        let original_home = std::env::var_os("HOME");
        std::env::set_var("HOME", tmp.path());

        let result = ensure_directories();
        let log_file = default_log_file();

        match original_home {
            Some(v) => std::env::set_var("HOME", v),
            None => std::env::remove_var("HOME"),
        }

        result.expect("ensure_directories should succeed");

        let dir = tmp.path().join(".fridge-dash");
        assert!(dir.is_dir(), ".fridge-dash dir must exist");
        assert!(dir.join("logs").is_dir(), "logs subdir must exist");
        assert_eq!(log_file, dir.join("logs").join("fridge-dash.log"));
    }

    // ── test_filter_directive ─────────────────────────────────────────────────

    #[test]
    fn test_filter_directive() {
        assert_eq!(filter_directive("DEBUG"), "debug");
        assert_eq!(filter_directive("info"), "info");
        assert_eq!(filter_directive("WARNING"), "warn");
        assert_eq!(filter_directive("CRITICAL"), "error");
        assert_eq!(filter_directive("dash_data=trace"), "dash_data=trace");
    }

    // ── test_setup_logging ────────────────────────────────────────────────────

    #[test]
    fn test_setup_logging_writes_to_file() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("nested").join("dash.log");

        setup_logging("INFO", Some(&path), false).expect("first init succeeds");
        tracing::info!("dashboard log line");
        assert!(path.is_file());
        let content = std::fs::read_to_string(&path).expect("read log");
        assert!(content.contains("dashboard log line"));

        // A second global subscriber is refused.
        assert!(setup_logging("INFO", Some(&path), false).is_err());
    }
}
