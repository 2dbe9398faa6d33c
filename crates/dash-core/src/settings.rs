use clap::parser::ValueSource;
use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::CanonicalVariable;
use crate::error::{DashError, Result};
use crate::palette;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Interactive dashboard for refrigeration-chamber sensor spreadsheets
#[derive(Parser, Debug, Clone)]
#[command(
    name = "fridge-dash",
    about = "Interactive dashboard for refrigeration-chamber sensor spreadsheets",
    version
)]
pub struct Settings {
    /// Spreadsheet files or directories to load (.xlsx, .xls, .ods, .csv)
    pub files: Vec<PathBuf>,

    /// Initial tab
    #[arg(long, default_value = "individual", value_parser = ["individual", "comparison"])]
    pub view: String,

    /// File shown in the individual analysis (defaults to the first file)
    #[arg(long)]
    pub select: Option<String>,

    /// Files to compare, comma separated (defaults to the first two files)
    #[arg(long, value_delimiter = ',')]
    pub compare: Vec<String>,

    /// Variables to overlay in the individual analysis, comma separated
    #[arg(long, value_delimiter = ',')]
    pub overlay: Vec<String>,

    /// Rescale overlaid series to the 0..1 range
    #[arg(long, overrides_with = "no_normalize")]
    pub normalize: bool,

    /// Plot raw values, overriding a saved `--normalize`
    #[arg(long, overrides_with = "normalize")]
    pub no_normalize: bool,

    /// Color override for a variable or experiment, as NAME=COLOR
    #[arg(long = "color", value_name = "NAME=COLOR")]
    pub colors: Vec<String>,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Print chart descriptions as JSON instead of starting the TUI
    #[arg(long)]
    pub json: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Forget the saved preferences
    #[arg(long)]
    pub clear: bool,
}

// ── Preferences ────────────────────────────────────────────────────────────────

/// Choices remembered between runs in `~/.fridge-dash/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalize: Option<bool>,
}

impl Preferences {
    pub fn default_path() -> PathBuf {
        Self::path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    pub fn path_in(home: &Path) -> PathBuf {
        home.join(".fridge-dash").join("last_used.json")
    }

    /// Missing or unreadable files yield empty preferences.
    pub fn read(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    /// Write through a sibling temp file and rename it into place.
    pub fn write(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let body = serde_json::to_vec_pretty(self).map_err(std::io::Error::other)?;
        let staging = path.with_extension("json.tmp");
        std::fs::write(&staging, body)?;
        std::fs::rename(&staging, path)
    }

    pub fn remove(path: &Path) -> std::io::Result<()> {
        match std::fs::remove_file(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

impl From<&Settings> for Preferences {
    fn from(settings: &Settings) -> Self {
        Preferences {
            theme: Some(settings.theme.clone()),
            view: Some(settings.view.clone()),
            normalize: Some(settings.normalize),
        }
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse the process arguments, fill unset options from the saved
    /// preferences and save the result.
    pub fn load_with_last_used() -> Self {
        Self::load_from_args(std::env::args_os().collect(), &Preferences::default_path())
    }

    pub fn load_from_args(args: Vec<std::ffi::OsString>, prefs_path: &Path) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = Preferences::remove(prefs_path) {
                tracing::debug!(error = %e, "could not remove saved preferences");
            }
            return settings.with_debug_level();
        }

        let saved = Preferences::read(prefs_path);
        let from_cli = |id: &str| matches.value_source(id) == Some(ValueSource::CommandLine);

        if let (false, Some(view)) = (from_cli("view"), saved.view) {
            settings.view = view;
        }
        if let (false, Some(theme)) = (from_cli("theme"), saved.theme) {
            settings.theme = theme;
        }
        let normalize_given = from_cli("normalize") || from_cli("no_normalize");
        if let (false, Some(normalize)) = (normalize_given, saved.normalize) {
            settings.normalize = normalize;
        }

        let settings = settings.with_debug_level();
        if let Err(e) = Preferences::from(&settings).write(prefs_path) {
            tracing::debug!(error = %e, "could not save preferences");
        }
        settings
    }

    fn with_debug_level(mut self) -> Self {
        if self.debug {
            self.log_level = "DEBUG".to_string();
        }
        self
    }

    /// Overlay variables requested with `--overlay`.
    pub fn overlay_variables(&self) -> Result<Vec<CanonicalVariable>> {
        self.overlay
            .iter()
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.parse())
            .collect()
    }

    /// `--color NAME=COLOR` pairs, colors validated and lower-cased.
    pub fn color_overrides(&self) -> Result<Vec<(String, String)>> {
        self.colors
            .iter()
            .map(|entry| {
                let (name, color) = entry.rsplit_once('=').ok_or_else(|| {
                    DashError::Config(format!("expected NAME=COLOR, got '{}'", entry))
                })?;
                Ok((name.trim().to_string(), palette::parse_color(color)?))
            })
            .collect()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn load(tmp: &TempDir, args: &[&str]) -> Settings {
        let mut argv = vec!["fridge-dash".into()];
        argv.extend(args.iter().map(|a| std::ffi::OsString::from(*a)));
        Settings::load_from_args(argv, &Preferences::path_in(tmp.path()))
    }

    #[test]
    fn test_preferences_write_then_read() {
        let tmp = TempDir::new().expect("tempdir");
        let path = Preferences::path_in(tmp.path());
        let prefs = Preferences {
            theme: Some("light".into()),
            view: Some("comparison".into()),
            normalize: Some(true),
        };
        prefs.write(&path).expect("write");
        assert_eq!(Preferences::read(&path), prefs);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_preferences_missing_or_corrupt_file() {
        let tmp = TempDir::new().expect("tempdir");
        let path = Preferences::path_in(tmp.path());
        assert_eq!(Preferences::read(&path), Preferences::default());

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(Preferences::read(&path), Preferences::default());

        // Removing an absent file is not an error.
        std::fs::remove_file(&path).unwrap();
        assert!(Preferences::remove(&path).is_ok());
    }

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::parse_from(["fridge-dash"]);
        assert!(settings.files.is_empty());
        assert_eq!(settings.view, "individual");
        assert!(settings.select.is_none());
        assert!(settings.compare.is_empty());
        assert!(settings.overlay.is_empty());
        assert!(settings.colors.is_empty());
        assert!(!settings.normalize);
        assert_eq!(settings.theme, "auto");
        assert!(!settings.json);
        assert_eq!(settings.log_level, "INFO");
    }

    #[test]
    fn test_settings_cli_lists() {
        let settings = Settings::parse_from([
            "fridge-dash",
            "a.xlsx",
            "b.xlsx",
            "--compare",
            "a.xlsx,b.xlsx",
            "--overlay",
            "Tensão A,Energia Ativa",
            "--color",
            "Tensão A=#FF0000",
        ]);
        assert_eq!(settings.files.len(), 2);
        assert_eq!(settings.compare, vec!["a.xlsx", "b.xlsx"]);
        assert_eq!(
            settings.overlay_variables().unwrap(),
            vec![CanonicalVariable::TensaoA, CanonicalVariable::EnergiaAtiva]
        );
        assert_eq!(
            settings.color_overrides().unwrap(),
            vec![("Tensão A".to_string(), "#ff0000".to_string())]
        );
    }

    #[test]
    fn test_settings_rejects_bad_overlay_and_color() {
        let settings = Settings::parse_from([
            "fridge-dash",
            "--overlay",
            "Pressão",
            "--color",
            "ensaio",
        ]);
        assert!(matches!(
            settings.overlay_variables(),
            Err(DashError::UnknownVariable(_))
        ));
        assert!(matches!(
            settings.color_overrides(),
            Err(DashError::Config(_))
        ));
    }

    #[test]
    fn test_saved_preferences_fill_unset_options() {
        let tmp = TempDir::new().expect("tempdir");
        Preferences {
            theme: Some("classic".into()),
            view: Some("comparison".into()),
            normalize: Some(true),
        }
        .write(&Preferences::path_in(tmp.path()))
        .expect("write");

        let settings = load(&tmp, &[]);
        assert_eq!(settings.theme, "classic");
        assert_eq!(settings.view, "comparison");
        assert!(settings.normalize);
    }

    #[test]
    fn test_cli_values_win_and_are_saved() {
        let tmp = TempDir::new().expect("tempdir");
        let path = Preferences::path_in(tmp.path());
        Preferences {
            view: Some("comparison".into()),
            ..Default::default()
        }
        .write(&path)
        .expect("write");

        let settings = load(&tmp, &["--view", "individual", "--theme", "light"]);
        assert_eq!(settings.view, "individual");
        assert_eq!(settings.theme, "light");

        let saved = Preferences::read(&path);
        assert_eq!(saved.view.as_deref(), Some("individual"));
        assert_eq!(saved.normalize, Some(false));
    }

    #[test]
    fn test_saved_normalize_can_be_turned_off() {
        let tmp = TempDir::new().expect("tempdir");
        let path = Preferences::path_in(tmp.path());

        assert!(load(&tmp, &["--normalize"]).normalize);
        assert!(load(&tmp, &[]).normalize);

        let settings = load(&tmp, &["--no-normalize"]);
        assert!(!settings.normalize);
        assert_eq!(Preferences::read(&path).normalize, Some(false));
        assert!(!load(&tmp, &[]).normalize);

        // The last of the pair wins.
        assert!(load(&tmp, &["--no-normalize", "--normalize"]).normalize);
        assert!(!load(&tmp, &["--normalize", "--no-normalize"]).normalize);
    }

    #[test]
    fn test_clear_forgets_preferences() {
        let tmp = TempDir::new().expect("tempdir");
        let path = Preferences::path_in(tmp.path());
        Preferences::default().write(&path).expect("write");

        let settings = load(&tmp, &["--clear", "--debug"]);
        assert!(!path.exists());
        assert_eq!(settings.log_level, "DEBUG");
    }
}
