//! Spreadsheet discovery and loading from disk.
//!
//! Paths given on the command line may be files or directories; directories
//! are walked for spreadsheet extensions. Files are read with `tokio::fs`
//! and handed to the session as [`UploadedFile`]s.

use std::path::{Path, PathBuf};

use dash_core::error::{DashError, Result};
use tracing::{debug, warn};

use crate::session::UploadedFile;

/// Extensions picked up when walking a directory.
pub const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xls", "ods", "csv"];

pub fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SPREADSHEET_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Every spreadsheet under `path`, sorted. A file path is returned as-is
/// regardless of its extension.
pub fn find_spreadsheets(path: &Path) -> Vec<PathBuf> {
    if !path.exists() {
        warn!("Data path does not exist: {}", path.display());
        return Vec::new();
    }
    if path.is_file() {
        return vec![path.to_path_buf()];
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(path)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_spreadsheet(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Expand every input path, keeping first-seen order and dropping
/// duplicates.
pub fn discover(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = Vec::new();
    for path in paths {
        for file in find_spreadsheets(path) {
            if !found.contains(&file) {
                found.push(file);
            }
        }
    }
    debug!(inputs = paths.len(), files = found.len(), "spreadsheets discovered");
    found
}

/// Display name of a loaded file: its file name component.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read one file.
pub async fn read_file(path: &Path) -> Result<UploadedFile> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| DashError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(UploadedFile::new(display_name(path), bytes))
}

/// Discover and read every spreadsheet under `paths`.
///
/// Unreadable files are logged and skipped; [`DashError::NoDataFiles`] is
/// returned only when nothing could be read at all. Files are keyed by
/// display name, so when two paths share one the later path wins.
pub async fn load_paths(paths: &[PathBuf]) -> Result<Vec<UploadedFile>> {
    let mut loaded: Vec<UploadedFile> = Vec::new();
    for path in discover(paths) {
        let file = match read_file(&path).await {
            Ok(file) => file,
            Err(e) => {
                warn!(error = %e, "skipping unreadable file");
                continue;
            }
        };
        match loaded.iter_mut().find(|f| f.name == file.name) {
            Some(existing) => {
                warn!(
                    name = %file.name,
                    path = %path.display(),
                    "file name already loaded from another path; keeping this one"
                );
                *existing = file;
            }
            None => loaded.push(file),
        }
    }
    if loaded.is_empty() {
        return Err(DashError::NoDataFiles);
    }
    Ok(loaded)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path, body: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(path, body).expect("write");
    }

    // ── test_is_spreadsheet ──

    #[test]
    fn test_is_spreadsheet() {
        assert!(is_spreadsheet(Path::new("a/exp1.xlsx")));
        assert!(is_spreadsheet(Path::new("EXP.CSV")));
        assert!(is_spreadsheet(Path::new("x.ods")));
        assert!(!is_spreadsheet(Path::new("notes.txt")));
        assert!(!is_spreadsheet(Path::new("noext")));
    }

    // ── test_find_spreadsheets_walks_directories ──

    #[test]
    fn test_find_spreadsheets_walks_directories() {
        let tmp = TempDir::new().expect("tempdir");
        touch(&tmp.path().join("b.csv"), "x");
        touch(&tmp.path().join("sub/a.xlsx"), "x");
        touch(&tmp.path().join("readme.md"), "x");

        let found = find_spreadsheets(tmp.path());
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| is_spreadsheet(p)));
        assert!(find_spreadsheets(&tmp.path().join("missing")).is_empty());
    }

    #[test]
    fn test_discover_dedups_and_accepts_explicit_files() {
        let tmp = TempDir::new().expect("tempdir");
        let data = tmp.path().join("data.txt");
        touch(&data, "x");
        touch(&tmp.path().join("exp.csv"), "x");

        let found = discover(&[data.clone(), tmp.path().to_path_buf(), data.clone()]);
        assert_eq!(found, vec![data, tmp.path().join("exp.csv")]);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("/tmp/run 1/exp1.xlsx")), "exp1.xlsx");
    }

    // ── test_load_paths ──

    #[tokio::test]
    async fn test_load_paths() {
        let tmp = TempDir::new().expect("tempdir");
        touch(&tmp.path().join("exp1.csv"), "a;b;c\n1;2;10:00:00\n");

        let files = load_paths(&[tmp.path().to_path_buf()]).await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "exp1.csv");
        assert_eq!(&*files[0].bytes, b"a;b;c\n1;2;10:00:00\n");
    }

    #[tokio::test]
    async fn test_load_paths_same_name_keeps_later_path() {
        let tmp = TempDir::new().expect("tempdir");
        touch(&tmp.path().join("run1/exp.csv"), "first");
        touch(&tmp.path().join("run2/exp.csv"), "second");
        touch(&tmp.path().join("run2/other.csv"), "other");

        let files = load_paths(&[tmp.path().join("run1"), tmp.path().join("run2")])
            .await
            .unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["exp.csv", "other.csv"]);
        assert_eq!(&*files[0].bytes, b"second");
    }

    #[tokio::test]
    async fn test_load_paths_nothing_found() {
        let tmp = TempDir::new().expect("tempdir");
        let err = load_paths(&[tmp.path().to_path_buf()]).await.unwrap_err();
        assert!(matches!(err, DashError::NoDataFiles));
    }

    #[tokio::test]
    async fn test_read_file_missing_path() {
        let err = read_file(Path::new("/definitely/not/here.xlsx"))
            .await
            .unwrap_err();
        assert!(matches!(err, DashError::FileRead { .. }));
    }
}
