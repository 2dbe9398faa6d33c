//! Dashboard session state.
//!
//! A [`DashboardSession`] owns the uploaded files, the table cache and every
//! user selection (file under analysis, overlay variables, normalization,
//! experiments to compare, colors). Views are recomputed from it on every
//! interaction; see [`crate::views`].

use std::collections::HashMap;
use std::sync::Arc;

use dash_core::catalog::CanonicalVariable;
use dash_core::error::{DashError, IngestionError, Result};
use dash_core::formatting::legend_name;
use dash_core::models::LoadedTable;
use dash_core::palette::{self, COMPARISON_PALETTE, OVERLAY_PALETTE};
use dash_data::cache::{CacheStats, TableCache};

/// Outcome of ingesting one uploaded file.
pub type TableResult = std::result::Result<Arc<LoadedTable>, IngestionError>;

/// Number of files compared when the user has not chosen any.
const DEFAULT_COMPARISON_COUNT: usize = 2;

// ── UploadedFile ──────────────────────────────────────────────────────────────

/// A file as handed over by the user: display name plus raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Arc<[u8]>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// File name up to the first `.`.
    pub fn legend(&self) -> &str {
        legend_name(&self.name)
    }
}

// ── DashboardSession ──────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct DashboardSession {
    files: Vec<UploadedFile>,
    cache: TableCache,
    selected: Option<String>,
    overlay: Vec<CanonicalVariable>,
    normalize: bool,
    overlay_colors: HashMap<CanonicalVariable, String>,
    /// `None` until the user picks; then an explicit, possibly empty list.
    comparison: Option<Vec<String>>,
    experiment_colors: HashMap<String, String>,
}

impl DashboardSession {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Files ─────────────────────────────────────────────────────────────

    /// Add a file. A file with the same name is replaced in place and its
    /// old table is dropped from the cache.
    pub fn upload(&mut self, file: UploadedFile) {
        match self.files.iter().position(|f| f.name == file.name) {
            Some(i) => {
                tracing::debug!(name = %file.name, "replacing uploaded file");
                let old = std::mem::replace(&mut self.files[i], file);
                self.release(&old.bytes);
            }
            None => {
                tracing::debug!(name = %file.name, bytes = file.bytes.len(), "file uploaded");
                self.files.push(file);
            }
        }
    }

    /// Discard a file, its cached table and every selection that refers
    /// to it.
    pub fn remove(&mut self, name: &str) -> bool {
        let Some(i) = self.files.iter().position(|f| f.name == name) else {
            return false;
        };
        let old = self.files.remove(i);
        self.release(&old.bytes);
        if self.selected.as_deref() == Some(name) {
            self.selected = None;
        }
        if let Some(names) = self.comparison.as_mut() {
            names.retain(|n| n != name);
        }
        self.experiment_colors.remove(name);
        true
    }

    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.iter().find(|f| f.name == name)
    }

    pub fn file_names(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn has_files(&self) -> bool {
        !self.files.is_empty()
    }

    // ── Individual analysis ───────────────────────────────────────────────

    /// File under individual analysis; the first file unless one was chosen.
    pub fn selected_file(&self) -> Option<&UploadedFile> {
        self.selected
            .as_deref()
            .and_then(|name| self.file(name))
            .or_else(|| self.files.first())
    }

    pub fn select(&mut self, name: &str) -> Result<()> {
        if self.file(name).is_none() {
            return Err(DashError::Config(format!("no uploaded file named '{}'", name)));
        }
        self.selected = Some(name.to_string());
        Ok(())
    }

    /// Move the selection `delta` files forward, wrapping around.
    pub fn cycle_selected(&mut self, delta: isize) {
        if self.files.is_empty() {
            return;
        }
        let len = self.files.len() as isize;
        let current = self
            .selected_file()
            .and_then(|sel| self.files.iter().position(|f| f.name == sel.name))
            .unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.selected = Some(self.files[next].name.clone());
    }

    pub fn overlay(&self) -> &[CanonicalVariable] {
        &self.overlay
    }

    pub fn set_overlay(&mut self, variables: Vec<CanonicalVariable>) {
        let mut unique = Vec::with_capacity(variables.len());
        for v in variables {
            if !unique.contains(&v) {
                unique.push(v);
            }
        }
        self.overlay = unique;
    }

    /// Add or remove `variable` from the overlay chart.
    pub fn toggle_overlay(&mut self, variable: CanonicalVariable) {
        match self.overlay.iter().position(|v| *v == variable) {
            Some(i) => {
                self.overlay.remove(i);
            }
            None => self.overlay.push(variable),
        }
    }

    pub fn normalize(&self) -> bool {
        self.normalize
    }

    pub fn set_normalize(&mut self, normalize: bool) {
        self.normalize = normalize;
    }

    pub fn toggle_normalize(&mut self) {
        self.normalize = !self.normalize;
    }

    /// Color of an overlay series: the user's choice, else the overlay
    /// palette entry for its position in the selection.
    pub fn overlay_color(&self, variable: CanonicalVariable) -> String {
        if let Some(color) = self.overlay_colors.get(&variable) {
            return color.clone();
        }
        let index = self
            .overlay
            .iter()
            .position(|v| *v == variable)
            .unwrap_or_else(|| {
                CanonicalVariable::ALL
                    .iter()
                    .position(|v| *v == variable)
                    .unwrap_or(0)
            });
        palette::cycle(&OVERLAY_PALETTE, index).to_string()
    }

    pub fn set_overlay_color(&mut self, variable: CanonicalVariable, color: &str) -> Result<()> {
        let color = palette::parse_color(color)?;
        self.overlay_colors.insert(variable, color);
        Ok(())
    }

    /// Replace the color of `variable` with the next overlay palette entry.
    pub fn cycle_overlay_color(&mut self, variable: CanonicalVariable) {
        let next = next_in_palette(&OVERLAY_PALETTE, &self.overlay_color(variable));
        self.overlay_colors.insert(variable, next.to_string());
    }

    // ── Comparison ────────────────────────────────────────────────────────

    /// Files to compare: the user's choice, else the first two files.
    pub fn comparison_selection(&self) -> Vec<&UploadedFile> {
        match &self.comparison {
            Some(names) => names.iter().filter_map(|n| self.file(n)).collect(),
            None => self.files.iter().take(DEFAULT_COMPARISON_COUNT).collect(),
        }
    }

    pub fn is_compared(&self, name: &str) -> bool {
        self.comparison_selection().iter().any(|f| f.name == name)
    }

    pub fn set_comparison(&mut self, names: Vec<String>) -> Result<()> {
        if let Some(unknown) = names.iter().find(|n| self.file(n).is_none()) {
            return Err(DashError::Config(format!("no uploaded file named '{}'", unknown)));
        }
        let mut unique: Vec<String> = Vec::with_capacity(names.len());
        for n in names {
            if !unique.contains(&n) {
                unique.push(n);
            }
        }
        self.comparison = Some(unique);
        Ok(())
    }

    /// Add or remove a file from the comparison.
    pub fn toggle_comparison(&mut self, name: &str) {
        if self.file(name).is_none() {
            return;
        }
        let mut names: Vec<String> = self
            .comparison_selection()
            .iter()
            .map(|f| f.name.clone())
            .collect();
        match names.iter().position(|n| n == name) {
            Some(i) => {
                names.remove(i);
            }
            None => names.push(name.to_string()),
        }
        self.comparison = Some(names);
    }

    /// Color of an experiment: the user's choice, else the comparison
    /// palette entry for its position in the selection.
    pub fn experiment_color(&self, name: &str) -> String {
        if let Some(color) = self.experiment_colors.get(name) {
            return color.clone();
        }
        let selection = self.comparison_selection();
        let index = selection
            .iter()
            .position(|f| f.name == name)
            .unwrap_or(selection.len());
        palette::cycle(&COMPARISON_PALETTE, index).to_string()
    }

    pub fn set_experiment_color(&mut self, name: &str, color: &str) -> Result<()> {
        let color = palette::parse_color(color)?;
        self.experiment_colors.insert(name.to_string(), color);
        Ok(())
    }

    pub fn cycle_experiment_color(&mut self, name: &str) {
        let next = next_in_palette(&COMPARISON_PALETTE, &self.experiment_color(name));
        self.experiment_colors.insert(name.to_string(), next.to_string());
    }

    /// Apply `NAME=COLOR` overrides. Names matching a canonical variable set
    /// an overlay color; otherwise they are matched against file names and
    /// legend names.
    pub fn apply_color_overrides(&mut self, overrides: &[(String, String)]) -> Result<()> {
        for (name, color) in overrides {
            if let Ok(variable) = name.parse::<CanonicalVariable>() {
                self.set_overlay_color(variable, color)?;
                continue;
            }
            let file = self
                .files
                .iter()
                .find(|f| f.name == *name || f.legend() == name)
                .map(|f| f.name.clone())
                .ok_or_else(|| {
                    DashError::Config(format!("'{}' is neither a variable nor a file", name))
                })?;
            self.set_experiment_color(&file, color)?;
        }
        Ok(())
    }

    // ── Tables ────────────────────────────────────────────────────────────

    /// Clean table of an uploaded file, parsed at most once per content.
    pub fn table(&mut self, name: &str) -> Option<TableResult> {
        let bytes = Arc::clone(&self.files.iter().find(|f| f.name == name)?.bytes);
        let loaded = self.cache.get_or_load(&bytes);
        if let Err(e) = &loaded {
            tracing::warn!(file = name, error = %e, "file could not be ingested");
        }
        Some(loaded)
    }

    /// Drop every memoized table.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Evict the table for `bytes` unless a remaining file has the same
    /// content.
    fn release(&mut self, bytes: &[u8]) {
        if self.files.iter().any(|f| &*f.bytes == bytes) {
            return;
        }
        if self.cache.evict(bytes) {
            tracing::debug!("cached table evicted");
        }
    }
}

/// Palette entry following `current`, or the first one.
fn next_in_palette(palette: &[&'static str], current: &str) -> &'static str {
    let index = palette
        .iter()
        .position(|c| c.eq_ignore_ascii_case(current))
        .map_or(0, |i| i + 1);
    palette::cycle(palette, index)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = "data;hora;tempo;temperatura ambiente (°c)\n\
                         01/02/2024;10:00:00;10:00:00;4,5\n";

    fn compared(s: &DashboardSession) -> Vec<String> {
        s.comparison_selection()
            .iter()
            .map(|f| f.name.clone())
            .collect()
    }

    fn session_with(names: &[&str]) -> DashboardSession {
        let mut s = DashboardSession::new();
        for n in names {
            s.upload(UploadedFile::new(*n, SHEET.as_bytes().to_vec()));
        }
        s
    }

    // ── test_upload_replaces_same_name ──

    #[test]
    fn test_upload_replaces_same_name() {
        let mut s = session_with(&["a.xlsx", "b.xlsx"]);
        s.upload(UploadedFile::new("a.xlsx", b"other".to_vec()));
        assert_eq!(s.file_names(), vec!["a.xlsx", "b.xlsx"]);
        assert_eq!(&*s.file("a.xlsx").unwrap().bytes, b"other");
    }

    // ── test_selected_defaults_to_first ──

    #[test]
    fn test_selected_defaults_to_first() {
        let mut s = session_with(&["a.xlsx", "b.xlsx", "c.xlsx"]);
        assert_eq!(s.selected_file().unwrap().name, "a.xlsx");
        s.select("c.xlsx").unwrap();
        assert_eq!(s.selected_file().unwrap().name, "c.xlsx");
        assert!(s.select("missing.xlsx").is_err());

        s.remove("c.xlsx");
        assert_eq!(s.selected_file().unwrap().name, "a.xlsx");
    }

    #[test]
    fn test_cycle_selected_wraps() {
        let mut s = session_with(&["a", "b", "c"]);
        s.cycle_selected(-1);
        assert_eq!(s.selected_file().unwrap().name, "c");
        s.cycle_selected(2);
        assert_eq!(s.selected_file().unwrap().name, "b");
    }

    // ── test_comparison_defaults_to_first_two ──

    #[test]
    fn test_comparison_defaults_to_first_two() {
        let mut s = session_with(&["a.xlsx", "b.xlsx", "c.xlsx"]);
        assert_eq!(compared(&s), vec!["a.xlsx", "b.xlsx"]);

        s.toggle_comparison("a.xlsx");
        s.toggle_comparison("c.xlsx");
        assert_eq!(compared(&s), vec!["b.xlsx", "c.xlsx"]);

        s.set_comparison(vec![]).unwrap();
        assert!(s.comparison_selection().is_empty());
        assert!(s.set_comparison(vec!["nope".into()]).is_err());
    }

    #[test]
    fn test_comparison_of_single_file() {
        let s = session_with(&["only.csv"]);
        assert_eq!(s.comparison_selection().len(), 1);
    }

    // ── test_default_colors_follow_selection_order ──

    #[test]
    fn test_default_colors_follow_selection_order() {
        let mut s = session_with(&["a.xlsx", "b.xlsx"]);
        s.set_overlay(vec![CanonicalVariable::TensaoB, CanonicalVariable::TensaoA]);
        assert_eq!(s.overlay_color(CanonicalVariable::TensaoB), OVERLAY_PALETTE[0]);
        assert_eq!(s.overlay_color(CanonicalVariable::TensaoA), OVERLAY_PALETTE[1]);
        assert_eq!(s.experiment_color("a.xlsx"), COMPARISON_PALETTE[0]);
        assert_eq!(s.experiment_color("b.xlsx"), COMPARISON_PALETTE[1]);
    }

    #[test]
    fn test_color_overrides() {
        let mut s = session_with(&["exp1.xlsx"]);
        s.apply_color_overrides(&[
            ("Tensão A".to_string(), "red".to_string()),
            ("exp1".to_string(), "#00FF00".to_string()),
        ])
        .unwrap();
        assert_eq!(s.overlay_color(CanonicalVariable::TensaoA), "red");
        assert_eq!(s.experiment_color("exp1.xlsx"), "#00ff00");

        assert!(s
            .apply_color_overrides(&[("ghost".to_string(), "red".to_string())])
            .is_err());
        assert!(s.set_overlay_color(CanonicalVariable::TensaoA, "nope").is_err());
    }

    #[test]
    fn test_cycle_color_moves_through_palette() {
        let mut s = session_with(&["a.xlsx"]);
        s.toggle_overlay(CanonicalVariable::CorrenteA);
        s.cycle_overlay_color(CanonicalVariable::CorrenteA);
        assert_eq!(s.overlay_color(CanonicalVariable::CorrenteA), OVERLAY_PALETTE[1]);

        s.set_overlay_color(CanonicalVariable::CorrenteA, "pink").unwrap();
        s.cycle_overlay_color(CanonicalVariable::CorrenteA);
        assert_eq!(s.overlay_color(CanonicalVariable::CorrenteA), OVERLAY_PALETTE[0]);
    }

    #[test]
    fn test_toggle_overlay_and_normalize() {
        let mut s = DashboardSession::new();
        s.toggle_overlay(CanonicalVariable::EnergiaAtiva);
        s.toggle_overlay(CanonicalVariable::TensaoC);
        s.toggle_overlay(CanonicalVariable::EnergiaAtiva);
        assert_eq!(s.overlay(), &[CanonicalVariable::TensaoC]);

        s.set_overlay(vec![CanonicalVariable::TensaoC, CanonicalVariable::TensaoC]);
        assert_eq!(s.overlay().len(), 1);

        assert!(!s.normalize());
        s.toggle_normalize();
        assert!(s.normalize());
    }

    // ── test_tables_are_memoized ──

    #[test]
    fn test_tables_are_memoized() {
        let mut s = session_with(&["a.xlsx", "copy.xlsx"]);
        let a = s.table("a.xlsx").unwrap().unwrap();
        let b = s.table("copy.xlsx").unwrap().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(s.cache_stats().misses, 1);

        s.clear_cache();
        assert_eq!(s.cache_stats().entries, 0);
        assert!(s.table("missing").is_none());
    }

    // ── test_cache_follows_live_files ──

    #[test]
    fn test_remove_evicts_cached_table() {
        let mut s = session_with(&["a.csv"]);
        s.table("a.csv").unwrap().unwrap();
        assert_eq!(s.cache_stats().entries, 1);

        assert!(s.remove("a.csv"));
        assert_eq!(s.cache_stats().entries, 0);
        assert!(!s.remove("a.csv"));
    }

    #[test]
    fn test_replacing_upload_evicts_old_table() {
        let mut s = DashboardSession::new();
        for value in ["4,5", "5,5", "6,5"] {
            let body = SHEET.replace("4,5", value);
            s.upload(UploadedFile::new("b.csv", body.into_bytes()));
            s.table("b.csv").unwrap().unwrap();
        }
        assert_eq!(s.cache_stats().entries, 1);
        assert_eq!(s.cache_stats().misses, 3);
    }

    #[test]
    fn test_shared_content_survives_removal_of_one_file() {
        let mut s = session_with(&["a.csv", "copy.csv"]);
        s.table("a.csv").unwrap().unwrap();

        s.remove("a.csv");
        assert_eq!(s.cache_stats().entries, 1);
        s.table("copy.csv").unwrap().unwrap();
        assert_eq!(s.cache_stats().hits, 1);

        s.upload(UploadedFile::new("copy.csv", b"other".to_vec()));
        assert_eq!(s.cache_stats().entries, 0);
    }

    #[test]
    fn test_bad_file_yields_error() {
        let mut s = DashboardSession::new();
        s.upload(UploadedFile::new("bad.xlsx", b"PK\x03\x04junk".to_vec()));
        assert!(s.table("bad.xlsx").unwrap().is_err());
    }
}
