//! View assembly.
//!
//! Pure functions from a [`DashboardSession`] to serializable view models.
//! The TUI renders them and `--json` prints them; neither recomputes
//! anything on its own.

use std::sync::Arc;

use serde::Serialize;

use dash_core::catalog::{CanonicalVariable, VariableCatalog, VariableGroup};
use dash_core::charts::{self, ChartSpec, ComparisonOutcome, Experiment, OverlaySelection};
use dash_core::formatting;
use dash_core::models::{LoadedTable, TimeAxisMode};

use crate::session::{DashboardSession, UploadedFile};

pub const NO_FILES_MESSAGE: &str = "Carregue um ou mais arquivos de planilha para iniciar a análise.";
pub const NO_EXPERIMENTS_MESSAGE: &str =
    "Selecione pelo menos um experimento para visualizar a comparação.";
pub const MIXED_AXIS_MESSAGE: &str = "Os experimentos misturam horário e minutos decorridos; \
     cada gráfico usa o eixo do primeiro experimento que tem a variável.";

// ── Notices ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A message shown next to the charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn ingestion_failed(file: &str, reason: impl std::fmt::Display) -> Self {
        Self::error(format!("Erro ao processar o arquivo {}: {}", file, reason))
    }
}

// ── Individual analysis ───────────────────────────────────────────────────────

/// One heading of the individual analysis and the charts found for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub group: VariableGroup,
    pub title: String,
    pub charts: Vec<ChartSpec>,
}

/// Total energy consumed over the file's period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergySummary {
    pub total_kwh: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayEntry {
    pub variable: CanonicalVariable,
    pub color: String,
}

/// The user-composed overlay chart and what can go into it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayView {
    /// Variables present in the file, in picker order.
    pub available: Vec<CanonicalVariable>,
    /// Selected variables that the file actually has.
    pub selected: Vec<OverlayEntry>,
    pub normalize: bool,
    pub chart: Option<ChartSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndividualView {
    pub file: Option<String>,
    pub heading: Option<String>,
    pub axis_mode: Option<TimeAxisMode>,
    pub sections: Vec<Section>,
    pub energy: Option<EnergySummary>,
    pub overlay: Option<OverlayView>,
    pub notices: Vec<Notice>,
}

/// Build the individual analysis of the selected file.
pub fn individual_view(session: &mut DashboardSession) -> IndividualView {
    let Some(name) = session.selected_file().map(|f| f.name.clone()) else {
        return IndividualView {
            notices: vec![Notice::info(NO_FILES_MESSAGE)],
            ..Default::default()
        };
    };

    let mut view = IndividualView {
        file: Some(name.clone()),
        ..Default::default()
    };

    let loaded = match session.table(&name) {
        Some(Ok(loaded)) => loaded,
        Some(Err(e)) => {
            view.notices.push(Notice::ingestion_failed(&name, e));
            return view;
        }
        None => return view,
    };

    let table = &loaded.table;
    let catalog = VariableCatalog::resolve(table);
    view.heading = Some(format!("Resultados: {}", formatting::legend_name(&name)));
    view.axis_mode = Some(table.axis_mode());
    let untimed = table.axis().missing_count();
    if untimed > 0 {
        view.notices.push(Notice::warning(format!(
            "{} de {} linhas de {} estão sem horário legível e não foram plotadas.",
            untimed,
            table.row_count(),
            name
        )));
    }

    view.sections = VariableGroup::ALL
        .into_iter()
        .map(|group| Section {
            group,
            title: group.title().to_string(),
            charts: group
                .variables()
                .filter_map(|v| charts::variable_chart(table, &catalog, v))
                .collect(),
        })
        .collect();

    view.energy = catalog
        .get(CanonicalVariable::EnergiaAtiva)
        .and_then(|col| table.numeric(&col.name))
        .and_then(charts::consumption_total)
        .map(|total_kwh| EnergySummary {
            total_kwh,
            label: format!(
                "Consumo Total no Período: {}",
                formatting::format_energy(total_kwh)
            ),
        });

    view.overlay = Some(overlay_view(session, &loaded, &catalog));

    tracing::debug!(
        file = %name,
        variables = catalog.len(),
        charts = view.sections.iter().map(|s| s.charts.len()).sum::<usize>(),
        "individual view built"
    );
    view
}

fn overlay_view(
    session: &DashboardSession,
    loaded: &Arc<LoadedTable>,
    catalog: &VariableCatalog,
) -> OverlayView {
    let selected: Vec<OverlayEntry> = session
        .overlay()
        .iter()
        .filter(|v| catalog.contains(**v))
        .map(|v| OverlayEntry {
            variable: *v,
            color: session.overlay_color(*v),
        })
        .collect();

    let selections: Vec<OverlaySelection<'_>> = selected
        .iter()
        .filter_map(|entry| {
            let column = catalog.get(entry.variable)?;
            Some(OverlaySelection {
                name: entry.variable.display_name(),
                column: &column.name,
                color: &entry.color,
            })
        })
        .collect();

    let chart = charts::overlay_chart(&loaded.table, &selections, session.normalize());

    OverlayView {
        available: catalog.variables().collect(),
        selected,
        normalize: session.normalize(),
        chart,
    }
}

// ── Comparison ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentEntry {
    pub file: String,
    pub legend: String,
    pub color: String,
    /// `false` when the file failed ingestion and is left out of the charts.
    pub loaded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonSection {
    pub group: VariableGroup,
    pub title: String,
    pub charts: Vec<ComparisonOutcome>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComparisonView {
    pub experiments: Vec<ExperimentEntry>,
    pub sections: Vec<ComparisonSection>,
    pub notices: Vec<Notice>,
}

impl ComparisonView {
    /// Every `NotFound` notice across the sections, in display order.
    pub fn missing_data_messages(&self) -> Vec<&str> {
        self.sections
            .iter()
            .flat_map(|s| &s.charts)
            .filter_map(|c| match c {
                ComparisonOutcome::NotFound { message, .. } => Some(message.as_str()),
                ComparisonOutcome::Chart(_) => None,
            })
            .collect()
    }
}

struct LoadedExperiment {
    legend: String,
    color: String,
    loaded: Arc<LoadedTable>,
    catalog: VariableCatalog,
}

/// Build the comparison of the selected experiments.
pub fn comparison_view(session: &mut DashboardSession) -> ComparisonView {
    let mut view = ComparisonView::default();
    if !session.has_files() {
        view.notices.push(Notice::info(NO_FILES_MESSAGE));
        return view;
    }

    let selection: Vec<UploadedFile> = session
        .comparison_selection()
        .into_iter()
        .cloned()
        .collect();
    if selection.is_empty() {
        view.notices.push(Notice::info(NO_EXPERIMENTS_MESSAGE));
        return view;
    }

    let mut experiments = Vec::with_capacity(selection.len());
    for file in &selection {
        let color = session.experiment_color(&file.name);
        let outcome = session.table(&file.name);
        let loaded = match outcome {
            Some(Ok(loaded)) => Some(loaded),
            Some(Err(e)) => {
                view.notices.push(Notice::ingestion_failed(&file.name, e));
                None
            }
            None => None,
        };
        view.experiments.push(ExperimentEntry {
            file: file.name.clone(),
            legend: file.legend().to_string(),
            color: color.clone(),
            loaded: loaded.is_some(),
        });
        if let Some(loaded) = loaded {
            let catalog = VariableCatalog::resolve(&loaded.table);
            experiments.push(LoadedExperiment {
                legend: file.legend().to_string(),
                color,
                loaded,
                catalog,
            });
        }
    }

    let modes: Vec<TimeAxisMode> = experiments.iter().map(|e| e.loaded.axis_mode()).collect();
    if modes.windows(2).any(|pair| pair[0] != pair[1]) {
        tracing::warn!(?modes, "comparing experiments with different time axes");
        view.notices.push(Notice::warning(MIXED_AXIS_MESSAGE));
    }

    let refs: Vec<Experiment<'_>> = experiments
        .iter()
        .map(|e| Experiment {
            name: &e.legend,
            table: &e.loaded.table,
            catalog: &e.catalog,
            color: &e.color,
        })
        .collect();

    view.sections = VariableGroup::ALL
        .into_iter()
        .map(|group| ComparisonSection {
            group,
            title: group.comparison_title().to_string(),
            charts: group
                .variables()
                .map(|v| charts::comparison_chart(&refs, v))
                .collect(),
        })
        .collect();

    for message in view.missing_data_messages() {
        tracing::debug!(notice = message, "comparison chart without data");
    }
    view
}

// ── Export ────────────────────────────────────────────────────────────────────

/// Both views, as printed by `--json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardExport {
    pub files: Vec<String>,
    pub individual: IndividualView,
    pub comparison: ComparisonView,
}

pub fn export(session: &mut DashboardSession) -> DashboardExport {
    DashboardExport {
        files: session.file_names().into_iter().map(String::from).collect(),
        individual: individual_view(session),
        comparison: comparison_view(session),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
