//! Chart descriptions handed to a renderer.
//!
//! Nothing here draws: builders turn a [`CleanTable`] into [`ChartSpec`]
//! values (series, colors, labels, axis mode) that the TUI renders and the
//! JSON export serializes.

use serde::Serialize;

use crate::catalog::{CanonicalVariable, VariableCatalog};
use crate::formatting;
use crate::models::{CleanTable, TimeAxisMode};

/// X-axis title shared by the energy and overlay charts.
pub const TIME_AXIS_TITLE: &str = "Tempo";
pub const NORMALIZED_Y_LABEL: &str = "Valores Normalizados (0 a 1)";
pub const RAW_Y_LABEL: &str = "Valores Brutos";

// ── Series math ───────────────────────────────────────────────────────────────

/// Min-max rescale to `[0, 1]`, ignoring missing values.
///
/// A constant series maps to all zeros. Missing entries stay missing.
pub fn normalize_min_max(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let Some((min, max)) = min_max(values) else {
        return values.to_vec();
    };
    let span = max - min;
    values
        .iter()
        .map(|v| {
            v.map(|x| {
                if span != 0.0 {
                    (x - min) / span
                } else {
                    x - min
                }
            })
        })
        .collect()
}

/// Smallest and largest present value.
pub fn min_max(values: &[Option<f64>]) -> Option<(f64, f64)> {
    values
        .iter()
        .flatten()
        .filter(|x| x.is_finite())
        .fold(None, |acc, &x| match acc {
            None => Some((x, x)),
            Some((lo, hi)) => Some((lo.min(x), hi.max(x))),
        })
}

/// Energy consumed over the period of a cumulative meter column.
pub fn consumption_total(values: &[Option<f64>]) -> Option<f64> {
    min_max(values).map(|(lo, hi)| hi - lo)
}

// ── Chart model ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    /// Filled down to zero.
    Area,
}

/// One plotted curve.
///
/// Rows without an axis value are dropped; `None` in `y` is a gap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub color: String,
    pub x: Vec<f64>,
    pub y: Vec<Option<f64>>,
}

impl Series {
    /// Pair `values` with `table`'s axis coordinates.
    pub fn from_table(
        name: impl Into<String>,
        color: impl Into<String>,
        table: &CleanTable,
        values: &[Option<f64>],
    ) -> Self {
        let (x, y) = table
            .axis()
            .coordinates()
            .into_iter()
            .zip(values.iter().copied())
            .filter_map(|(x, y)| x.map(|x| (x, y.filter(|v| v.is_finite()))))
            .unzip();
        Self {
            name: name.into(),
            color: color.into(),
            x,
            y,
        }
    }

    /// Contiguous runs of present points, split at gaps.
    pub fn segments(&self) -> Vec<Vec<(f64, f64)>> {
        let mut segments = Vec::new();
        let mut current: Vec<(f64, f64)> = Vec::new();
        for (x, y) in self.x.iter().zip(&self.y) {
            match y {
                Some(y) => current.push((*x, *y)),
                None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
                None => {}
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }

    pub fn has_data(&self) -> bool {
        self.y.iter().any(Option::is_some)
    }
}

/// Everything a renderer needs to draw one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: Option<String>,
    pub kind: ChartKind,
    pub axis_mode: TimeAxisMode,
    pub x_label: Option<String>,
    pub y_label: String,
    pub series: Vec<Series>,
}

impl ChartSpec {
    /// `[min, max]` of all x coordinates.
    pub fn x_bounds(&self) -> Option<[f64; 2]> {
        let xs: Vec<Option<f64>> = self
            .series
            .iter()
            .flat_map(|s| s.x.iter().copied().map(Some))
            .collect();
        min_max(&xs).map(|(lo, hi)| [lo, hi])
    }

    /// `[min, max]` of all y values; area charts always include zero.
    pub fn y_bounds(&self) -> Option<[f64; 2]> {
        let ys: Vec<Option<f64>> = self.series.iter().flat_map(|s| s.y.clone()).collect();
        let (lo, hi) = min_max(&ys)?;
        Some(match self.kind {
            ChartKind::Area => [lo.min(0.0), hi.max(0.0)],
            ChartKind::Line => [lo, hi],
        })
    }

    /// Tick / hover label for `x` according to the axis mode.
    pub fn format_x(&self, x: f64) -> String {
        formatting::format_axis_value(self.axis_mode, x)
    }
}

// ── Builders ──────────────────────────────────────────────────────────────────

/// Single time-series line of `column`.
///
/// Returns `None` when `table` has no numeric column of that name.
pub fn line_chart(
    table: &CleanTable,
    column: &str,
    title: &str,
    color: &str,
    y_label: &str,
) -> Option<ChartSpec> {
    let values = table.numeric(column)?;
    Some(ChartSpec {
        title: Some(title.to_string()),
        kind: ChartKind::Line,
        axis_mode: table.axis_mode(),
        x_label: None,
        y_label: y_label.to_string(),
        series: vec![Series::from_table(title, color, table, values)],
    })
}

/// Filled-area variant used for cumulative energy.
pub fn area_chart(
    table: &CleanTable,
    column: &str,
    name: &str,
    color: &str,
    y_label: &str,
) -> Option<ChartSpec> {
    let values = table.numeric(column)?;
    Some(ChartSpec {
        title: None,
        kind: ChartKind::Area,
        axis_mode: table.axis_mode(),
        x_label: Some(TIME_AXIS_TITLE.to_string()),
        y_label: y_label.to_string(),
        series: vec![Series::from_table(name, color, table, values)],
    })
}

/// Chart of a canonical variable with its own title, color and unit.
pub fn variable_chart(
    table: &CleanTable,
    catalog: &VariableCatalog,
    variable: CanonicalVariable,
) -> Option<ChartSpec> {
    let column = catalog.get(variable)?;
    match variable {
        CanonicalVariable::EnergiaAtiva => area_chart(
            table,
            &column.name,
            variable.display_name(),
            variable.default_color(),
            variable.unit_label(),
        ),
        _ => line_chart(
            table,
            &column.name,
            variable.chart_title(),
            variable.default_color(),
            variable.unit_label(),
        ),
    }
}

/// One series requested for the overlay chart.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySelection<'a> {
    pub name: &'a str,
    pub column: &'a str,
    pub color: &'a str,
}

/// Several columns of one table on shared axes, each optionally rescaled
/// to `[0, 1]`. Selections naming a non-numeric column are skipped.
pub fn overlay_chart(
    table: &CleanTable,
    selections: &[OverlaySelection<'_>],
    normalize: bool,
) -> Option<ChartSpec> {
    let series: Vec<Series> = selections
        .iter()
        .filter_map(|sel| {
            let values = table.numeric(sel.column)?;
            let values = if normalize {
                normalize_min_max(values)
            } else {
                values.to_vec()
            };
            Some(Series::from_table(sel.name, sel.color, table, &values))
        })
        .collect();

    if series.is_empty() {
        return None;
    }

    Some(ChartSpec {
        title: None,
        kind: ChartKind::Line,
        axis_mode: table.axis_mode(),
        x_label: Some(TIME_AXIS_TITLE.to_string()),
        y_label: if normalize {
            NORMALIZED_Y_LABEL
        } else {
            RAW_Y_LABEL
        }
        .to_string(),
        series,
    })
}

/// One loaded file taking part in a comparison.
#[derive(Debug, Clone, Copy)]
pub struct Experiment<'a> {
    /// Legend name, usually the file name without extension.
    pub name: &'a str,
    pub table: &'a CleanTable,
    pub catalog: &'a VariableCatalog,
    pub color: &'a str,
}

/// Result of a comparison chart request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ComparisonOutcome {
    Chart(ChartSpec),
    NotFound { title: String, message: String },
}

/// The same variable across several experiments, one series each.
///
/// Experiments lacking the variable are left out; when none has it the
/// outcome is [`ComparisonOutcome::NotFound`] with a user-facing notice.
pub fn comparison_chart(
    experiments: &[Experiment<'_>],
    variable: CanonicalVariable,
) -> ComparisonOutcome {
    let title = variable.comparison_title();
    let mut axis_mode = None;
    let series: Vec<Series> = experiments
        .iter()
        .filter_map(|exp| {
            let column = exp.catalog.get(variable)?;
            let values = exp.table.numeric(&column.name)?;
            if axis_mode.is_none() {
                axis_mode = Some(exp.table.axis_mode());
            }
            Some(Series::from_table(exp.name, exp.color, exp.table, values))
        })
        .collect();

    match axis_mode {
        Some(axis_mode) if !series.is_empty() => ComparisonOutcome::Chart(ChartSpec {
            title: Some(title.to_string()),
            kind: ChartKind::Line,
            axis_mode,
            x_label: None,
            y_label: variable.unit_label().to_string(),
            series,
        }),
        _ => ComparisonOutcome::NotFound {
            title: title.to_string(),
            message: format!("Dados não encontrados para {} nos arquivos selecionados.", title),
        },
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
