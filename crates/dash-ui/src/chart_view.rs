//! Rendering of [`ChartSpec`]s with the ratatui `Chart` widget.
//!
//! Every series is split at missing values and each run becomes its own
//! dataset, so gaps stay visible. Area charts are drawn as bars down to
//! zero.

use dash_core::charts::{ChartKind, ChartSpec, ComparisonOutcome};
use dash_core::formatting::format_number;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition, Paragraph, Wrap,
};
use ratatui::Frame;

use crate::themes::Theme;

/// Maximum charts placed side by side in one row.
pub const MAX_COLUMNS: usize = 3;

/// Pad degenerate bounds so the axis has a non-zero span.
pub fn padded_bounds(bounds: Option<[f64; 2]>) -> [f64; 2] {
    match bounds {
        Some([lo, hi]) if hi > lo => [lo, hi],
        Some([lo, _]) => [lo - 1.0, lo + 1.0],
        None => [0.0, 1.0],
    }
}

/// Three tick labels (min, middle, max) for the x axis.
pub fn x_tick_labels(spec: &ChartSpec, bounds: [f64; 2]) -> Vec<String> {
    let mid = (bounds[0] + bounds[1]) / 2.0;
    [bounds[0], mid, bounds[1]]
        .into_iter()
        .map(|x| spec.format_x(x))
        .collect()
}

/// Three tick labels (min, middle, max) for the y axis.
pub fn y_tick_labels(bounds: [f64; 2]) -> Vec<String> {
    let span = bounds[1] - bounds[0];
    let decimals = if span >= 100.0 {
        0
    } else if span >= 1.0 {
        1
    } else {
        2
    };
    let mid = (bounds[0] + bounds[1]) / 2.0;
    [bounds[0], mid, bounds[1]]
        .into_iter()
        .map(|y| format_number(y, decimals))
        .collect()
}

/// Render one chart into `area`.
pub fn render_chart(frame: &mut Frame, area: Rect, spec: &ChartSpec, theme: &Theme) {
    let segments: Vec<(usize, Vec<Vec<(f64, f64)>>)> = spec
        .series
        .iter()
        .enumerate()
        .map(|(i, s)| (i, s.segments()))
        .collect();

    let graph_type = match spec.kind {
        ChartKind::Line => GraphType::Line,
        ChartKind::Area => GraphType::Bar,
    };

    let mut datasets = Vec::new();
    for (i, runs) in &segments {
        let series = &spec.series[*i];
        let style = Style::default().fg(theme.series_color(&series.color));
        for (j, run) in runs.iter().enumerate() {
            let mut dataset = Dataset::default()
                .marker(Marker::Braille)
                .graph_type(graph_type)
                .style(style)
                .data(run);
            // Legend entry only for the first run.
            if j == 0 {
                dataset = dataset.name(series.name.clone());
            }
            datasets.push(dataset);
        }
    }

    let x_bounds = padded_bounds(spec.x_bounds());
    let y_bounds = padded_bounds(spec.y_bounds());

    let mut x_axis = Axis::default()
        .style(theme.axis)
        .bounds(x_bounds)
        .labels(x_tick_labels(spec, x_bounds));
    if let Some(label) = &spec.x_label {
        x_axis = x_axis.title(Span::styled(label.clone(), theme.axis_label));
    }
    let y_axis = Axis::default()
        .style(theme.axis)
        .bounds(y_bounds)
        .labels(y_tick_labels(y_bounds))
        .title(Span::styled(spec.y_label.clone(), theme.axis_label));

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.chart_border);
    if let Some(title) = &spec.title {
        block = block.title(Span::styled(format!(" {} ", title), theme.chart_title));
    }

    let legend = if spec.series.len() > 1 {
        Some(LegendPosition::TopRight)
    } else {
        None
    };

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(x_axis)
        .y_axis(y_axis)
        .legend_position(legend);
    frame.render_widget(chart, area);
}

/// Boxed message in place of a chart.
pub fn render_placeholder(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    message: &str,
    style: Style,
    theme: &Theme,
) {
    let paragraph = Paragraph::new(Line::from(Span::styled(message.to_string(), style)))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.chart_border)
                .title(Span::styled(format!(" {} ", title), theme.chart_title)),
        );
    frame.render_widget(paragraph, area);
}

/// Split `area` into rows of at most [`MAX_COLUMNS`] equal cells.
pub fn grid(area: Rect, count: usize) -> Vec<Rect> {
    if count == 0 {
        return Vec::new();
    }
    let rows = count.div_ceil(MAX_COLUMNS);
    let row_areas = Layout::vertical(vec![Constraint::Ratio(1, rows as u32); rows]).split(area);

    let mut cells = Vec::with_capacity(count);
    for (r, row) in row_areas.iter().enumerate() {
        let in_row = (count - r * MAX_COLUMNS).min(MAX_COLUMNS);
        let cols =
            Layout::horizontal(vec![Constraint::Ratio(1, in_row as u32); in_row]).split(*row);
        cells.extend(cols.iter().copied());
    }
    cells
}

/// Render charts side by side, or `empty` when there are none.
pub fn render_chart_row(
    frame: &mut Frame,
    area: Rect,
    charts: &[ChartSpec],
    empty: &str,
    theme: &Theme,
) {
    if charts.is_empty() {
        render_placeholder(frame, area, "", empty, theme.dim, theme);
        return;
    }
    for (spec, cell) in charts.iter().zip(grid(area, charts.len())) {
        render_chart(frame, cell, spec, theme);
    }
}

/// Render comparison outcomes side by side; missing data shows its notice.
pub fn render_outcome_row(
    frame: &mut Frame,
    area: Rect,
    outcomes: &[ComparisonOutcome],
    theme: &Theme,
) {
    for (outcome, cell) in outcomes.iter().zip(grid(area, outcomes.len())) {
        match outcome {
            ComparisonOutcome::Chart(spec) => render_chart(frame, cell, spec, theme),
            ComparisonOutcome::NotFound { title, message } => {
                render_placeholder(frame, cell, title, message, theme.warning, theme)
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
