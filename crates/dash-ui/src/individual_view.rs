//! Individual analysis tab: one section of one file at a time.

use dash_runtime::views::IndividualView;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::chart_view;
use crate::themes::Theme;

pub const OVERLAY_TITLE: &str = "Comparativo Personalizado (Sobreposição Interna)";
const NO_SECTION_DATA: &str = "Nenhuma coluna correspondente neste arquivo.";
const NO_OVERLAY: &str = "Escolha variáveis à esquerda para sobrepô-las.";

/// Pages of the tab: one per section plus the overlay page.
pub fn page_count(view: &IndividualView) -> usize {
    if view.sections.is_empty() {
        0
    } else {
        view.sections.len() + 1
    }
}

/// Title of page `page`.
pub fn page_title(view: &IndividualView, page: usize) -> &str {
    match view.sections.get(page) {
        Some(section) => &section.title,
        None => OVERLAY_TITLE,
    }
}

/// `true` when `page` is the overlay page.
pub fn is_overlay_page(view: &IndividualView, page: usize) -> bool {
    !view.sections.is_empty() && page >= view.sections.len()
}

/// Lines above the charts: heading, page title and page position.
pub fn build_title_lines<'a>(view: &'a IndividualView, page: usize, theme: &'a Theme) -> Vec<Line<'a>> {
    let mut lines = Vec::with_capacity(2);
    if let Some(heading) = &view.heading {
        lines.push(Line::from(Span::styled(heading.as_str(), theme.bold)));
    }
    let pages = page_count(view);
    if pages > 0 {
        lines.push(Line::from(vec![
            Span::styled(page_title(view, page), theme.header),
            Span::styled(format!("  ({}/{})", page + 1, pages), theme.dim),
        ]));
    }
    lines
}

/// Render page `page` of the individual analysis into `area`.
pub fn render_individual_view(
    frame: &mut Frame,
    area: Rect,
    view: &IndividualView,
    page: usize,
    theme: &Theme,
) {
    let title = build_title_lines(view, page, theme);
    let [title_area, body] =
        Layout::vertical([Constraint::Length(title.len() as u16), Constraint::Min(0)]).areas(area);
    frame.render_widget(Paragraph::new(Text::from(title)), title_area);

    if view.sections.is_empty() {
        return;
    }

    if let Some(section) = view.sections.get(page) {
        let is_energy = section.group == dash_core::catalog::VariableGroup::Energy;
        match (&view.energy, is_energy) {
            (Some(energy), true) => {
                let [chart_area, total_area] =
                    Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(body);
                chart_view::render_chart_row(frame, chart_area, &section.charts, NO_SECTION_DATA, theme);
                frame.render_widget(
                    Paragraph::new(Line::from(Span::styled(energy.label.as_str(), theme.success))),
                    total_area,
                );
            }
            _ => chart_view::render_chart_row(frame, body, &section.charts, NO_SECTION_DATA, theme),
        }
        return;
    }

    let Some(overlay) = &view.overlay else {
        return;
    };
    let [status_area, chart_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(body);
    let status = if overlay.normalize {
        "Normalizada (0 a 1)"
    } else {
        "Valores brutos"
    };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Escala: ", theme.label),
            Span::styled(status, theme.value),
            Span::styled("  [z] alternar", theme.dim),
        ])),
        status_area,
    );
    match &overlay.chart {
        Some(chart) => chart_view::render_chart(frame, chart_area, chart, theme),
        None => chart_view::render_placeholder(frame, chart_area, OVERLAY_TITLE, NO_OVERLAY, theme.dim, theme),
    }
}
