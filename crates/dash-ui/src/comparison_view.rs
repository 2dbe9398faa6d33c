//! Comparison tab: one variable group across the selected experiments.

use dash_runtime::views::ComparisonView;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::chart_view;
use crate::themes::Theme;

pub const TITLE: &str = "Sobreposição de Múltiplos Experimentos";

pub fn page_count(view: &ComparisonView) -> usize {
    view.sections.len()
}

/// Title, the legend of selected experiments and the page position.
pub fn build_title_lines<'a>(view: &'a ComparisonView, page: usize, theme: &'a Theme) -> Vec<Line<'a>> {
    let mut lines = vec![Line::from(Span::styled(TITLE, theme.bold))];

    if !view.experiments.is_empty() {
        let mut legend = Vec::with_capacity(view.experiments.len() * 2);
        for exp in &view.experiments {
            let style = if exp.loaded {
                Style::default().fg(theme.series_color(&exp.color))
            } else {
                theme.dim
            };
            legend.push(Span::styled("■ ", style));
            legend.push(Span::styled(format!("{}  ", exp.legend), theme.text));
        }
        lines.push(Line::from(legend));
    }

    if let Some(section) = view.sections.get(page) {
        lines.push(Line::from(vec![
            Span::styled(section.title.as_str(), theme.header),
            Span::styled(format!("  ({}/{})", page + 1, view.sections.len()), theme.dim),
        ]));
    }
    lines
}

/// Render page `page` of the comparison into `area`.
pub fn render_comparison_view(
    frame: &mut Frame,
    area: Rect,
    view: &ComparisonView,
    page: usize,
    theme: &Theme,
) {
    let title = build_title_lines(view, page, theme);
    let [title_area, body] =
        Layout::vertical([Constraint::Length(title.len() as u16), Constraint::Min(0)]).areas(area);
    frame.render_widget(Paragraph::new(Text::from(title)), title_area);

    if let Some(section) = view.sections.get(page) {
        chart_view::render_outcome_row(frame, body, &section.charts, theme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dash_runtime::session::{DashboardSession, UploadedFile};
    use dash_runtime::views::comparison_view;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    const WITH_ENERGY: &str = "Data;Hora;Tempo;Corrente A (A);Energia Ativa (kWh)\n\
                               01/02/2024;10:00:00;10:00:00;5,0;1,0\n\
                               01/02/2024;10:00:10;10:00:10;5,5;1,5\n";
    const WITHOUT_ENERGY: &str = "Data;Hora;Tempo;Corrente A (A)\n\
                                  01/02/2024;08:00:00;0 days 00:00:00;4,0\n\
                                  01/02/2024;08:00:10;0 days 00:00:10;4,5\n";

    fn view(files: &[(&str, &str)]) -> ComparisonView {
        let mut s = DashboardSession::new();
        for (name, body) in files {
            s.upload(UploadedFile::new(*name, body.as_bytes().to_vec()));
        }
        comparison_view(&mut s)
    }

    fn draw(view: &ComparisonView, page: usize) -> String {
        let backend = TestBackend::new(150, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render_comparison_view(frame, area, view, page, &theme);
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_title_lines_list_experiments() {
        let v = view(&[("exp1.xlsx", WITH_ENERGY), ("exp2.csv", WITHOUT_ENERGY)]);
        let theme = Theme::dark();
        let lines = build_title_lines(&v, 2, &theme);
        let legend: String = lines[1].spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(legend, "■ exp1  ■ exp2  ");
        let page: String = lines[2].spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(page, "Corrente  (3/4)");
    }

    #[test]
    fn test_render_all_pages_does_not_panic() {
        let v = view(&[("exp1.xlsx", WITH_ENERGY), ("exp2.csv", WITHOUT_ENERGY)]);
        for page in 0..page_count(&v) {
            draw(&v, page);
        }
    }

    #[test]
    fn test_missing_variable_shows_notice() {
        let v = view(&[("exp2.csv", WITHOUT_ENERGY)]);
        let screen = draw(&v, 3);
        assert!(screen.contains("Dados não encontrados para Energia Ativa (Acumulada)"));
    }

    #[test]
    fn test_empty_view_renders_title_only() {
        let v = ComparisonView::default();
        assert_eq!(page_count(&v), 0);
        let screen = draw(&v, 0);
        assert!(screen.contains(TITLE));
    }
}
