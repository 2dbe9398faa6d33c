use crate::themes::Theme;
use dash_core::models::TimeAxisMode;
use ratatui::text::{Line, Span};

/// Decoration placed either side of the application title.
pub const FLAKES: &str = "❄ ❅ ❄";

/// Width of the `=` separator under the title.
pub const SEPARATOR_WIDTH: usize = 60;

/// Dashboard header rendering four lines:
///
/// 1. Application title with decorations (ALL CAPS).
/// 2. A 60-column `=` separator.
/// 3. File and axis information in `[ file | n files | axis ]` format.
/// 4. An empty line.
pub struct Header<'a> {
    /// Name of the file under analysis, if any.
    pub file: Option<&'a str>,
    pub file_count: usize,
    pub axis_mode: Option<TimeAxisMode>,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(
        file: Option<&'a str>,
        file_count: usize,
        axis_mode: Option<TimeAxisMode>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            file,
            file_count,
            axis_mode,
            theme,
        }
    }

    /// Render the header as exactly four lines.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let files = match self.file_count {
            1 => "1 arquivo".to_string(),
            n => format!("{} arquivos", n),
        };
        let axis = match self.axis_mode {
            Some(TimeAxisMode::AbsoluteTime) => "horário",
            Some(TimeAxisMode::ElapsedMinutes) => "minutos decorridos",
            None => "sem dados",
        };

        vec![
            Line::from(vec![
                Span::styled(FLAKES, self.theme.header_accent),
                Span::styled(" ANÁLISE DE CONSUMO E REFRIGERAÇÃO ", self.theme.header),
                Span::styled(FLAKES, self.theme.header_accent),
            ]),
            Line::from(Span::styled(
                "=".repeat(SEPARATOR_WIDTH),
                self.theme.separator,
            )),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(self.file.unwrap_or("-").to_string(), self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(files, self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(axis, self.theme.value),
                Span::styled(" ]", self.theme.label),
            ]),
            Line::from(""),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_header_to_lines_count() {
        let theme = Theme::dark();
        let lines = Header::new(Some("exp1.xlsx"), 2, None, &theme).to_lines();
        assert_eq!(lines.len(), 4, "header must produce exactly 4 lines");
        assert!(text(&lines[3]).is_empty());
    }

    #[test]
    fn test_header_title_line_content() {
        let theme = Theme::dark();
        let lines = Header::new(None, 0, None, &theme).to_lines();
        let title = text(&lines[0]);
        assert!(title.contains("ANÁLISE DE CONSUMO E REFRIGERAÇÃO"));
        assert!(title.starts_with(FLAKES));
    }

    #[test]
    fn test_header_separator_line() {
        let theme = Theme::dark();
        let lines = Header::new(None, 0, None, &theme).to_lines();
        let sep = text(&lines[1]);
        assert_eq!(sep.chars().count(), SEPARATOR_WIDTH);
        assert!(sep.chars().all(|c| c == '='));
    }

    #[test]
    fn test_header_info_line() {
        let theme = Theme::dark();
        let lines = Header::new(
            Some("exp1.xlsx"),
            1,
            Some(TimeAxisMode::ElapsedMinutes),
            &theme,
        )
        .to_lines();
        assert_eq!(text(&lines[2]), "[ exp1.xlsx | 1 arquivo | minutos decorridos ]");

        let lines = Header::new(None, 3, Some(TimeAxisMode::AbsoluteTime), &theme).to_lines();
        assert_eq!(text(&lines[2]), "[ - | 3 arquivos | horário ]");
    }
}
