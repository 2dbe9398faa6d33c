use crate::themes::Theme;
use dash_runtime::views::{Notice, NoticeLevel};
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Icon shown in front of a notice.
pub fn icon(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Info => "ℹ ",
        NoticeLevel::Warning => "⚠ ",
        NoticeLevel::Error => "✖ ",
    }
}

/// Cut `text` to at most `width` terminal columns, ending in `…` when cut.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// Notices as one styled line each, cut to `width` columns.
pub struct NoticeList<'a> {
    pub notices: &'a [Notice],
    pub theme: &'a Theme,
}

impl<'a> NoticeList<'a> {
    pub fn new(notices: &'a [Notice], theme: &'a Theme) -> Self {
        Self { notices, theme }
    }

    pub fn to_lines(&self, width: usize) -> Vec<Line<'a>> {
        self.notices
            .iter()
            .map(|n| {
                let style = self.theme.notice_style(n.level);
                let prefix = icon(n.level);
                let room = width.saturating_sub(prefix.width());
                Line::from(vec![
                    Span::styled(prefix, style),
                    Span::styled(truncate_to_width(&n.message, room), style),
                ])
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("Tensão - Fase A", 8), "Tensão …");
        assert_eq!(truncate_to_width("abc", 0), "");
        assert_eq!(truncate_to_width("abcdef", 4).width(), 4);
    }

    #[test]
    fn test_notice_lines_styled_by_level() {
        let theme = Theme::dark();
        let notices = vec![
            Notice::info("Selecione pelo menos um experimento para visualizar a comparação."),
            Notice::error("Erro ao processar o arquivo x.xlsx: bad"),
        ];
        let lines = NoticeList::new(&notices, &theme).to_lines(200);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].spans[0].style, theme.info);
        assert_eq!(lines[1].spans[1].style, theme.error);
        assert_eq!(lines[1].spans[1].content, "Erro ao processar o arquivo x.xlsx: bad");
    }

    #[test]
    fn test_notice_lines_fit_width() {
        let theme = Theme::dark();
        let notices = vec![Notice::warning("x".repeat(100))];
        let lines = NoticeList::new(&notices, &theme).to_lines(20);
        let total: usize = lines[0].spans.iter().map(|s| s.content.width()).sum();
        assert!(total <= 20);
    }
}
