use crate::components::notices::truncate_to_width;
use crate::themes::Theme;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

/// Swatch drawn in a row's series color.
pub const SWATCH: &str = "██";

/// One selectable row: overlay variable or experiment.
#[derive(Debug, Clone, PartialEq)]
pub struct PickerItem {
    pub label: String,
    pub checked: bool,
    /// Configured series color (`#rrggbb` or a name).
    pub color: String,
}

/// Checkbox list with a cursor.
///
/// Rows render as `[x] ██ label`; the row under the cursor is highlighted
/// and labels are padded so highlights line up.
pub struct Picker<'a> {
    pub items: &'a [PickerItem],
    pub cursor: usize,
    pub theme: &'a Theme,
}

impl<'a> Picker<'a> {
    pub fn new(items: &'a [PickerItem], cursor: usize, theme: &'a Theme) -> Self {
        Self {
            items,
            cursor,
            theme,
        }
    }

    pub fn to_lines(&self, width: usize) -> Vec<Line<'a>> {
        // "[x] " + swatch + " "
        let prefix = 4 + SWATCH.width() + 1;
        let room = width.saturating_sub(prefix);

        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let mark = if item.checked { "[x] " } else { "[ ] " };
                let mark_style = if item.checked {
                    self.theme.checked
                } else {
                    self.theme.dim
                };
                let label = truncate_to_width(&item.label, room);
                let padded = format!("{}{}", label, " ".repeat(room.saturating_sub(label.width())));
                let label_style = if i == self.cursor {
                    self.theme.cursor
                } else {
                    self.theme.text
                };
                Line::from(vec![
                    Span::styled(mark, mark_style),
                    Span::styled(
                        SWATCH,
                        Style::default().fg(self.theme.series_color(&item.color)),
                    ),
                    Span::raw(" "),
                    Span::styled(padded, label_style),
                ])
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    fn items() -> Vec<PickerItem> {
        vec![
            PickerItem {
                label: "Temperatura Ambiente".into(),
                checked: true,
                color: "#1f77b4".into(),
            },
            PickerItem {
                label: "Tensão A".into(),
                checked: false,
                color: "red".into(),
            },
        ]
    }

    #[test]
    fn test_picker_marks_and_colors() {
        let theme = Theme::dark();
        let items = items();
        let lines = Picker::new(&items, 1, &theme).to_lines(40);

        assert_eq!(lines[0].spans[0].content, "[x] ");
        assert_eq!(lines[1].spans[0].content, "[ ] ");
        assert_eq!(lines[0].spans[1].style.fg, Some(Color::Rgb(0x1f, 0x77, 0xb4)));
        assert_eq!(lines[1].spans[3].style, theme.cursor);
        assert_eq!(lines[0].spans[3].style, theme.text);
    }

    #[test]
    fn test_picker_rows_have_equal_width() {
        let theme = Theme::dark();
        let items = items();
        let lines = Picker::new(&items, 0, &theme).to_lines(30);
        let widths: Vec<usize> = lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.width()).sum())
            .collect();
        assert_eq!(widths, vec![30, 30]);
    }
}
