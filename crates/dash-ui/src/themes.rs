use dash_core::palette;
use dash_runtime::views::NoticeLevel;
use ratatui::style::{Color, Modifier, Style};

/// Background of the terminal, as far as it can be told.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
}

/// Read the background from `COLORFGBG` (`"fg;bg"`).
///
/// Palette indices above 6 mean a light background; anything else,
/// including a missing variable, counts as dark.
pub fn detect_background() -> BackgroundType {
    let bg = std::env::var("COLORFGBG")
        .ok()
        .and_then(|v| v.rsplit(';').next().and_then(|b| b.parse::<u8>().ok()));
    match bg {
        Some(n) if n > 6 => BackgroundType::Light,
        _ => BackgroundType::Dark,
    }
}

/// Complete theme definition carrying all UI styles used by dash-ui
/// components.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Header ───────────────────────────────────────────────────────────────
    pub header: Style,
    pub header_accent: Style,
    pub separator: Style,

    // ── Text ─────────────────────────────────────────────────────────────────
    pub text: Style,
    pub dim: Style,
    pub bold: Style,
    pub label: Style,
    pub value: Style,

    // ── Status ───────────────────────────────────────────────────────────────
    pub info: Style,
    pub success: Style,
    pub warning: Style,
    pub error: Style,

    // ── Tabs / picker ────────────────────────────────────────────────────────
    pub tab_active: Style,
    pub tab_inactive: Style,
    /// Row under the picker cursor.
    pub cursor: Style,
    pub checked: Style,

    // ── Charts ───────────────────────────────────────────────────────────────
    pub chart_border: Style,
    pub chart_title: Style,
    pub axis: Style,
    pub axis_label: Style,

    /// `false` restricts series colors to the 16 ANSI colors.
    pub true_color: bool,
}

impl Theme {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Dark-background terminal theme (default).
    pub fn dark() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            header_accent: Style::default().fg(Color::LightBlue),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            bold: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            label: Style::default().fg(Color::Gray),
            value: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Cyan),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),

            tab_active: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            cursor: Style::default().add_modifier(Modifier::REVERSED),
            checked: Style::default().fg(Color::Green),

            chart_border: Style::default().fg(Color::DarkGray),
            chart_title: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            axis: Style::default().fg(Color::Gray),
            axis_label: Style::default().fg(Color::DarkGray),

            true_color: true,
        }
    }

    /// Light-background terminal theme.
    ///
    /// Uses dark colours for text so that content remains legible against a
    /// white/light-grey terminal canvas.
    pub fn light() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            header_accent: Style::default().fg(Color::Magenta),
            separator: Style::default().fg(Color::Gray),

            text: Style::default().fg(Color::Black),
            dim: Style::default().fg(Color::Gray),
            bold: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            label: Style::default().fg(Color::DarkGray),
            value: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Blue),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),

            tab_active: Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            cursor: Style::default().add_modifier(Modifier::REVERSED),
            checked: Style::default().fg(Color::Green),

            chart_border: Style::default().fg(Color::Gray),
            chart_title: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            axis: Style::default().fg(Color::DarkGray),
            axis_label: Style::default().fg(Color::Gray),

            true_color: true,
        }
    }

    /// Classic terminal theme using only the basic ANSI palette.
    ///
    /// No bold modifiers, and series colors are snapped to the nearest ANSI
    /// color for minimal terminal emulators.
    pub fn classic() -> Self {
        Self {
            header: Style::default().fg(Color::Cyan),
            header_accent: Style::default().fg(Color::White),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            bold: Style::default().fg(Color::White),
            label: Style::default().fg(Color::Gray),
            value: Style::default().fg(Color::White),

            info: Style::default().fg(Color::Cyan),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            tab_active: Style::default().fg(Color::Black).bg(Color::White),
            tab_inactive: Style::default().fg(Color::Gray),
            cursor: Style::default().add_modifier(Modifier::REVERSED),
            checked: Style::default().fg(Color::Green),

            chart_border: Style::default().fg(Color::DarkGray),
            chart_title: Style::default().fg(Color::White),
            axis: Style::default().fg(Color::Gray),
            axis_label: Style::default().fg(Color::DarkGray),

            true_color: false,
        }
    }

    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            BackgroundType::Dark => Self::dark(),
        }
    }

    /// `light`, `dark` or `classic`; anything else is auto-detected.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            "classic" => Self::classic(),
            _ => Self::auto_detect(),
        }
    }

    // ── Style helpers ────────────────────────────────────────────────────────

    pub fn notice_style(&self, level: NoticeLevel) -> Style {
        match level {
            NoticeLevel::Info => self.info,
            NoticeLevel::Warning => self.warning,
            NoticeLevel::Error => self.error,
        }
    }

    /// Terminal color of a configured series color (`#rrggbb` or a name).
    ///
    /// Unknown colors fall back to the text color.
    pub fn series_color(&self, color: &str) -> Color {
        let Some((r, g, b)) = palette::rgb(color) else {
            return self.text.fg.unwrap_or(Color::Reset);
        };
        if self.true_color {
            Color::Rgb(r, g, b)
        } else {
            nearest_ansi(r, g, b)
        }
    }
}

/// Closest of the 16 ANSI colors by squared RGB distance.
fn nearest_ansi(r: u8, g: u8, b: u8) -> Color {
    const ANSI: [(Color, (i32, i32, i32)); 16] = [
        (Color::Black, (0, 0, 0)),
        (Color::Red, (205, 0, 0)),
        (Color::Green, (0, 205, 0)),
        (Color::Yellow, (205, 205, 0)),
        (Color::Blue, (0, 0, 238)),
        (Color::Magenta, (205, 0, 205)),
        (Color::Cyan, (0, 205, 205)),
        (Color::Gray, (229, 229, 229)),
        (Color::DarkGray, (127, 127, 127)),
        (Color::LightRed, (255, 0, 0)),
        (Color::LightGreen, (0, 255, 0)),
        (Color::LightYellow, (255, 255, 0)),
        (Color::LightBlue, (92, 92, 255)),
        (Color::LightMagenta, (255, 0, 255)),
        (Color::LightCyan, (0, 255, 255)),
        (Color::White, (255, 255, 255)),
    ];
    let (r, g, b) = (r as i32, g as i32, b as i32);
    ANSI.iter()
        .min_by_key(|(_, (ar, ag, ab))| (r - ar).pow(2) + (g - ag).pow(2) + (b - ab).pow(2))
        .map(|(c, _)| *c)
        .unwrap_or(Color::White)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Theme construction ───────────────────────────────────────────────────

    #[test]
    fn test_dark_theme() {
        let t = Theme::dark();
        assert_eq!(t.header.fg, Some(Color::Cyan));
        assert_eq!(t.success.fg, Some(Color::Green));
        assert_eq!(t.warning.fg, Some(Color::Yellow));
        assert_eq!(t.error.fg, Some(Color::Red));
        assert!(t.true_color);
    }

    #[test]
    fn test_light_theme() {
        let t = Theme::light();
        assert_eq!(t.header.fg, Some(Color::Blue));
        assert_eq!(t.text.fg, Some(Color::Black));
        assert_eq!(t.chart_title.fg, Some(Color::Black));
    }

    #[test]
    fn test_classic_theme_is_plain() {
        let t = Theme::classic();
        assert!(!t.bold.add_modifier.contains(Modifier::BOLD));
        assert!(!t.error.add_modifier.contains(Modifier::BOLD));
        assert!(!t.true_color);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Theme::from_name("dark").header.fg, Some(Color::Cyan));
        assert_eq!(Theme::from_name("light").header.fg, Some(Color::Blue));
        assert!(!Theme::from_name("classic").true_color);
        assert!(Theme::from_name("does-not-exist").header.fg.is_some());
    }

    // ── notice_style ─────────────────────────────────────────────────────────

    #[test]
    fn test_notice_style() {
        let t = Theme::dark();
        assert_eq!(t.notice_style(NoticeLevel::Info).fg, Some(Color::Cyan));
        assert_eq!(t.notice_style(NoticeLevel::Warning).fg, Some(Color::Yellow));
        assert_eq!(t.notice_style(NoticeLevel::Error).fg, Some(Color::Red));
    }

    // ── series_color ─────────────────────────────────────────────────────────

    #[test]
    fn test_series_color_true_color() {
        let t = Theme::dark();
        assert_eq!(t.series_color("#1f77b4"), Color::Rgb(0x1f, 0x77, 0xb4));
        assert_eq!(t.series_color("green"), Color::Rgb(0, 128, 0));
        assert_eq!(t.series_color("not-a-color"), Color::White);
    }

    #[test]
    fn test_series_color_classic_snaps_to_ansi() {
        let t = Theme::classic();
        assert_eq!(t.series_color("red"), Color::LightRed);
        assert_eq!(t.series_color("#000000"), Color::Black);
        assert_eq!(t.series_color("white"), Color::White);
    }
}
