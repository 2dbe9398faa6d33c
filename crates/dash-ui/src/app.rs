//! Main application state and TUI event loop.
//!
//! [`App`] owns the theme, the dashboard session and the current views. Every
//! key press mutates the session and recomputes the views synchronously; the
//! table cache keeps that cheap.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};

use dash_core::catalog::CanonicalVariable;
use dash_runtime::session::DashboardSession;
use dash_runtime::views::{self, ComparisonView, IndividualView};

use crate::comparison_view;
use crate::components::header::Header;
use crate::components::notices::NoticeList;
use crate::components::picker::{Picker, PickerItem};
use crate::individual_view;
use crate::themes::Theme;

/// Width of the picker column.
const PICKER_WIDTH: u16 = 34;

pub const KEY_HELP: &str =
    "tab aba  ←/→ arquivo  ↑/↓ seção  [/] mover  espaço marcar  c cor  z normalizar  r recarregar  q sair";

// ── Tab ───────────────────────────────────────────────────────────────────────

/// Which tab the TUI is currently rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Individual,
    Comparison,
}

impl Tab {
    pub const TITLES: [&'static str; 2] = ["Análise Individual", "Comparação entre Experimentos"];

    pub fn from_name(name: &str) -> Self {
        match name {
            "comparison" => Tab::Comparison,
            _ => Tab::Individual,
        }
    }

    fn index(self) -> usize {
        match self {
            Tab::Individual => 0,
            Tab::Comparison => 1,
        }
    }

    fn toggled(self) -> Self {
        match self {
            Tab::Individual => Tab::Comparison,
            Tab::Comparison => Tab::Individual,
        }
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the dashboard TUI.
pub struct App {
    pub theme: Theme,
    pub tab: Tab,
    pub session: DashboardSession,
    /// Section shown in each tab.
    pub page: [usize; 2],
    /// Picker cursor in each tab.
    pub cursor: [usize; 2],
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
    pub individual: IndividualView,
    pub comparison: ComparisonView,
}

impl App {
    pub fn new(theme_name: &str, tab: Tab, session: DashboardSession) -> Self {
        let mut app = Self {
            theme: Theme::from_name(theme_name),
            tab,
            session,
            page: [0, 0],
            cursor: [0, 0],
            should_quit: false,
            individual: IndividualView::default(),
            comparison: ComparisonView::default(),
        };
        app.refresh();
        app
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the dashboard until `q`, `Q` or `Ctrl+C`.
    ///
    /// Uses `crossterm::event::poll` with a 250 ms timeout so the loop stays
    /// responsive without busy-waiting.
    pub async fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            if let Err(e) = terminal.draw(|frame| self.render(frame)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => self.handle_key(key),
                    Ok(_) => {}
                    Err(e) => break Err(e),
                },
                Ok(false) => {}
                Err(e) => break Err(e),
            }

            if self.should_quit {
                break Ok(());
            }
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    // ── State ─────────────────────────────────────────────────────────────────

    /// Recompute both views from the session.
    pub fn refresh(&mut self) {
        self.individual = views::individual_view(&mut self.session);
        self.comparison = views::comparison_view(&mut self.session);
        self.clamp();
    }

    fn clamp(&mut self) {
        let pages = [
            individual_view::page_count(&self.individual),
            comparison_view::page_count(&self.comparison),
        ];
        let items = [self.overlay_options().len(), self.session.files().len()];
        for i in 0..2 {
            self.page[i] = self.page[i].min(pages[i].saturating_sub(1));
            self.cursor[i] = self.cursor[i].min(items[i].saturating_sub(1));
        }
    }

    fn overlay_options(&self) -> Vec<CanonicalVariable> {
        self.individual
            .overlay
            .as_ref()
            .map(|o| o.available.clone())
            .unwrap_or_default()
    }

    fn page_count(&self) -> usize {
        match self.tab {
            Tab::Individual => individual_view::page_count(&self.individual),
            Tab::Comparison => comparison_view::page_count(&self.comparison),
        }
    }

    /// Rows of the picker in the current tab.
    pub fn picker_items(&self) -> Vec<PickerItem> {
        match self.tab {
            Tab::Individual => self
                .overlay_options()
                .into_iter()
                .map(|v| PickerItem {
                    label: v.display_name().to_string(),
                    checked: self.session.overlay().contains(&v),
                    color: self.session.overlay_color(v),
                })
                .collect(),
            Tab::Comparison => self
                .session
                .files()
                .iter()
                .map(|f| PickerItem {
                    label: f.legend().to_string(),
                    checked: self.session.is_compared(&f.name),
                    color: self.session.experiment_color(&f.name),
                })
                .collect(),
        }
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    /// Apply one key press.
    pub fn handle_key(&mut self, key: KeyEvent) {
        let tab = self.tab.index();
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::BackTab => self.tab = self.tab.toggled(),
            KeyCode::Left => {
                self.session.cycle_selected(-1);
                self.refresh();
            }
            KeyCode::Right => {
                self.session.cycle_selected(1);
                self.refresh();
            }
            KeyCode::Up | KeyCode::PageUp => {
                let pages = self.page_count();
                if pages > 0 {
                    self.page[tab] = (self.page[tab] + pages - 1) % pages;
                }
            }
            KeyCode::Down | KeyCode::PageDown => {
                let pages = self.page_count();
                if pages > 0 {
                    self.page[tab] = (self.page[tab] + 1) % pages;
                }
            }
            KeyCode::Char('[') => self.cursor[tab] = self.cursor[tab].saturating_sub(1),
            KeyCode::Char(']') => {
                let len = self.picker_items().len();
                if self.cursor[tab] + 1 < len {
                    self.cursor[tab] += 1;
                }
            }
            KeyCode::Char(' ') => {
                self.toggle_at_cursor();
                self.refresh();
            }
            KeyCode::Char('c') => {
                self.cycle_color_at_cursor();
                self.refresh();
            }
            KeyCode::Char('z') => {
                self.session.toggle_normalize();
                self.refresh();
            }
            KeyCode::Char('r') => {
                self.session.clear_cache();
                tracing::info!("table cache cleared; reloading views");
                self.refresh();
            }
            _ => {}
        }
    }

    fn toggle_at_cursor(&mut self) {
        let cursor = self.cursor[self.tab.index()];
        match self.tab {
            Tab::Individual => {
                if let Some(v) = self.overlay_options().get(cursor).copied() {
                    self.session.toggle_overlay(v);
                }
            }
            Tab::Comparison => {
                if let Some(name) = self.session.files().get(cursor).map(|f| f.name.clone()) {
                    self.session.toggle_comparison(&name);
                }
            }
        }
    }

    fn cycle_color_at_cursor(&mut self) {
        let cursor = self.cursor[self.tab.index()];
        match self.tab {
            Tab::Individual => {
                if let Some(v) = self.overlay_options().get(cursor).copied() {
                    self.session.cycle_overlay_color(v);
                }
            }
            Tab::Comparison => {
                if let Some(name) = self.session.files().get(cursor).map(|f| f.name.clone()) {
                    self.session.cycle_experiment_color(&name);
                }
            }
        }
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Render the current application state into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let notices = match self.tab {
            Tab::Individual => &self.individual.notices,
            Tab::Comparison => &self.comparison.notices,
        };

        let [header_area, tabs_area, body, notice_area, help_area] = Layout::vertical([
            Constraint::Length(4),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(notices.len() as u16),
            Constraint::Length(1),
        ])
        .areas(area);

        let header = Header::new(
            self.individual.file.as_deref(),
            self.session.files().len(),
            self.individual.axis_mode,
            &self.theme,
        );
        frame.render_widget(Paragraph::new(Text::from(header.to_lines())), header_area);

        let tabs = Tabs::new(Tab::TITLES)
            .select(self.tab.index())
            .style(self.theme.tab_inactive)
            .highlight_style(self.theme.tab_active);
        frame.render_widget(tabs, tabs_area);

        self.render_body(frame, body);

        let notice_lines = NoticeList::new(notices, &self.theme).to_lines(notice_area.width as usize);
        frame.render_widget(Paragraph::new(Text::from(notice_lines)), notice_area);

        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(KEY_HELP, self.theme.dim))),
            help_area,
        );
    }

    fn render_body(&self, frame: &mut Frame, area: Rect) {
        let [picker_area, main_area] =
            Layout::horizontal([Constraint::Length(PICKER_WIDTH), Constraint::Min(0)]).areas(area);

        let picker_title = match self.tab {
            Tab::Individual => " Variáveis para sobrepor ",
            Tab::Comparison => " Experimentos ",
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.separator)
            .title(Span::styled(picker_title, self.theme.label));
        let inner = block.inner(picker_area);
        let items = self.picker_items();
        let lines = Picker::new(&items, self.cursor[self.tab.index()], &self.theme)
            .to_lines(inner.width as usize);
        frame.render_widget(Paragraph::new(Text::from(lines)).block(block), picker_area);

        match self.tab {
            Tab::Individual => individual_view::render_individual_view(
                frame,
                main_area,
                &self.individual,
                self.page[0],
                &self.theme,
            ),
            Tab::Comparison => comparison_view::render_comparison_view(
                frame,
                main_area,
                &self.comparison,
                self.page[1],
                &self.theme,
            ),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
