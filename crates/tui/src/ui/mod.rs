pub mod components;
pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::{AppState, Screen, Section};

pub use terminal::{AppTerminal as Terminal, restore_terminal, setup_terminal};
pub use theme::Theme;

pub fn render(frame: &mut Frame<'_>, state: &AppState) {
    let area = frame.area();
    match state.screen {
        Screen::Login => screens::login::render(frame, area, state),
        Screen::Home => render_shell(frame, area, state),
    }
    components::toast::render(frame, area, state.toast.as_ref());
}

fn render_shell(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Info bar
            Constraint::Length(4), // Dashboard cards
            Constraint::Length(2), // Tab bar
            Constraint::Min(0),    // Section content
            Constraint::Length(1), // Bottom bar
        ])
        .split(area);

    render_info_bar(frame, layout[0], state, &theme);
    screens::dashboard::render(frame, layout[1], &state.dashboard, &theme);
    components::tabs::render_tabs(frame, layout[2], state.section, &theme);

    match state.section {
        Section::History => screens::history::render(frame, layout[3], &state.history, &theme),
        Section::Expense => screens::expense::render(frame, layout[3], &state.expense, &theme),
        Section::Budgets => screens::budgets::render(frame, layout[3], state, &theme),
    }

    render_bottom_bar(frame, layout[4], state.section, &theme);
}

fn render_info_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let user = state
        .user
        .as_ref()
        .map(|user| format!("{} (#{})", user.user_name, user.id))
        .unwrap_or_else(|| "-".to_string());

    let line = Line::from(vec![
        Span::styled("User", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {user}  ")),
        Span::styled("Month", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {}  ", state.dashboard.month())),
        Span::styled("Server", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {}", state.base_url)),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn render_bottom_bar(frame: &mut Frame<'_>, area: Rect, section: Section, theme: &Theme) {
    let separator = || Span::styled("  │  ", Style::default().fg(theme.border));
    let key = |label: &'static str| Span::styled(label, Style::default().fg(theme.accent));

    let mut parts = components::tabs::tab_shortcuts(theme);
    parts.push(separator());
    parts.extend(section_hints(section, theme));
    parts.push(separator());
    parts.extend([
        key("F5"),
        Span::raw(" refresh  "),
        key("Ctrl+L"),
        Span::raw(" logout  "),
        key("Ctrl+C"),
        Span::raw(" quit"),
    ]);

    frame.render_widget(Paragraph::new(Line::from(parts)), area);
}

fn section_hints(section: Section, theme: &Theme) -> Vec<Span<'static>> {
    let key = |label: &'static str| Span::styled(label, Style::default().fg(theme.accent));
    match section {
        Section::History => vec![
            key("↑/↓"),
            Span::raw(" select  "),
            key("Del"),
            Span::raw(" delete  "),
            key("q"),
            Span::raw(" quit"),
        ],
        Section::Expense | Section::Budgets => vec![
            key("Tab"),
            Span::raw(" next field  "),
            key("Enter"),
            Span::raw(" save  "),
            key("Esc"),
            Span::raw(" dismiss"),
        ],
    }
}
