use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
};

use crate::{
    app::AppState,
    ui::{components::money::styled_total, screens::form, theme::Theme},
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let month = state.dashboard.month();
    let registered = match &state.dashboard.budget {
        Some(budget) => styled_total(budget.available_amount, theme),
        None => Span::styled("none", Style::default().fg(theme.text_muted)),
    };
    let extra = vec![
        Line::from(vec![
            Span::styled(
                format!("Registered for {month}: "),
                Style::default().fg(theme.text_muted),
            ),
            registered,
        ]),
        Line::styled(
            "Saving again replaces the amount used for that month.",
            Style::default().fg(theme.text_muted),
        ),
    ];
    form::render(
        frame,
        area,
        "Monthly budget",
        ["Month", "Amount"],
        &state.budget,
        extra,
        theme,
    );
}
