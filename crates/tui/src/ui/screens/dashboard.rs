//! Month overview cards shown above every tab.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Span,
};

use crate::{
    app::Dashboard,
    ui::{
        components::{
            card::FigureCard,
            money::{allowance_label, format_yen, styled_total},
        },
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, dashboard: &Dashboard, theme: &Theme) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(area);

    let budget = match &dashboard.budget {
        Some(budget) => styled_total(budget.available_amount, theme),
        None => Span::styled("not set", Style::default().fg(theme.text_muted)),
    };
    FigureCard::new("Budget", budget)
        .caption(dashboard.month().to_string())
        .render(frame, columns[0], theme);

    let remaining = dashboard
        .remaining()
        .map(|remaining| format!("{} left", format_yen(remaining)))
        .unwrap_or_default();
    FigureCard::new("Spent", styled_total(dashboard.spent_amount(), theme))
        .caption(remaining)
        .render(frame, columns[1], theme);

    let allowance = dashboard.allowance();
    let color = match allowance {
        Some(value) if value.is_finite() && value < 0.0 => theme.negative,
        Some(value) if value.is_finite() => theme.positive,
        _ => theme.text_muted,
    };
    FigureCard::new(
        "Daily allowance",
        Span::styled(
            allowance_label(allowance),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
    )
    .caption(format!("from {}", dashboard.today.format("%Y-%m-%d")))
    .render(frame, columns[2], theme);
}
