use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{
    app::{FormField, FormState},
    ui::{components::card::card_block, theme::Theme},
};

/// Renders a two-field form inside a card. `extra` lines go below the inputs.
pub(super) fn render(
    frame: &mut Frame<'_>,
    area: Rect,
    title: &str,
    labels: [&str; 2],
    form: &FormState,
    extra: Vec<Line<'static>>,
    theme: &Theme,
) {
    let block = card_block(title, true, theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![
        Line::raw(""),
        input_line(labels[0], &form.first, form.focus == FormField::First, theme),
        input_line(labels[1], &form.amount, form.focus == FormField::Amount, theme),
        Line::raw(""),
    ];
    if let Some(message) = &form.message {
        lines.push(Line::from(Span::styled(
            message.clone(),
            Style::default().fg(theme.error),
        )));
    }
    lines.extend(extra);

    frame.render_widget(Paragraph::new(lines), inner);
}

fn input_line(label: &str, value: &str, focused: bool, theme: &Theme) -> Line<'static> {
    let (marker, style) = if focused {
        ("> ", Style::default().fg(theme.accent))
    } else {
        ("  ", Style::default().fg(theme.text))
    };
    let cursor = if focused { "│" } else { "" };
    Line::from(vec![
        Span::styled(marker, style),
        Span::styled(format!("{label:<8}"), Style::default().fg(theme.text_muted)),
        Span::styled(format!("{value}{cursor}"), style),
    ])
}
