use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
};

use crate::{
    app::HistoryState,
    ui::{
        components::{
            card::card_block,
            money::{format_yen, styled_total},
        },
        theme::Theme,
    },
};

const UNDATED: &str = "----------";

pub fn render(frame: &mut Frame<'_>, area: Rect, history: &HistoryState, theme: &Theme) {
    let block = card_block("Expenses", true, theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner);

    if history.items.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "No expenses yet.",
                Style::default().fg(theme.text_muted),
            )),
            rows[0],
        );
    } else {
        let items: Vec<ListItem<'_>> = history
            .items
            .iter()
            .map(|expense| {
                let date = expense
                    .expense_date
                    .map(|date| date.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| UNDATED.to_string());
                ListItem::new(Line::from(vec![
                    Span::styled(date, Style::default().fg(theme.text_muted)),
                    Span::raw("  "),
                    Span::styled(
                        format!("{:>12}", format_yen(expense.amount)),
                        Style::default().fg(theme.text),
                    ),
                ]))
            })
            .collect();

        let list = List::new(items)
            .highlight_style(
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        let mut list_state = ListState::default().with_selected(Some(history.selected));
        frame.render_stateful_widget(list, rows[0], &mut list_state);
    }

    let total = Line::from(vec![
        Span::styled(
            format!("{} expenses, total ", history.items.len()),
            Style::default().fg(theme.text_muted),
        ),
        styled_total(history.total(), theme),
    ]);
    frame.render_widget(Paragraph::new(total), rows[1]);
}
