use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::ui::theme::Theme;

/// Rounded, titled block used for panels.
pub fn card_block<'a>(title: &'a str, focused: bool, theme: &Theme) -> Block<'a> {
    let border = if focused {
        theme.border_focused
    } else {
        theme.border
    };
    Block::default()
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(theme.accent),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(theme.surface))
}

/// A small card with one emphasized figure and an optional caption.
pub struct FigureCard<'a> {
    title: &'a str,
    value: Span<'static>,
    caption: Option<String>,
}

impl<'a> FigureCard<'a> {
    pub fn new(title: &'a str, value: Span<'static>) -> Self {
        Self {
            title,
            value,
            caption: None,
        }
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn render(self, frame: &mut Frame<'_>, area: Rect, theme: &Theme) {
        let block = card_block(self.title, false, theme);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut lines = vec![Line::from(self.value)];
        if let Some(caption) = self.caption {
            lines.push(Line::from(Span::styled(
                caption,
                Style::default().fg(theme.text_muted),
            )));
        }
        frame.render_widget(Paragraph::new(lines), inner);
    }
}
