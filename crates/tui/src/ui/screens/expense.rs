use ratatui::{Frame, layout::Rect, style::Style, text::Line};

use crate::{
    app::FormState,
    ui::{screens::form, theme::Theme},
};

pub fn render(frame: &mut Frame<'_>, area: Rect, form: &FormState, theme: &Theme) {
    let note = Line::styled(
        "Date is YYYY-MM-DD. Leave it empty to record an undated expense.",
        Style::default().fg(theme.text_muted),
    );
    form::render(
        frame,
        area,
        "Record expense",
        ["Date", "Amount"],
        form,
        vec![note],
        theme,
    );
}
