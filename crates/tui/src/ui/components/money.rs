//! Yen amounts.

use ratatui::{
    style::{Modifier, Style},
    text::Span,
};

use crate::ui::theme::Theme;

/// Formats an amount as whole yen with digit grouping, e.g. `¥12,345`.
#[must_use]
pub fn format_yen(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("{sign}¥{grouped}")
}

/// Label for a per-day allowance. Non-finite values (last day of the month)
/// have no meaningful amount.
#[must_use]
pub fn allowance_label(allowance: Option<f64>) -> String {
    match allowance {
        None => "no budget".to_string(),
        Some(value) if !value.is_finite() => "n/a (last day)".to_string(),
        Some(value) => format!("{}/day", format_yen(value as i64)),
    }
}

/// Amount in bold, red when negative.
#[must_use]
pub fn styled_total(amount: i64, theme: &Theme) -> Span<'static> {
    let color = if amount < 0 {
        theme.negative
    } else {
        theme.text
    };
    Span::styled(
        format_yen(amount),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(format_yen(0), "¥0");
        assert_eq!(format_yen(999), "¥999");
        assert_eq!(format_yen(1000), "¥1,000");
        assert_eq!(format_yen(1234567), "¥1,234,567");
        assert_eq!(format_yen(-45000), "-¥45,000");
    }

    #[test]
    fn allowance_labels() {
        assert_eq!(allowance_label(None), "no budget");
        assert_eq!(allowance_label(Some(40.0)), "¥40/day");
        assert_eq!(allowance_label(Some(-1250.0)), "-¥1,250/day");
        assert_eq!(allowance_label(Some(f64::INFINITY)), "n/a (last day)");
        assert_eq!(allowance_label(Some(f64::NAN)), "n/a (last day)");
    }
}
