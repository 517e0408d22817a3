//! Input parsing for the expense and budget forms.

use chrono::NaiveDate;
use engine::BudgetMonth;

/// Parses a yen amount. Digit group separators and a leading `¥` are allowed.
pub fn parse_amount(input: &str) -> Result<i64, String> {
    let cleaned: String = input
        .trim()
        .trim_start_matches('¥')
        .chars()
        .filter(|ch| *ch != ',' && *ch != '_')
        .collect();
    if cleaned.is_empty() {
        return Err("Enter an amount.".to_string());
    }
    let amount: i64 = cleaned
        .parse()
        .map_err(|_| format!("Not a whole number: {}", input.trim()))?;
    engine::validate_amount(amount).map_err(|_| "Amount must be 0 or more.".to_string())
}

/// Parses an expense date. An empty field means no date.
pub fn parse_date(input: &str) -> Result<Option<NaiveDate>, String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| format!("Use YYYY-MM-DD for the date, got {input}"))
}

pub fn parse_month(input: &str) -> Result<BudgetMonth, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("Enter a month (YYYY-MM).".to_string());
    }
    input
        .parse()
        .map_err(|_| format!("Use YYYY-MM for the month, got {input}"))
}
