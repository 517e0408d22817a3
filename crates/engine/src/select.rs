//! Lookup of the record that represents a given budget month.
//!
//! The API does not enforce one budget or aggregate per (user, month), so
//! callers must pick one deterministically out of a list.

use api_types::{budget::MonthlyBudget, monthly_expense::MonthlyExpense};
use chrono::{DateTime, Utc};

use crate::BudgetMonth;

/// A record keyed by budget month.
pub trait MonthRecord {
    fn budget_month(&self) -> &str;

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        None
    }
}

impl MonthRecord for MonthlyBudget {
    fn budget_month(&self) -> &str {
        &self.budget_month
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl MonthRecord for MonthlyExpense {
    fn budget_month(&self) -> &str {
        &self.budget_month
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

/// First record whose month key is exactly `key`.
///
/// Keys are compared as plain strings: `"2025-3"` does not match `"2025-03"`.
pub fn select_current_month_record<'a, T: MonthRecord>(
    records: &'a [T],
    key: &str,
) -> Option<&'a T> {
    records.iter().find(|record| record.budget_month() == key)
}

/// Record for `month`, comparing normalized keys.
///
/// Records with unparseable keys are ignored. Among several matches the most
/// recently updated wins; without timestamps the first match is returned.
pub fn select_for_month<T: MonthRecord>(records: &[T], month: BudgetMonth) -> Option<&T> {
    records
        .iter()
        .filter(|record| {
            record
                .budget_month()
                .parse::<BudgetMonth>()
                .is_ok_and(|parsed| parsed == month)
        })
        .fold(None, |best: Option<&T>, record| match best {
            Some(best) if record.updated_at() <= best.updated_at() => Some(best),
            _ => Some(record),
        })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn budget(month: &str, amount: i64) -> MonthlyBudget {
        MonthlyBudget {
            id: None,
            user_id: 1,
            budget_month: month.to_string(),
            available_amount: amount,
            updated_at: None,
        }
    }

    #[test]
    fn exact_match_returns_first() {
        let records = vec![budget("2025-02", 1), budget("2025-03", 2), budget("2025-03", 3)];
        let found = select_current_month_record(&records, "2025-03").unwrap();
        assert_eq!(found.available_amount, 2);
    }

    #[test]
    fn exact_match_does_not_normalize() {
        let records = vec![budget("2025-3", 1)];
        assert!(select_current_month_record(&records, "2025-03").is_none());
    }

    #[test]
    fn exact_match_on_empty_list() {
        let records: Vec<MonthlyBudget> = Vec::new();
        assert!(select_current_month_record(&records, "2025-03").is_none());
    }

    #[test]
    fn normalized_match_accepts_legacy_keys() {
        let records = vec![budget("2025-2", 1), budget("2025-3", 2), budget("garbage", 3)];
        let month = BudgetMonth::new(2025, 3).unwrap();
        assert_eq!(select_for_month(&records, month).unwrap().available_amount, 2);
    }

    #[test]
    fn normalized_match_prefers_latest_update() {
        let mut older = budget("2025-03", 1);
        older.updated_at = Some(Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap());
        let mut newer = budget("2025-3", 2);
        newer.updated_at = Some(Utc.with_ymd_and_hms(2025, 3, 2, 9, 0, 0).unwrap());
        let untimed = budget("2025-03", 3);

        let records = vec![older, newer, untimed];
        let month = BudgetMonth::new(2025, 3).unwrap();
        assert_eq!(select_for_month(&records, month).unwrap().available_amount, 2);
    }

    #[test]
    fn normalized_match_without_timestamps_keeps_first() {
        let records = vec![budget("2025-03", 1), budget("2025-03", 2)];
        let month = BudgetMonth::new(2025, 3).unwrap();
        assert_eq!(select_for_month(&records, month).unwrap().available_amount, 1);
    }
}
