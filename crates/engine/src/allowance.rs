use chrono::{Datelike, NaiveDate};

use crate::BudgetMonth;

/// Amount that can still be spent per remaining day of the month.
///
/// Computes `round((budget_amount - spent_amount) / (last_day_of_month - today))`
/// with halves rounded up (`-2.5` becomes `-2`, `2.5` becomes `3`).
///
/// On the last day of the month the divisor is zero and the result is not
/// finite: `+inf`/`-inf` when there is money left/overspent, `NaN` when the
/// budget is exactly used up. Callers decide how to present that.
///
/// ```rust
/// use engine::compute_daily_allowance;
///
/// assert_eq!(compute_daily_allowance(1000, 200, 10, 30), 40.0);
/// assert!(!compute_daily_allowance(1000, 200, 30, 30).is_finite());
/// ```
#[must_use]
pub fn compute_daily_allowance(
    budget_amount: i64,
    spent_amount: i64,
    today: u32,
    last_day_of_month: u32,
) -> f64 {
    let remaining = (budget_amount - spent_amount) as f64;
    let days_left = f64::from(last_day_of_month) - f64::from(today);
    round_half_up(remaining / days_left)
}

/// Same as [`compute_daily_allowance`], deriving the day numbers from `today`.
#[must_use]
pub fn daily_allowance_on(budget_amount: i64, spent_amount: i64, today: NaiveDate) -> f64 {
    let last_day = BudgetMonth::from_date(today).last_day();
    compute_daily_allowance(budget_amount, spent_amount, today.day(), last_day)
}

/// Rounds to the nearest integer, halves towards `+inf`.
///
/// Compares the fractional part instead of computing `floor(x + 0.5)`, whose
/// addition rounds `0.49999999999999994` up to `1`.
fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    if value - floor >= 0.5 { floor + 1.0 } else { floor }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divides_remaining_budget_by_days_left() {
        assert_eq!(compute_daily_allowance(1000, 200, 10, 30), 40.0);
    }

    #[test]
    fn rounds_halves_up() {
        // 5 / 2 = 2.5
        assert_eq!(compute_daily_allowance(5, 0, 28, 30), 3.0);
        // -5 / 2 = -2.5
        assert_eq!(compute_daily_allowance(0, 5, 28, 30), -2.0);
        // 10 / 3 = 3.33
        assert_eq!(compute_daily_allowance(10, 0, 27, 30), 3.0);
    }

    #[test]
    fn values_just_below_a_half_round_down() {
        let below_half = 0.499_999_999_999_999_94_f64;
        assert!(below_half < 0.5);
        assert_eq!(round_half_up(below_half), 0.0);
        assert_eq!(round_half_up(-0.5), 0.0);
        assert_eq!(round_half_up(-1.5), -1.0);
        assert_eq!(round_half_up(f64::INFINITY), f64::INFINITY);
        assert!(round_half_up(f64::NAN).is_nan());
    }

    #[test]
    fn overspent_budget_is_negative() {
        assert_eq!(compute_daily_allowance(1000, 1600, 20, 30), -60.0);
    }

    #[test]
    fn last_day_of_month_divides_by_zero() {
        let left = compute_daily_allowance(1000, 200, 31, 31);
        assert!(left.is_infinite() && left.is_sign_positive());

        let overspent = compute_daily_allowance(1000, 1200, 31, 31);
        assert!(overspent.is_infinite() && overspent.is_sign_negative());

        assert!(compute_daily_allowance(1000, 1000, 31, 31).is_nan());
    }

    #[test]
    fn allowance_on_date_uses_month_length() {
        let feb = NaiveDate::from_ymd_opt(2024, 2, 19).unwrap();
        // 29 - 19 = 10 days left
        assert_eq!(daily_allowance_on(3000, 1000, feb), 200.0);

        let last = NaiveDate::from_ymd_opt(2025, 2, 28).unwrap();
        assert!(!daily_allowance_on(3000, 1000, last).is_finite());
    }
}
