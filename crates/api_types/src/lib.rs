use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Error body returned by the API on non-2xx responses.
///
/// Older backends used `error` as the field name, so both are accepted.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(alias = "error")]
    pub message: String,
}

pub mod user {
    use super::*;

    /// Body for both `/api/users/register` and `/api/users/login`.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct Credentials {
        #[serde(rename = "userName")]
        pub user_name: String,
        pub password: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct LoginResponse {
        pub token: String,
        pub id: i64,
        #[serde(rename = "userName")]
        pub user_name: String,
    }
}

pub mod expense {
    use super::*;

    /// A single dated expense of the ledger.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct DailyExpense {
        pub expense_id: i64,
        pub user_id: i64,
        /// Calendar date (`YYYY-MM-DD`), may be null.
        #[serde(default)]
        pub expense_date: Option<NaiveDate>,
        pub amount: i64,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub user_id: i64,
        pub expense_date: Option<NaiveDate>,
        pub amount: i64,
    }
}

pub mod budget {
    use super::*;

    /// Monthly spending target.
    ///
    /// The API does not enforce one record per (user, month).
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct MonthlyBudget {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub id: Option<i64>,
        pub user_id: i64,
        pub budget_month: String,
        pub available_amount: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub updated_at: Option<DateTime<Utc>>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct BudgetNew {
        pub user_id: i64,
        pub budget_month: String,
        pub available_amount: i64,
    }
}

pub mod monthly_expense {
    use super::*;

    /// Aggregate of a user's expenses in one budget month.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct MonthlyExpense {
        #[serde(
            default,
            alias = "monthly_expense_id",
            alias = "monthlyExpenseId",
            skip_serializing_if = "Option::is_none"
        )]
        pub id: Option<i64>,
        pub user_id: i64,
        pub budget_month: String,
        pub amount: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub updated_at: Option<DateTime<Utc>>,
    }

    /// Body for both create (`POST`) and update (`PUT`).
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct MonthlyExpenseUpsert {
        pub user_id: i64,
        pub budget_month: String,
        pub amount: i64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monthly_expense_accepts_legacy_id_names() {
        let a: monthly_expense::MonthlyExpense = serde_json::from_str(
            r#"{"monthly_expense_id": 7, "user_id": 1, "budget_month": "2025-01", "amount": 10}"#,
        )
        .unwrap();
        let b: monthly_expense::MonthlyExpense = serde_json::from_str(
            r#"{"monthlyExpenseId": 8, "user_id": 1, "budget_month": "2025-01", "amount": 10}"#,
        )
        .unwrap();

        assert_eq!(a.id, Some(7));
        assert_eq!(b.id, Some(8));
    }

    #[test]
    fn credentials_use_camel_case_user_name() {
        let body = serde_json::to_value(user::Credentials {
            user_name: "hanako".to_string(),
            password: "secret".to_string(),
        })
        .unwrap();

        assert_eq!(body["userName"], "hanako");
        assert!(body.get("user_name").is_none());
    }

    #[test]
    fn expense_date_may_be_null_or_missing() {
        let null: expense::DailyExpense = serde_json::from_str(
            r#"{"expense_id": 1, "user_id": 1, "expense_date": null, "amount": 300}"#,
        )
        .unwrap();
        let missing: expense::DailyExpense =
            serde_json::from_str(r#"{"expense_id": 2, "user_id": 1, "amount": 300}"#).unwrap();
        let dated: expense::DailyExpense = serde_json::from_str(
            r#"{"expense_id": 3, "user_id": 1, "expense_date": "2025-01-05", "amount": 300}"#,
        )
        .unwrap();

        assert_eq!(null.expense_date, None);
        assert_eq!(missing.expense_date, None);
        assert_eq!(dated.expense_date, NaiveDate::from_ymd_opt(2025, 1, 5));
    }

    #[test]
    fn error_body_accepts_error_field() {
        let body: ErrorBody = serde_json::from_str(r#"{"error": "nope"}"#).unwrap();
        assert_eq!(body.message, "nope");
    }
}
