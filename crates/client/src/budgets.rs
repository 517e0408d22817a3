use api_types::budget::{BudgetNew, MonthlyBudget};
use engine::BudgetMonth;

use crate::{ApiClient, error::Result};

/// Monthly budget targets. Writing a budget does not touch the aggregates.
#[derive(Debug, Clone)]
pub struct BudgetClient {
    api: ApiClient,
}

impl BudgetClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list_budgets(&self, user_id: i64) -> Result<Vec<MonthlyBudget>> {
        let request = self.api.authorized(
            self.api
                .http()
                .get(self.api.url("/api/budgets"))
                .query(&[("userId", user_id)]),
        )?;
        self.api.send_list(request).await
    }

    /// Posts a budget under the canonical month key.
    ///
    /// Every call adds a record; [`current_budget`](Self::current_budget)
    /// resolves duplicates to the latest one.
    pub async fn create_or_update_budget(
        &self,
        user_id: i64,
        month: BudgetMonth,
        available_amount: i64,
    ) -> Result<MonthlyBudget> {
        let available_amount = engine::validate_amount(available_amount)?;
        let payload = BudgetNew {
            user_id,
            budget_month: month.to_string(),
            available_amount,
        };
        let request = self
            .api
            .authorized(self.api.http().post(self.api.url("/api/budgets")).json(&payload))?;
        let created = self.api.send_record(request).await?;
        tracing::info!(user_id, month = %month, available_amount, "budget saved");
        Ok(created)
    }

    pub async fn current_budget(
        &self,
        user_id: i64,
        month: BudgetMonth,
    ) -> Result<Option<MonthlyBudget>> {
        let budgets = self.list_budgets(user_id).await?;
        Ok(engine::select_for_month(&budgets, month).cloned())
    }
}
