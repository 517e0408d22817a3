//! Monthly budget API endpoints

use api_types::budget::{BudgetNew, MonthlyBudget};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use engine::BudgetMonth;
use sea_orm::{ActiveValue, QueryOrder, entity::prelude::*};

use crate::{
    ServerError,
    server::{ListQuery, ServerState, ensure_owner},
    user,
};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "monthly_budgets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub budget_month: String,
    pub available_amount: i64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for MonthlyBudget {
    fn from(value: Model) -> Self {
        Self {
            id: Some(value.id),
            user_id: value.user_id,
            budget_month: value.budget_month,
            available_amount: value.available_amount,
            updated_at: Some(value.updated_at),
        }
    }
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<MonthlyBudget>>, ServerError> {
    ensure_owner(&user, query.user_id)?;

    let mut select = Entity::find().filter(Column::UserId.eq(query.user_id));
    if let Some(month) = query.budget_month {
        select = select.filter(Column::BudgetMonth.eq(month));
    }
    let budgets = select.order_by_asc(Column::Id).all(&state.db).await?;

    Ok(Json(budgets.into_iter().map(MonthlyBudget::from).collect()))
}

/// Stores a new budget record. The month key is kept as sent, but it must
/// parse as a budget month.
pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetNew>,
) -> Result<(StatusCode, Json<MonthlyBudget>), ServerError> {
    ensure_owner(&user, payload.user_id)?;
    payload.budget_month.parse::<BudgetMonth>()?;
    let available_amount = engine::validate_amount(payload.available_amount)?;

    let created = ActiveModel {
        id: ActiveValue::NotSet,
        user_id: ActiveValue::Set(payload.user_id),
        budget_month: ActiveValue::Set(payload.budget_month),
        available_amount: ActiveValue::Set(available_amount),
        updated_at: ActiveValue::Set(Utc::now()),
    }
    .insert(&state.db)
    .await?;
    tracing::debug!(
        user_id = created.user_id,
        budget_month = %created.budget_month,
        "budget stored"
    );

    Ok((StatusCode::CREATED, Json(created.into())))
}
