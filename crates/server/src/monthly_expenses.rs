//! Monthly expense aggregate API endpoints
//!
//! The server stores whatever total the client computed; it never derives
//! aggregates itself.

use api_types::monthly_expense::{MonthlyExpense, MonthlyExpenseUpsert};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
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
#[sea_orm(table_name = "monthly_expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub budget_month: String,
    pub amount: i64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for MonthlyExpense {
    fn from(value: Model) -> Self {
        Self {
            id: Some(value.id),
            user_id: value.user_id,
            budget_month: value.budget_month,
            amount: value.amount,
            updated_at: Some(value.updated_at),
        }
    }
}

fn validate(payload: &MonthlyExpenseUpsert) -> Result<i64, ServerError> {
    payload.budget_month.parse::<BudgetMonth>()?;
    Ok(engine::validate_amount(payload.amount)?)
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<MonthlyExpense>>, ServerError> {
    ensure_owner(&user, query.user_id)?;

    let mut select = Entity::find().filter(Column::UserId.eq(query.user_id));
    if let Some(month) = query.budget_month {
        select = select.filter(Column::BudgetMonth.eq(month));
    }
    let records = select.order_by_asc(Column::Id).all(&state.db).await?;

    Ok(Json(records.into_iter().map(MonthlyExpense::from).collect()))
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<MonthlyExpenseUpsert>,
) -> Result<(StatusCode, Json<MonthlyExpense>), ServerError> {
    ensure_owner(&user, payload.user_id)?;
    let amount = validate(&payload)?;

    let created = ActiveModel {
        id: ActiveValue::NotSet,
        user_id: ActiveValue::Set(payload.user_id),
        budget_month: ActiveValue::Set(payload.budget_month),
        amount: ActiveValue::Set(amount),
        updated_at: ActiveValue::Set(Utc::now()),
    }
    .insert(&state.db)
    .await?;
    tracing::debug!(
        user_id = created.user_id,
        budget_month = %created.budget_month,
        amount,
        "monthly expense created"
    );

    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<MonthlyExpenseUpsert>,
) -> Result<Json<MonthlyExpense>, ServerError> {
    ensure_owner(&user, payload.user_id)?;
    let amount = validate(&payload)?;

    let record = Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("monthly expense {id}")))?;
    ensure_owner(&user, record.user_id)?;

    let mut active: ActiveModel = record.into();
    active.budget_month = ActiveValue::Set(payload.budget_month);
    active.amount = ActiveValue::Set(amount);
    active.updated_at = ActiveValue::Set(Utc::now());
    let updated = active.update(&state.db).await?;
    tracing::debug!(user_id = updated.user_id, id, amount, "monthly expense updated");

    Ok(Json(updated.into()))
}
