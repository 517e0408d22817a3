//! Daily expense API endpoints

use api_types::expense::{DailyExpense, ExpenseNew};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use sea_orm::{ActiveValue, QueryOrder, entity::prelude::*};

use crate::{
    ServerError,
    server::{ListQuery, ServerState, ensure_owner},
    user,
};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "daily_expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub expense_id: i64,
    pub user_id: i64,
    pub expense_date: Option<NaiveDate>,
    pub amount: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for DailyExpense {
    fn from(value: Model) -> Self {
        Self {
            expense_id: value.expense_id,
            user_id: value.user_id,
            expense_date: value.expense_date,
            amount: value.amount,
        }
    }
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<DailyExpense>>, ServerError> {
    ensure_owner(&user, query.user_id)?;

    let expenses = Entity::find()
        .filter(Column::UserId.eq(query.user_id))
        .order_by_asc(Column::ExpenseId)
        .all(&state.db)
        .await?;

    Ok(Json(expenses.into_iter().map(DailyExpense::from).collect()))
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<DailyExpense>), ServerError> {
    ensure_owner(&user, payload.user_id)?;
    let amount = engine::validate_amount(payload.amount)?;

    let created = ActiveModel {
        expense_id: ActiveValue::NotSet,
        user_id: ActiveValue::Set(payload.user_id),
        expense_date: ActiveValue::Set(payload.expense_date),
        amount: ActiveValue::Set(amount),
    }
    .insert(&state.db)
    .await?;
    tracing::debug!(
        user_id = created.user_id,
        expense_id = created.expense_id,
        "expense stored"
    );

    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn remove(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    let expense = Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("expense {id}")))?;
    ensure_owner(&user, expense.user_id)?;

    Entity::delete_by_id(id).exec(&state.db).await?;
    tracing::debug!(user_id = user.id, expense_id = id, "expense deleted");

    Ok(StatusCode::NO_CONTENT)
}
