//! Users, registration and login.

use api_types::user::{Credentials, LoginResponse};
use axum::{Json, extract::State, http::StatusCode};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub user_name: String,
    pub password: String,
    pub token: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn validate(credentials: &Credentials) -> Result<(), ServerError> {
    if credentials.user_name.trim().is_empty() || credentials.password.is_empty() {
        return Err(ServerError::BadRequest(
            "user name and password are required".to_string(),
        ));
    }
    Ok(())
}

pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<Credentials>,
) -> Result<StatusCode, ServerError> {
    validate(&payload)?;

    let existing = Entity::find()
        .filter(Column::UserName.eq(payload.user_name.as_str()))
        .one(&state.db)
        .await?;
    if existing.is_some() {
        return Err(ServerError::Conflict("user name already taken".to_string()));
    }

    let user = ActiveModel {
        id: ActiveValue::NotSet,
        user_name: ActiveValue::Set(payload.user_name),
        password: ActiveValue::Set(payload.password),
        token: ActiveValue::Set(None),
    }
    .insert(&state.db)
    .await?;
    tracing::info!(user_id = user.id, user_name = %user.user_name, "user registered");

    Ok(StatusCode::CREATED)
}

/// Checks the credentials and issues a fresh token, replacing the previous one.
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<Credentials>,
) -> Result<Json<LoginResponse>, ServerError> {
    validate(&payload)?;

    let user = Entity::find()
        .filter(Column::UserName.eq(payload.user_name.as_str()))
        .one(&state.db)
        .await?
        .filter(|user| user.password == payload.password)
        .ok_or_else(|| ServerError::Unauthorized("invalid user name or password".to_string()))?;

    let token = Uuid::new_v4().to_string();
    let mut active: ActiveModel = user.into();
    active.token = ActiveValue::Set(Some(token.clone()));
    let user = active.update(&state.db).await?;
    tracing::info!(user_id = user.id, "user logged in");

    Ok(Json(LoginResponse {
        token,
        id: user.id,
        user_name: user.user_name,
    }))
}
