use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Deserialize;

use std::net::SocketAddr;

use crate::{ServerError, budgets, expenses, monthly_expenses, user};

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
}

/// Query string shared by the list endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct ListQuery {
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "budgetMonth")]
    pub budget_month: Option<String>,
}

/// Rejects requests acting on behalf of another user.
pub(crate) fn ensure_owner(user: &user::Model, user_id: i64) -> Result<(), ServerError> {
    if user.id != user_id {
        tracing::warn!(user_id = user.id, requested = user_id, "cross-user access refused");
        return Err(ServerError::Forbidden(
            "you can only access your own data".to_string(),
        ));
    }
    Ok(())
}

async fn auth(
    auth_header: Option<TypedHeader<Authorization<Bearer>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(TypedHeader(Authorization(bearer))) = auth_header else {
        return Err(ServerError::Unauthorized("missing token".to_string()));
    };
    let token = bearer.token();
    if token.is_empty() {
        return Err(ServerError::Unauthorized("missing token".to_string()));
    }

    let user = user::Entity::find()
        .filter(user::Column::Token.eq(token))
        .one(&state.db)
        .await?
        .ok_or_else(|| ServerError::Unauthorized("invalid token".to_string()))?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    let protected = Router::new()
        .route("/api/expenses", get(expenses::list).post(expenses::create))
        .route("/api/expenses/{id}", delete(expenses::remove))
        .route("/api/budgets", get(budgets::list).post(budgets::create))
        .route(
            "/api/monthly-expenses",
            get(monthly_expenses::list).post(monthly_expenses::create),
        )
        .route("/api/monthly-expenses/{id}", put(monthly_expenses::update))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .route("/api/users/register", post(user::register))
        .route("/api/users/login", post(user::login))
        .merge(protected)
        .with_state(state)
}

pub async fn run(db: DatabaseConnection, addr: SocketAddr) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    run_with_listener(db, listener).await
}

pub async fn run_with_listener(
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(ServerState { db })).await
}

/// Serves on `listener` in a background task and returns the bound address.
pub fn spawn_with_listener(
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(db, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
