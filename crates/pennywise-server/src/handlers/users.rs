//! User handlers

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::{ApiJson, ApiPath, AppError, AppState};
use pennywise_core::models::User;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    #[serde(default)]
    pub balance: f64,
}

/// GET /api/users - List users
pub async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<User>>, AppError> {
    let users = state.db.list_users()?;
    Ok(Json(users))
}

/// POST /api/users - Create a user
///
/// A taken name returns the existing user with 200 and its balance unchanged;
/// a new user gets 201.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    if let Some(existing) = state.db.get_user_by_name(&req.name)? {
        return Ok((StatusCode::OK, Json(existing)));
    }
    let id = state.db.upsert_user(&req.name, req.balance)?;
    let user = state.db.require_user(id)?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/users/:id - Get one user
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<User>, AppError> {
    let user = state
        .db
        .get_user(id)?
        .ok_or_else(|| AppError::not_found(&format!("User {} not found", id)))?;
    Ok(Json(user))
}
