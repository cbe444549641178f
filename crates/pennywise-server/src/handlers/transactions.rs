//! Transaction handlers

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ApiJson, ApiPath, ApiQuery, AppError, AppState, MAX_PAGE_LIMIT};
use pennywise_core::models::{NewLineItem, NewTransaction, Transaction, TransactionSource};
use pennywise_core::savings::config::parse_source_filter;

/// Query parameters for listing a user's transactions
#[derive(Debug, Deserialize)]
pub struct TransactionQuery {
    /// Provenance tag, or "all"
    pub source: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Serialize)]
pub struct TransactionResponse {
    pub user_id: i64,
    pub transactions: Vec<Transaction>,
    pub limit: i64,
}

/// GET /api/users/:id/transactions - Most recent transactions with line items
pub async fn list_user_transactions(
    State(state): State<Arc<AppState>>,
    ApiPath(user_id): ApiPath<i64>,
    ApiQuery(params): ApiQuery<TransactionQuery>,
) -> Result<Json<TransactionResponse>, AppError> {
    state.db.require_user(user_id)?;

    // Input validation: clamp pagination parameters
    let limit = params.limit.clamp(1, MAX_PAGE_LIMIT);
    let source = match params.source.as_deref() {
        Some(s) => parse_source_filter(s)?,
        None => None,
    };

    let transactions = state.db.recent_user_transactions(user_id, source, limit)?;
    Ok(Json(TransactionResponse {
        user_id,
        transactions,
        limit,
    }))
}

/// Manual entry of one purchase
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub merchant: String,
    pub location: Option<String>,
    /// Defaults to now
    pub timestamp: Option<DateTime<Utc>>,
    /// Defaults to manual
    #[serde(default)]
    pub source: TransactionSource,
    pub items: Vec<NewLineItem>,
}

/// POST /api/users/:id/transactions - Record a purchase
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    ApiPath(user_id): ApiPath<i64>,
    ApiJson(req): ApiJson<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<Transaction>), AppError> {
    if req.items.is_empty() {
        return Err(AppError::bad_request("A transaction needs at least one item"));
    }

    let new_tx = NewTransaction {
        merchant: req.merchant,
        location: req.location,
        timestamp: req.timestamp.unwrap_or_else(Utc::now),
        source: req.source,
        import_hash: None,
        items: req.items,
    };
    let id = state.db.insert_transaction(user_id, &new_tx)?.id();

    let tx = state
        .db
        .get_transaction(id)?
        .ok_or_else(|| AppError::internal("Transaction vanished after insert"))?;
    Ok((StatusCode::CREATED, Json(tx)))
}

/// Query parameters for bulk deletion
#[derive(Debug, Deserialize)]
pub struct DeleteTransactionsQuery {
    pub source: String,
    pub user_id: Option<i64>,
}

#[derive(Serialize)]
pub struct DeleteTransactionsResponse {
    pub source: TransactionSource,
    pub user_id: Option<i64>,
    pub deleted: usize,
}

/// DELETE /api/transactions?source=&user_id= - Reset tooling: bulk delete by provenance
pub async fn delete_transactions(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<DeleteTransactionsQuery>,
) -> Result<Json<DeleteTransactionsResponse>, AppError> {
    let source: TransactionSource = params
        .source
        .parse()
        .map_err(|e: String| AppError::bad_request(&e))?;
    if let Some(user_id) = params.user_id {
        state.db.require_user(user_id)?;
    }

    let deleted = state
        .db
        .delete_transactions_by_source(source, params.user_id)?;
    Ok(Json(DeleteTransactionsResponse {
        source,
        user_id: params.user_id,
        deleted,
    }))
}
