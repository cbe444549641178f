//! Report handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::{ApiQuery, AppError, AppState, MAX_PAGE_LIMIT};
use pennywise_core::models::MerchantsReport;

#[derive(Debug, Deserialize)]
pub struct MerchantsQuery {
    pub user_id: i64,
    #[serde(default = "default_merchant_limit")]
    pub limit: i64,
}

fn default_merchant_limit() -> i64 {
    10
}

/// GET /api/reports/merchants - Spending by merchant for one user
pub async fn get_merchants_report(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<MerchantsQuery>,
) -> Result<Json<MerchantsReport>, AppError> {
    state.db.require_user(params.user_id)?;
    let limit = params.limit.clamp(1, MAX_PAGE_LIMIT);
    let report = state.db.get_top_merchants(params.user_id, limit)?;
    Ok(Json(report))
}
