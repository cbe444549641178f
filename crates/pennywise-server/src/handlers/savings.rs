//! Savings comparison handlers
//!
//! Every request recomputes from the store; nothing is cached between calls.

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{ApiJson, ApiQuery, AppError, AppState};
use pennywise_core::db::Database;
use pennywise_core::models::NewLineItem;
use pennywise_core::savings::{
    ComparisonResult, FrequencyReport, SavingsEngine, SavingsHistory, SavingsProjection,
};

fn engine(state: &AppState) -> SavingsEngine<'_, Database> {
    SavingsEngine::with_config(&state.db, state.config.engine.clone())
}

/// Items to price against a comparison user
#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    pub comparison_user_id: i64,
    pub items: Vec<NewLineItem>,
}

/// POST /api/savings/compare - Point-in-time comparison of submitted items
pub async fn compare_items(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CompareRequest>,
) -> Result<Json<ComparisonResult>, AppError> {
    let result = engine(&state).compare(req.comparison_user_id, &req.items)?;
    Ok(Json(result))
}

/// Subject and comparison user for the aggregate endpoints
#[derive(Debug, Deserialize)]
pub struct SavingsQuery {
    pub user_id: i64,
    pub comparison_user_id: i64,
    /// Projection date (YYYY-MM-DD), defaults to today
    pub as_of: Option<String>,
}

#[derive(Serialize)]
pub struct FrequencyResponse {
    pub user_id: i64,
    pub comparison_user_id: i64,
    #[serde(flatten)]
    pub report: FrequencyReport,
}

/// GET /api/savings/frequency - Extrapolated savings on frequent purchases
pub async fn get_frequency_savings(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<SavingsQuery>,
) -> Result<Json<FrequencyResponse>, AppError> {
    let report = engine(&state).frequency(params.user_id, params.comparison_user_id)?;
    Ok(Json(FrequencyResponse {
        user_id: params.user_id,
        comparison_user_id: params.comparison_user_id,
        report,
    }))
}

/// GET /api/savings/history - Savings per calendar month, newest first
pub async fn get_savings_history(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<SavingsQuery>,
) -> Result<Json<SavingsHistory>, AppError> {
    let history = engine(&state).history(params.user_id, params.comparison_user_id)?;
    Ok(Json(history))
}

/// GET /api/savings/projection - Monthly history with projected growth
pub async fn get_savings_projection(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<SavingsQuery>,
) -> Result<Json<SavingsProjection>, AppError> {
    let engine = engine(&state);
    let result = match params.as_of.as_deref() {
        Some(date) => {
            let today = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
                AppError::bad_request(&format!("Invalid as_of date '{}', expected YYYY-MM-DD", date))
            })?;
            engine.projection_at(params.user_id, params.comparison_user_id, today)?
        }
        None => engine.projection(params.user_id, params.comparison_user_id)?,
    };
    Ok(Json(result))
}
