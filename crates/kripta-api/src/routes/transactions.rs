//! 거래 내역 endpoint.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use kripta_core::Transaction;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use crate::auth::CurrentUser;
use crate::error::{api_error, ApiResult};
use crate::repository::TransactionRepository;
use crate::state::AppState;

/// 기본 조회 개수.
pub const DEFAULT_HISTORY_LIMIT: i64 = 100;
/// 최대 조회 개수.
pub const MAX_HISTORY_LIMIT: i64 = 500;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// 조회 개수 (기본 100, 최대 500)
    pub limit: Option<i64>,
}

impl HistoryQuery {
    /// 1..=500 범위로 보정한 조회 개수.
    pub fn effective_limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT)
    }
}

/// 거래 내역 (최신순).
#[utoipa::path(
    get,
    path = "/api/v1/transactions",
    params(HistoryQuery),
    responses(
        (status = 200, description = "거래 내역", body = Vec<Transaction>),
        (status = 401, description = "인증 필요")
    ),
    tag = "transactions"
)]
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<Vec<Transaction>>> {
    let pool = state.require_db()?;
    let transactions = TransactionRepository::list_recent(pool, user.id, query.effective_limit())
        .await
        .map_err(api_error)?;
    Ok(Json(transactions))
}

/// 거래 내역 라우터 생성.
pub fn transactions_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(get_history))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_limit() {
        assert_eq!(HistoryQuery::default().effective_limit(), 100);
        assert_eq!(HistoryQuery { limit: Some(20) }.effective_limit(), 20);
        assert_eq!(HistoryQuery { limit: Some(10_000) }.effective_limit(), 500);
        assert_eq!(HistoryQuery { limit: Some(0) }.effective_limit(), 1);
    }
}
