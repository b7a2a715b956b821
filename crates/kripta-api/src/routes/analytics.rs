//! 분석 endpoint.
//!
//! 필요한 행을 모두 읽은 뒤 `kripta-analytics`의 순수 함수로 계산합니다.
//!
//! - `GET /api/v1/analytics/portfolio-metrics`
//! - `GET /api/v1/analytics/trade-performance`
//! - `GET /api/v1/analytics/value-history?daysBack=30`
//! - `GET /api/v1/analytics/trading-statistics`
//! - `POST /api/v1/analytics/snapshots`

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use kripta_analytics::{
    bucket_daily, calculate_portfolio_metrics, calculate_trade_performance,
    calculate_trading_statistics, clamp_days_back, window_start, PortfolioMetrics,
    TradePerformance, TradingStatistics, ValueHistoryPoint,
};
use kripta_core::PortfolioSnapshot;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use crate::auth::CurrentUser;
use crate::error::{api_error, ApiErrorResponse, ApiResult};
use crate::metrics::record_snapshots;
use crate::repository::{
    CryptocurrencyRepository, MarketDataRepository, OrderRepository, SnapshotRepository,
    TransactionRepository, WalletRepository,
};
use crate::services::{self, index_markets, price_map};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ValueHistoryQuery {
    /// 조회 기간(일). 기본 30, 범위 1-365
    pub days_back: Option<i64>,
}

/// 포트폴리오 지표.
#[utoipa::path(
    get,
    path = "/api/v1/analytics/portfolio-metrics",
    responses(
        (status = 200, description = "평가액, 투자금, 수익률, 자산 배분", body = PortfolioMetrics),
        (status = 401, description = "인증 필요")
    ),
    tag = "analytics"
)]
pub async fn get_portfolio_metrics(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<PortfolioMetrics>> {
    let pool = state.require_db()?;

    let wallets = WalletRepository::list_by_user(pool, user.id)
        .await
        .map_err(api_error)?;
    let cryptos = CryptocurrencyRepository::list_all(pool)
        .await
        .map_err(api_error)?
        .into_iter()
        .map(|crypto| (crypto.id, crypto))
        .collect();
    let markets = index_markets(MarketDataRepository::list_all(pool).await.map_err(api_error)?);
    let transactions = TransactionRepository::list_by_user(pool, user.id)
        .await
        .map_err(api_error)?;

    Ok(Json(calculate_portfolio_metrics(
        &wallets,
        &cryptos,
        &price_map(&markets),
        &transactions,
    )))
}

/// 매수 체결 기준 손익 성과.
#[utoipa::path(
    get,
    path = "/api/v1/analytics/trade-performance",
    responses(
        (status = 200, description = "승률, 손익비", body = TradePerformance),
        (status = 401, description = "인증 필요")
    ),
    tag = "analytics"
)]
pub async fn get_trade_performance(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<TradePerformance>> {
    let pool = state.require_db()?;

    let orders = OrderRepository::list_by_user(pool, user.id)
        .await
        .map_err(api_error)?;
    let markets = index_markets(MarketDataRepository::list_all(pool).await.map_err(api_error)?);

    Ok(Json(calculate_trade_performance(&orders, &price_map(&markets))))
}

/// 일별 포트폴리오 가치 추이.
#[utoipa::path(
    get,
    path = "/api/v1/analytics/value-history",
    params(ValueHistoryQuery),
    responses(
        (status = 200, description = "하루 한 점, 시각 오름차순", body = Vec<ValueHistoryPoint>),
        (status = 401, description = "인증 필요")
    ),
    tag = "analytics"
)]
pub async fn get_value_history(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ValueHistoryQuery>,
) -> ApiResult<Json<Vec<ValueHistoryPoint>>> {
    let pool = state.require_db()?;

    let since = window_start(chrono::Utc::now(), clamp_days_back(query.days_back));
    let snapshots = SnapshotRepository::list_since(pool, user.id, since)
        .await
        .map_err(api_error)?;

    Ok(Json(bucket_daily(&snapshots)))
}

/// 주문 통계.
#[utoipa::path(
    get,
    path = "/api/v1/analytics/trading-statistics",
    responses(
        (status = 200, description = "매수/매도 건수, 수량, 평균가, 체결률", body = TradingStatistics),
        (status = 401, description = "인증 필요")
    ),
    tag = "analytics"
)]
pub async fn get_trading_statistics(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<TradingStatistics>> {
    let pool = state.require_db()?;

    let orders = OrderRepository::list_by_user(pool, user.id)
        .await
        .map_err(api_error)?;

    Ok(Json(calculate_trading_statistics(&orders)))
}

/// 현재 보유 자산으로 스냅샷 저장.
#[utoipa::path(
    post,
    path = "/api/v1/analytics/snapshots",
    responses(
        (status = 201, description = "저장된 스냅샷", body = PortfolioSnapshot),
        (status = 503, description = "데이터베이스 없음", body = ApiErrorResponse)
    ),
    tag = "analytics"
)]
pub async fn record_snapshot(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<(StatusCode, Json<PortfolioSnapshot>)> {
    let pool = state.require_db()?;

    let snapshot = services::record_snapshot(pool, user.id)
        .await
        .map_err(api_error)?;
    record_snapshots(1);

    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// 분석 라우터 생성.
pub fn analytics_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/portfolio-metrics", get(get_portfolio_metrics))
        .route("/trade-performance", get(get_trade_performance))
        .route("/value-history", get(get_value_history))
        .route("/trading-statistics", get(get_trading_statistics))
        .route("/snapshots", post(record_snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query as QueryExtractor;
    use axum::http::Uri;

    #[test]
    fn test_value_history_query_camel_case() {
        let uri: Uri = "/value-history?daysBack=7".parse().unwrap();
        let QueryExtractor(query) = QueryExtractor::<ValueHistoryQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(query.days_back, Some(7));
        assert_eq!(clamp_days_back(query.days_back), 7);
    }

    #[test]
    fn test_value_history_query_default() {
        let uri: Uri = "/value-history".parse().unwrap();
        let QueryExtractor(query) = QueryExtractor::<ValueHistoryQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(clamp_days_back(query.days_back), 30);
    }
}
