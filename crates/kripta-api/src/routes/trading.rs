//! 거래 endpoint.
//!
//! - `GET /api/v1/trading/orders` - 최근 주문 50건
//! - `POST /api/v1/trading/orders` - 대기 주문 생성
//! - `DELETE /api/v1/trading/orders/{id}` - 주문 취소
//! - `POST /api/v1/trading/execute` - 즉시 체결

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use kripta_core::{ledger, ExchangeResult, Order, OrderSide, Transaction};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use utoipa::ToSchema;
use validator::Validate;

use super::{validated, SuccessResponse};
use crate::auth::CurrentUser;
use crate::error::{api_error, ApiErrorResponse, ApiResult};
use crate::metrics::{record_order, record_order_cancelled, record_trade};
use crate::repository::OrderRepository;
use crate::services::{self, OrderRequest};
use crate::state::AppState;

/// 주문 목록 조회 개수.
pub const RECENT_ORDER_LIMIT: i64 = 50;

/// 주문/체결 요청 본문.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    #[validate(range(min = 1, message = "cryptoId는 양수여야 합니다"))]
    pub crypto_id: i64,
    pub order_type: OrderSide,
    #[validate(length(min = 1, max = 64))]
    pub quantity: String,
    #[validate(length(min = 1, max = 64))]
    pub price_per_unit: String,
}

impl PlaceOrderRequest {
    fn parse(&self) -> ExchangeResult<OrderRequest> {
        Ok(OrderRequest {
            crypto_id: self.crypto_id,
            side: self.order_type,
            quantity: ledger::parse_amount(&self.quantity)?,
            price_per_unit: ledger::parse_amount(&self.price_per_unit)?,
        })
    }
}

/// 주문 생성 결과.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlaceOrderResponse {
    pub success: bool,
    pub message: String,
    pub order: Order,
}

/// 즉시 체결 결과.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteTradeResponse {
    pub success: bool,
    #[schema(value_type = String)]
    pub total_price: Decimal,
    #[schema(value_type = String)]
    pub fee: Decimal,
    pub order: Order,
    pub transaction: Transaction,
}

/// 최근 주문 목록.
#[utoipa::path(
    get,
    path = "/api/v1/trading/orders",
    responses(
        (status = 200, description = "최근 주문 (최신순)", body = Vec<Order>),
        (status = 401, description = "인증 필요")
    ),
    tag = "trading"
)]
pub async fn get_orders(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<Order>>> {
    let pool = state.require_db()?;
    let orders = OrderRepository::list_recent(pool, user.id, RECENT_ORDER_LIMIT)
        .await
        .map_err(api_error)?;
    Ok(Json(orders))
}

/// 대기 주문 생성.
#[utoipa::path(
    post,
    path = "/api/v1/trading/orders",
    request_body = PlaceOrderRequest,
    responses(
        (status = 200, description = "주문 생성", body = PlaceOrderResponse),
        (status = 400, description = "잔고 부족 또는 잘못된 입력", body = ApiErrorResponse),
        (status = 404, description = "매도할 지갑 없음", body = ApiErrorResponse)
    ),
    tag = "trading"
)]
pub async fn place_order(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    body: Result<Json<PlaceOrderRequest>, JsonRejection>,
) -> ApiResult<Json<PlaceOrderResponse>> {
    let request = validated(body)?.parse().map_err(api_error)?;
    let pool = state.require_db()?;

    let order = services::place_order(pool, user.id, request)
        .await
        .map_err(api_error)?;
    record_order(order.order_type.as_str(), "limit");

    Ok(Json(PlaceOrderResponse {
        success: true,
        message: "Order placed successfully".to_string(),
        order,
    }))
}

/// 주문 취소.
#[utoipa::path(
    delete,
    path = "/api/v1/trading/orders/{id}",
    params(("id" = i64, Path, description = "주문 ID")),
    responses(
        (status = 200, description = "취소됨", body = SuccessResponse),
        (status = 403, description = "다른 사용자의 주문", body = ApiErrorResponse),
        (status = 404, description = "주문 없음", body = ApiErrorResponse),
        (status = 409, description = "이미 체결/취소된 주문", body = ApiErrorResponse)
    ),
    tag = "trading"
)]
pub async fn cancel_order(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<i64>,
) -> ApiResult<Json<SuccessResponse>> {
    let pool = state.require_db()?;

    let order = services::cancel_order(pool, user.id, order_id)
        .await
        .map_err(api_error)?;
    record_order_cancelled(order.order_type.as_str());
    debug!(order_id, "Cancel acknowledged");

    Ok(Json(SuccessResponse::ok()))
}

/// 즉시 체결.
#[utoipa::path(
    post,
    path = "/api/v1/trading/execute",
    request_body = PlaceOrderRequest,
    responses(
        (status = 200, description = "체결 완료", body = ExecuteTradeResponse),
        (status = 400, description = "잔고 부족 또는 잘못된 입력", body = ApiErrorResponse),
        (status = 404, description = "매도할 지갑 없음", body = ApiErrorResponse)
    ),
    tag = "trading"
)]
pub async fn execute_trade(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    body: Result<Json<PlaceOrderRequest>, JsonRejection>,
) -> ApiResult<Json<ExecuteTradeResponse>> {
    let request = validated(body)?.parse().map_err(api_error)?;
    let pool = state.require_db()?;

    let execution = services::execute_trade(pool, user.id, request, state.fee_rate())
        .await
        .map_err(api_error)?;
    record_order(request.side.as_str(), "market");
    record_trade(request.side.as_str());

    Ok(Json(ExecuteTradeResponse {
        success: true,
        total_price: execution.total_price,
        fee: execution.fee,
        order: execution.order,
        transaction: execution.transaction,
    }))
}

/// 거래 라우터 생성.
pub fn trading_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", get(get_orders).post(place_order))
        .route("/orders/{id}", delete(cancel_order))
        .route("/execute", post(execute_trade))
}
