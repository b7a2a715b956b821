//! 이메일 알림 endpoint.
//!
//! 모든 요청은 현재 사용자의 이메일 주소로 발송됩니다. 발송 실패는
//! 에러가 아니라 `success: false` 응답으로 돌려줍니다.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use kripta_core::{ledger, ExchangeError, OrderSide, User};
use kripta_notification::{
    DepositConfirmation, OrderConfirmation, PriceAlert, PriceDirection, WithdrawalConfirmation,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;
use validator::Validate;

use super::validated;
use crate::auth::CurrentUser;
use crate::error::{api_error, ApiError, ApiErrorResponse, ApiResult};
use crate::metrics::record_email;
use crate::state::AppState;

const SEND_FAILED: &str = "Failed to send email";

/// 알림 발송 결과.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationResponse {
    pub success: bool,
    pub message: String,
}

impl NotificationResponse {
    fn from_outcome(kind: &str, delivered: bool, success_message: &str) -> Self {
        record_email(kind, delivered);
        if !delivered {
            error!(kind, "Notification e-mail was not delivered");
        }
        Self {
            success: delivered,
            message: if delivered { success_message } else { SEND_FAILED }.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmationRequest {
    pub order_type: OrderSide,
    #[validate(length(min = 1, max = 50))]
    pub cryptocurrency: String,
    #[validate(length(min = 1, max = 64))]
    pub amount: String,
    #[validate(length(min = 1, max = 64))]
    pub price: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepositConfirmationRequest {
    #[validate(length(min = 1, max = 50))]
    pub cryptocurrency: String,
    #[validate(length(min = 1, max = 64))]
    pub amount: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalConfirmationRequest {
    #[validate(length(min = 1, max = 50))]
    pub cryptocurrency: String,
    #[validate(length(min = 1, max = 64))]
    pub amount: String,
    #[validate(length(min = 1, max = 200))]
    pub address: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceAlertRequest {
    #[validate(length(min = 1, max = 50))]
    pub cryptocurrency: String,
    #[validate(length(min = 1, max = 64))]
    pub current_price: String,
    #[validate(length(min = 1, max = 64))]
    pub alert_price: String,
    /// "above" 또는 "below"
    #[schema(value_type = String)]
    pub direction: PriceDirection,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecurityAlertRequest {
    #[validate(length(min = 1, max = 1000))]
    pub message: String,
}

/// 사용자의 수신 주소. 없으면 `USER_EMAIL_NOT_FOUND`.
fn recipient(user: &User) -> Result<String, ApiError> {
    user.email_address()
        .map(str::to_string)
        .ok_or_else(|| api_error(ExchangeError::UserEmailNotFound))
}

/// 주문 확인 메일.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/order-confirmation",
    request_body = OrderConfirmationRequest,
    responses(
        (status = 200, description = "발송 결과", body = NotificationResponse),
        (status = 400, description = "이메일 없음 또는 잘못된 입력", body = ApiErrorResponse)
    ),
    tag = "notifications"
)]
pub async fn send_order_confirmation(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    body: Result<Json<OrderConfirmationRequest>, JsonRejection>,
) -> ApiResult<Json<NotificationResponse>> {
    let request = validated(body)?;
    let to = recipient(&user)?;
    let amount = ledger::parse_amount(&request.amount).map_err(api_error)?;
    let price = ledger::parse_amount(&request.price).map_err(api_error)?;

    let data = OrderConfirmation::new(
        user.display_name(),
        request.order_type,
        request.cryptocurrency,
        amount,
        price,
    );
    let delivered = state.email_service.send_order_confirmation(&to, &data).await;

    Ok(Json(NotificationResponse::from_outcome(
        "order_confirmation",
        delivered,
        "Email sent successfully",
    )))
}

/// 입금 확인 메일.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/deposit-confirmation",
    request_body = DepositConfirmationRequest,
    responses(
        (status = 200, description = "발송 결과", body = NotificationResponse),
        (status = 400, description = "이메일 없음 또는 잘못된 입력", body = ApiErrorResponse)
    ),
    tag = "notifications"
)]
pub async fn send_deposit_confirmation(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    body: Result<Json<DepositConfirmationRequest>, JsonRejection>,
) -> ApiResult<Json<NotificationResponse>> {
    let request = validated(body)?;
    let to = recipient(&user)?;
    let amount = ledger::parse_amount(&request.amount).map_err(api_error)?;

    let data = DepositConfirmation::new(user.display_name(), request.cryptocurrency, amount);
    let delivered = state.email_service.send_deposit_confirmation(&to, &data).await;

    Ok(Json(NotificationResponse::from_outcome(
        "deposit_confirmation",
        delivered,
        "Confirmation email sent",
    )))
}

/// 출금 접수 메일.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/withdrawal-confirmation",
    request_body = WithdrawalConfirmationRequest,
    responses(
        (status = 200, description = "발송 결과", body = NotificationResponse),
        (status = 400, description = "이메일 없음 또는 잘못된 입력", body = ApiErrorResponse)
    ),
    tag = "notifications"
)]
pub async fn send_withdrawal_confirmation(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    body: Result<Json<WithdrawalConfirmationRequest>, JsonRejection>,
) -> ApiResult<Json<NotificationResponse>> {
    let request = validated(body)?;
    let to = recipient(&user)?;
    let amount = ledger::parse_amount(&request.amount).map_err(api_error)?;

    let data = WithdrawalConfirmation::new(
        user.display_name(),
        request.cryptocurrency,
        amount,
        request.address,
    );
    let delivered = state
        .email_service
        .send_withdrawal_confirmation(&to, &data)
        .await;

    Ok(Json(NotificationResponse::from_outcome(
        "withdrawal_confirmation",
        delivered,
        "Withdrawal confirmation email sent",
    )))
}

/// 가격 알림 메일.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/price-alert",
    request_body = PriceAlertRequest,
    responses(
        (status = 200, description = "발송 결과", body = NotificationResponse),
        (status = 400, description = "이메일 없음 또는 잘못된 입력", body = ApiErrorResponse)
    ),
    tag = "notifications"
)]
pub async fn send_price_alert(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    body: Result<Json<PriceAlertRequest>, JsonRejection>,
) -> ApiResult<Json<NotificationResponse>> {
    let request = validated(body)?;
    let to = recipient(&user)?;

    let data = PriceAlert {
        user_name: user.display_name().to_string(),
        cryptocurrency: request.cryptocurrency,
        current_price: ledger::parse_amount(&request.current_price).map_err(api_error)?,
        alert_price: ledger::parse_amount(&request.alert_price).map_err(api_error)?,
        direction: request.direction,
    };
    let delivered = state.email_service.send_price_alert(&to, &data).await;

    Ok(Json(NotificationResponse::from_outcome(
        "price_alert",
        delivered,
        "Price alert email sent",
    )))
}

/// 보안 알림 메일.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/security-alert",
    request_body = SecurityAlertRequest,
    responses(
        (status = 200, description = "발송 결과", body = NotificationResponse),
        (status = 400, description = "이메일 없음", body = ApiErrorResponse)
    ),
    tag = "notifications"
)]
pub async fn send_security_alert(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    body: Result<Json<SecurityAlertRequest>, JsonRejection>,
) -> ApiResult<Json<NotificationResponse>> {
    let request = validated(body)?;
    let to = recipient(&user)?;

    let delivered = state
        .email_service
        .send_security_alert(&to, &request.message)
        .await;

    Ok(Json(NotificationResponse::from_outcome(
        "security_alert",
        delivered,
        "Security alert sent",
    )))
}

/// 알림 라우터 생성.
pub fn notifications_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/order-confirmation", post(send_order_confirmation))
        .route("/deposit-confirmation", post(send_deposit_confirmation))
        .route("/withdrawal-confirmation", post(send_withdrawal_confirmation))
        .route("/price-alert", post(send_price_alert))
        .route("/security-alert", post(send_security_alert))
}
