//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/api/v1/auth` - 세션 (me, logout)
//! - `/api/v1/market` - 상장 암호화폐와 시세 캐시
//! - `/api/v1/wallet` - 지갑, 포트폴리오 요약, 입출금
//! - `/api/v1/trading` - 주문, 취소, 즉시 체결
//! - `/api/v1/transactions` - 거래 내역
//! - `/api/v1/notifications` - 이메일 알림
//! - `/api/v1/analytics` - 포트폴리오/거래 분석

pub mod analytics;
pub mod auth;
pub mod health;
pub mod market;
#[cfg(feature = "notifications")]
pub mod notifications;
pub mod trading;
pub mod transactions;
pub mod wallet;

pub use analytics::analytics_router;
pub use auth::auth_router;
pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use market::market_router;
#[cfg(feature = "notifications")]
pub use notifications::{notifications_router, NotificationResponse};
pub use trading::trading_router;
pub use transactions::transactions_router;
pub use wallet::wallet_router;

use axum::{extract::rejection::JsonRejection, Json, Router};
use kripta_core::{ExchangeError, ExchangeResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{api_error, validation_error, ApiResult};
use crate::state::AppState;

/// 성공 여부만 담은 응답.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// JSON 본문을 추출하고 검증합니다.
///
/// 본문 파싱 실패와 검증 실패 모두 `INVALID_INPUT`(400)으로 응답합니다.
pub(crate) fn validated<T: Validate>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    let Json(request) = body
        .map_err(|rejection| api_error(ExchangeError::InvalidInput(rejection.body_text())))?;
    request.validate().map_err(validation_error)?;
    Ok(request)
}

/// 부호가 있을 수 있는 선택적 10진수 필드를 파싱합니다.
pub(crate) fn parse_decimal_field(field: &str, text: Option<&str>) -> ExchangeResult<Option<Decimal>> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| {
            t.parse::<Decimal>()
                .map_err(|_| ExchangeError::InvalidInput(format!("{field}: 잘못된 숫자 형식 '{t}'")))
        })
        .transpose()
}

/// 전체 API 라우터 생성.
///
/// # Feature Flags
/// - `notifications`: 알림 라우터 활성화 (`/api/v1/notifications`)
pub fn create_api_router() -> Router<Arc<AppState>> {
    let router = Router::new()
        .nest("/health", health_router())
        .nest("/api/v1/auth", auth_router())
        .nest("/api/v1/market", market_router())
        .nest("/api/v1/wallet", wallet_router())
        .nest("/api/v1/trading", trading_router())
        .nest("/api/v1/transactions", transactions_router())
        .nest("/api/v1/analytics", analytics_router());

    #[cfg(feature = "notifications")]
    let router = router.nest("/api/v1/notifications", notifications_router());

    router
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_decimal_field() {
        assert_eq!(parse_decimal_field("x", Some("-2.5")).unwrap(), Some(dec!(-2.5)));
        assert_eq!(parse_decimal_field("x", Some("  ")).unwrap(), None);
        assert_eq!(parse_decimal_field("x", None).unwrap(), None);
        assert!(matches!(
            parse_decimal_field("priceEur", Some("abc")),
            Err(ExchangeError::InvalidInput(msg)) if msg.starts_with("priceEur")
        ));
    }
}
