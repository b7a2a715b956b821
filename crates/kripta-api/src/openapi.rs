//! OpenAPI 문서화 설정.
//!
//! utoipa를 사용하여 REST API의 OpenAPI 3.0 스펙을 생성합니다.
//! Swagger UI는 `/swagger-ui` 경로에서 사용 가능합니다.
//!
//! 새로운 엔드포인트를 추가할 때:
//!
//! 1. 응답/요청 타입에 `#[derive(ToSchema)]` 추가
//! 2. 핸들러에 `#[utoipa::path(...)]` 어노테이션 추가
//! 3. 이 파일의 `components(schemas(...))` 및 `paths(...)` 섹션에 추가
//!
//! 알림 endpoint는 `notifications` feature가 켜진 경우에만
//! [`openapi_spec`]에서 병합됩니다.

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use kripta_analytics::{
    AssetAllocation, HoldingValue, PortfolioMetrics, PortfolioSummary, TradePerformance,
    TradingStatistics, ValueHistoryPoint,
};
use kripta_core::{
    Cryptocurrency, MarketData, Order, OrderSide, OrderStatus, PortfolioSnapshot, Role,
    SnapshotHolding, Transaction, TransactionStatus, TransactionType, User, Wallet,
};

use crate::error::ApiErrorResponse;
use crate::routes::{
    market::{CreateCryptocurrencyRequest, MarketOverviewItem, UpsertMarketDataRequest},
    trading::{ExecuteTradeResponse, PlaceOrderRequest, PlaceOrderResponse},
    wallet::{BalanceChangeRequest, WalletChangeResponse, WalletView},
    ComponentHealth, ComponentStatus, HealthResponse, SuccessResponse,
};

// ==================== OpenAPI 문서 정의 ====================

/// Kripta API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Kripta Asset Exchange API",
        version = "0.1.0",
        description = r#"
# Kripta 암호화폐 거래소 REST API

지갑, 주문, 거래 내역, 포트폴리오 분석을 위한 REST API입니다.

## 인증

대부분의 엔드포인트는 JWT 세션 토큰이 필요합니다.
`Authorization: Bearer <token>` 헤더 또는 `kripta_session` 쿠키를 사용하세요.

## 금액 표기

모든 금액과 가격은 10진수 문자열로 주고받습니다 (예: `"0.00150000"`).
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "로컬 개발 서버"),
    ),
    tags(
        (name = "health", description = "헬스 체크 - 서버 상태 확인"),
        (name = "auth", description = "세션 - 현재 사용자, 로그아웃"),
        (name = "market", description = "시장 - 상장 암호화폐와 시세"),
        (name = "wallet", description = "지갑 - 잔고, 입출금"),
        (name = "trading", description = "거래 - 주문 생성/취소, 즉시 체결"),
        (name = "transactions", description = "거래 내역"),
        (name = "analytics", description = "분석 - 포트폴리오 지표 및 거래 성과"),
        (name = "notifications", description = "알림 - 이메일 발송")
    ),
    // ==================== 스키마 등록 ====================
    components(
        schemas(
            // ===== Common =====
            ApiErrorResponse,
            SuccessResponse,
            HealthResponse,
            ComponentHealth,
            ComponentStatus,

            // ===== Domain =====
            User,
            Role,
            Cryptocurrency,
            MarketData,
            Wallet,
            Order,
            OrderSide,
            OrderStatus,
            Transaction,
            TransactionType,
            TransactionStatus,
            PortfolioSnapshot,
            SnapshotHolding,

            // ===== Requests / Responses =====
            CreateCryptocurrencyRequest,
            UpsertMarketDataRequest,
            MarketOverviewItem,
            WalletView,
            BalanceChangeRequest,
            WalletChangeResponse,
            PlaceOrderRequest,
            PlaceOrderResponse,
            ExecuteTradeResponse,

            // ===== Analytics =====
            PortfolioSummary,
            HoldingValue,
            PortfolioMetrics,
            AssetAllocation,
            TradePerformance,
            TradingStatistics,
            ValueHistoryPoint,
        )
    ),
    // ==================== 경로 등록 ====================
    paths(
        // ===== Health =====
        crate::routes::health::health_check,
        crate::routes::health::health_ready,

        // ===== Auth =====
        crate::routes::auth::me,
        crate::routes::auth::logout,

        // ===== Market =====
        crate::routes::market::get_cryptocurrencies,
        crate::routes::market::create_cryptocurrency,
        crate::routes::market::get_all_market_data,
        crate::routes::market::get_market_data,
        crate::routes::market::upsert_market_data,

        // ===== Wallet =====
        crate::routes::wallet::get_wallets,
        crate::routes::wallet::get_portfolio_summary,
        crate::routes::wallet::deposit,
        crate::routes::wallet::withdraw,

        // ===== Trading =====
        crate::routes::trading::get_orders,
        crate::routes::trading::place_order,
        crate::routes::trading::cancel_order,
        crate::routes::trading::execute_trade,

        // ===== Transactions =====
        crate::routes::transactions::get_history,

        // ===== Analytics =====
        crate::routes::analytics::get_portfolio_metrics,
        crate::routes::analytics::get_trade_performance,
        crate::routes::analytics::get_value_history,
        crate::routes::analytics::get_trading_statistics,
        crate::routes::analytics::record_snapshot,
    )
)]
pub struct ApiDoc;

/// 알림 endpoint 문서.
#[cfg(feature = "notifications")]
#[derive(OpenApi)]
#[openapi(
    components(schemas(
        crate::routes::notifications::NotificationResponse,
        crate::routes::notifications::OrderConfirmationRequest,
        crate::routes::notifications::DepositConfirmationRequest,
        crate::routes::notifications::WithdrawalConfirmationRequest,
        crate::routes::notifications::PriceAlertRequest,
        crate::routes::notifications::SecurityAlertRequest,
    )),
    paths(
        crate::routes::notifications::send_order_confirmation,
        crate::routes::notifications::send_deposit_confirmation,
        crate::routes::notifications::send_withdrawal_confirmation,
        crate::routes::notifications::send_price_alert,
        crate::routes::notifications::send_security_alert,
    )
)]
pub struct NotificationsDoc;

/// 활성화된 feature를 반영한 전체 OpenAPI 스펙.
pub fn openapi_spec() -> utoipa::openapi::OpenApi {
    #[allow(unused_mut)]
    let mut spec = ApiDoc::openapi();

    #[cfg(feature = "notifications")]
    spec.merge(NotificationsDoc::openapi());

    spec
}

// ==================== Swagger UI 라우터 ====================

/// Swagger UI 라우터 생성.
///
/// 다음 경로에 문서 UI를 마운트합니다:
/// - `/swagger-ui` - Swagger UI 대화형 문서
/// - `/api-docs/openapi.json` - OpenAPI JSON 스펙
pub fn swagger_ui_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", openapi_spec())
        .into()
}

// ==================== 테스트 ====================
