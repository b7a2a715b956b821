//! 통합 API 에러 응답 타입.
//!
//! 모든 API 엔드포인트에서 일관된 에러 형식을 제공합니다.
//! 도메인 에러(`ExchangeError`)는 [`api_error`]를 통해 HTTP 상태와
//! 고정 에러 코드로 변환됩니다.

use axum::http::{Method, StatusCode, Uri};
use axum::Json;
use kripta_core::ExchangeError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// 통합 API 에러 응답.
///
/// # 예시
///
/// ```json
/// {
///   "code": "INSUFFICIENT_BALANCE",
///   "message": "잔고 부족: 요청 5, 사용 가능 1.5",
///   "details": {"requested": "5", "available": "1.5"},
///   "timestamp": 1738300800
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "DB_UNAVAILABLE", "INVALID_INPUT", "ORDER_NOT_FOUND")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 추가 에러 상세 정보 (선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// 에러 발생 타임스탬프 (Unix timestamp, 선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// HTTP 메서드 (GET, POST 등)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// 요청 경로
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ApiErrorResponse {
    /// 기본 에러 생성 (타임스탬프 포함).
    ///
    /// ```
    /// use kripta_api::error::ApiErrorResponse;
    ///
    /// let error = ApiErrorResponse::new("ORDER_NOT_FOUND", "Order not found");
    /// ```
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            timestamp: Some(chrono::Utc::now().timestamp()),
            method: None,
            path: None,
        }
    }

    /// 상세 정보 포함 에러 생성.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Value,
    ) -> Self {
        Self {
            details: Some(details),
            ..Self::new(code, message)
        }
    }

    /// 타임스탬프 없는 간단한 에러.
    pub fn simple(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            timestamp: None,
            method: None,
            path: None,
        }
    }

    /// 요청 정보(메서드, 경로)를 추가합니다.
    #[must_use]
    pub fn with_request_info(mut self, method: &Method, uri: &Uri) -> Self {
        self.method = Some(method.to_string());
        self.path = Some(uri.path().to_string());
        self
    }

    /// 에러 코드 반환.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// 에러 메시지 반환.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// 핸들러 에러 타입.
pub type ApiError = (StatusCode, Json<ApiErrorResponse>);

/// API 핸들러 Result 타입 별칭.
///
/// ```ignore
/// async fn get_market_data(
///     Path(crypto_id): Path<i64>,
///     State(state): State<Arc<AppState>>,
/// ) -> ApiResult<Json<MarketData>> {
///     let pool = state.require_db()?;
///     let market = market_data::find_by_crypto(pool, crypto_id)
///         .await
///         .map_err(api_error)?
///         .ok_or_else(|| api_error(ExchangeError::MarketDataNotFound(crypto_id)))?;
///     Ok(Json(market))
/// }
/// ```
pub type ApiResult<T> = Result<T, ApiError>;

/// 도메인 에러의 HTTP 상태.
pub fn status_for(err: &ExchangeError) -> StatusCode {
    match err {
        ExchangeError::DbUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ExchangeError::InsufficientBalance { .. }
        | ExchangeError::InvalidInput(_)
        | ExchangeError::UserEmailNotFound => StatusCode::BAD_REQUEST,
        ExchangeError::WalletNotFound { .. }
        | ExchangeError::OrderNotFound(_)
        | ExchangeError::CryptocurrencyNotFound(_)
        | ExchangeError::MarketDataNotFound(_) => StatusCode::NOT_FOUND,
        ExchangeError::Forbidden(_) => StatusCode::FORBIDDEN,
        ExchangeError::OrderNotCancellable { .. } => StatusCode::CONFLICT,
        ExchangeError::Database(_)
        | ExchangeError::Data(_)
        | ExchangeError::Config(_)
        | ExchangeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// 도메인 에러를 API 에러 응답으로 변환합니다.
///
/// 서버 측 에러는 `error` 레벨로 기록하고, 내부 메시지는 응답에
/// 노출하지 않습니다.
pub fn api_error(err: ExchangeError) -> ApiError {
    let status = status_for(&err);

    let body = match &err {
        ExchangeError::InsufficientBalance {
            requested,
            available,
        } => ApiErrorResponse::with_details(
            err.code(),
            err.to_string(),
            serde_json::json!({
                "requested": requested.to_string(),
                "available": available.to_string(),
            }),
        ),
        ExchangeError::Forbidden(_) => ApiErrorResponse::new(err.code(), "Unauthorized"),
        ExchangeError::Database(_) | ExchangeError::Data(_) | ExchangeError::Internal(_) => {
            tracing::error!(code = err.code(), "Request failed: {}", err);
            ApiErrorResponse::new(err.code(), "Internal server error")
        }
        ExchangeError::DbUnavailable => {
            tracing::warn!("Database unavailable");
            ApiErrorResponse::new(err.code(), err.to_string())
        }
        _ => ApiErrorResponse::new(err.code(), err.to_string()),
    };

    (status, Json(body))
}

/// 요청 본문 검증 실패를 `INVALID_INPUT`으로 변환합니다.
pub fn validation_error(errors: validator::ValidationErrors) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiErrorResponse::with_details(
            "INVALID_INPUT",
            "요청 값이 올바르지 않습니다",
            serde_json::to_value(&errors).unwrap_or(Value::Null),
        )),
    )
}
