//! 거래소 에러 타입.
//!
//! 지갑, 주문, 분석 등 거래소 전반에서 사용되는 에러 타입을 정의합니다.
//! 각 에러는 API 계층에서 HTTP 상태와 고정 에러 코드로 변환됩니다.

use rust_decimal::Decimal;
use thiserror::Error;

/// 핵심 거래소 에러.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// 데이터베이스가 설정되지 않았거나 연결할 수 없음
    #[error("데이터베이스를 사용할 수 없습니다")]
    DbUnavailable,

    /// 쿼리 실행 에러
    #[error("데이터베이스 에러: {0}")]
    Database(String),

    /// 잔고 부족
    #[error("잔고 부족: 요청 {requested}, 사용 가능 {available}")]
    InsufficientBalance {
        requested: Decimal,
        available: Decimal,
    },

    /// 잘못된 입력 (금액 형식, 범위 등)
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 사용자가 해당 암호화폐 지갑을 보유하지 않음
    #[error("지갑을 찾을 수 없습니다 (crypto_id={crypto_id})")]
    WalletNotFound { crypto_id: i64 },

    /// 주문 없음
    #[error("주문을 찾을 수 없습니다: {0}")]
    OrderNotFound(i64),

    /// 암호화폐 없음
    #[error("암호화폐를 찾을 수 없습니다: {0}")]
    CryptocurrencyNotFound(i64),

    /// 시세 캐시 없음
    #[error("시세 데이터를 찾을 수 없습니다: {0}")]
    MarketDataNotFound(i64),

    /// 다른 사용자의 리소스 접근
    #[error("권한 없음: {0}")]
    Forbidden(String),

    /// 이미 종료된 주문 취소 시도
    #[error("취소할 수 없는 주문입니다 (order_id={order_id}, status={status})")]
    OrderNotCancellable { order_id: i64, status: String },

    /// 사용자 이메일 미등록
    #[error("사용자 이메일이 등록되어 있지 않습니다")]
    UserEmailNotFound,

    /// 저장된 데이터 손상 (파싱 불가 decimal 등)
    #[error("데이터 에러: {0}")]
    Data(String),

    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 거래소 작업을 위한 Result 타입.
pub type ExchangeResult<T> = Result<T, ExchangeError>;

impl ExchangeError {
    /// 고정 에러 코드를 반환합니다.
    pub fn code(&self) -> &'static str {
        match self {
            ExchangeError::DbUnavailable => "DB_UNAVAILABLE",
            ExchangeError::Database(_) => "DB_ERROR",
            ExchangeError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            ExchangeError::InvalidInput(_) => "INVALID_INPUT",
            ExchangeError::WalletNotFound { .. } => "WALLET_NOT_FOUND",
            ExchangeError::OrderNotFound(_) => "ORDER_NOT_FOUND",
            ExchangeError::CryptocurrencyNotFound(_) => "CRYPTOCURRENCY_NOT_FOUND",
            ExchangeError::MarketDataNotFound(_) => "MARKET_DATA_NOT_FOUND",
            ExchangeError::Forbidden(_) => "FORBIDDEN",
            ExchangeError::OrderNotCancellable { .. } => "ORDER_NOT_CANCELLABLE",
            ExchangeError::UserEmailNotFound => "USER_EMAIL_NOT_FOUND",
            ExchangeError::Data(_) => "DATA_ERROR",
            ExchangeError::Config(_) => "CONFIG_ERROR",
            ExchangeError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 클라이언트 요청에 의한 에러인지 확인합니다.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ExchangeError::InsufficientBalance { .. }
                | ExchangeError::InvalidInput(_)
                | ExchangeError::WalletNotFound { .. }
                | ExchangeError::OrderNotFound(_)
                | ExchangeError::CryptocurrencyNotFound(_)
                | ExchangeError::MarketDataNotFound(_)
                | ExchangeError::Forbidden(_)
                | ExchangeError::OrderNotCancellable { .. }
                | ExchangeError::UserEmailNotFound
        )
    }
}

impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        ExchangeError::Data(err.to_string())
    }
}

impl From<rust_decimal::Error> for ExchangeError {
    fn from(err: rust_decimal::Error) -> Self {
        ExchangeError::Data(err.to_string())
    }
}

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for ExchangeError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                ExchangeError::DbUnavailable
            }
            other => ExchangeError::Database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(ExchangeError::DbUnavailable.code(), "DB_UNAVAILABLE");
        assert_eq!(
            ExchangeError::WalletNotFound { crypto_id: 1 }.code(),
            "WALLET_NOT_FOUND"
        );
        assert_eq!(
            ExchangeError::OrderNotCancellable {
                order_id: 7,
                status: "filled".to_string()
            }
            .code(),
            "ORDER_NOT_CANCELLABLE"
        );
    }

    #[test]
    fn test_client_error_classification() {
        let insufficient = ExchangeError::InsufficientBalance {
            requested: dec!(2),
            available: dec!(1),
        };
        assert!(insufficient.is_client_error());
        assert!(!ExchangeError::DbUnavailable.is_client_error());
        assert!(!ExchangeError::Data("bad decimal".to_string()).is_client_error());
    }

    #[test]
    fn test_insufficient_balance_message() {
        let err = ExchangeError::InsufficientBalance {
            requested: dec!(5),
            available: dec!(1.5),
        };
        let msg = err.to_string();
        assert!(msg.contains("5"));
        assert!(msg.contains("1.5"));
    }
}
