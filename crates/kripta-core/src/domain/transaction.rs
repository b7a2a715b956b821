//! 거래 내역 (원장).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ExchangeError;

/// 거래 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    Trade,
    Transfer,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "deposit",
            TransactionType::Withdrawal => "withdrawal",
            TransactionType::Trade => "trade",
            TransactionType::Transfer => "transfer",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = ExchangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "deposit" => Ok(TransactionType::Deposit),
            "withdrawal" => Ok(TransactionType::Withdrawal),
            "trade" => Ok(TransactionType::Trade),
            "transfer" => Ok(TransactionType::Transfer),
            other => Err(ExchangeError::Data(format!("알 수 없는 거래 유형: {other}"))),
        }
    }
}

/// 거래 처리 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
        }
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = ExchangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(TransactionStatus::Pending),
            "completed" => Ok(TransactionStatus::Completed),
            "failed" => Ok(TransactionStatus::Failed),
            other => Err(ExchangeError::Data(format!("알 수 없는 거래 상태: {other}"))),
        }
    }
}

/// 원장 항목.
///
/// 입금은 `to_crypto_id`, 출금은 `from_crypto_id`를 채웁니다.
/// 체결은 매수면 `to_crypto_id`, 매도면 `from_crypto_id`입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub from_crypto_id: Option<i64>,
    pub to_crypto_id: Option<i64>,
    pub transaction_type: TransactionType,
    #[cfg_attr(feature = "utoipa-support", schema(value_type = String))]
    pub amount: Decimal,
    #[cfg_attr(feature = "utoipa-support", schema(value_type = String))]
    pub fee: Decimal,
    pub status: TransactionStatus,
    pub order_id: Option<i64>,
    pub tx_hash: Option<String>,
    /// 발생 시점의 단가 (USD). 과거 데이터에는 없을 수 있습니다.
    #[cfg_attr(feature = "utoipa-support", schema(value_type = Option<String>))]
    pub price_usd: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// 해당 암호화폐의 완료된 입금인지 확인합니다.
    pub fn is_completed_deposit_of(&self, crypto_id: i64) -> bool {
        self.transaction_type == TransactionType::Deposit
            && self.status == TransactionStatus::Completed
            && self.to_crypto_id == Some(crypto_id)
    }
}
