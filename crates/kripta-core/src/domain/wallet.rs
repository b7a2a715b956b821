//! 사용자 지갑.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger;

/// 사용자별, 암호화폐별 잔고.
///
/// `(user_id, crypto_id)` 조합은 유일합니다. `locked_balance`는
/// 미체결 매도 주문에 묶인 수량입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub id: i64,
    pub user_id: i64,
    pub crypto_id: i64,
    #[cfg_attr(feature = "utoipa-support", schema(value_type = String))]
    pub balance: Decimal,
    #[cfg_attr(feature = "utoipa-support", schema(value_type = String))]
    pub locked_balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    /// 매도 주문에 사용할 수 있는 잔고.
    pub fn available_balance(&self) -> Decimal {
        ledger::available(self.balance, self.locked_balance)
    }
}
