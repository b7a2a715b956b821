//! 상장 암호화폐.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 거래 가능한 암호화폐.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Cryptocurrency {
    pub id: i64,
    /// 티커 (예: "BTC", 최대 10자)
    pub symbol: String,
    pub name: String,
    /// 외부 시세 제공자 식별자
    pub coin_gecko_id: String,
    pub logo: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 심볼 최대 길이.
pub const MAX_SYMBOL_LEN: usize = 10;
