//! 시세 캐시.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 암호화폐별 최신 시세.
///
/// 외부 프로세스가 채우는 캐시 테이블의 한 행입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct MarketData {
    pub id: i64,
    pub crypto_id: i64,
    #[cfg_attr(feature = "utoipa-support", schema(value_type = String))]
    pub price_usd: Decimal,
    #[cfg_attr(feature = "utoipa-support", schema(value_type = Option<String>))]
    pub price_eur: Option<Decimal>,
    #[cfg_attr(feature = "utoipa-support", schema(value_type = Option<String>))]
    pub market_cap: Option<Decimal>,
    #[cfg_attr(feature = "utoipa-support", schema(value_type = Option<String>))]
    pub volume_24h: Option<Decimal>,
    #[cfg_attr(feature = "utoipa-support", schema(value_type = Option<String>))]
    pub percent_change_24h: Option<Decimal>,
    #[cfg_attr(feature = "utoipa-support", schema(value_type = Option<String>))]
    pub percent_change_7d: Option<Decimal>,
    #[cfg_attr(feature = "utoipa-support", schema(value_type = Option<String>))]
    pub high_price_24h: Option<Decimal>,
    #[cfg_attr(feature = "utoipa-support", schema(value_type = Option<String>))]
    pub low_price_24h: Option<Decimal>,
    pub updated_at: DateTime<Utc>,
}
