//! 포트폴리오 스냅샷.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 스냅샷 시점의 보유 자산 한 건.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SnapshotHolding {
    pub crypto_id: i64,
    pub symbol: String,
    #[cfg_attr(feature = "utoipa-support", schema(value_type = String))]
    pub balance: Decimal,
    #[cfg_attr(feature = "utoipa-support", schema(value_type = String))]
    pub price_usd: Decimal,
    #[cfg_attr(feature = "utoipa-support", schema(value_type = String))]
    pub value_usd: Decimal,
}

/// 특정 시점의 포트폴리오 평가액.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    pub id: i64,
    pub user_id: i64,
    #[cfg_attr(feature = "utoipa-support", schema(value_type = String))]
    pub total_value_usd: Decimal,
    #[cfg_attr(feature = "utoipa-support", schema(value_type = Option<String>))]
    pub total_value_eur: Option<Decimal>,
    pub holdings: Vec<SnapshotHolding>,
    pub created_at: DateTime<Utc>,
}
