//! 포트폴리오 평가액 추이.
//!
//! 스냅샷을 UTC 날짜별로 묶어 각 날짜의 마지막 스냅샷만 남깁니다.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use kripta_core::PortfolioSnapshot;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 기본 조회 기간 (일).
pub const DEFAULT_DAYS_BACK: i64 = 30;

/// 최대 조회 기간 (일).
pub const MAX_DAYS_BACK: i64 = 365;

/// 추이 그래프의 한 점.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ValueHistoryPoint {
    /// Unix 밀리초
    pub timestamp: i64,
    #[cfg_attr(feature = "utoipa-support", schema(value_type = String))]
    pub total_value_usd: Decimal,
    pub holding_count: usize,
}

/// 조회 기간을 1..=365 범위로 보정합니다. 없으면 30일.
pub fn clamp_days_back(days_back: Option<i64>) -> i64 {
    days_back
        .unwrap_or(DEFAULT_DAYS_BACK)
        .clamp(1, MAX_DAYS_BACK)
}

/// 조회 시작 시각.
pub fn window_start(now: DateTime<Utc>, days_back: i64) -> DateTime<Utc> {
    now - Duration::days(days_back)
}

/// 스냅샷을 일 단위로 묶습니다. 결과는 시각 오름차순입니다.
pub fn bucket_daily(snapshots: &[PortfolioSnapshot]) -> Vec<ValueHistoryPoint> {
    let mut latest_per_day: BTreeMap<NaiveDate, &PortfolioSnapshot> = BTreeMap::new();

    for snapshot in snapshots {
        let day = snapshot.created_at.date_naive();
        match latest_per_day.get(&day) {
            Some(existing) if existing.created_at >= snapshot.created_at => {}
            _ => {
                latest_per_day.insert(day, snapshot);
            }
        }
    }

    latest_per_day
        .into_values()
        .map(|snapshot| ValueHistoryPoint {
            timestamp: snapshot.created_at.timestamp_millis(),
            total_value_usd: snapshot.total_value_usd,
            holding_count: snapshot.holdings.len(),
        })
        .collect()
}
