//! 포트폴리오 스냅샷 저장소.

use chrono::{DateTime, Utc};
use kripta_core::{
    parse_optional_decimal, parse_stored_decimal, ExchangeError, ExchangeResult,
    PortfolioSnapshot, SnapshotHolding,
};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{FromRow, PgExecutor};

use super::convert_all;

/// portfolio_snapshots 테이블 레코드.
#[derive(Debug, Clone, FromRow)]
pub struct SnapshotRecord {
    pub id: i64,
    pub user_id: i64,
    pub total_value_usd: String,
    pub total_value_eur: Option<String>,
    pub holdings_json: Json<Vec<SnapshotHolding>>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<SnapshotRecord> for PortfolioSnapshot {
    type Error = ExchangeError;

    fn try_from(r: SnapshotRecord) -> Result<Self, Self::Error> {
        Ok(PortfolioSnapshot {
            id: r.id,
            user_id: r.user_id,
            total_value_usd: parse_stored_decimal(
                "portfolio_snapshots.total_value_usd",
                &r.total_value_usd,
            )?,
            total_value_eur: parse_optional_decimal(
                "portfolio_snapshots.total_value_eur",
                r.total_value_eur.as_deref(),
            )?,
            holdings: r.holdings_json.0,
            created_at: r.created_at,
        })
    }
}

/// 새 스냅샷 입력.
#[derive(Debug, Clone)]
pub struct NewSnapshot {
    pub user_id: i64,
    pub total_value_usd: Decimal,
    pub total_value_eur: Option<Decimal>,
    pub holdings: Vec<SnapshotHolding>,
}

const COLUMNS: &str = "id, user_id, total_value_usd, total_value_eur, holdings_json, created_at";

/// 포트폴리오 스냅샷 저장소.
pub struct SnapshotRepository;

impl SnapshotRepository {
    /// 스냅샷 저장.
    pub async fn insert<'e>(
        executor: impl PgExecutor<'e>,
        input: &NewSnapshot,
    ) -> ExchangeResult<PortfolioSnapshot> {
        let record = sqlx::query_as::<_, SnapshotRecord>(&format!(
            r#"
            INSERT INTO portfolio_snapshots (user_id, total_value_usd, total_value_eur, holdings_json)
            VALUES ($1, $2, $3, $4)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(input.user_id)
        .bind(input.total_value_usd.to_string())
        .bind(input.total_value_eur.map(|v| v.to_string()))
        .bind(Json(&input.holdings))
        .fetch_one(executor)
        .await?;

        PortfolioSnapshot::try_from(record)
    }

    /// 기준 시각 이후 스냅샷 (오래된 순).
    pub async fn list_since<'e>(
        executor: impl PgExecutor<'e>,
        user_id: i64,
        since: DateTime<Utc>,
    ) -> ExchangeResult<Vec<PortfolioSnapshot>> {
        let records = sqlx::query_as::<_, SnapshotRecord>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM portfolio_snapshots
            WHERE user_id = $1 AND created_at >= $2
            ORDER BY created_at
            "#
        ))
        .bind(user_id)
        .bind(since)
        .fetch_all(executor)
        .await?;

        convert_all(records)
    }
}
