//! 시세 캐시 저장소.
//!
//! 시세는 외부 갱신 프로세스가 채우며, 이 서비스는 주로 읽기만 합니다.

use chrono::{DateTime, Utc};
use kripta_core::{parse_optional_decimal, parse_stored_decimal, ExchangeError, ExchangeResult, MarketData};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgExecutor};

use super::convert_all;

/// market_data 테이블 레코드.
#[derive(Debug, Clone, FromRow)]
pub struct MarketDataRecord {
    pub id: i64,
    pub crypto_id: i64,
    pub price_usd: String,
    pub price_eur: Option<String>,
    pub market_cap: Option<String>,
    pub volume_24h: Option<String>,
    pub percent_change_24h: Option<String>,
    pub percent_change_7d: Option<String>,
    pub high_price_24h: Option<String>,
    pub low_price_24h: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<MarketDataRecord> for MarketData {
    type Error = ExchangeError;

    fn try_from(r: MarketDataRecord) -> Result<Self, Self::Error> {
        Ok(MarketData {
            id: r.id,
            crypto_id: r.crypto_id,
            price_usd: parse_stored_decimal("market_data.price_usd", &r.price_usd)?,
            price_eur: parse_optional_decimal("market_data.price_eur", r.price_eur.as_deref())?,
            market_cap: parse_optional_decimal("market_data.market_cap", r.market_cap.as_deref())?,
            volume_24h: parse_optional_decimal("market_data.volume_24h", r.volume_24h.as_deref())?,
            percent_change_24h: parse_optional_decimal(
                "market_data.percent_change_24h",
                r.percent_change_24h.as_deref(),
            )?,
            percent_change_7d: parse_optional_decimal(
                "market_data.percent_change_7d",
                r.percent_change_7d.as_deref(),
            )?,
            high_price_24h: parse_optional_decimal(
                "market_data.high_price_24h",
                r.high_price_24h.as_deref(),
            )?,
            low_price_24h: parse_optional_decimal(
                "market_data.low_price_24h",
                r.low_price_24h.as_deref(),
            )?,
            updated_at: r.updated_at,
        })
    }
}

/// 시세 upsert 입력.
#[derive(Debug, Clone, Default)]
pub struct NewMarketData {
    pub price_usd: Decimal,
    pub price_eur: Option<Decimal>,
    pub market_cap: Option<Decimal>,
    pub volume_24h: Option<Decimal>,
    pub percent_change_24h: Option<Decimal>,
    pub percent_change_7d: Option<Decimal>,
    pub high_price_24h: Option<Decimal>,
    pub low_price_24h: Option<Decimal>,
}

const COLUMNS: &str = "id, crypto_id, price_usd, price_eur, market_cap, volume_24h, \
                       percent_change_24h, percent_change_7d, high_price_24h, low_price_24h, updated_at";

fn text(value: Option<Decimal>) -> Option<String> {
    value.map(|v| v.to_string())
}

/// 시세 캐시 저장소.
pub struct MarketDataRepository;

impl MarketDataRepository {
    /// 암호화폐의 캐시된 시세.
    pub async fn find_by_crypto<'e>(
        executor: impl PgExecutor<'e>,
        crypto_id: i64,
    ) -> ExchangeResult<Option<MarketData>> {
        let record = sqlx::query_as::<_, MarketDataRecord>(&format!(
            "SELECT {COLUMNS} FROM market_data WHERE crypto_id = $1"
        ))
        .bind(crypto_id)
        .fetch_optional(executor)
        .await?;

        record.map(MarketData::try_from).transpose()
    }

    /// 전체 캐시된 시세.
    pub async fn list_all<'e>(executor: impl PgExecutor<'e>) -> ExchangeResult<Vec<MarketData>> {
        let records = sqlx::query_as::<_, MarketDataRecord>(&format!(
            "SELECT {COLUMNS} FROM market_data ORDER BY crypto_id"
        ))
        .fetch_all(executor)
        .await?;

        convert_all(records)
    }

    /// 시세를 생성하거나 교체합니다.
    pub async fn upsert<'e>(
        executor: impl PgExecutor<'e>,
        crypto_id: i64,
        input: &NewMarketData,
    ) -> ExchangeResult<MarketData> {
        let record = sqlx::query_as::<_, MarketDataRecord>(&format!(
            r#"
            INSERT INTO market_data (
                crypto_id, price_usd, price_eur, market_cap, volume_24h,
                percent_change_24h, percent_change_7d, high_price_24h, low_price_24h, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
            ON CONFLICT (crypto_id) DO UPDATE SET
                price_usd = EXCLUDED.price_usd,
                price_eur = EXCLUDED.price_eur,
                market_cap = EXCLUDED.market_cap,
                volume_24h = EXCLUDED.volume_24h,
                percent_change_24h = EXCLUDED.percent_change_24h,
                percent_change_7d = EXCLUDED.percent_change_7d,
                high_price_24h = EXCLUDED.high_price_24h,
                low_price_24h = EXCLUDED.low_price_24h,
                updated_at = NOW()
            RETURNING {COLUMNS}
            "#
        ))
        .bind(crypto_id)
        .bind(input.price_usd.to_string())
        .bind(text(input.price_eur))
        .bind(text(input.market_cap))
        .bind(text(input.volume_24h))
        .bind(text(input.percent_change_24h))
        .bind(text(input.percent_change_7d))
        .bind(text(input.high_price_24h))
        .bind(text(input.low_price_24h))
        .fetch_one(executor)
        .await?;

        MarketData::try_from(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record() -> MarketDataRecord {
        MarketDataRecord {
            id: 1,
            crypto_id: 1,
            price_usd: "64250.12".to_string(),
            price_eur: Some("59000".to_string()),
            market_cap: None,
            volume_24h: Some("".to_string()),
            percent_change_24h: Some("-1.25".to_string()),
            percent_change_7d: None,
            high_price_24h: None,
            low_price_24h: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_record_conversion() {
        let market = MarketData::try_from(record()).unwrap();
        assert_eq!(market.price_usd, dec!(64250.12));
        assert_eq!(market.percent_change_24h, Some(dec!(-1.25)));
        assert_eq!(market.volume_24h, None);
    }

    #[test]
    fn test_malformed_price_is_data_error() {
        let mut r = record();
        r.price_usd = "sixty thousand".to_string();
        let err = MarketData::try_from(r).unwrap_err();
        assert_eq!(err.code(), "DATA_ERROR");
    }
}
