//! 암호화폐 저장소.

use chrono::{DateTime, Utc};
use kripta_core::{Cryptocurrency, ExchangeError, ExchangeResult};
use sqlx::{FromRow, PgExecutor};

use super::convert_all;

/// cryptocurrencies 테이블 레코드.
#[derive(Debug, Clone, FromRow)]
pub struct CryptocurrencyRecord {
    pub id: i64,
    pub symbol: String,
    pub name: String,
    pub coin_gecko_id: String,
    pub logo: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<CryptocurrencyRecord> for Cryptocurrency {
    type Error = ExchangeError;

    fn try_from(r: CryptocurrencyRecord) -> Result<Self, Self::Error> {
        Ok(Cryptocurrency {
            id: r.id,
            symbol: r.symbol,
            name: r.name,
            coin_gecko_id: r.coin_gecko_id,
            logo: r.logo,
            description: r.description,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

/// 새 암호화폐 등록 입력.
#[derive(Debug, Clone)]
pub struct NewCryptocurrency {
    pub symbol: String,
    pub name: String,
    pub coin_gecko_id: String,
    pub logo: Option<String>,
    pub description: Option<String>,
}

const COLUMNS: &str =
    "id, symbol, name, coin_gecko_id, logo, description, is_active, created_at, updated_at";

/// 암호화폐 저장소.
pub struct CryptocurrencyRepository;

impl CryptocurrencyRepository {
    /// 활성 암호화폐 목록 (id 순).
    pub async fn list_active<'e>(executor: impl PgExecutor<'e>) -> ExchangeResult<Vec<Cryptocurrency>> {
        let records = sqlx::query_as::<_, CryptocurrencyRecord>(&format!(
            "SELECT {COLUMNS} FROM cryptocurrencies WHERE is_active = TRUE ORDER BY id"
        ))
        .fetch_all(executor)
        .await?;

        convert_all(records)
    }

    /// 비활성 포함 전체 목록 (id 순).
    pub async fn list_all<'e>(executor: impl PgExecutor<'e>) -> ExchangeResult<Vec<Cryptocurrency>> {
        let records = sqlx::query_as::<_, CryptocurrencyRecord>(&format!(
            "SELECT {COLUMNS} FROM cryptocurrencies ORDER BY id"
        ))
        .fetch_all(executor)
        .await?;

        convert_all(records)
    }

    /// id로 조회.
    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        crypto_id: i64,
    ) -> ExchangeResult<Option<Cryptocurrency>> {
        let record = sqlx::query_as::<_, CryptocurrencyRecord>(&format!(
            "SELECT {COLUMNS} FROM cryptocurrencies WHERE id = $1"
        ))
        .bind(crypto_id)
        .fetch_optional(executor)
        .await?;

        record.map(Cryptocurrency::try_from).transpose()
    }

    /// id로 조회하되, 없으면 `CryptocurrencyNotFound`.
    pub async fn require<'e>(
        executor: impl PgExecutor<'e>,
        crypto_id: i64,
    ) -> ExchangeResult<Cryptocurrency> {
        Self::find_by_id(executor, crypto_id)
            .await?
            .ok_or(ExchangeError::CryptocurrencyNotFound(crypto_id))
    }

    /// 새 암호화폐 등록.
    ///
    /// 심볼은 대문자로 저장됩니다.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &NewCryptocurrency,
    ) -> ExchangeResult<Cryptocurrency> {
        let record = sqlx::query_as::<_, CryptocurrencyRecord>(&format!(
            r#"
            INSERT INTO cryptocurrencies (symbol, name, coin_gecko_id, logo, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(input.symbol.to_uppercase())
        .bind(&input.name)
        .bind(&input.coin_gecko_id)
        .bind(&input.logo)
        .bind(&input.description)
        .fetch_one(executor)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => ExchangeError::InvalidInput(
                format!("이미 등록된 암호화폐입니다: {}", input.symbol),
            ),
            _ => ExchangeError::from(e),
        })?;

        Cryptocurrency::try_from(record)
    }
}
