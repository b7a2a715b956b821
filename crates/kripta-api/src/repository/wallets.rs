//! 지갑 저장소.
//!
//! 잔고 변경은 서비스 계층의 트랜잭션 안에서 `lock_for_update`로
//! 행을 잠근 뒤 `update_balances`로 기록합니다.

use chrono::{DateTime, Utc};
use kripta_core::{parse_stored_decimal, ExchangeError, ExchangeResult, Wallet};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgExecutor};

use super::convert_all;

/// wallets 테이블 레코드.
#[derive(Debug, Clone, FromRow)]
pub struct WalletRecord {
    pub id: i64,
    pub user_id: i64,
    pub crypto_id: i64,
    pub balance: String,
    pub locked_balance: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<WalletRecord> for Wallet {
    type Error = ExchangeError;

    fn try_from(r: WalletRecord) -> Result<Self, Self::Error> {
        Ok(Wallet {
            id: r.id,
            user_id: r.user_id,
            crypto_id: r.crypto_id,
            balance: parse_stored_decimal("wallets.balance", &r.balance)?,
            locked_balance: parse_stored_decimal("wallets.locked_balance", &r.locked_balance)?,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

const COLUMNS: &str = "id, user_id, crypto_id, balance, locked_balance, created_at, updated_at";

/// 지갑 저장소.
pub struct WalletRepository;

impl WalletRepository {
    /// 사용자의 모든 지갑 (crypto_id 순).
    pub async fn list_by_user<'e>(
        executor: impl PgExecutor<'e>,
        user_id: i64,
    ) -> ExchangeResult<Vec<Wallet>> {
        let records = sqlx::query_as::<_, WalletRecord>(&format!(
            "SELECT {COLUMNS} FROM wallets WHERE user_id = $1 ORDER BY crypto_id"
        ))
        .bind(user_id)
        .fetch_all(executor)
        .await?;

        convert_all(records)
    }

    /// 사용자/암호화폐 지갑 조회 (잠금 없음).
    pub async fn find<'e>(
        executor: impl PgExecutor<'e>,
        user_id: i64,
        crypto_id: i64,
    ) -> ExchangeResult<Option<Wallet>> {
        let record = sqlx::query_as::<_, WalletRecord>(&format!(
            "SELECT {COLUMNS} FROM wallets WHERE user_id = $1 AND crypto_id = $2"
        ))
        .bind(user_id)
        .bind(crypto_id)
        .fetch_optional(executor)
        .await?;

        record.map(Wallet::try_from).transpose()
    }

    /// 지갑이 없으면 잔고 0으로 생성합니다. 이미 있으면 아무것도 하지 않습니다.
    pub async fn ensure_exists<'e>(
        executor: impl PgExecutor<'e>,
        user_id: i64,
        crypto_id: i64,
    ) -> ExchangeResult<()> {
        sqlx::query(
            r#"
            INSERT INTO wallets (user_id, crypto_id, balance, locked_balance)
            VALUES ($1, $2, '0', '0')
            ON CONFLICT (user_id, crypto_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(crypto_id)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// 지갑 행을 `FOR UPDATE`로 잠그고 읽습니다. 트랜잭션 안에서만 의미가 있습니다.
    pub async fn lock_for_update<'e>(
        executor: impl PgExecutor<'e>,
        user_id: i64,
        crypto_id: i64,
    ) -> ExchangeResult<Option<Wallet>> {
        let record = sqlx::query_as::<_, WalletRecord>(&format!(
            "SELECT {COLUMNS} FROM wallets WHERE user_id = $1 AND crypto_id = $2 FOR UPDATE"
        ))
        .bind(user_id)
        .bind(crypto_id)
        .fetch_optional(executor)
        .await?;

        record.map(Wallet::try_from).transpose()
    }

    /// 잔고와 잠금 잔고를 기록합니다.
    pub async fn update_balances<'e>(
        executor: impl PgExecutor<'e>,
        wallet_id: i64,
        balance: Decimal,
        locked_balance: Decimal,
    ) -> ExchangeResult<Wallet> {
        let record = sqlx::query_as::<_, WalletRecord>(&format!(
            r#"
            UPDATE wallets
            SET balance = $2, locked_balance = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(wallet_id)
        .bind(balance.to_string())
        .bind(locked_balance.to_string())
        .fetch_one(executor)
        .await?;

        Wallet::try_from(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(balance: &str, locked: &str) -> WalletRecord {
        let now = Utc::now();
        WalletRecord {
            id: 3,
            user_id: 1,
            crypto_id: 2,
            balance: balance.to_string(),
            locked_balance: locked.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_record_conversion() {
        let wallet = Wallet::try_from(record("1.50000000", "0.5")).unwrap();
        assert_eq!(wallet.balance, dec!(1.5));
        assert_eq!(wallet.available_balance(), dec!(1));
    }

    #[test]
    fn test_empty_balance_is_zero() {
        let wallet = Wallet::try_from(record("", "")).unwrap();
        assert_eq!(wallet.balance, Decimal::ZERO);
        assert_eq!(wallet.locked_balance, Decimal::ZERO);
    }

    #[test]
    fn test_malformed_balance_is_error() {
        assert!(Wallet::try_from(record("1,5", "0")).is_err());
    }
}
