//! 거래 내역 저장소.

use chrono::{DateTime, Utc};
use kripta_core::{
    parse_optional_decimal, parse_stored_decimal, ExchangeError, ExchangeResult, Transaction,
    TransactionStatus, TransactionType,
};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgExecutor};

use super::convert_all;

/// transactions 테이블 레코드.
#[derive(Debug, Clone, FromRow)]
pub struct TransactionRecord {
    pub id: i64,
    pub user_id: i64,
    pub from_crypto_id: Option<i64>,
    pub to_crypto_id: Option<i64>,
    pub transaction_type: String,
    pub amount: String,
    pub fee: String,
    pub status: String,
    pub order_id: Option<i64>,
    pub tx_hash: Option<String>,
    pub price_usd: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<TransactionRecord> for Transaction {
    type Error = ExchangeError;

    fn try_from(r: TransactionRecord) -> Result<Self, Self::Error> {
        Ok(Transaction {
            id: r.id,
            user_id: r.user_id,
            from_crypto_id: r.from_crypto_id,
            to_crypto_id: r.to_crypto_id,
            transaction_type: r.transaction_type.parse::<TransactionType>()?,
            amount: parse_stored_decimal("transactions.amount", &r.amount)?,
            fee: parse_stored_decimal("transactions.fee", &r.fee)?,
            status: r.status.parse::<TransactionStatus>()?,
            order_id: r.order_id,
            tx_hash: r.tx_hash,
            price_usd: parse_optional_decimal("transactions.price_usd", r.price_usd.as_deref())?,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

/// 새 거래 내역 입력.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub user_id: i64,
    pub from_crypto_id: Option<i64>,
    pub to_crypto_id: Option<i64>,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub fee: Decimal,
    pub status: TransactionStatus,
    pub order_id: Option<i64>,
    pub price_usd: Option<Decimal>,
}

impl NewTransaction {
    /// 완료된 입금 내역.
    pub fn deposit(user_id: i64, crypto_id: i64, amount: Decimal, price_usd: Option<Decimal>) -> Self {
        Self {
            user_id,
            from_crypto_id: None,
            to_crypto_id: Some(crypto_id),
            transaction_type: TransactionType::Deposit,
            amount,
            fee: Decimal::ZERO,
            status: TransactionStatus::Completed,
            order_id: None,
            price_usd,
        }
    }

    /// 완료된 출금 내역.
    pub fn withdrawal(user_id: i64, crypto_id: i64, amount: Decimal, price_usd: Option<Decimal>) -> Self {
        Self {
            user_id,
            from_crypto_id: Some(crypto_id),
            to_crypto_id: None,
            transaction_type: TransactionType::Withdrawal,
            amount,
            fee: Decimal::ZERO,
            status: TransactionStatus::Completed,
            order_id: None,
            price_usd,
        }
    }
}

const COLUMNS: &str = "id, user_id, from_crypto_id, to_crypto_id, transaction_type, amount, fee, \
                       status, order_id, tx_hash, price_usd, created_at, updated_at";

/// 거래 내역 저장소.
pub struct TransactionRepository;

impl TransactionRepository {
    /// 거래 내역 추가.
    pub async fn insert<'e>(
        executor: impl PgExecutor<'e>,
        input: &NewTransaction,
    ) -> ExchangeResult<Transaction> {
        let record = sqlx::query_as::<_, TransactionRecord>(&format!(
            r#"
            INSERT INTO transactions (
                user_id, from_crypto_id, to_crypto_id, transaction_type,
                amount, fee, status, order_id, price_usd
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(input.user_id)
        .bind(input.from_crypto_id)
        .bind(input.to_crypto_id)
        .bind(input.transaction_type.as_str())
        .bind(input.amount.to_string())
        .bind(input.fee.to_string())
        .bind(input.status.as_str())
        .bind(input.order_id)
        .bind(input.price_usd.map(|p| p.to_string()))
        .fetch_one(executor)
        .await?;

        Transaction::try_from(record)
    }

    /// 사용자의 최근 거래 내역 (최신순).
    pub async fn list_recent<'e>(
        executor: impl PgExecutor<'e>,
        user_id: i64,
        limit: i64,
    ) -> ExchangeResult<Vec<Transaction>> {
        let records = sqlx::query_as::<_, TransactionRecord>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM transactions
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(executor)
        .await?;

        convert_all(records)
    }

    /// 사용자의 전체 거래 내역 (분석용).
    pub async fn list_by_user<'e>(
        executor: impl PgExecutor<'e>,
        user_id: i64,
    ) -> ExchangeResult<Vec<Transaction>> {
        let records = sqlx::query_as::<_, TransactionRecord>(&format!(
            "SELECT {COLUMNS} FROM transactions WHERE user_id = $1 ORDER BY created_at"
        ))
        .bind(user_id)
        .fetch_all(executor)
        .await?;

        convert_all(records)
    }
}
