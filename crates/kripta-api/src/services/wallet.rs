//! 입출금.

use kripta_core::{exchange_span, ledger, ExchangeError, ExchangeResult, Wallet};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{info, Instrument};

use crate::repository::{
    CryptocurrencyRepository, MarketDataRepository, NewTransaction, TransactionRepository,
    WalletRepository,
};

/// 입금 처리.
///
/// 지갑이 없으면 잔고 0으로 만든 뒤 잠그고, 잔고를 늘린 다음
/// 완료된 입금 내역을 같은 트랜잭션에서 기록합니다.
pub async fn deposit(
    pool: &PgPool,
    user_id: i64,
    crypto_id: i64,
    amount: Decimal,
) -> ExchangeResult<Wallet> {
    async move {
        CryptocurrencyRepository::require(pool, crypto_id).await?;

        let price_usd = MarketDataRepository::find_by_crypto(pool, crypto_id)
            .await?
            .map(|market| market.price_usd);

        let mut tx = pool.begin().await?;

        WalletRepository::ensure_exists(&mut *tx, user_id, crypto_id).await?;
        let wallet = WalletRepository::lock_for_update(&mut *tx, user_id, crypto_id)
            .await?
            .ok_or(ExchangeError::WalletNotFound { crypto_id })?;

        let balance = ledger::credit(wallet.balance, amount)?;
        let wallet =
            WalletRepository::update_balances(&mut *tx, wallet.id, balance, wallet.locked_balance)
                .await?;

        TransactionRepository::insert(
            &mut *tx,
            &NewTransaction::deposit(user_id, crypto_id, amount, price_usd),
        )
        .await?;

        tx.commit().await?;

        info!(%amount, balance = %wallet.balance, "Deposit completed");
        Ok(wallet)
    }
    .instrument(exchange_span!("deposit", user_id, crypto_id))
    .await
}

/// 출금 처리.
///
/// 지갑이 없으면 `WalletNotFound`, 잔고보다 많으면 `InsufficientBalance`.
pub async fn withdraw(
    pool: &PgPool,
    user_id: i64,
    crypto_id: i64,
    amount: Decimal,
) -> ExchangeResult<Wallet> {
    async move {
        let price_usd = MarketDataRepository::find_by_crypto(pool, crypto_id)
            .await?
            .map(|market| market.price_usd);

        let mut tx = pool.begin().await?;

        let wallet = WalletRepository::lock_for_update(&mut *tx, user_id, crypto_id)
            .await?
            .ok_or(ExchangeError::WalletNotFound { crypto_id })?;

        let balance = ledger::debit(wallet.balance, amount)?;
        let wallet =
            WalletRepository::update_balances(&mut *tx, wallet.id, balance, wallet.locked_balance)
                .await?;

        TransactionRepository::insert(
            &mut *tx,
            &NewTransaction::withdrawal(user_id, crypto_id, amount, price_usd),
        )
        .await?;

        tx.commit().await?;

        info!(%amount, balance = %wallet.balance, "Withdrawal completed");
        Ok(wallet)
    }
    .instrument(exchange_span!("withdraw", user_id, crypto_id))
    .await
}
